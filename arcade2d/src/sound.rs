/// Fire-and-forget sound playback by name.
///
/// A missing sound or an unavailable device is the sink's problem; callers
/// never hear about it.
pub trait SoundSink {
    fn play_sound(&mut self, name: &str);
}

/// Sink that remembers what was played, in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SoundLog {
    pub played: Vec<String>,
}

impl SoundLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, name: &str) -> usize {
        self.played.iter().filter(|played| *played == name).count()
    }

    pub fn clear(&mut self) {
        self.played.clear();
    }
}

impl SoundSink for SoundLog {
    fn play_sound(&mut self, name: &str) {
        log::trace!("sound: {name}");
        self.played.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_plays_by_name() {
        let mut log = SoundLog::new();
        log.play_sound("hit");
        log.play_sound("boom");
        log.play_sound("hit");
        assert_eq!(log.count("hit"), 2);
        assert_eq!(log.played, ["hit", "boom", "hit"]);
    }
}
