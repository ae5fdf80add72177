pub const MAX_TABLE_SIZE: usize = 128;

/// A small table of pre-rolled uniform numbers in `[0, 1)`.
///
/// Sequential reads wrap around, so a seeded table replays the same
/// sequence every lap.
#[derive(Clone, Debug)]
pub struct RandomNumberTable {
    rng: fastrand::Rng,
    values: Vec<f32>,
    cursor: usize,
}

impl RandomNumberTable {
    /// Table of `size` numbers, clamped to `1..=128`.
    pub fn new(size: usize, seed: u64) -> Self {
        let mut table = Self {
            rng: fastrand::Rng::with_seed(seed),
            values: vec![0.0; size.clamp(1, MAX_TABLE_SIZE)],
            cursor: 0,
        };
        table.regenerate();
        table
    }

    /// Roll every entry again and rewind.
    pub fn regenerate(&mut self) {
        for value in &mut self.values {
            *value = self.rng.f32();
        }
        self.cursor = 0;
    }

    /// Next number in sequence.
    pub fn get(&mut self) -> f32 {
        let value = self.values[self.cursor];
        self.cursor = (self.cursor + 1) % self.values.len();
        value
    }

    /// Entry `index`, clamped to the table.
    pub fn get_at(&self, index: usize) -> f32 {
        self.values[index.min(self.values.len() - 1)]
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
