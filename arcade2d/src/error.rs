use thiserror::Error;

/// Setup-time failures. Nothing in the per-tick path returns these.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("grid `{name}` has zero cells ({size_x}x{size_y})")]
    ZeroCells {
        name: String,
        size_x: u32,
        size_y: u32,
    },
    #[error("grid `{name}` has non-positive extents {width}x{height}")]
    InvalidExtents {
        name: String,
        width: f32,
        height: f32,
    },
    #[error("grid `{name}` bins must hold at least one reference")]
    ZeroBinCapacity { name: String },
    #[error("pool `{name}` was created with zero capacity")]
    ZeroCapacity { name: String },
    #[error("framerate must be greater than zero")]
    ZeroFramerate,
    #[error("duplicate name `{0}`")]
    DuplicateName(String),
    #[error("no template named `{0}`")]
    MissingTemplate(String),
}
