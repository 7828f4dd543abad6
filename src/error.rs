use thiserror::Error;

/// Errors surfaced by the library.  Gameplay rejections (a locked door, a
/// missing connection) are not errors and never show up here.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("start room not found in generated {width}x{height} grid")]
    StartRoomMissing { width: usize, height: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
