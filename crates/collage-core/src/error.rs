use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("No images for collage found")]
    EmptyInput,
    #[error("Every row of the layout is empty; nothing to render")]
    EmptyLayout,
    #[error("Height of collage could not be 0")]
    ZeroHeight,
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Unknown image key: {0}")]
    UnknownKey(String),
}

pub type Result<T> = std::result::Result<T, CollageError>;
