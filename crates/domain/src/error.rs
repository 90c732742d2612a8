#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("item id must be positive, got {0}")]
    InvalidItemId(i64),
    #[error("outfit id must be positive, got {0}")]
    InvalidOutfitId(i64),
    #[error("unknown clothing category: {0}")]
    UnknownCategory(String),
    #[error("pixel buffer of {width}x{height} needs {expected} bytes, got {actual}")]
    InvalidPixelBuffer {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}
