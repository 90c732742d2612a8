use wardrobe_domain::DomainError;

#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("decode error: {0}")]
    Decode(String),
}

impl ApplicationError {
    /// Classifies an I/O failure, keeping not-found and permission failures
    /// distinguishable from other I/O errors.
    pub fn from_io(context: &str, error: std::io::Error) -> Self {
        let message = format!("{context}: {error}");
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(message),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(message),
            _ => Self::Io(message),
        }
    }
}
