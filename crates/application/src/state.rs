use crate::ApplicationError;

/// Progress of a user-initiated operation as the presentation layer sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationState<T> {
    Idle,
    InProgress,
    Succeeded(T),
    Failed(String),
}

impl<T> Default for OperationState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> OperationState<T> {
    pub fn begin(&mut self) {
        *self = Self::InProgress;
    }

    /// Settles the operation; `describe` turns a failure into a user-facing message.
    pub fn complete<F>(&mut self, result: Result<T, ApplicationError>, describe: F)
    where
        F: FnOnce(&ApplicationError) -> String,
    {
        *self = match result {
            Ok(value) => Self::Succeeded(value),
            Err(error) => Self::Failed(describe(&error)),
        };
    }

    pub fn reset(&mut self) {
        *self = Self::Idle;
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::InProgress)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }
}
