pub use crate::types::BucketFinderError;

pub type Result<T> = std::result::Result<T, BucketFinderError>;

/// Attaches a message to foreign errors while folding them into the
/// matching `BucketFinderError` variant.
pub trait ErrorContext<T> {
    fn config_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;

    fn checkpoint_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::fmt::Display,
{
    fn config_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| BucketFinderError::ConfigError(format!("{}: {}", f(), e)))
    }

    fn checkpoint_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| BucketFinderError::CheckpointError(format!("{}: {}", f(), e)))
    }
}
