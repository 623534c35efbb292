use thiserror::Error;

/// A field of an incoming issue failed its format check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown facility `{0}`")]
    UnknownFacility(String),
    #[error("author must be 1-64 letters or spaces")]
    Author,
    #[error("text must be 1-256 letters, whitespace or . , ? !")]
    Text,
    #[error("img must be an http(s) URL shorter than 256 characters")]
    Img,
    #[error("coordinate `{axis}` must be a finite number")]
    Coordinate { axis: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("issue storage corrupt: {0}")]
    Corrupt(String),
    #[error("issue storage error: {0}")]
    Io(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IssueError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("cannot create more issues (limit {limit} reached)")]
    Capacity { limit: usize },
    #[error(transparent)]
    Storage(#[from] StorageError),
}
