/// Failure of an occupancy operation. `E` is the error type of the backing store.
#[derive(thiserror::Error, Debug)]
pub enum OccupancyError<E> {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Store(#[source] E),
}

impl<E> From<E> for OccupancyError<E> {
    fn from(value: E) -> Self {
        Self::Store(value)
    }
}
