use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("db error: {0}")]
    Db(#[from] tracker_db::DbError),
    #[error("ingest error: {0}")]
    Ingest(#[from] ingest::IngestError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Message(String),
}

impl AppError {
    /// Stable machine-readable code for caller-side errors.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::InvalidInput(_) => Some("invalid_input"),
            Self::NotFound(_) => Some("not_found"),
            Self::Db(_) | Self::Ingest(_) | Self::Io(_) | Self::Message(_) => {
                None
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
