use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("cannot delete \"{name}\": orders reference article {article}")]
    ProductReferenced { name: String, article: String },

    #[error("{0} not found")]
    NotFound(&'static str),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: csv::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
