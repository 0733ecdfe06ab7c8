use thiserror::Error;

pub type ServiceResult<T> = core::result::Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Input(#[from] InputError),
    #[error("{0}")]
    Storage(#[from] StorageError),
    #[error("{0}")]
    IoError(#[from] std::io::Error),
    #[error("{0}")]
    SerdeJsonError(#[from] serde_json::Error),
    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid snapshot: {0}")]
    Invalid(String),
}

/// Rejected user input from the command surface.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("'{0}' is not a valid HH:MM time")]
    InvalidTime(String),
    #[error("unknown medication '{0}' (expected paracetamol or ibuprofen)")]
    UnknownMedication(String),
    #[error("unknown task '{0}' (expected rinse or corsodyl)")]
    UnknownTask(String),
    #[error("unknown item '{0}'")]
    UnknownItem(String),
    #[error("{section} has {len} time slots, slot {index} does not exist")]
    SlotOutOfRange {
        section: String,
        index: usize,
        len: usize,
    },
    #[error("{med} interval must be between {min} and {max} hours, got {got}")]
    IntervalOutOfRange {
        med: String,
        min: u32,
        max: u32,
        got: u32,
    },
    #[error("{section} has no {time} slot")]
    NoSuchSlot { section: String, time: String },
}
