/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Malformed record on line {line} ({content:?}): {reason}")]
    MalformedRecord {
        line: usize,
        content: String,
        reason: String,
    },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Duplicate preference for user {user_id}, item {item_id}")]
    DuplicatePreference { user_id: i64, item_id: i64 },

    #[error("Unknown user: {0}")]
    UnknownUser(i64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Builds a malformed-record error for a 1-based line number
    pub fn malformed(line: usize, content: &str, reason: impl Into<String>) -> Self {
        AppError::MalformedRecord {
            line,
            content: content.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the error describes a single bad input record
    pub fn is_record_error(&self) -> bool {
        matches!(
            self,
            AppError::MalformedRecord { .. } | AppError::InvalidRecord(_)
        )
    }
}

pub type AppResult<T> = Result<T, AppError>;
