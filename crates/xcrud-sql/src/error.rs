//! Error types for xcrud-sql

use thiserror::Error;

/// The result type for statement generation
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while turning a CRUD message into SQL
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Unrecognized or structurally invalid message or expression node
    #[error("Bad message: {0}")]
    BadMessage(String),

    /// A qualifying part of an identifier is missing
    #[error("Missing argument: {0}")]
    MissingArgument(String),

    /// An enumerated value is outside its valid set
    #[error("Invalid type value: {0}")]
    BadTypeValue(String),

    /// The projection does not fit the data model
    #[error("Invalid projection: {0}")]
    BadProjection(String),

    /// Row data does not match the projection
    #[error("Invalid insert data: {0}")]
    BadInsertData(String),

    /// The target table or collection name is invalid
    #[error("Invalid table: {0}")]
    BadTable(String),

    /// A recognized feature that has no SQL rendering yet
    #[error("Unsupported: {0} is not supported yet")]
    Unsupported(String),

    /// The execution engine rejected the generated statement
    #[error("Execution error {code}: {message}")]
    Execution { code: u16, message: String },

    /// The acknowledgement could not be delivered
    #[error("Notice error: {0}")]
    Notice(String),
}

impl Error {
    /// Create a bad message error
    pub fn bad_message(message: impl Into<String>) -> Self {
        Error::BadMessage(message.into())
    }

    /// Create a missing argument error
    pub fn missing_argument(message: impl Into<String>) -> Self {
        Error::MissingArgument(message.into())
    }

    /// Create a bad type value error
    pub fn bad_type_value(message: impl Into<String>) -> Self {
        Error::BadTypeValue(message.into())
    }

    /// Create a bad projection error
    pub fn bad_projection(message: impl Into<String>) -> Self {
        Error::BadProjection(message.into())
    }

    /// Create a bad insert data error
    pub fn bad_insert_data(message: impl Into<String>) -> Self {
        Error::BadInsertData(message.into())
    }

    /// Create a bad table error
    pub fn bad_table(message: impl Into<String>) -> Self {
        Error::BadTable(message.into())
    }

    /// Create an unsupported feature error
    pub fn unsupported(feature: impl Into<String>) -> Self {
        Error::Unsupported(feature.into())
    }

    /// Create an execution error carrying the engine's error code
    pub fn execution(code: u16, message: impl Into<String>) -> Self {
        Error::Execution {
            code,
            message: message.into(),
        }
    }

    /// Create a notice delivery error
    pub fn notice(message: impl Into<String>) -> Self {
        Error::Notice(message.into())
    }

    /// Server error number reported to the client for this error.
    ///
    /// Compilation errors use the X plugin's 5xxx range; execution errors
    /// keep the engine's own code.
    pub fn code(&self) -> u16 {
        match self {
            Error::BadMessage(_) => 5000,
            Error::BadTable(_) => 5113,
            Error::BadProjection(_) => 5114,
            Error::BadInsertData(_) => 5115,
            Error::MissingArgument(_) => 5152,
            Error::BadTypeValue(_) => 5153,
            Error::Unsupported(_) => 1235,
            Error::Execution { code, .. } => *code,
            Error::Notice(_) => 1105,
        }
    }

    /// SQLSTATE reported alongside [`Error::code`].
    pub fn sql_state(&self) -> &'static str {
        "HY000"
    }

    /// Whether the error was raised while compiling, before anything was executed.
    pub fn is_compile_error(&self) -> bool {
        !matches!(self, Error::Execution { .. } | Error::Notice(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::bad_message("x").code(), 5000);
        assert_eq!(Error::missing_argument("x").code(), 5152);
        assert_eq!(Error::bad_type_value("x").code(), 5153);
        assert_eq!(Error::bad_projection("x").code(), 5114);
        assert_eq!(Error::bad_insert_data("x").code(), 5115);
        assert_eq!(Error::execution(1146, "no such table").code(), 1146);
    }

    #[test]
    fn test_error_display() {
        let err = Error::unsupported("string collation");
        assert_eq!(
            err.to_string(),
            "Unsupported: string collation is not supported yet"
        );
        assert!(err.is_compile_error());
        assert!(!Error::notice("closed").is_compile_error());
    }
}
