//! Error types for the sparkify loader.

use thiserror::Error;

/// The main error type for statement generation and pipeline execution.
#[derive(Debug, Error)]
pub enum EtlError {
    /// A statement was requested for a table without a name.
    #[error("Table name must not be empty")]
    EmptyTableName,

    /// CREATE or INSERT was requested with no columns.
    #[error("Table '{table}' has no columns")]
    EmptyColumns { table: String },

    /// A column has a blank name or type. `index` is 1-based.
    #[error("Column {index} of table '{table}' has a blank name or type")]
    EmptyColumnField { table: String, index: usize },

    /// A primary key was supplied but lists no columns.
    #[error("Table '{table}' declares an empty primary key")]
    EmptyPrimaryKey { table: String },

    /// COPY was requested without a data source.
    #[error("Table '{table}' has no data source to copy from")]
    EmptySource { table: String },

    /// INSERT was requested with a blank query.
    #[error("Table '{table}' has an empty populating query")]
    EmptyQuery { table: String },

    /// Inconsistent table declarations.
    #[error("Registry error: {0}")]
    Registry(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A statement failed; the remaining statements were not run.
    #[error("Statement {index} failed: {message}\n{statement}")]
    Execution {
        index: usize,
        statement: String,
        message: String,
    },
}

impl EtlError {
    /// Create an execution error for the statement at `index` (1-based).
    pub fn execution(index: usize, statement: &str, message: impl Into<String>) -> Self {
        Self::Execution {
            index,
            statement: statement.to_string(),
            message: message.into(),
        }
    }

    /// Create a registry error.
    pub fn registry(message: impl Into<String>) -> Self {
        Self::Registry(message.into())
    }
}

/// Result type alias for loader operations.
pub type EtlResult<T> = Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EtlError::EmptyColumns {
            table: "users".to_string(),
        };
        assert_eq!(err.to_string(), "Table 'users' has no columns");
    }

    #[test]
    fn test_column_field_display() {
        let err = EtlError::EmptyColumnField {
            table: "songs".to_string(),
            index: 2,
        };
        assert_eq!(err.to_string(), "Column 2 of table 'songs' has a blank name or type");
    }

    #[test]
    fn test_execution_display() {
        let err = EtlError::execution(3, "DROP TABLE IF EXISTS x CASCADE;", "permission denied");
        assert_eq!(
            err.to_string(),
            "Statement 3 failed: permission denied\nDROP TABLE IF EXISTS x CASCADE;"
        );
    }
}
