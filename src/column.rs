//! Column definitions.

use std::fmt;

/// One column of a table: name, warehouse type and optional constraints.
///
/// `extra` holds space-joined constraints such as `NOT NULL` or
/// `IDENTITY(0, 1)`. It may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub ty: String,
    pub extra: String,
}

impl Column {
    /// A column with no constraints.
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            extra: String::new(),
        }
    }

    /// Replace the constraint text.
    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = extra.into();
        self
    }

    /// Whether the warehouse assigns this column's values.
    pub fn is_identity(&self) -> bool {
        self.extra.to_ascii_uppercase().contains("IDENTITY")
    }
}

/// Renders the column as it appears in a CREATE TABLE body.
impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.ty)?;
        let extra = self.extra.trim();
        if !extra.is_empty() {
            write!(f, " {}", extra)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_without_extra() {
        assert_eq!(Column::new("c1", "t1").to_string(), "c1 t1");
    }

    #[test]
    fn test_display_with_extra() {
        let col = Column::new("hour", "INT2").with_extra("NOT NULL");
        assert_eq!(col.to_string(), "hour INT2 NOT NULL");
    }

    #[test]
    fn test_display_blank_extra() {
        let col = Column::new("c", "INT").with_extra("   ");
        assert_eq!(col.to_string(), "c INT");
    }

    #[test]
    fn test_identity() {
        assert!(Column::new("id", "INT4").with_extra("IDENTITY(0, 1)").is_identity());
        assert!(Column::new("id", "INT4").with_extra("identity(1, 1) NOT NULL").is_identity());
        assert!(!Column::new("id", "INT4").with_extra("NOT NULL").is_identity());
    }
}
