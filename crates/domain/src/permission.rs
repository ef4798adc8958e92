use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rolegate_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Atomic named capability, e.g. `project.delete`.
///
/// Codes are immutable catalog entries. The engine validates shape here and
/// catalog membership at sync time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PermissionCode(String);

impl PermissionCode {
    /// Creates a validated permission code.
    ///
    /// Codes are dot-separated segments of lowercase ASCII letters, digits,
    /// `_` and `-`, with at least one segment.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();

        if value.is_empty() {
            return Err(AppError::Validation(
                "permission code must not be empty".to_owned(),
            ));
        }

        let segments_valid = value.split('.').all(|segment| {
            !segment.is_empty()
                && segment.chars().all(|character| {
                    character.is_ascii_lowercase()
                        || character.is_ascii_digit()
                        || character == '_'
                        || character == '-'
                })
        });

        if !segments_valid {
            return Err(AppError::Validation(format!(
                "invalid permission code '{value}'"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the underlying code string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for PermissionCode {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

impl From<PermissionCode> for String {
    fn from(value: PermissionCode) -> Self {
        value.0
    }
}

impl Display for PermissionCode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::PermissionCode;

    #[test]
    fn accepts_dotted_lowercase_codes() {
        assert!(PermissionCode::new("project.delete").is_ok());
        assert!(PermissionCode::new("invoice.view").is_ok());
        assert!(PermissionCode::new("audit-log.export_csv").is_ok());
    }

    #[test]
    fn rejects_empty_and_malformed_codes() {
        assert!(PermissionCode::new("").is_err());
        assert!(PermissionCode::new("Project.Delete").is_err());
        assert!(PermissionCode::new("project..delete").is_err());
        assert!(PermissionCode::new(".delete").is_err());
        assert!(PermissionCode::new("project delete").is_err());
    }
}
