//! Configuration validation errors

use super::options::Stack;
use thiserror::Error;

/// One reason a project name is not a valid package name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameIssue {
    #[error("name must not be empty")]
    Empty,
    #[error("name is {0} characters long, the limit is 214")]
    TooLong(usize),
    #[error("name must not start with a period")]
    LeadingDot,
    #[error("name must not start with an underscore")]
    LeadingUnderscore,
    #[error("name must not have leading or trailing whitespace")]
    SurroundingWhitespace,
    #[error("name must not contain capital letters")]
    Uppercase,
    #[error("name contains characters that are not URL-safe: {0}")]
    InvalidCharacters(String),
    #[error("'{0}' is a reserved name")]
    Reserved(String),
    #[error("'{0}' is a Node.js core module name")]
    CoreModule(String),
}

/// One problem found while building a `FeatureConfig`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigIssue {
    #[error("invalid project name: {0}")]
    InvalidProjectName(NameIssue),

    #[error("unknown {field} '{value}'")]
    UnknownValue { field: &'static str, value: String },

    #[error("authentication on {stack} needs a database, pick one or turn auth off")]
    AuthRequiresDatabase { stack: Stack },

    #[error("shadcn/ui needs Tailwind CSS on Next.js or the T3 Stack")]
    ShadcnRequiresTailwind,
}

impl ConfigIssue {
    pub(crate) fn unknown(field: &'static str, value: &str) -> Self {
        ConfigIssue::UnknownValue {
            field,
            value: value.to_string(),
        }
    }
}

/// Every issue found in a set of answers, reported together
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid configuration:{}", format_issues(.issues))]
pub struct ConfigError {
    pub issues: Vec<ConfigIssue>,
}

fn format_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("\n  - {}", issue))
        .collect()
}
