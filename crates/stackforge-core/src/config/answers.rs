//! Unvalidated answers gathered from flags, an answers file or prompts

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Raw answers before validation
///
/// Enum-valued answers are kept as strings so that unknown values surface as
/// configuration issues alongside every other problem instead of as a parse
/// failure of the whole file. `None` means "not answered" and falls back to the
/// default for the chosen stack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawAnswers {
    pub project_name: Option<String>,
    pub stack: Option<String>,
    pub package_manager: Option<String>,
    pub git: Option<bool>,

    // Backend
    pub database: Option<String>,
    pub use_orm: Option<bool>,
    pub include_auth: Option<bool>,
    pub include_api_docs: Option<bool>,
    pub include_container: Option<bool>,

    // Frontend
    pub styling: Option<String>,
    pub typescript: Option<bool>,
    pub shadcn: Option<bool>,

    // Mobile
    pub expo_template: Option<String>,
    pub nativewind: Option<bool>,
}

impl RawAnswers {
    /// Answers for `stack` with every other question left at its default
    pub fn for_stack(name: &str, stack: &str) -> Self {
        Self {
            project_name: Some(name.to_string()),
            stack: Some(stack.to_string()),
            ..Default::default()
        }
    }

    /// Parse answers from YAML text
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("Failed to parse answers")
    }

    /// Load answers from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read answers file {}", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("Invalid answers file {}", path.display()))
    }

    /// Serialize to YAML, e.g. to save interactive answers for reuse
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize answers")
    }

    /// Take every answer `other` gives, keeping ours where it is silent
    pub fn overlay(&mut self, other: RawAnswers) {
        fn take<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        take(&mut self.project_name, other.project_name);
        take(&mut self.stack, other.stack);
        take(&mut self.package_manager, other.package_manager);
        take(&mut self.git, other.git);
        take(&mut self.database, other.database);
        take(&mut self.use_orm, other.use_orm);
        take(&mut self.include_auth, other.include_auth);
        take(&mut self.include_api_docs, other.include_api_docs);
        take(&mut self.include_container, other.include_container);
        take(&mut self.styling, other.styling);
        take(&mut self.typescript, other.typescript);
        take(&mut self.shadcn, other.shadcn);
        take(&mut self.expo_template, other.expo_template);
        take(&mut self.nativewind, other.nativewind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_answers() {
        let yaml = r#"
project_name: shop-api
stack: express
database: postgresql
use_orm: true
include_auth: true
package_manager: pnpm
"#;
        let answers = RawAnswers::from_yaml_str(yaml).unwrap();
        assert_eq!(answers.project_name.as_deref(), Some("shop-api"));
        assert_eq!(answers.database.as_deref(), Some("postgresql"));
        assert_eq!(answers.include_auth, Some(true));
        assert_eq!(answers.include_api_docs, None);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(RawAnswers::from_yaml_str("projectname: x\n").is_err());
    }

    #[test]
    fn test_overlay_prefers_given_answers() {
        let mut base = RawAnswers::for_stack("one", "express");
        base.include_auth = Some(true);
        base.overlay(RawAnswers {
            project_name: Some("two".to_string()),
            git: Some(false),
            ..Default::default()
        });
        assert_eq!(base.project_name.as_deref(), Some("two"));
        assert_eq!(base.stack.as_deref(), Some("express"));
        assert_eq!(base.include_auth, Some(true));
        assert_eq!(base.git, Some(false));
    }

    #[test]
    fn test_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.yaml");
        std::fs::write(&path, "stack: nest\n").unwrap();
        let answers = RawAnswers::from_yaml_file(&path).unwrap();
        assert_eq!(answers.stack.as_deref(), Some("nest"));
    }
}
