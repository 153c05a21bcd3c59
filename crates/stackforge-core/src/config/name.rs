//! Package-name validation for project names

use super::error::NameIssue;
use std::fmt;

const MAX_LENGTH: usize = 214;

const RESERVED: &[&str] = &["node_modules", "favicon.ico"];

const CORE_MODULES: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// A project name that is also a valid package name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectName(String);

impl ProjectName {
    /// Validate `raw`, returning every rule it breaks
    pub fn parse(raw: &str) -> Result<Self, Vec<NameIssue>> {
        let issues = validate(raw);
        if issues.is_empty() {
            Ok(Self(raw.to_string()))
        } else {
            Err(issues)
        }
    }

    /// Derive a sibling name such as `<name>-server`
    ///
    /// Appending a lowercase suffix to a valid name keeps it valid apart from
    /// the length limit, which is trimmed here.
    pub(crate) fn with_suffix(&self, suffix: &str) -> Self {
        let mut name = format!("{}-{}", self.0, suffix);
        if name.len() > MAX_LENGTH {
            let keep = MAX_LENGTH - suffix.len() - 1;
            name = format!("{}-{}", &self.0[..keep], suffix);
        }
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProjectName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn validate(raw: &str) -> Vec<NameIssue> {
    if raw.is_empty() {
        return vec![NameIssue::Empty];
    }

    let mut issues = Vec::new();
    let trimmed = raw.trim();

    if raw.len() > MAX_LENGTH {
        issues.push(NameIssue::TooLong(raw.len()));
    }
    if raw.starts_with('.') {
        issues.push(NameIssue::LeadingDot);
    }
    if raw.starts_with('_') {
        issues.push(NameIssue::LeadingUnderscore);
    }
    if trimmed != raw {
        issues.push(NameIssue::SurroundingWhitespace);
    }
    if raw.chars().any(|c| c.is_uppercase()) {
        issues.push(NameIssue::Uppercase);
    }

    let mut invalid: Vec<char> = trimmed
        .chars()
        .filter(|c| !c.is_uppercase() && !is_url_safe(*c))
        .collect();
    invalid.sort_unstable();
    invalid.dedup();
    if !invalid.is_empty() {
        issues.push(NameIssue::InvalidCharacters(invalid.into_iter().collect()));
    }

    let lowered = trimmed.to_lowercase();
    if RESERVED.contains(&lowered.as_str()) {
        issues.push(NameIssue::Reserved(lowered));
    } else if CORE_MODULES.contains(&lowered.as_str()) {
        issues.push(NameIssue::CoreModule(lowered));
    }

    issues
}

fn is_url_safe(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '.' | '_' | '~')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_names() {
        for name in ["my-app", "app2", "a.b_c~d", "x"] {
            assert!(ProjectName::parse(name).is_ok(), "{} should be valid", name);
        }
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(ProjectName::parse("").unwrap_err(), vec![NameIssue::Empty]);
    }

    #[test]
    fn test_collects_every_reason() {
        let issues = ProjectName::parse(" My App").unwrap_err();
        assert!(issues.contains(&NameIssue::SurroundingWhitespace));
        assert!(issues.contains(&NameIssue::Uppercase));
        assert!(issues.contains(&NameIssue::InvalidCharacters(" ".to_string())));
    }

    #[test]
    fn test_leading_dot_and_underscore() {
        assert_eq!(
            ProjectName::parse(".hidden").unwrap_err(),
            vec![NameIssue::LeadingDot]
        );
        assert_eq!(
            ProjectName::parse("_private").unwrap_err(),
            vec![NameIssue::LeadingUnderscore]
        );
    }

    #[test]
    fn test_length_limit() {
        let long = "a".repeat(215);
        assert_eq!(
            ProjectName::parse(&long).unwrap_err(),
            vec![NameIssue::TooLong(215)]
        );
        assert!(ProjectName::parse(&"a".repeat(214)).is_ok());
    }

    #[test]
    fn test_reserved_and_core_modules() {
        assert_eq!(
            ProjectName::parse("node_modules").unwrap_err(),
            vec![NameIssue::Reserved("node_modules".to_string())]
        );
        assert_eq!(
            ProjectName::parse("http").unwrap_err(),
            vec![NameIssue::CoreModule("http".to_string())]
        );
    }

    #[test]
    fn test_special_characters() {
        let issues = ProjectName::parse("app@home!").unwrap_err();
        assert_eq!(
            issues,
            vec![NameIssue::InvalidCharacters("!@".to_string())]
        );
    }

    #[test]
    fn test_suffix_respects_length_limit() {
        let name = ProjectName::parse(&"a".repeat(214)).unwrap();
        let server = name.with_suffix("server");
        assert_eq!(server.as_str().len(), 214);
        assert!(server.as_str().ends_with("-server"));
    }
}
