//! Version parsing and range normalization

use semver::{Version, VersionReq};

/// Range used when nothing at all is known about a package
pub const LATEST: &str = "latest";

/// Parse version string, handling a leading 'v'
pub fn parse_version(version_str: &str) -> Result<Version, semver::Error> {
    let trimmed = version_str.trim();
    let cleaned = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(cleaned)
}

/// Turn a registry version like `4.21.2` into a caret range `^4.21.2`
///
/// Returns `None` for anything that is not a valid semantic version so that
/// garbage never reaches the cache or a generated manifest.
pub fn caret_range(version_str: &str) -> Option<String> {
    parse_version(version_str)
        .ok()
        .map(|version| format!("^{}", version))
}

/// Whether `range` can be placed in a manifest as a dependency version
pub fn is_installable(range: &str) -> bool {
    range == LATEST || VersionReq::parse(range).is_ok()
}
