//! Extraction of OS build numbers from file names.
//!
//! Apple build numbers consist of a two-digit major version, one uppercase
//! letter for the minor train, up to five digits for the build, and an
//! optional lowercase letter marking a beta or seed:
//! - `UniversalMac_21A5248p_Restore.ipsw` → `21A5248p`
//! - `UniversalMac_14.0_23A344_Restore.ipsw` → `23A344`

use regex::Regex;
use std::sync::OnceLock;

static BUILD_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

fn build_pattern() -> Option<&'static Regex> {
    BUILD_PATTERN
        .get_or_init(|| {
            Regex::new(r"(?:^|[^A-Za-z0-9])(\d{2}[A-Z]\d{1,5}[a-z]?)(?:[^A-Za-z0-9]|$)").ok()
        })
        .as_ref()
}

/// Extract the first OS build number embedded in `name`.
///
/// The build must be delimited from surrounding alphanumerics, so version
/// strings glued to other tokens are not mistaken for builds.
pub fn match_os_build(name: &str) -> Option<String> {
    build_pattern()?
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
