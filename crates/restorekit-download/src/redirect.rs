//! Redirect and cookie policy.
//!
//! Applied to every redirect hop of a transfer:
//! - a target URL containing `unauthorized` (any case) aborts the transfer
//! - otherwise the first `name=value` segment of `Set-Cookie` is appended to
//!   the cookie carried so far

use restorekit_core::{DownloadError, RedirectDecision, RedirectHop};

/// Substring of a redirect target that marks an authentication failure.
pub const AUTHENTICATION_FAILURE_MARKER: &str = "unauthorized";

/// Decide how to handle a redirect.
///
/// `previous_cookie` is the `Cookie` value sent with the redirected request.
pub fn on_redirect(previous_cookie: Option<&str>, hop: &RedirectHop) -> RedirectDecision {
    if hop
        .target
        .as_str()
        .to_lowercase()
        .contains(AUTHENTICATION_FAILURE_MARKER)
    {
        return RedirectDecision::Abort(DownloadError::AuthenticationRequired);
    }

    let cookie = match hop.header("set-cookie") {
        Some(set_cookie) => merge_cookie(previous_cookie, set_cookie),
        None => previous_cookie.map(str::to_string),
    };

    RedirectDecision::Continue { cookie }
}

/// Append the cookie pair of a `Set-Cookie` value to an existing `Cookie` value.
///
/// Attributes such as `Path` or `Expires` after the first `;` are dropped.
pub fn merge_cookie(previous: Option<&str>, set_cookie: &str) -> Option<String> {
    let previous = previous.filter(|value| !value.trim().is_empty());
    let pair = set_cookie.split(';').next().unwrap_or_default().trim();

    match (previous, pair.is_empty()) {
        (prev, true) => prev.map(str::to_string),
        (Some(prev), false) => Some(format!("{prev}; {pair}")),
        (None, false) => Some(pair.to_string()),
    }
}
