//! Tag and untag command handlers.
//!
//! Tagging records the identity tuple on the file itself so it can still be
//! matched after being renamed.

use std::path::Path;

use anyhow::Result;
use tracing::warn;

use restorekit_core::utils::path_file_name;
use restorekit_core::{IdentityTuple, match_os_build};

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Execute the tag command.
pub fn execute(ctx: &CliContext, file: &Path, build: &str, filename: Option<&str>) -> Result<()> {
    let tuple = identity_for(file, build, filename)?;
    ctx.identity()
        .set_catalog_data(file, Some(&tuple))
        .map_err(CliError::from)?;
    println!("Tagged {} as {tuple}", file.display());
    Ok(())
}

/// Execute the untag command.
pub fn execute_untag(ctx: &CliContext, file: &Path) -> Result<()> {
    ctx.identity()
        .set_catalog_data(file, None)
        .map_err(CliError::from)?;
    println!("Removed identity from {}", file.display());
    Ok(())
}

fn identity_for(
    file: &Path,
    build: &str,
    filename: Option<&str>,
) -> Result<IdentityTuple, CliError> {
    let build = build.trim();
    if build.is_empty() {
        return Err(CliError::Arguments("build must not be empty".to_string()));
    }
    if match_os_build(build).as_deref() != Some(build) {
        warn!(build, "Build does not look like an OS build number");
    }

    let filename = filename
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map_or_else(|| path_file_name(file), str::to_string);
    Ok(IdentityTuple::new(build, filename))
}
