//! Paths command handler.
//!
//! Displays the resolved downloads directory for diagnostics.

use anyhow::Result;

use crate::bootstrap::CliContext;

/// Execute the paths command, printing `key = value` lines.
pub fn execute(ctx: &CliContext) -> Result<()> {
    let downloads = &ctx.downloads;
    println!("downloads_dir = {}", downloads.path.display());
    println!("source        = {}", downloads.source);
    Ok(())
}
