//! Match command handler.

use std::path::Path;

use anyhow::Result;

use restorekit_catalog::CatalogMatch;
use restorekit_core::RestoreImage;

use crate::bootstrap::CliContext;
use crate::handlers::{load_catalog, require_file};

/// Execute the match command.
pub fn execute(ctx: &CliContext, file: &Path, catalog_path: &Path) -> Result<()> {
    require_file(file)?;
    let catalog = load_catalog(catalog_path)?;
    let found = ctx.matcher.match_catalog(file, &catalog);
    println!("{}", render(found));
    Ok(())
}

fn render(found: Option<CatalogMatch<'_, RestoreImage>>) -> String {
    let Some(found) = found else {
        return "no match".to_string();
    };
    let entry = found.entry;
    let title = entry.name.as_deref().unwrap_or(&entry.build);
    format!(
        "{title} ({})\nurl   = {}\nrule  = {}",
        entry.build, entry.url, found.rule
    )
}
