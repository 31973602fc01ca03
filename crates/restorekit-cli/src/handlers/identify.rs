//! Identify command handler.

use std::path::Path;

use anyhow::Result;

use restorekit_catalog::Identification;

use crate::bootstrap::CliContext;
use crate::handlers::require_file;

/// Execute the identify command.
pub fn execute(ctx: &CliContext, file: &Path) -> Result<()> {
    require_file(file)?;
    let identification = ctx.identity().identify(file);
    println!("{}", render(&identification));
    Ok(())
}

fn render(identification: &Identification) -> String {
    let tuple = &identification.tuple;
    let build = if tuple.has_build() {
        tuple.build.as_str()
    } else {
        "unknown"
    };
    format!(
        "build    = {build}\nfilename = {}\nsource   = {}",
        tuple.filename, identification.source
    )
}

#[cfg(test)]
mod tests {
    use restorekit_catalog::IdentitySource;
    use restorekit_core::IdentityTuple;

    use super::*;

    #[test]
    fn test_render_known_build() {
        let identification = Identification {
            tuple: IdentityTuple::new("22E261", "UniversalMac_13.3_22E261_Restore.ipsw"),
            source: IdentitySource::FileName,
        };
        let text = render(&identification);
        assert!(text.contains("build    = 22E261"));
        assert!(text.contains("filename = UniversalMac_13.3_22E261_Restore.ipsw"));
        assert!(text.contains(&format!("source   = {}", IdentitySource::FileName)));
    }

    #[test]
    fn test_render_unknown_build() {
        let identification = Identification {
            tuple: IdentityTuple::new("", "image.ipsw"),
            source: IdentitySource::Unknown,
        };
        assert!(render(&identification).contains("build    = unknown"));
    }
}
