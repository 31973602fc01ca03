//! Pure helper functions shared across restorekit crates.

pub mod build_number;
pub mod file_name;

pub use build_number::match_os_build;
pub use file_name::{path_file_name, url_file_name};
