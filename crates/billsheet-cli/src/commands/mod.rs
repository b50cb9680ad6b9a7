//! CLI command implementations.

pub mod config;
pub mod inspect;
pub mod report;

use std::path::Path;

use billsheet_core::ExtractConfig;

/// Load the extraction config from a file, or fall back to defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ExtractConfig> {
    match config_path {
        Some(path) => Ok(ExtractConfig::from_file(Path::new(path))?),
        None => Ok(ExtractConfig::default()),
    }
}

/// True if the path has a supported spreadsheet extension.
pub fn is_workbook_file(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    matches!(ext.to_lowercase().as_str(), "xlsx" | "xlsm" | "xlsb" | "xls")
}
