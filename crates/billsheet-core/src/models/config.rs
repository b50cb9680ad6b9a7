//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

/// Configuration for table location within a sheet grid.
///
/// Defaults match the billing exports seen so far; a config file overrides
/// them when an export moves the table outside the usual window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// First row index considered as a table header start.
    pub scan_start_row: usize,

    /// Row index at which the header scan gives up (exclusive).
    pub scan_end_row: usize,

    /// Substrings that mark the end of the data table (matched uppercase).
    pub end_markers: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            scan_start_row: 10,
            scan_end_row: 40,
            end_markers: vec![
                "TOTAL AMOUNT DUE".to_string(),
                "BALANCE THIS STATEMENT".to_string(),
            ],
        }
    }
}

impl ExtractConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scan_window() {
        let config = ExtractConfig::default();
        assert_eq!(config.scan_start_row, 10);
        assert_eq!(config.scan_end_row, 40);
        assert_eq!(config.end_markers.len(), 2);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: ExtractConfig = serde_json::from_str(r#"{"scan_end_row": 60}"#).unwrap();
        assert_eq!(config.scan_end_row, 60);
        assert_eq!(config.scan_start_row, 10);
        assert!(!config.end_markers.is_empty());
    }
}
