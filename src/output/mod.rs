mod cli;
mod json;

pub use cli::print_cli_table;
pub use json::print_json;

use crate::model::Advisory;
use anyhow::Result;

/// Output format for parsed advisories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    Table,
    /// JSON format for programmatic use
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use 'table' or 'json'", s)),
        }
    }
}

pub fn print_result(advisories: &[Advisory], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_cli_table(advisories),
        OutputFormat::Json => print_json(advisories),
    }
}

/// Format advisories to string for file output
pub fn format_result_to_string(advisories: &[Advisory], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json::generate_json_string(advisories),
        OutputFormat::Table => {
            // Tables are for terminals; files always get JSON
            json::generate_json_string(advisories)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("table"), Ok(OutputFormat::Table));
        assert_eq!(OutputFormat::from_str("JSON"), Ok(OutputFormat::Json));
        assert!(OutputFormat::from_str("sarif").is_err());
    }

    #[test]
    fn test_table_format_writes_json_to_file() {
        let advisories = vec![Advisory::new(1)];
        let out = format_result_to_string(&advisories, OutputFormat::Table).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["id"], 1);
    }
}
