//! Export the asset collection to JSON or YAML.

use std::str::FromStr;

use aldehyde_assets::Asset;

use crate::error::AldError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Yaml,
}

impl FromStr for ExportFormat {
    type Err = AldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "yaml" | "yml" => Ok(ExportFormat::Yaml),
            _ => Err(AldError::UnknownFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Pretty-print JSON output (YAML is always block style)
    pub pretty: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { pretty: true }
    }
}

/// Serializes the assets in collection order. Missing dates become `null`.
pub fn export(
    assets: &[Asset],
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<String, AldError> {
    let content = match format {
        ExportFormat::Json if options.pretty => serde_json::to_string_pretty(assets)?,
        ExportFormat::Json => serde_json::to_string(assets)?,
        ExportFormat::Yaml => serde_yaml::to_string(assets)?,
    };
    Ok(content)
}
