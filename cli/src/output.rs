//! Output formatting for list results.

use std::str::FromStr;

use crate::list::ListRequest;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(format!(
                "unsupported output format '{other}' (expected table, json or yaml)"
            )),
        }
    }
}

/// Formats a list request in the requested output format.
pub fn format_request(request: &ListRequest, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(request)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(request).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Table => Ok(request_to_table(request)),
    }
}

fn request_to_table(request: &ListRequest) -> String {
    let mut out = String::new();

    let regions = if request.all_regions {
        "all".to_string()
    } else if request.region.is_empty() {
        "default".to_string()
    } else {
        request.region.clone()
    };
    out.push_str(&format!("Region: {regions}  Detail: {}\n", request.detail));
    if let Some(ref config) = request.config {
        out.push_str(&format!("Config: {config}\n"));
    }

    out.push_str(&format!("  {:<4} {}\n", "#", "RESOURCE"));
    for (index, resource) in request.resources.iter().enumerate() {
        out.push_str(&format!("  {:<4} {resource}\n", index + 1));
    }

    out
}
