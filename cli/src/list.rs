//! The `list` command: turns resolved settings into a scan request.

use redhawk_flags::{ConfigStore, DEFAULT_OUTPUT_FORMAT};
use serde::Serialize;

/// What `list` was asked to scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListRequest {
    pub region: String,
    pub all_regions: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    pub detail: bool,
    pub resources: Vec<String>,
}

impl ListRequest {
    /// Builds the request from the configuration store.
    ///
    /// `resources` is required and comma-delimited; empty entries are
    /// dropped.
    pub fn from_store(store: &ConfigStore) -> Result<Self, String> {
        let resources: Vec<String> = store
            .get_str("resources")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(String::from)
            .collect();
        if resources.is_empty() {
            return Err(
                "--resources is required (comma-delimited resource list, e.g. ec2,rds)"
                    .to_string(),
            );
        }

        let config = store
            .get_str("config")
            .filter(|c| !c.is_empty())
            .map(String::from);

        Ok(Self {
            region: store.get_str("region").unwrap_or_default().to_string(),
            all_regions: store.get_bool("all").unwrap_or(false),
            config,
            detail: store.get_bool("detail").unwrap_or(false),
            resources,
        })
    }
}

/// The requested output format name.
pub fn output_format(store: &ConfigStore) -> &str {
    store.get_str("output").unwrap_or(DEFAULT_OUTPUT_FORMAT)
}
