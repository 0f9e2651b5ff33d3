//! Run report serialization.
//!
//! A [`RunReport`] summarizes one pipeline run: how many files and endpoints each stage
//! handled, where documentation was written, and which endpoints fell out along the way.
//! It can be written as YAML or JSON.

use crate::patcher::PatchedEndpoint;
use crate::pipeline::PipelineState;
use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Per-stage counts of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub router_context_files: usize,
    pub route_files: usize,
    pub controller_files: usize,
    pub middleware_files: usize,
    pub router_base_urls: usize,
    pub endpoints: usize,
    pub controller_symbols: usize,
    pub middleware_symbols: usize,
    pub synthesized: usize,
    pub validated: usize,
    pub patched: usize,
}

/// Serializable outcome of one run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub module_directories: Vec<PathBuf>,
    pub summary: RunSummary,
    pub patched: Vec<PatchedEndpoint>,
    /// `METHOD /path` of endpoints whose documentation failed validation
    pub rejected: Vec<String>,
    /// `METHOD /path` of validated endpoints whose registration was not found
    pub unpatched: Vec<String>,
    pub errors: Vec<String>,
}

impl RunReport {
    pub fn from_state(state: &PipelineState) -> Self {
        let validated: Vec<String> = state.validated_endpoints.iter().map(|d| d.endpoint.key()).collect();
        let patched: Vec<String> = state
            .patched_endpoints
            .iter()
            .map(|p| format!("{} {}", p.method, p.full_path))
            .collect();

        let rejected = state
            .synthesized_endpoints
            .iter()
            .map(|d| d.endpoint.key())
            .filter(|key| !validated.contains(key))
            .collect();
        let unpatched = validated.iter().filter(|key| !patched.contains(key)).cloned().collect();

        Self {
            module_directories: state.module_directories.clone(),
            summary: RunSummary {
                router_context_files: state.router_context_files.len(),
                route_files: state.route_files.len(),
                controller_files: state.controller_files.len(),
                middleware_files: state.middleware_files.len(),
                router_base_urls: state.router_base_urls.len(),
                endpoints: state.endpoints.len(),
                controller_symbols: state.controller_symbols.len(),
                middleware_symbols: state.middleware_symbols.len(),
                synthesized: state.synthesized_endpoints.len(),
                validated: state.validated_endpoints.len(),
                patched: state.patched_endpoints.len(),
            },
            patched: state.patched_endpoints.clone(),
            rejected,
            unpatched,
            errors: state.errors.clone(),
        }
    }
}

/// Serializes a run report to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(report: &RunReport) -> Result<String> {
    debug!("Serializing run report to YAML");
    serde_yaml::to_string(report).context("Failed to serialize run report to YAML")
}

/// Serializes a run report to pretty-printed JSON.
pub fn serialize_json(report: &RunReport) -> Result<String> {
    debug!("Serializing run report to JSON");
    serde_json::to_string_pretty(report).context("Failed to serialize run report to JSON")
}

/// Writes string content to a file, creating parent directories as needed.
///
/// Overwrites the file if it exists.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{EndpointDescriptor, HttpMethod};
    use crate::synthesizer::SynthesizedEndpoint;
    use tempfile::TempDir;

    fn documented(method: HttpMethod, path: &str) -> SynthesizedEndpoint {
        SynthesizedEndpoint {
            endpoint: EndpointDescriptor::new(method, path, path, PathBuf::from("routes/users.js")),
            documentation_block: "/** doc */".to_string(),
        }
    }

    /// Helper to build a state where each stage dropped one endpoint
    fn create_test_state() -> PipelineState {
        let a = documented(HttpMethod::Get, "/users");
        let b = documented(HttpMethod::Post, "/users");
        let c = documented(HttpMethod::Delete, "/users/:id");

        PipelineState {
            module_directories: vec![PathBuf::from("src/modules/users")],
            route_files: vec![PathBuf::from("routes/users.js")],
            endpoints: vec![a.endpoint.clone(), b.endpoint.clone(), c.endpoint.clone()],
            synthesized_endpoints: vec![a.clone(), b.clone(), c.clone()],
            validated_endpoints: vec![a, c],
            patched_endpoints: vec![PatchedEndpoint {
                method: HttpMethod::Get,
                full_path: "/users".to_string(),
                file_path: PathBuf::from("routes/users.js"),
                line: 12,
            }],
            ..PipelineState::default()
        }
    }

    #[test]
    fn test_report_tracks_dropped_endpoints() {
        let report = RunReport::from_state(&create_test_state());

        assert_eq!(report.summary.endpoints, 3);
        assert_eq!(report.summary.synthesized, 3);
        assert_eq!(report.summary.validated, 2);
        assert_eq!(report.summary.patched, 1);
        assert_eq!(report.rejected, vec!["POST /users".to_string()]);
        assert_eq!(report.unpatched, vec!["DELETE /users/:id".to_string()]);
    }

    #[test]
    fn test_serialize_yaml() {
        let report = RunReport::from_state(&create_test_state());
        let yaml = serialize_yaml(&report).unwrap();

        assert!(yaml.contains("summary:"));
        assert!(yaml.contains("routeFiles: 1"));
        assert!(yaml.contains("fullPath: /users"));
        assert!(yaml.contains("line: 12"));

        // The summary reads back as plain data
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        let summary: RunSummary = serde_yaml::from_value(value["summary"].clone()).unwrap();
        assert_eq!(summary, report.summary);
    }

    #[test]
    fn test_serialize_json() {
        let report = RunReport::from_state(&create_test_state());
        let json = serialize_json(&report).unwrap();

        assert!(json.contains('\n'));
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["summary"]["patched"], 1);
        assert_eq!(parsed["patched"][0]["method"], "GET");
        assert_eq!(parsed["patched"][0]["filePath"], "routes/users.js");
        assert_eq!(parsed["rejected"][0], "POST /users");
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("reports").join("nested").join("run.yaml");

        write_to_file("test content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "test content");
    }

    #[test]
    fn test_write_to_file_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("run.json");

        write_to_file("initial content", &file_path).unwrap();
        write_to_file("new content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }
}
