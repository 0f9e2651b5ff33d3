use crate::extractor::router_context::router_context_for;
use crate::extractor::{EndpointDescriptor, RouterBaseUrl};
use crate::oracle::CachedOracle;
use crate::pipeline::map_isolated;
use crate::prompts;
use anyhow::{Context, Result};
use log::debug;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Derives endpoint descriptors from route files with the help of the oracle.
pub struct EndpointExtractor<'o> {
    oracle: &'o CachedOracle<'o>,
}

impl<'o> EndpointExtractor<'o> {
    pub fn new(oracle: &'o CachedOracle<'o>) -> Self {
        Self { oracle }
    }

    /// Endpoints registered in one route file. The file path is the cache key.
    pub fn extract_file(
        &self,
        route_file: &Path,
        base_urls: &[RouterBaseUrl],
    ) -> Result<Vec<EndpointDescriptor>> {
        let content = fs::read_to_string(route_file)
            .with_context(|| format!("Failed to read route file: {}", route_file.display()))?;

        let context = router_context_for(route_file, base_urls);
        debug!("Router context for {}: {:?}", route_file.display(), context);

        let messages = prompts::endpoint_prompt(route_file, &content, &context);
        let entries: Vec<Value> = self
            .oracle
            .invoke_json(&messages, &route_file.to_string_lossy())
            .with_context(|| format!("Failed to extract endpoints from {}", route_file.display()))?;

        // Entries are decoded one by one so a malformed one only costs itself
        Ok(map_isolated(
            entries.into_iter().enumerate(),
            |(index, _)| format!("endpoint #{} of {}", index + 1, route_file.display()),
            |(_, entry)| {
                let endpoint: EndpointDescriptor = serde_json::from_value(entry)?;
                Ok(normalize(endpoint, route_file))
            },
        ))
    }

    /// Endpoints of every route file; files that fail are logged and left out.
    pub fn extract_all(
        &self,
        route_files: &[PathBuf],
        base_urls: &[RouterBaseUrl],
    ) -> Vec<EndpointDescriptor> {
        map_isolated(
            route_files,
            |path| format!("route file {}", path.display()),
            |path| self.extract_file(path, base_urls),
        )
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Stamps the origin file and fills a missing full path from the registered path.
fn normalize(mut endpoint: EndpointDescriptor, route_file: &Path) -> EndpointDescriptor {
    endpoint.file_path = route_file.to_path_buf();
    if endpoint.full_path.trim().is_empty() {
        endpoint.full_path = endpoint.path.clone();
    }
    endpoint
}
