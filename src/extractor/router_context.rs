use crate::extractor::RouterBaseUrl;
use crate::oracle::CachedOracle;
use crate::pipeline::map_isolated;
use crate::prompts;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Turns router aggregation files into a base-URL table with the help of the oracle.
pub struct RouterContextExtractor<'o> {
    oracle: &'o CachedOracle<'o>,
}

impl<'o> RouterContextExtractor<'o> {
    pub fn new(oracle: &'o CachedOracle<'o>) -> Self {
        Self { oracle }
    }

    /// Base URLs mounted by one router file. The file path is the cache key.
    pub fn extract_file(&self, router_file: &Path) -> Result<Vec<RouterBaseUrl>> {
        let content = fs::read_to_string(router_file)
            .with_context(|| format!("Failed to read router file: {}", router_file.display()))?;

        let messages = prompts::router_context_prompt(&content);
        let base_urls: Vec<RouterBaseUrl> = self
            .oracle
            .invoke_json(&messages, &router_file.to_string_lossy())
            .with_context(|| format!("Failed to extract router context from {}", router_file.display()))?;

        debug!("{} mounts {} routers", router_file.display(), base_urls.len());
        Ok(base_urls)
    }

    /// Base URLs of every router file; files that fail are logged and left out.
    pub fn extract_all(&self, router_files: &[PathBuf]) -> Vec<RouterBaseUrl> {
        map_isolated(
            router_files,
            |path| format!("router context file {}", path.display()),
            |path| self.extract_file(path),
        )
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Comma-joined `apiPaths` of every router whose `routerPath` occurs in `route_file`'s path.
///
/// The association is a plain substring test on the path text, so `users` also matches
/// `modules/users-admin/routes/list.js`. Entries with an empty `routerPath` never match.
pub fn router_context_for(route_file: &Path, base_urls: &[RouterBaseUrl]) -> String {
    let route_path = route_file.to_string_lossy();

    base_urls
        .iter()
        .filter(|base| !base.router_path.is_empty() && route_path.contains(base.router_path.as_str()))
        .flat_map(|base| base.api_paths.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(", ")
}
