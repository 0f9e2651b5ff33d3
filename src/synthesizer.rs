//! Documentation synthesis through the oracle.

use crate::extractor::EndpointDescriptor;
use crate::oracle::CachedOracle;
use crate::pipeline::map_isolated;
use crate::prompts::{self, SynthesisHints};
use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;

/// Marker looked for in middleware sources.
const AUTHORIZATION_TOKEN: &str = "authorization";
/// Marker looked for in controller sources.
const LANGUAGE_TOKEN: &str = "lang";

/// An endpoint together with the documentation block generated for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizedEndpoint {
    #[serde(flatten)]
    pub endpoint: EndpointDescriptor,
    pub documentation_block: String,
}

/// Hints derived from the matched middleware and controller sources.
pub fn hints_for(endpoint: &EndpointDescriptor) -> SynthesisHints {
    let mentions = |contents: &[String], token: &str| {
        contents.iter().any(|content| content.to_lowercase().contains(token))
    };

    SynthesisHints {
        mentions_authorization: mentions(&endpoint.middleware_contents, AUTHORIZATION_TOKEN),
        mentions_language: mentions(&endpoint.controller_contents, LANGUAGE_TOKEN),
    }
}

/// Generates one documentation block per endpoint.
pub struct DocumentationSynthesizer<'o> {
    oracle: &'o CachedOracle<'o>,
}

impl<'o> DocumentationSynthesizer<'o> {
    pub fn new(oracle: &'o CachedOracle<'o>) -> Self {
        Self { oracle }
    }

    /// Documentation block for one endpoint, cached under `METHOD /full/path`.
    pub fn synthesize(&self, endpoint: &EndpointDescriptor) -> Result<SynthesizedEndpoint> {
        let hints = hints_for(endpoint);
        debug!("{}: synthesis hints {:?}", endpoint.key(), hints);

        let messages = prompts::swagger_prompt(endpoint, hints);
        let block = self
            .oracle
            .invoke_text(&messages, &endpoint.key())
            .with_context(|| format!("Failed to generate documentation for {}", endpoint.key()))?;

        Ok(SynthesizedEndpoint {
            endpoint: endpoint.clone(),
            documentation_block: block,
        })
    }

    /// Documents every endpoint; failures are logged and the endpoint is left out.
    pub fn synthesize_all(&self, endpoints: &[EndpointDescriptor]) -> Vec<SynthesizedEndpoint> {
        map_isolated(
            endpoints,
            |endpoint| format!("documentation for {}", endpoint.key()),
            |endpoint| self.synthesize(endpoint),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheStore, MemoryCache};
    use crate::extractor::HttpMethod;
    use crate::oracle::ScriptedOracle;
    use std::path::PathBuf;

    fn endpoint(method: HttpMethod, full_path: &str) -> EndpointDescriptor {
        EndpointDescriptor::new(method, full_path, full_path, PathBuf::from("routes/users.js"))
    }

    #[test]
    fn test_hints_are_case_insensitive() {
        let mut e = endpoint(HttpMethod::Get, "/users");
        e.middleware_contents = vec!["const token = req.headers.Authorization;".to_string()];
        e.controller_contents = vec!["const language = req.query.Lang;".to_string()];

        assert_eq!(
            hints_for(&e),
            SynthesisHints { mentions_authorization: true, mentions_language: true }
        );
        assert_eq!(hints_for(&endpoint(HttpMethod::Get, "/users")), SynthesisHints::default());
    }

    #[test]
    fn test_controller_source_reaches_the_oracle() {
        let mut e = endpoint(HttpMethod::Get, "/users/:id");
        e.controller_contents = vec!["async getUser(req, res) { res.json({}); }".to_string()];

        let oracle = ScriptedOracle::new().respond_when("/users/:id", "/**\n * @swagger\n */");
        let cache = MemoryCache::new();
        let cached = CachedOracle::new(&oracle, &cache);

        let documented = DocumentationSynthesizer::new(&cached).synthesize(&e).unwrap();

        assert_eq!(documented.documentation_block, "/**\n * @swagger\n */");
        assert!(oracle.requests()[0][1].content.contains("async getUser(req, res)"));
        assert!(cache.exists("GET /users/:id").unwrap());
    }

    #[test]
    fn test_failed_endpoint_is_dropped_and_order_kept() {
        let endpoints = vec![
            endpoint(HttpMethod::Get, "/a"),
            endpoint(HttpMethod::Get, "/b"),
            endpoint(HttpMethod::Post, "/c"),
        ];
        let oracle = ScriptedOracle::new()
            .fail_when("Path: /b")
            .respond_when("Path: /", "/** doc */");
        let cache = MemoryCache::new();
        let cached = CachedOracle::new(&oracle, &cache);

        let documented = DocumentationSynthesizer::new(&cached).synthesize_all(&endpoints);

        let keys: Vec<_> = documented.iter().map(|d| d.endpoint.key()).collect();
        assert_eq!(keys, vec!["GET /a".to_string(), "POST /c".to_string()]);
    }

    #[test]
    fn test_serialized_endpoint_is_flat() {
        let documented = SynthesizedEndpoint {
            endpoint: endpoint(HttpMethod::Get, "/a"),
            documentation_block: "/** */".to_string(),
        };

        let value = serde_json::to_value(&documented).unwrap();

        assert_eq!(value["fullPath"], "/a");
        assert_eq!(value["documentationBlock"], "/** */");
    }
}
