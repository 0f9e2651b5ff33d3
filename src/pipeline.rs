//! The documentation pipeline.
//!
//! A run is a fixed sequence of stages over one [`PipelineState`]. Each stage reads the
//! fields earlier stages produced and returns a new state with its own fields filled in.
//! Only discovery can stop a run; every later stage drops failing items and carries on.

use crate::cache::CacheStore;
use crate::extractor::endpoints::EndpointExtractor;
use crate::extractor::router_context::RouterContextExtractor;
use crate::extractor::symbols::SymbolExtractor;
use crate::extractor::{EndpointDescriptor, RouterBaseUrl, Symbol};
use crate::matcher;
use crate::oracle::{CachedOracle, Oracle};
use crate::patcher::{self, PatchedEndpoint};
use crate::scanner::{self, FileScanner};
use crate::synthesizer::{DocumentationSynthesizer, SynthesizedEndpoint};
use crate::validator;
use anyhow::{bail, Result};
use log::{error, info, warn};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Runs `op` on every item, logging and dropping the ones that fail.
///
/// Output order follows input order. `label` names an item in the warning.
pub fn map_isolated<T, U, L, F>(items: impl IntoIterator<Item = T>, label: L, mut op: F) -> Vec<U>
where
    L: Fn(&T) -> String,
    F: FnMut(T) -> Result<U>,
{
    let mut results = Vec::new();
    for item in items {
        let name = label(&item);
        match op(item) {
            Ok(value) => results.push(value),
            Err(e) => warn!("Skipping {}: {:#}", name, e),
        }
    }
    results
}

/// Everything a run knows, accumulated stage by stage.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineState {
    pub module_directories: Vec<PathBuf>,
    pub router_context_files: Vec<PathBuf>,
    pub route_files: Vec<PathBuf>,
    pub controller_files: Vec<PathBuf>,
    pub middleware_files: Vec<PathBuf>,
    pub router_base_urls: Vec<RouterBaseUrl>,
    pub endpoints: Vec<EndpointDescriptor>,
    pub controller_symbols: Vec<Symbol>,
    pub middleware_symbols: Vec<Symbol>,
    pub matched_endpoints: Vec<EndpointDescriptor>,
    pub synthesized_endpoints: Vec<SynthesizedEndpoint>,
    pub validated_endpoints: Vec<SynthesizedEndpoint>,
    pub patched_endpoints: Vec<PatchedEndpoint>,
    /// Fatal errors; a non-empty list means the run stopped early
    pub errors: Vec<String>,
}

impl PipelineState {
    /// Initial state for the given module directories and designated router files.
    pub fn new(module_directories: Vec<PathBuf>, router_context_files: Vec<PathBuf>) -> Self {
        Self {
            module_directories,
            router_context_files,
            ..Self::default()
        }
    }

    pub fn is_failed(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Discovery,
    RouterContext,
    Endpoints,
    ControllerSymbols,
    MiddlewareSymbols,
    Matching,
    Synthesis,
    Validation,
    Patching,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Discovery => "discovery",
            Stage::RouterContext => "router context extraction",
            Stage::Endpoints => "endpoint extraction",
            Stage::ControllerSymbols => "controller symbol extraction",
            Stage::MiddlewareSymbols => "middleware symbol extraction",
            Stage::Matching => "matching",
            Stage::Synthesis => "documentation synthesis",
            Stage::Validation => "validation",
            Stage::Patching => "patching",
        };
        f.write_str(name)
    }
}

type StageFn = fn(&Pipeline<'_>, &PipelineState) -> Result<PipelineState>;

const STAGES: &[(Stage, StageFn)] = &[
    (Stage::Discovery, discover),
    (Stage::RouterContext, extract_router_context),
    (Stage::Endpoints, extract_endpoints),
    (Stage::ControllerSymbols, extract_controller_symbols),
    (Stage::MiddlewareSymbols, extract_middleware_symbols),
    (Stage::Matching, match_symbols),
    (Stage::Synthesis, synthesize),
    (Stage::Validation, validate),
    (Stage::Patching, patch),
];

/// Runs the stages against one oracle, cache and scanner.
///
/// # Example
///
/// ```no_run
/// use swagger_from_source::cache::MemoryCache;
/// use swagger_from_source::oracle::ScriptedOracle;
/// use swagger_from_source::pipeline::{Pipeline, PipelineState};
/// use swagger_from_source::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let oracle = ScriptedOracle::new();
/// let cache = MemoryCache::new();
/// let pipeline = Pipeline::new(&oracle, &cache, FileScanner::new(vec!["js".to_string()]));
/// let state = pipeline.run(PipelineState::new(vec![PathBuf::from("src/modules/users")], vec![]));
/// println!("Patched {} endpoints", state.patched_endpoints.len());
/// ```
pub struct Pipeline<'a> {
    oracle: CachedOracle<'a>,
    scanner: FileScanner,
}

impl<'a> Pipeline<'a> {
    pub fn new(oracle: &'a dyn Oracle, cache: &'a dyn CacheStore, scanner: FileScanner) -> Self {
        Self {
            oracle: CachedOracle::new(oracle, cache),
            scanner,
        }
    }

    /// Runs every stage in order and returns the final state.
    ///
    /// A stage error is recorded in `errors` and ends the run with the state as it was
    /// before that stage.
    pub fn run(&self, initial: PipelineState) -> PipelineState {
        let mut state = initial;

        for (stage, run_stage) in STAGES {
            info!("Starting {}...", stage);
            match run_stage(self, &state) {
                Ok(next) => state = next,
                Err(e) => {
                    error!("{} failed: {:#}", stage, e);
                    state.errors.push(format!("{}: {:#}", stage, e));
                    break;
                }
            }
        }

        state
    }
}

fn discover(pipeline: &Pipeline<'_>, state: &PipelineState) -> Result<PipelineState> {
    if state.module_directories.is_empty() {
        bail!("no module directories given");
    }
    if pipeline.scanner.extensions().is_empty() {
        bail!("no file extensions configured");
    }

    let scan = pipeline.scanner.scan(&state.module_directories);
    let (router_context_files, route_files) =
        scanner::partition_router_context(scan.route_files, &state.router_context_files);

    info!(
        "Found {} route, {} controller and {} middleware files ({} router context files)",
        route_files.len(),
        scan.controller_files.len(),
        scan.middleware_files.len(),
        router_context_files.len()
    );

    Ok(PipelineState {
        router_context_files,
        route_files,
        controller_files: scan.controller_files,
        middleware_files: scan.middleware_files,
        ..state.clone()
    })
}

fn extract_router_context(pipeline: &Pipeline<'_>, state: &PipelineState) -> Result<PipelineState> {
    let router_base_urls =
        RouterContextExtractor::new(&pipeline.oracle).extract_all(&state.router_context_files);
    info!("Found {} router base URL entries", router_base_urls.len());

    Ok(PipelineState {
        router_base_urls,
        ..state.clone()
    })
}

fn extract_endpoints(pipeline: &Pipeline<'_>, state: &PipelineState) -> Result<PipelineState> {
    let endpoints = EndpointExtractor::new(&pipeline.oracle)
        .extract_all(&state.route_files, &state.router_base_urls);
    info!("Extracted {} endpoints", endpoints.len());

    Ok(PipelineState {
        endpoints,
        ..state.clone()
    })
}

fn extract_controller_symbols(_: &Pipeline<'_>, state: &PipelineState) -> Result<PipelineState> {
    let controller_symbols = SymbolExtractor::extract_all(&state.controller_files);
    info!("Found {} controller symbols", controller_symbols.len());

    Ok(PipelineState {
        controller_symbols,
        ..state.clone()
    })
}

fn extract_middleware_symbols(_: &Pipeline<'_>, state: &PipelineState) -> Result<PipelineState> {
    let middleware_symbols = SymbolExtractor::extract_all(&state.middleware_files);
    info!("Found {} middleware symbols", middleware_symbols.len());

    Ok(PipelineState {
        middleware_symbols,
        ..state.clone()
    })
}

fn match_symbols(_: &Pipeline<'_>, state: &PipelineState) -> Result<PipelineState> {
    let matched_endpoints = matcher::match_all(
        &state.endpoints,
        &state.controller_symbols,
        &state.middleware_symbols,
    );
    let with_controller = matched_endpoints
        .iter()
        .filter(|e| !e.controller_contents.is_empty())
        .count();
    info!(
        "Matched {} of {} endpoints to a controller implementation",
        with_controller,
        matched_endpoints.len()
    );

    Ok(PipelineState {
        matched_endpoints,
        ..state.clone()
    })
}

fn synthesize(pipeline: &Pipeline<'_>, state: &PipelineState) -> Result<PipelineState> {
    let synthesized_endpoints =
        DocumentationSynthesizer::new(&pipeline.oracle).synthesize_all(&state.matched_endpoints);
    info!("Generated documentation for {} endpoints", synthesized_endpoints.len());

    Ok(PipelineState {
        synthesized_endpoints,
        ..state.clone()
    })
}

fn validate(_: &Pipeline<'_>, state: &PipelineState) -> Result<PipelineState> {
    let validated_endpoints = validator::validate_all(&state.synthesized_endpoints);
    info!(
        "{} of {} documentation blocks passed validation",
        validated_endpoints.len(),
        state.synthesized_endpoints.len()
    );

    Ok(PipelineState {
        validated_endpoints,
        ..state.clone()
    })
}

fn patch(_: &Pipeline<'_>, state: &PipelineState) -> Result<PipelineState> {
    let patched_endpoints = patcher::patch_all(&state.validated_endpoints);
    info!("Patched {} endpoints", patched_endpoints.len());

    Ok(PipelineState {
        patched_endpoints,
        ..state.clone()
    })
}
