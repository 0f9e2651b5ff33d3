//! Swagger From Source - Swagger JSDoc generation for Express.js projects.
//!
//! This library documents an existing Express API in place. Route files are described by a
//! text-generation oracle, handler references are resolved to controller and middleware
//! class methods through syntax-tree parsing, and the oracle then writes one Swagger JSDoc
//! block per endpoint. Blocks that parse as pure comments are inserted directly above the
//! matching `router.<method>('<path>', ...)` registration.
//!
//! # Architecture
//!
//! The modules form one linear pipeline, driven by [`pipeline::Pipeline`]:
//!
//! 1. [`scanner`] - Finds route, controller and middleware files in module directories
//! 2. [`extractor`] - Router base paths and endpoints (via the oracle) and class symbols
//!    (via [`parser`])
//! 3. [`matcher`] - Attaches controller and middleware source text to each endpoint
//! 4. [`synthesizer`] - Generates a documentation block per endpoint
//! 5. [`validator`] - Rejects blocks that are not comment-only JavaScript
//! 6. [`patcher`] - Writes blocks above their route registrations
//! 7. [`serializer`] - Serializes the run report to YAML or JSON
//!
//! Every oracle call goes through [`oracle::CachedOracle`], backed by a [`cache`] store.
//!
//! # Example Usage
//!
//! ```no_run
//! use swagger_from_source::{
//!     cache::FileCache,
//!     oracle::{GeminiClient, GeminiConfig},
//!     pipeline::{Pipeline, PipelineState},
//!     scanner::FileScanner,
//!     serializer::{serialize_yaml, RunReport},
//! };
//! use std::path::{Path, PathBuf};
//!
//! let oracle = GeminiClient::new(GeminiConfig::new("api-key".to_string())).unwrap();
//! let cache = FileCache::open(Path::new(".swagger-cache")).unwrap();
//! let scanner = FileScanner::new(vec!["js".to_string(), "ts".to_string()]);
//!
//! let pipeline = Pipeline::new(&oracle, &cache, scanner);
//! let state = pipeline.run(PipelineState::new(
//!     vec![PathBuf::from("src/modules/users")],
//!     vec![PathBuf::from("src/routes/index.js")],
//! ));
//!
//! let yaml = serialize_yaml(&RunReport::from_state(&state)).unwrap();
//! println!("{}", yaml);
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod cli;
pub mod scanner;
pub mod parser;
pub mod extractor;
pub mod oracle;
pub mod cache;
pub mod prompts;
pub mod matcher;
pub mod synthesizer;
pub mod validator;
pub mod patcher;
pub mod pipeline;
pub mod serializer;
pub mod error;
