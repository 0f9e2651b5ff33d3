use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use swagger_from_source::{
    cache::{FileCache, MemoryCache},
    extractor::HttpMethod,
    oracle::{ChatMessage, ScriptedOracle},
    pipeline::{Pipeline, PipelineState},
    scanner::FileScanner,
    serializer::{serialize_json, serialize_yaml, RunReport},
};
use tempfile::TempDir;

const FIXTURES: &[(&str, &str)] = &[
    ("users/routes/index.js", include_str!("fixtures/express_project/users/routes/index.js")),
    ("users/routes/user.routes.js", include_str!("fixtures/express_project/users/routes/user.routes.js")),
    (
        "users/controllers/user.controller.js",
        include_str!("fixtures/express_project/users/controllers/user.controller.js"),
    ),
    (
        "users/middlewares/auth.middleware.js",
        include_str!("fixtures/express_project/users/middlewares/auth.middleware.js"),
    ),
];

const ROUTER_CONTEXT_RESPONSE: &str = r#"[{ "routerPath": "user.routes", "apiPaths": ["/api/v1"] }]"#;

const ENDPOINTS_RESPONSE: &str = r#"[
  {
    "method": "GET",
    "path": "/users/:id",
    "fullPath": "/api/v1/users/:id",
    "handlers": ["getUser"],
    "middlewares": [],
    "parameters": [{ "name": "id", "in": "path", "type": "string", "required": true }]
  },
  {
    "method": "POST",
    "path": "/users",
    "fullPath": "/api/v1/users",
    "handlers": ["createUser"],
    "middlewares": ["authMiddleware.verifyToken"]
  },
  {
    "method": "DELETE",
    "path": "/users/:id",
    "fullPath": "/api/v1/users/:id",
    "handlers": ["deleteUser"],
    "middlewares": ["verifyToken"]
  },
  {
    "method": "PUT",
    "path": "/users/:id",
    "fullPath": "/api/v1/users/:id",
    "handlers": ["updateUser"]
  }
]"#;

const GET_BLOCK: &str = "/**
 * @swagger
 * /api/v1/users/{id}:
 *   get:
 *     summary: Get a user by id
 *     responses:
 *       200:
 *         description: The user
 */";

const DELETE_BLOCK: &str = "/**
 * @swagger
 * /api/v1/users/{id}:
 *   delete:
 *     summary: Delete a user
 *     security:
 *       - bearerAuth: []
 */";

/// Helper function to copy the fixture project into a temporary module root
fn create_test_project() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    for (path, content) in FIXTURES {
        let file_path = temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
    }

    temp_dir
}

fn module_dir(project: &TempDir) -> PathBuf {
    project.path().join("users")
}

fn routes_file(project: &TempDir) -> PathBuf {
    module_dir(project).join("routes").join("user.routes.js")
}

fn scripted_oracle() -> ScriptedOracle {
    ScriptedOracle::new()
        .respond_when("router.use(", ROUTER_CONTEXT_RESPONSE)
        .respond_when("Base URL: /api/v1\nFile:", ENDPOINTS_RESPONSE)
        .respond_when("- Method: GET\n- Path: /api/v1/users/:id", GET_BLOCK)
        // Wrapped in a markdown fence, so validation must reject it
        .respond_when("- Method: POST", "```javascript\n/**\n * @swagger\n */\n```")
        .respond_when("- Method: DELETE\n- Path: /api/v1/users/:id", DELETE_BLOCK)
        .respond_when("- Method: PUT", "/** update */")
}

fn js_scanner() -> FileScanner {
    FileScanner::new(vec!["js".to_string()])
}

fn expected_routes() -> String {
    format!(
        "const express = require('express');
const {{ getUser, createUser, deleteUser }} = require('../controllers/user.controller');
const authMiddleware = require('../middlewares/auth.middleware');

const router = express.Router();

{}
router.get('/users/:id', getUser);
router.post('/users', authMiddleware.verifyToken, createUser);
{}
router.delete('/users/:id', authMiddleware.verifyToken, deleteUser);

module.exports = router;
",
        GET_BLOCK, DELETE_BLOCK
    )
}

fn request_for<'a>(requests: &'a [Vec<ChatMessage>], needle: &str) -> &'a [ChatMessage] {
    requests
        .iter()
        .find(|messages| messages.last().is_some_and(|m| m.content.contains(needle)))
        .unwrap_or_else(|| panic!("no request containing {:?}", needle))
}

#[test]
fn test_express_end_to_end_documentation() {
    let project = create_test_project();
    let oracle = scripted_oracle();
    let cache = MemoryCache::new();

    let pipeline = Pipeline::new(&oracle, &cache, js_scanner());
    let state = pipeline.run(PipelineState::new(vec![module_dir(&project)], vec![]));

    assert!(state.errors.is_empty(), "Unexpected errors: {:?}", state.errors);

    // index.js is used as the router context file and not as a route file
    assert_eq!(state.router_context_files, vec![module_dir(&project).join("routes").join("index.js")]);
    assert_eq!(state.route_files, vec![routes_file(&project)]);
    assert_eq!(state.endpoints.len(), 4);

    let symbols: Vec<_> = state.controller_symbols.iter().map(|s| s.qualified_name.as_str()).collect();
    assert_eq!(
        symbols,
        vec!["UserController.getUser", "UserController.createUser", "UserController.deleteUser"]
    );
    assert_eq!(state.middleware_symbols[0].qualified_name, "AuthMiddleware.verifyToken");

    // Synthesis saw the implementation and picked up both hints
    let requests = oracle.requests();
    let get_request = request_for(&requests, "- Method: GET");
    assert!(get_request[1].content.contains("async getUser(req, res) {"));
    assert!(get_request[0].content.contains("LanguageHeader"));
    assert!(!get_request[0].content.contains("bearerAuth"));
    let delete_request = request_for(&requests, "- Method: DELETE");
    assert!(delete_request[1].content.contains("verifyToken(req, res, next) {"));
    assert!(delete_request[0].content.contains("bearerAuth"));

    // POST failed validation; PUT has no registration in the file
    assert_eq!(state.synthesized_endpoints.len(), 4);
    assert_eq!(state.validated_endpoints.len(), 3);
    let patched: Vec<_> = state.patched_endpoints.iter().map(|p| (p.method, p.line)).collect();
    assert_eq!(patched, vec![(HttpMethod::Get, 7), (HttpMethod::Delete, 18)]);
    assert!(state.patched_endpoints.iter().all(|p| p.file_path == routes_file(&project)));

    assert_eq!(fs::read_to_string(routes_file(&project)).unwrap(), expected_routes());

    // Controllers and middlewares are never modified
    let controller = module_dir(&project).join("controllers").join("user.controller.js");
    assert_eq!(fs::read_to_string(controller).unwrap(), FIXTURES[2].1);

    let report = RunReport::from_state(&state);
    assert_eq!(report.rejected, vec!["POST /api/v1/users".to_string()]);
    assert_eq!(report.unpatched, vec!["PUT /api/v1/users/:id".to_string()]);
    assert!(serialize_yaml(&report).unwrap().contains("patched: 2"));
    let json: serde_json::Value = serde_json::from_str(&serialize_json(&report).unwrap()).unwrap();
    assert_eq!(json["patched"][1]["line"], 18);
}

#[test]
fn test_second_run_is_served_from_cache() {
    let project = create_test_project();
    let cache_dir = TempDir::new().unwrap();
    let cache = FileCache::open(cache_dir.path()).unwrap();

    let first_oracle = scripted_oracle();
    Pipeline::new(&first_oracle, &cache, js_scanner())
        .run(PipelineState::new(vec![module_dir(&project)], vec![]));
    assert_eq!(first_oracle.call_count(), 6);
    let first_output = fs::read_to_string(routes_file(&project)).unwrap();

    // Restore the sources; every answer must now come from the cache
    fs::write(routes_file(&project), FIXTURES[1].1).unwrap();
    let silent_oracle = ScriptedOracle::new();
    let state = Pipeline::new(&silent_oracle, &cache, js_scanner())
        .run(PipelineState::new(vec![module_dir(&project)], vec![]));

    assert_eq!(silent_oracle.call_count(), 0);
    assert_eq!(state.patched_endpoints.len(), 2);
    assert_eq!(fs::read_to_string(routes_file(&project)).unwrap(), first_output);
}

#[test]
fn test_explicit_router_context_file() {
    let project = create_test_project();
    let module = module_dir(&project);
    let shared_router = project.path().join("app.routes.js");
    fs::write(&shared_router, "app.use('/api/v1', require('./users/routes/user.routes'));\n").unwrap();

    let oracle = ScriptedOracle::new()
        .respond_when("app.use(", ROUTER_CONTEXT_RESPONSE)
        .respond_when("Base URL: /api/v1\nFile:", "[]")
        // index.js is now an ordinary route file without a base URL
        .respond_when("No base URL provided.", "[]");
    let cache = MemoryCache::new();

    let state = Pipeline::new(&oracle, &cache, js_scanner())
        .run(PipelineState::new(vec![module.clone()], vec![shared_router.clone()]));

    assert!(state.errors.is_empty());
    assert_eq!(state.router_context_files, vec![shared_router]);
    assert_eq!(
        state.route_files,
        vec![module.join("routes").join("index.js"), routes_file(&project)]
    );
    assert_eq!(state.router_base_urls.len(), 1);
    assert_eq!(oracle.call_count(), 3);
}

#[test]
fn test_oracle_failures_leave_sources_untouched() {
    let project = create_test_project();
    let oracle = ScriptedOracle::new().fail_when("router.use(").fail_when("File:");
    let cache = MemoryCache::new();

    let state = Pipeline::new(&oracle, &cache, js_scanner())
        .run(PipelineState::new(vec![module_dir(&project)], vec![]));

    // Per-item failures never stop the run
    assert!(state.errors.is_empty());
    assert!(state.router_base_urls.is_empty());
    assert!(state.endpoints.is_empty());
    assert_eq!(state.controller_symbols.len(), 3);
    assert!(state.patched_endpoints.is_empty());
    for (path, content) in FIXTURES {
        assert_eq!(fs::read_to_string(project.path().join(path)).unwrap(), *content);
    }
}

#[test]
fn test_missing_module_directory_is_not_fatal() {
    let oracle = ScriptedOracle::new();
    let cache = MemoryCache::new();

    let state = Pipeline::new(&oracle, &cache, js_scanner())
        .run(PipelineState::new(vec![Path::new("/nonexistent/module").to_path_buf()], vec![]));

    assert!(state.errors.is_empty());
    assert!(state.route_files.is_empty());
    assert_eq!(oracle.call_count(), 0);
}
