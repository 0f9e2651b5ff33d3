//! Message builders for every oracle call site.

use crate::extractor::EndpointDescriptor;
use crate::oracle::ChatMessage;
use std::path::Path;

const ROUTER_CONTEXT_INSTRUCTIONS: &str = r#"You are given the source of an Express.js router aggregation file.
Find every sub-router it mounts and the base paths each one is mounted under.
Respond with a JSON array only, shaped like:
[
  { "routerPath": "modules/users/routes", "apiPaths": ["/api/v1/users"] }
]
Rules:
- routerPath is the mounted router's file path relative to the project root, without a leading ./ and without an extension.
- apiPaths are complete base paths including every prefix applied above the router.
- Do not wrap the answer in markdown or code fences."#;

const ENDPOINT_INSTRUCTIONS: &str = r#"You are given an Express.js route file.
List every endpoint it registers. Respond with a JSON array only, shaped like:
[
  {
    "method": "GET|POST|PUT|DELETE|PATCH",
    "path": "/users/:id",
    "fullPath": "/api/v1/users/:id",
    "handlers": ["getUser"],
    "middlewares": ["authenticate"],
    "parameters": [
      { "name": "id", "in": "path", "type": "string", "description": "User identifier", "required": true }
    ]
  }
]
Rules:
- path is the first argument of the route registration, copied character for character.
- fullPath prefixes path with the base URL when one is given.
- handlers are the controller method names; middlewares are the middleware method names, without their object prefix.
- "in" is one of path, query, header, body; "type" is one of string, number, boolean, object.
- A parameter without a default value is required.
- Do not wrap the answer in markdown or code fences."#;

/// Prompt asking for the base paths a router aggregation file mounts.
pub fn router_context_prompt(content: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(ROUTER_CONTEXT_INSTRUCTIONS),
        ChatMessage::user(format!("File Content:\n{}", content)),
    ]
}

/// Prompt asking for the endpoints registered in one route file.
pub fn endpoint_prompt(file_path: &Path, content: &str, router_context: &str) -> Vec<ChatMessage> {
    let base_url = if router_context.is_empty() {
        "No base URL provided."
    } else {
        router_context
    };

    vec![
        ChatMessage::system(ENDPOINT_INSTRUCTIONS),
        ChatMessage::user(format!(
            "Base URL: {}\nFile: {}\nContent:\n{}",
            base_url,
            file_path.display(),
            content
        )),
    ]
}

/// Hints that steer the generated documentation block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SynthesisHints {
    /// Some middleware reads an authorization header
    pub mentions_authorization: bool,
    /// Some controller reads a language setting
    pub mentions_language: bool,
}

/// Prompt asking for the Swagger JSDoc block of one endpoint.
pub fn swagger_prompt(endpoint: &EndpointDescriptor, hints: SynthesisHints) -> Vec<ChatMessage> {
    let method = endpoint.method.router_method();
    let language_parameter = if hints.mentions_language {
        "\n *       - $ref: '#/components/parameters/LanguageHeader'"
    } else {
        ""
    };
    let security = if hints.mentions_authorization {
        "\n *     security:\n *       - bearerAuth: []"
    } else {
        ""
    };

    let system = format!(
        r#"Write one Swagger/OpenAPI JSDoc comment for the endpoint described below.
Rules:
- Base every statement on the implementation shown; document only parameters and status codes that the code actually uses.
- Only list status codes that are sent through .status(...) or .json(...).
- Derive the summary and description from the path and the implementation.
- Document every path parameter.
- If there is neither middleware nor controller source, leave out parameters and responses.
- Return the comment as plain text, with no markdown and nothing before or after it.

Format:
/**
 * @swagger
 * {full_path}:
 *   {method}:
 *     tags:
 *       - [Controller name without the "Controller" suffix]
 *     summary: [Short summary]
 *     description: [Detailed description]
 *     parameters:{language_parameter}
 *       - name: [name]
 *         in: [path|query|header]
 *         required: [true|false]
 *         schema:
 *           type: [string|number|boolean|object]
 *         description: [description]
 *     requestBody:
 *       required: [true|false]
 *       content:
 *         application/json:
 *           schema:
 *             type: object
 *             properties:
 *               [property]:
 *                 type: [type]
 *     responses:
 *       [status]:
 *         description: [description]{security}
 */"#,
        full_path = endpoint.full_path,
        method = method,
        language_parameter = language_parameter,
        security = security,
    );

    let parameters =
        serde_json::to_string(&endpoint.parameters).unwrap_or_else(|_| "[]".to_string());
    let middleware = if endpoint.middleware_contents.is_empty() {
        "No middleware content available.".to_string()
    } else {
        endpoint.middleware_contents.join("\n")
    };
    let controller = if endpoint.controller_contents.is_empty() {
        "No controller content available.".to_string()
    } else {
        endpoint.controller_contents.join("\n")
    };

    let user = format!(
        "Endpoint Details:\n- Method: {}\n- Path: {}\n- Parameters: {} (the controller may use more)\n\nMiddleware Content:\n{}\n\nController Content:\n{}",
        endpoint.method, endpoint.full_path, parameters, middleware, controller
    );

    vec![ChatMessage::system(system), ChatMessage::user(user)]
}
