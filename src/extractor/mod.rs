//! Extraction of route metadata and implementation symbols.
//!
//! Route-side metadata comes from the oracle: router aggregation files are turned into
//! [`RouterBaseUrl`] tables and route files into [`EndpointDescriptor`]s. Implementation
//! symbols come from parsing controller and middleware classes.
//!
//! - **Router context**: See [`router_context::RouterContextExtractor`]
//! - **Endpoints**: See [`endpoints::EndpointExtractor`]
//! - **Symbols**: See [`symbols::SymbolExtractor`]

pub mod endpoints;
pub mod router_context;
pub mod symbols;

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Base path segments mounted by one router aggregation file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterBaseUrl {
    /// Path of the router file the segments belong to
    pub router_path: String,
    /// Full base paths (e.g. `/api/v1/users`)
    #[serde(default)]
    pub api_paths: Vec<String>,
}

/// HTTP methods an endpoint can be registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl HttpMethod {
    /// Upper-case wire name, as used in cache keys and prompts.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Router method name, e.g. `get` in `router.get(...)`.
    pub fn router_method(&self) -> String {
        self.as_str().to_lowercase()
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            "OPTIONS" => Ok(HttpMethod::Options),
            "HEAD" => Ok(HttpMethod::Head),
            other => Err(format!("unsupported HTTP method: {}", other)),
        }
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        method.as_str().to_string()
    }
}

/// The location where a parameter value is read from in an HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    #[serde(alias = "Path", alias = "PATH")]
    Path,
    #[serde(alias = "Query", alias = "QUERY")]
    Query,
    #[serde(alias = "Header", alias = "HEADER")]
    Header,
    #[serde(alias = "Body", alias = "BODY")]
    Body,
}

/// A parameter declared by a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(rename = "type", default = "default_parameter_type", deserialize_with = "parameter_type")]
    pub param_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub required: bool,
}

fn default_parameter_type() -> String {
    "string".to_string()
}

fn parameter_type<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_parameter_type))
}

/// Reads an explicit `null` the same way as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One route registration discovered in a route file.
///
/// `handlers` and `middlewares` are unresolved name references when the descriptor is
/// created; `controller_contents` and `middleware_contents` are filled in by the matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDescriptor {
    pub method: HttpMethod,
    /// Path exactly as written in the route registration
    pub path: String,
    /// Path including every mounted base path
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub handlers: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub middlewares: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: Vec<ParameterDescriptor>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_path: PathBuf,
    #[serde(default, deserialize_with = "null_as_default")]
    pub controller_contents: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub middleware_contents: Vec<String>,
}

impl EndpointDescriptor {
    /// Create a descriptor with minimal required fields
    pub fn new(method: HttpMethod, path: &str, full_path: &str, file_path: PathBuf) -> Self {
        Self {
            method,
            path: path.to_string(),
            full_path: full_path.to_string(),
            handlers: Vec::new(),
            middlewares: Vec::new(),
            parameters: Vec::new(),
            file_path,
            controller_contents: Vec::new(),
            middleware_contents: Vec::new(),
        }
    }

    /// `METHOD /full/path`, used as the synthesis cache key and in log lines.
    pub fn key(&self) -> String {
        format!("{} {}", self.method, self.full_path)
    }
}

/// Byte and line extent of a symbol in its file. Lines are 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceSpan {
    pub start_byte: usize,
    pub end_byte: usize,
    pub start_line: usize,
    pub end_line: usize,
}

/// A method-like declaration found in a controller or middleware class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    /// `Container.member`, or just `member` for anonymous classes
    pub qualified_name: String,
    pub source_text: String,
    pub source_span: SourceSpan,
}

impl Symbol {
    /// The member name without its container.
    pub fn bare_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_deserialize_defaults() {
        let json = r#"{
            "method": "get",
            "path": "/users/:id",
            "parameters": [
                { "name": "id", "in": "Path", "required": true }
            ]
        }"#;

        let endpoint: EndpointDescriptor = serde_json::from_str(json).unwrap();

        assert_eq!(endpoint.method, HttpMethod::Get);
        assert!(endpoint.handlers.is_empty());
        assert!(endpoint.middlewares.is_empty());
        assert!(endpoint.controller_contents.is_empty());
        assert_eq!(endpoint.parameters[0].location, ParameterLocation::Path);
        assert_eq!(endpoint.parameters[0].param_type, "string");
        assert!(endpoint.parameters[0].description.is_none());
    }

    #[test]
    fn test_endpoint_null_fields_read_as_absent() {
        let json = r#"{
            "method": "POST",
            "path": "/users",
            "fullPath": null,
            "handlers": null,
            "middlewares": null,
            "parameters": [{ "name": "name", "in": "body", "type": null, "required": null }],
            "controllerContents": null,
            "middlewareContents": null
        }"#;

        let endpoint: EndpointDescriptor = serde_json::from_str(json).unwrap();

        assert_eq!(endpoint.full_path, "");
        assert!(endpoint.handlers.is_empty());
        assert!(endpoint.middlewares.is_empty());
        assert!(endpoint.controller_contents.is_empty());
        assert_eq!(endpoint.parameters[0].param_type, "string");
        assert!(!endpoint.parameters[0].required);
    }

    #[test]
    fn test_endpoint_rejects_unknown_method() {
        let json = r#"{ "method": "TRACE", "path": "/x" }"#;
        assert!(serde_json::from_str::<EndpointDescriptor>(json).is_err());
    }

    #[test]
    fn test_endpoint_serializes_camel_case() {
        let endpoint = EndpointDescriptor::new(
            HttpMethod::Post,
            "/",
            "/api/users",
            PathBuf::from("routes/users.js"),
        );
        let value = serde_json::to_value(&endpoint).unwrap();

        assert_eq!(value["method"], "POST");
        assert_eq!(value["fullPath"], "/api/users");
        assert!(value.get("controllerContents").is_some());
        assert_eq!(endpoint.key(), "POST /api/users");
    }

    #[test]
    fn test_symbol_bare_name() {
        let span = SourceSpan { start_byte: 0, end_byte: 0, start_line: 1, end_line: 1 };
        let qualified = Symbol {
            qualified_name: "UserController.getUser".to_string(),
            source_text: String::new(),
            source_span: span,
        };
        let bare = Symbol { qualified_name: "getUser".to_string(), ..qualified.clone() };

        assert_eq!(qualified.bare_name(), "getUser");
        assert_eq!(bare.bare_name(), "getUser");
    }

    #[test]
    fn test_router_method_is_lower_case() {
        assert_eq!(HttpMethod::Delete.router_method(), "delete");
        assert_eq!("Patch".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
    }
}
