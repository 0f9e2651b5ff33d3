//! Joins endpoint handler and middleware references to symbol source text.

use crate::extractor::{EndpointDescriptor, Symbol};
use log::{debug, warn};

/// Reduces a handler reference to the member name it points at.
///
/// `" getUser / legacy "` becomes `getUser` and `userController.getUser` becomes
/// `getUser`.
pub fn normalize_reference(reference: &str) -> &str {
    let head = reference.split(" / ").next().unwrap_or(reference).trim();
    head.rsplit('.').next().unwrap_or(head).trim()
}

/// Source texts of every symbol whose bare name equals one of `references`, ignoring case.
///
/// Results follow the order of `symbols`, not the order of `references`, and a symbol
/// appears at most once.
pub fn matching_contents(references: &[String], symbols: &[Symbol]) -> Vec<String> {
    let wanted: Vec<&str> = references
        .iter()
        .map(|r| normalize_reference(r))
        .filter(|r| !r.is_empty())
        .collect();

    symbols
        .iter()
        .filter(|symbol| wanted.iter().any(|name| same_name(symbol.bare_name(), name)))
        .map(|symbol| symbol.source_text.clone())
        .collect()
}

/// Attaches controller and middleware source texts to one endpoint.
///
/// Unresolved references are reported but never drop the endpoint.
pub fn match_endpoint(
    mut endpoint: EndpointDescriptor,
    controllers: &[Symbol],
    middlewares: &[Symbol],
) -> EndpointDescriptor {
    warn_unresolved(&endpoint, "handler", &endpoint.handlers, controllers);
    warn_unresolved(&endpoint, "middleware", &endpoint.middlewares, middlewares);

    let controller_contents = matching_contents(&endpoint.handlers, controllers);
    let middleware_contents = matching_contents(&endpoint.middlewares, middlewares);
    debug!(
        "{}: {} controller and {} middleware matches",
        endpoint.key(),
        controller_contents.len(),
        middleware_contents.len()
    );

    endpoint.controller_contents.extend(controller_contents);
    endpoint.middleware_contents.extend(middleware_contents);
    endpoint
}

/// Matches every endpoint; the output has the same length and order as the input.
pub fn match_all(
    endpoints: &[EndpointDescriptor],
    controllers: &[Symbol],
    middlewares: &[Symbol],
) -> Vec<EndpointDescriptor> {
    endpoints
        .iter()
        .cloned()
        .map(|endpoint| match_endpoint(endpoint, controllers, middlewares))
        .collect()
}

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn warn_unresolved(endpoint: &EndpointDescriptor, kind: &str, references: &[String], symbols: &[Symbol]) {
    for reference in references {
        let name = normalize_reference(reference);
        if !symbols.iter().any(|s| same_name(s.bare_name(), name)) {
            warn!("No {} implementation found for '{}' ({})", kind, reference, endpoint.key());
        }
    }
}
