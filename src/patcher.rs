//! Insertion of validated documentation blocks above route registrations.

use crate::extractor::HttpMethod;
use crate::parser::{AstParser, Dialect, SyntaxTree};
use crate::pipeline::map_isolated;
use crate::synthesizer::SynthesizedEndpoint;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tree_sitter::Node;

/// Where one documentation block was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchedEndpoint {
    pub method: HttpMethod,
    pub full_path: String,
    pub file_path: PathBuf,
    /// 1-indexed line where the block now starts
    pub line: usize,
}

/// 1-indexed line of the first statement `<object>.<method>('<path>', ...)` in source order.
///
/// Only expression statements whose callee is a member access are considered; the
/// property must equal the lower-cased method and the first argument must be a string
/// literal equal to `path`.
pub fn locate_route_line(tree: &SyntaxTree, method: HttpMethod, path: &str) -> Option<usize> {
    let property = method.router_method();
    tree.find_first(|node| route_statement_line(tree, node, &property, path))
}

fn route_statement_line(tree: &SyntaxTree, node: Node<'_>, property: &str, path: &str) -> Option<usize> {
    if node.kind() != "expression_statement" {
        return None;
    }

    let call = first_named_non_comment(node)?;
    if call.kind() != "call_expression" {
        return None;
    }

    let callee = call.child_by_field_name("function")?;
    if callee.kind() != "member_expression" {
        return None;
    }
    let member = callee.child_by_field_name("property")?;
    if tree.text(member) != property {
        return None;
    }

    let arguments = call.child_by_field_name("arguments")?;
    let first = first_named_non_comment(arguments)?;
    if first.kind() != "string" || string_value(tree, first) != path {
        return None;
    }

    Some(node.start_position().row + 1)
}

fn first_named_non_comment(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|child| child.kind() != "comment");
    found
}

/// Literal text of a string node without its quotes.
fn string_value<'a>(tree: &'a SyntaxTree, node: Node<'_>) -> &'a str {
    let raw = tree.text(node);
    if raw.len() >= 2 {
        &raw[1..raw.len() - 1]
    } else {
        ""
    }
}

/// Inserts `block` as new lines directly above the 1-indexed `line` of `content`.
///
/// Every inserted line takes the leading whitespace of the target line, and follows its
/// line ending.
pub fn insert_block(content: &str, block: &str, line: usize) -> String {
    let mut lines: Vec<&str> = content.split('\n').collect();
    let index = line.saturating_sub(1).min(lines.len());

    let target = lines.get(index).copied().unwrap_or("");
    let indent: String = target.chars().take_while(|c| *c == ' ' || *c == '\t').collect();
    let line_ending = if target.ends_with('\r') { "\r" } else { "" };

    let block_lines: Vec<String> = block
        .trim()
        .lines()
        .map(|l| {
            let l = l.trim_end();
            if l.is_empty() {
                line_ending.to_string()
            } else {
                format!("{}{}{}", indent, l, line_ending)
            }
        })
        .collect();

    lines.splice(index..index, block_lines.iter().map(String::as_str));
    lines.join("\n")
}

/// Writes one endpoint's block into its origin file.
///
/// The file is read and parsed afresh, so earlier insertions into the same file are
/// accounted for. Returns `None` (and leaves the file untouched) when no registration
/// matches.
pub fn patch_endpoint(documented: &SynthesizedEndpoint) -> Result<Option<PatchedEndpoint>> {
    let endpoint = &documented.endpoint;
    let file_path: &Path = &endpoint.file_path;

    let content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read route file: {}", file_path.display()))?;
    let tree = AstParser::parse_source(&content, Dialect::from_path(file_path))
        .with_context(|| format!("Failed to parse route file: {}", file_path.display()))?;

    let Some(line) = locate_route_line(&tree, endpoint.method, &endpoint.path) else {
        warn!(
            "Could not find route definition for {} '{}' in {}",
            endpoint.method,
            endpoint.path,
            file_path.display()
        );
        return Ok(None);
    };
    debug!("{} registered at {}:{}", endpoint.key(), file_path.display(), line);

    let patched = insert_block(&content, &documented.documentation_block, line);
    fs::write(file_path, patched)
        .with_context(|| format!("Failed to write route file: {}", file_path.display()))?;

    info!("Documented {} in {}:{}", endpoint.key(), file_path.display(), line);
    Ok(Some(PatchedEndpoint {
        method: endpoint.method,
        full_path: endpoint.full_path.clone(),
        file_path: file_path.to_path_buf(),
        line,
    }))
}

/// Patches every endpoint in order; failures and misses are logged and skipped.
pub fn patch_all(endpoints: &[SynthesizedEndpoint]) -> Vec<PatchedEndpoint> {
    map_isolated(
        endpoints,
        |documented| format!("patch for {}", documented.endpoint.key()),
        patch_endpoint,
    )
    .into_iter()
    .flatten()
    .collect()
}
