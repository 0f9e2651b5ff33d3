use crate::extractor::{SourceSpan, Symbol};
use crate::parser::{AstParser, Dialect, SyntaxTree};
use crate::pipeline::map_isolated;
use anyhow::{anyhow, bail, Context, Result};
use log::debug;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use tree_sitter::Node;

/// Node kinds that introduce a class body.
const CLASS_KINDS: &[&str] = &["class_declaration", "class", "abstract_class_declaration"];

/// Node kinds whose value turns a class field into a method-like member.
const FUNCTION_VALUE_KINDS: &[&str] = &["arrow_function", "function_expression", "function"];

/// Extracts method-like class members from controller and middleware files.
///
/// Every method definition, and every class field initialised with a function, becomes a
/// [`Symbol`] named `Container.member` whose source text is the member's exact span in
/// the file.
pub struct SymbolExtractor;

impl SymbolExtractor {
    /// Symbols of an already parsed tree, in source order.
    ///
    /// # Errors
    ///
    /// Fails when a method-like member has no plain identifier name (computed, string,
    /// numeric or private names); no symbols of the tree are returned in that case.
    pub fn extract_tree(tree: &SyntaxTree) -> Result<Vec<Symbol>> {
        let mut symbols = Vec::new();
        let mut failure = None;

        tree.visit(|node| {
            if CLASS_KINDS.contains(&node.kind()) {
                if let Err(e) = collect_class_members(tree, node, &mut symbols) {
                    failure = Some(e);
                    return ControlFlow::Break(());
                }
            }
            ControlFlow::Continue(())
        });

        match failure {
            Some(e) => Err(e),
            None => Ok(symbols),
        }
    }

    /// Symbols of source text parsed with the given grammar.
    pub fn extract_source(source: &str, dialect: Dialect) -> Result<Vec<Symbol>> {
        let tree = AstParser::parse_source(source, dialect)?;
        Self::extract_tree(&tree)
    }

    /// Symbols of one file.
    pub fn extract_file(path: &Path) -> Result<Vec<Symbol>> {
        let tree = AstParser::parse_file(path)?;
        let symbols = Self::extract_tree(&tree)
            .with_context(|| format!("Failed to extract symbols from {}", path.display()))?;
        debug!("Found {} symbols in {}", symbols.len(), path.display());
        Ok(symbols)
    }

    /// Symbols of every file, flattened in file order; failing files contribute nothing.
    pub fn extract_all(files: &[PathBuf]) -> Vec<Symbol> {
        map_isolated(
            files,
            |path| format!("source file {}", path.display()),
            |path| Self::extract_file(path),
        )
        .into_iter()
        .flatten()
        .collect()
    }
}

fn collect_class_members(tree: &SyntaxTree, class: Node<'_>, symbols: &mut Vec<Symbol>) -> Result<()> {
    let container = class
        .child_by_field_name("name")
        .map(|name| tree.text(name).to_string())
        .unwrap_or_default();

    let Some(body) = class.child_by_field_name("body") else {
        return Ok(());
    };

    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        let name = match member.kind() {
            "method_definition" => member.child_by_field_name("name"),
            "field_definition" if has_function_value(member) => member.child_by_field_name("property"),
            "public_field_definition" if has_function_value(member) => member.child_by_field_name("name"),
            _ => continue,
        };
        let line = member.start_position().row + 1;
        let name = name.ok_or_else(|| anyhow!("member at line {} has no name", line))?;

        if name.kind() != "property_identifier" {
            bail!(
                "member `{}` at line {} of class `{}` has no simple identifier name",
                tree.text(name),
                line,
                container
            );
        }

        let member_name = tree.text(name);
        let qualified_name = if container.is_empty() {
            member_name.to_string()
        } else {
            format!("{}.{}", container, member_name)
        };

        symbols.push(Symbol {
            qualified_name,
            source_text: tree.text(member).to_string(),
            source_span: SourceSpan {
                start_byte: member.start_byte(),
                end_byte: member.end_byte(),
                start_line: line,
                end_line: member.end_position().row + 1,
            },
        });
    }

    Ok(())
}

fn has_function_value(field: Node<'_>) -> bool {
    field
        .child_by_field_name("value")
        .map(|value| FUNCTION_VALUE_KINDS.contains(&value.kind()))
        .unwrap_or(false)
}
