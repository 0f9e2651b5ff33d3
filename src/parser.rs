use crate::error::{Error, Result};
use log::debug;
use std::fs;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use tree_sitter::{Language, Node, Parser, Tree};

/// Syntax-tree parser for JavaScript and TypeScript sources.
///
/// The `AstParser` uses tree-sitter grammars to turn source text into a concrete syntax tree.
/// tree-sitter recovers from syntax errors by inserting `ERROR` and missing nodes; the
/// `AstParser` treats any such node as a failed parse so callers never work on a
/// partially understood file.
///
/// # Example
///
/// ```no_run
/// use swagger_from_source::parser::{AstParser, Dialect};
///
/// let tree = AstParser::parse_source("router.get('/users', list);", Dialect::JavaScript).unwrap();
/// assert_eq!(tree.root().kind(), "program");
/// ```
pub struct AstParser;

/// Grammar used to parse a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    JavaScript,
    TypeScript,
    Tsx,
}

impl Dialect {
    /// Picks the grammar from a file extension; anything unknown is parsed as JavaScript.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("ts") | Some("mts") | Some("cts") => Dialect::TypeScript,
            Some("tsx") => Dialect::Tsx,
            _ => Dialect::JavaScript,
        }
    }

    fn language(self) -> Language {
        match self {
            Dialect::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Dialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Dialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// A successfully parsed source text together with its syntax tree.
pub struct SyntaxTree {
    source: String,
    tree: Tree,
}

impl SyntaxTree {
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source text covered by `node`.
    pub fn text(&self, node: Node<'_>) -> &str {
        &self.source[node.start_byte()..node.end_byte()]
    }

    /// Walks the tree depth-first in source order, calling `on_node` for every node.
    ///
    /// Returning `ControlFlow::Break` from the callback stops the traversal.
    pub fn visit<'a, F>(&'a self, mut on_node: F)
    where
        F: FnMut(Node<'a>) -> ControlFlow<()>,
    {
        let mut cursor = self.tree.walk();
        loop {
            if on_node(cursor.node()).is_break() {
                return;
            }
            if cursor.goto_first_child() {
                continue;
            }
            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return;
                }
            }
        }
    }

    /// Returns the first value produced by `f` in depth-first source order.
    pub fn find_first<'a, T, F>(&'a self, mut f: F) -> Option<T>
    where
        F: FnMut(Node<'a>) -> Option<T>,
    {
        let mut found = None;
        self.visit(|node| match f(node) {
            Some(value) => {
                found = Some(value);
                ControlFlow::Break(())
            }
            None => ControlFlow::Continue(()),
        });
        found
    }
}

impl AstParser {
    /// Parses source text with the given grammar.
    ///
    /// # Errors
    ///
    /// Returns `Error::ParseError` if the grammar cannot be loaded, the parser gives up,
    /// or the resulting tree contains error or missing nodes. The message names the
    /// line and column of the first problem.
    pub fn parse_source(source: &str, dialect: Dialect) -> Result<SyntaxTree> {
        Self::parse_named(source, dialect, Path::new("<inline>"))
    }

    /// Reads and parses a file, choosing the grammar from its extension.
    pub fn parse_file(path: &Path) -> Result<SyntaxTree> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path)?;
        let tree = Self::parse_named(&content, Dialect::from_path(path), path)?;

        debug!("Successfully parsed file: {}", path.display());
        Ok(tree)
    }

    fn parse_named(source: &str, dialect: Dialect, name: &Path) -> Result<SyntaxTree> {
        let parse_error = |message: String| Error::ParseError {
            file: PathBuf::from(name),
            message,
        };

        let mut parser = Parser::new();
        parser
            .set_language(&dialect.language())
            .map_err(|e| parse_error(format!("failed to load {:?} grammar: {}", dialect, e)))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| parse_error("parser returned no tree".to_string()))?;

        let syntax_tree = SyntaxTree {
            source: source.to_string(),
            tree,
        };

        if syntax_tree.root().has_error() {
            let location = syntax_tree
                .find_first(|node| {
                    (node.is_error() || node.is_missing()).then(|| node.start_position())
                })
                .map(|pos| format!("line {}, column {}", pos.row + 1, pos.column + 1))
                .unwrap_or_else(|| "unknown location".to_string());
            return Err(parse_error(format!("invalid syntax at {}", location)));
        }

        Ok(syntax_tree)
    }
}
