//! Structural validation of generated documentation blocks.

use crate::parser::{AstParser, Dialect};
use crate::pipeline::map_isolated;
use crate::synthesizer::SynthesizedEndpoint;
use anyhow::{bail, Context, Result};

/// Checks that a block can be embedded in a source file as documentation.
///
/// The block must parse as JavaScript and consist of comments only; generated code,
/// markdown fences and unterminated comments are all rejected.
pub fn validate_block(block: &str) -> Result<()> {
    if block.trim().is_empty() {
        bail!("documentation block is empty");
    }

    let tree = AstParser::parse_source(block, Dialect::JavaScript)
        .context("documentation block is not valid JavaScript")?;

    let root = tree.root();
    let mut cursor = root.walk();
    if let Some(node) = root.named_children(&mut cursor).find(|n| n.kind() != "comment") {
        bail!(
            "documentation block contains a `{}` at line {}",
            node.kind(),
            node.start_position().row + 1
        );
    }

    Ok(())
}

/// Keeps the endpoints whose block validates, in their original order.
pub fn validate_all(endpoints: &[SynthesizedEndpoint]) -> Vec<SynthesizedEndpoint> {
    map_isolated(
        endpoints,
        |documented| format!("documentation for {}", documented.endpoint.key()),
        |documented| {
            validate_block(&documented.documentation_block)?;
            Ok(documented.clone())
        },
    )
}
