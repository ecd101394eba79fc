//! Path matching with the structure specification's fallbacks

use tracing::trace;
use wordseer_markup::{MarkupError, MarkupNode, MarkupTree};

/// Resolve a path expression against a markup node
///
/// - An empty or whitespace-only expression matches `node` itself.
/// - If `"../" + expression` evaluated from `node` reaches `node`, the
///   expression names the node's own position and `node` alone is returned.
///   Leaf specifications rely on this: their `xpaths` are re-applied to the
///   unit's node to gather sentence text. An expression that cannot take a
///   parent step (`(//p)[1]`) is evaluated from the parent instead.
/// - Otherwise the matches of `expression` relative to `node` are returned
///   in document order. No match is an empty vector.
pub fn match_nodes<'a>(
    tree: &'a MarkupTree,
    expression: &str,
    node: MarkupNode<'a>,
) -> Result<Vec<MarkupNode<'a>>, MarkupError> {
    if expression.trim().is_empty() {
        return Ok(vec![node]);
    }

    if refers_to_itself(tree, expression, node)? {
        trace!("'{}' refers to {} itself", expression, tree.locate(node));
        return Ok(vec![node]);
    }

    let matches = tree.select(node, expression)?;
    trace!(
        "'{}' matched {} node(s) under {}",
        expression,
        matches.len(),
        tree.locate(node)
    );
    Ok(matches)
}

fn refers_to_itself<'a>(
    tree: &'a MarkupTree,
    expression: &str,
    node: MarkupNode<'a>,
) -> Result<bool, MarkupError> {
    let via_parent = format!("../{}", expression);
    match tree.select(node, &via_parent) {
        Ok(nodes) => Ok(nodes.contains(&node)),
        Err(MarkupError::InvalidPath { .. }) => match tree.parent(node) {
            Some(parent) if tree.is_queryable(parent) => {
                Ok(tree.select(parent, expression)?.contains(&node))
            }
            _ => Ok(false),
        },
        Err(e) => Err(e),
    }
}
