//! Recursive structural pretty-printer for AST nodes.
//!
//! Every concrete node emits a `TypeName:` header line at its depth and its
//! fields one level deeper, in declaration order. Virtual nodes (grouping
//! types flagged at type-definition time, never inferred from a name) emit
//! no header and keep their children at the node's own depth. Absent
//! optional fields emit nothing.

use crate::ast::tokens::Token;
use crate::parse_tree::ParseTree;

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

/// One printable field value of a node.
pub enum PrintItem<'a> {
    /// A nested AST node; printed recursively.
    Node(&'a dyn AstPrint),
    /// A token leaf.
    Token(&'a Token),
    /// A resolved scalar (datatype, flag, name), already rendered.
    Leaf(String),
    /// An unmodeled raw parse subtree, dumped in parse-tree form.
    Subtree(&'a ParseTree),
}

/// Structural printing, implemented by every AST node type.
pub trait AstPrint {
    /// The header name printed for this node.
    fn type_name(&self) -> &'static str;

    /// Whether this node type is virtual (grouping-only, no header line).
    fn is_virtual(&self) -> bool {
        false
    }

    /// The node's fields in declaration order. Sequence fields contribute
    /// one item per element; absent optionals contribute nothing.
    fn print_items(&self) -> Vec<PrintItem<'_>>;

    /// Render the subtree as indented lines, recomputed on each call.
    fn prettyprint(&self, depth: usize) -> Vec<String> {
        let mut lines = Vec::new();
        let child_depth = if self.is_virtual() { depth } else { depth + 1 };
        if !self.is_virtual() {
            lines.push(format!("{}{}:", indent(depth), self.type_name()));
        }
        for item in self.print_items() {
            match item {
                PrintItem::Node(node) => lines.extend(node.prettyprint(child_depth)),
                PrintItem::Token(token) => {
                    lines.push(format!("{}{}", indent(child_depth), token));
                }
                PrintItem::Leaf(text) => {
                    lines.push(format!("{}{}", indent(child_depth), text));
                }
                PrintItem::Subtree(tree) => lines.extend(tree.pretty(child_depth)),
            }
        }
        lines
    }
}
