//! AST → text serialization.
//!
//! Output is deterministic: properties follow [`property_order`], unset
//! values, empty lists and `false` flags are omitted, ids and references are
//! escaped with [`to_id`] / [`to_id_reference`]. Parsing the output yields an
//! AST equal to the input on every non-cosmetic field.

use tokio_util::sync::CancellationToken;

use super::escape::{quote_string, to_id, to_id_reference};
use super::options::SerializerOptions;
use crate::parser::{Ast, Node, NodeId, NodeKind, Operand, PropertyValue, property_order};

/// Serialize a document with the given layout options.
pub fn serialize(ast: &Ast, options: &SerializerOptions) -> String {
    let mut writer = Writer::new(ast, options, None);
    writer.document();
    writer.finish()
}

/// Serialize with cancellation support.
/// Returns `None` if the cancellation token is signalled.
pub fn serialize_async(
    ast: &Ast,
    options: &SerializerOptions,
    cancel: &CancellationToken,
) -> Option<String> {
    let mut writer = Writer::new(ast, options, Some(cancel));
    writer.document();
    if cancel.is_cancelled() {
        return None;
    }
    Some(writer.finish())
}

/// The keyword that opens a document holding a node of `kind`.
pub fn root_keyword(kind: NodeKind) -> Option<&'static str> {
    match kind {
        NodeKind::Entity => Some("entity"),
        NodeKind::Relationship => Some("relationship"),
        NodeKind::Mapping => Some("mapping"),
        NodeKind::SystemDiagram => Some("systemDiagram"),
        _ => None,
    }
}

/// Integral values print without a fraction.
pub fn format_number(value: f64) -> String {
    value.to_string()
}

/// Single-line rendering of the node kinds written inline.
///
/// Dependencies, join conditions and attribute-mapping sources/targets are
/// written on the `- ` or `key:` line instead of as a nested block.
pub fn inline_text(ast: &Ast, id: NodeId) -> Option<String> {
    match ast.node(id) {
        Node::SourceObjectDependency(n) => Some(to_id_reference(&n.source.text)),
        Node::AttributeMappingSource(n) => Some(to_id_reference(&n.value.text)),
        Node::AttributeMappingTarget(n) => Some(to_id_reference(&n.value.text)),
        Node::JoinCondition(n) => {
            let right = match &n.right {
                Operand::Reference(r) => to_id_reference(&r.text),
                Operand::Number(value) => format_number(*value),
                Operand::String(value) => quote_string(value),
            };
            Some(format!("{} {} {}", to_id_reference(&n.left.text), n.op.symbol(), right))
        }
        _ => None,
    }
}

struct Writer<'a> {
    ast: &'a Ast,
    options: &'a SerializerOptions,
    cancel: Option<&'a CancellationToken>,
    lines: Vec<String>,
    /// Prefix replacing the indentation of the next line (list markers).
    pending_prefix: Option<String>,
}

impl<'a> Writer<'a> {
    fn new(ast: &'a Ast, options: &'a SerializerOptions, cancel: Option<&'a CancellationToken>) -> Self {
        Self {
            ast,
            options,
            cancel,
            lines: Vec::new(),
            pending_prefix: None,
        }
    }

    fn finish(self) -> String {
        let ending = self.options.line_ending.as_str();
        let mut out = String::new();
        for line in self.lines {
            out.push_str(&line);
            out.push_str(ending);
        }
        out
    }

    fn cancelled(&self) -> bool {
        self.cancel.is_some_and(|c| c.is_cancelled())
    }

    fn line(&mut self, column: usize, text: String) {
        let prefix = self
            .pending_prefix
            .take()
            .unwrap_or_else(|| " ".repeat(column));
        self.lines.push(format!("{prefix}{text}"));
    }

    fn document(&mut self) {
        let Some(content) = self.ast.root_content() else {
            return;
        };
        let Some(keyword) = root_keyword(self.ast.kind(content)) else {
            return;
        };
        self.line(0, format!("{keyword}:"));
        self.block(content, self.options.block_column(0));
    }

    /// Write the properties of `id` at `column`.
    fn block(&mut self, id: NodeId, column: usize) {
        let ast = self.ast;
        let node = ast.node(id);
        for &property in property_order(node.kind()) {
            if self.cancelled() {
                return;
            }
            let Some(key) = property.keyword() else {
                continue;
            };
            let Some(value) = node.property_value(property) else {
                continue;
            };
            match value {
                PropertyValue::Id(value) => self.line(column, format!("{key}: {}", to_id(value))),
                PropertyValue::String(s) => self.line(column, format!("{key}: {}", quote_string(s))),
                PropertyValue::Integer(i) => self.line(column, format!("{key}: {i}")),
                PropertyValue::Number(n) => self.line(column, format!("{key}: {}", format_number(n))),
                PropertyValue::Bool(true) => self.line(column, format!("{key}: true")),
                PropertyValue::Bool(false) => {}
                PropertyValue::Keyword(k) => self.line(column, format!("{key}: {k}")),
                PropertyValue::Reference(r) => {
                    self.line(column, format!("{key}: {}", to_id_reference(&r.text)))
                }
                PropertyValue::References(refs) => {
                    if refs.is_empty() {
                        continue;
                    }
                    self.line(column, format!("{key}:"));
                    let marker = self.marker(column);
                    for r in refs {
                        self.lines.push(format!("{marker}{}", to_id_reference(&r.text)));
                    }
                }
                PropertyValue::Node(child) => match inline_text(ast, child) {
                    Some(text) => self.line(column, format!("{key}: {text}")),
                    None => {
                        self.line(column, format!("{key}:"));
                        self.block(child, self.options.block_column(column));
                    }
                },
                PropertyValue::Nodes(children) => {
                    if children.is_empty() {
                        continue;
                    }
                    self.line(column, format!("{key}:"));
                    self.list(children, column);
                }
            }
        }
    }

    fn marker(&self, column: usize) -> String {
        format!("{}- ", " ".repeat(self.options.marker_column(column)))
    }

    fn list(&mut self, children: &[NodeId], column: usize) {
        let marker = self.marker(column);
        for &child in children {
            match inline_text(self.ast, child) {
                Some(text) => self.lines.push(format!("{marker}{text}")),
                None => {
                    let before = self.lines.len();
                    self.pending_prefix = Some(marker.clone());
                    self.block(child, self.options.item_column(column));
                    if self.lines.len() == before {
                        // An item without properties still needs its marker.
                        self.pending_prefix = None;
                        self.lines.push(marker.clone());
                    }
                }
            }
        }
    }
}
