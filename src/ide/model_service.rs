//! Client-facing model payloads.
//!
//! Nodes become JSON objects carrying `$type` and their set properties.
//! References are sent as their text; containers, ranges and derived
//! attributes never leave the core.

use serde_json::{Map, Number, Value, json};

use crate::parser::{Ast, NodeId, PropertyValue, property_order};
use crate::syntax::serializer::root_keyword;

/// The payload of a whole document.
///
/// ```text
/// { "$type": "CrossModelRoot", "entity": { "$type": "LogicalEntity", "id": "Customer", ... } }
/// ```
pub fn to_client_model(ast: &Ast) -> Value {
    let root = ast.root();
    let mut object = Map::new();
    object.insert("$type".into(), json!(ast.kind(root).type_name()));
    if let Some(content) = ast.root_content() {
        if let Some(keyword) = root_keyword(ast.kind(content)) {
            object.insert(keyword.into(), node_value(ast, content));
        }
    }
    Value::Object(object)
}

/// The payload of one node and everything it contains.
pub fn node_value(ast: &Ast, node: NodeId) -> Value {
    let data = ast.node(node);
    let mut object = Map::new();
    object.insert("$type".into(), json!(data.kind().type_name()));
    for &property in property_order(data.kind()) {
        let Some(value) = data.property_value(property) else {
            continue;
        };
        object.insert(property.name().into(), property_json(ast, value));
    }
    Value::Object(object)
}

fn property_json(ast: &Ast, value: PropertyValue<'_>) -> Value {
    match value {
        PropertyValue::Id(id) => json!(id.as_str()),
        PropertyValue::String(text) => json!(text),
        PropertyValue::Integer(value) => json!(value),
        PropertyValue::Number(value) => Number::from_f64(value).map_or(Value::Null, Value::Number),
        PropertyValue::Bool(value) => json!(value),
        PropertyValue::Keyword(keyword) => json!(keyword),
        PropertyValue::Reference(reference) => json!(reference.text.as_str()),
        PropertyValue::References(references) => {
            Value::Array(references.iter().map(|r| json!(r.text.as_str())).collect())
        }
        PropertyValue::Node(child) => node_value(ast, child),
        PropertyValue::Nodes(children) => {
            Value::Array(children.iter().map(|&child| node_value(ast, child)).collect())
        }
    }
}
