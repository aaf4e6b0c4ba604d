//! Raw graph document as produced by the code analyzer.

use serde::Deserialize;

use super::error::GraphError;

/// Relation that parents a node when its scope does not.
pub const CONTAINS: &str = "contains";
/// Relation hidden from the relationship view.
pub const USES: &str = "uses";

/// A node record: `{id, name, type, scope}`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct RawNode {
	/// Unique node id.
	pub id: String,
	/// Display name; the id is shown when absent.
	#[serde(default)]
	pub name: Option<String>,
	/// Raw `type` string, see [`NodeType::parse`](super::palette::NodeType::parse).
	#[serde(default, rename = "type")]
	pub node_type: Option<String>,
	/// Ancestor ids, outermost first.
	#[serde(default)]
	pub scope: Vec<String>,
	/// Sections declared inline on this node.
	#[serde(default)]
	pub sections: Vec<RawSection>,
}

/// A named group of nested node records declared inline on its owner.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct RawSection {
	/// Section id, unique across nodes and sections.
	pub id: String,
	/// Heading shown on the row.
	#[serde(default)]
	pub name: Option<String>,
	/// Member node records.
	#[serde(default)]
	pub subnodes: Vec<RawNode>,
}

/// An edge record: `{source, target, relation}`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct RawEdge {
	/// Source node or section id.
	pub source: String,
	/// Target node or section id.
	pub target: String,
	/// Relation name, e.g. `calls` or `contains`.
	#[serde(default)]
	pub relation: String,
}

/// The whole input: flat node and edge lists.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct GraphDocument {
	/// Node records in document order.
	#[serde(default)]
	pub nodes: Vec<RawNode>,
	/// Edge records in document order.
	#[serde(default)]
	pub edges: Vec<RawEdge>,
}

impl GraphDocument {
	/// Decodes a document from JSON text.
	pub fn from_json(text: &str) -> Result<Self, GraphError> {
		Ok(serde_json::from_str(text)?)
	}
}

impl RawNode {
	pub(crate) fn display_name(&self) -> &str {
		self.name.as_deref().unwrap_or(&self.id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn missing_optional_fields_default() {
		let doc = GraphDocument::from_json(
			r#"{"nodes":[{"id":"a"}],"edges":[{"source":"a","target":"b"}]}"#,
		)
		.unwrap();
		assert_eq!(doc.nodes[0].scope, Vec::<String>::new());
		assert_eq!(doc.nodes[0].display_name(), "a");
		assert_eq!(doc.edges[0].relation, "");
	}

	#[test]
	fn type_field_and_inline_sections_decode() {
		let doc = GraphDocument::from_json(
			r#"{"nodes":[{"id":"m","name":"Net","type":"class","extra":1,
				"sections":[{"id":"in","name":"Inputs","subnodes":[{"id":"x","name":"X"}]}]}]}"#,
		)
		.unwrap();
		assert_eq!(doc.nodes[0].node_type.as_deref(), Some("class"));
		assert_eq!(doc.nodes[0].sections[0].subnodes[0].id, "x");
		assert!(doc.edges.is_empty());
	}

	#[test]
	fn malformed_json_is_an_error() {
		let err = GraphDocument::from_json("{\"nodes\": 3}").unwrap_err();
		assert!(err.to_string().starts_with("invalid graph document"));
	}
}
