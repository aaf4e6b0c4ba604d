//! Static lookup tables: node-type colors, section buckets, edge styles.

use std::cmp::Ordering;

/// Fallback fill for node types without an entry.
pub const DEFAULT_NODE_COLOR: &str = "#ccc";

/// Derived stroke for edges touching a section.
pub const SECTION_EDGE_STROKE: &str = "#00c853";
/// Derived stroke for edges touching a nested node.
pub const SUBNODE_EDGE_STROKE: &str = "#ff9800";
/// Stroke when nothing more specific applies.
pub const NEUTRAL_EDGE_STROKE: &str = "#999";
/// Stroke of edges drawn by the user.
pub const USER_EDGE_STROKE: &str = "#5c3cb3";

const BUCKET_PRIORITY: &[&str] = &[
	"Files",
	"Imports",
	"Classes",
	"Methods",
	"Objects",
	"Functions",
	"Variables",
	"Libraries",
];

const SECTION_COLORS: &[(&str, &str)] = &[
	("Functions", "#4caf50"),
	("Variables", "#ff9800"),
	("Classes", "#2196f3"),
	("Methods", "#9c27b0"),
	("Objects", "#f44336"),
	("Libraries", "#607d8b"),
	("Imports", "#00bcd4"),
	("Files", "#795548"),
];

/// Kind of code element a node stands for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeType {
	/// `folder`.
	Folder,
	/// `module`.
	Module,
	/// `file`.
	File,
	/// `class`.
	Class,
	/// `method`.
	Method,
	/// `object`.
	Object,
	/// `function`.
	Function,
	/// `External Function`.
	ExternalFunction,
	/// `variable`.
	Variable,
	/// `Local Library`.
	LocalLibrary,
	/// `External Library`.
	ExternalLibrary,
	/// Any type string the tables do not know.
	Other(String),
}

impl NodeType {
	/// Parses the `type` field of a raw node record.
	pub fn parse(raw: &str) -> Self {
		match raw {
			"folder" => Self::Folder,
			"module" => Self::Module,
			"file" => Self::File,
			"class" => Self::Class,
			"method" => Self::Method,
			"object" => Self::Object,
			"function" => Self::Function,
			"External Function" => Self::ExternalFunction,
			"variable" => Self::Variable,
			"Local Library" => Self::LocalLibrary,
			"External Library" => Self::ExternalLibrary,
			other => Self::Other(other.to_string()),
		}
	}

	/// The `type` string this variant was parsed from.
	pub fn as_str(&self) -> &str {
		match self {
			Self::Folder => "folder",
			Self::Module => "module",
			Self::File => "file",
			Self::Class => "class",
			Self::Method => "method",
			Self::Object => "object",
			Self::Function => "function",
			Self::ExternalFunction => "External Function",
			Self::Variable => "variable",
			Self::LocalLibrary => "Local Library",
			Self::ExternalLibrary => "External Library",
			Self::Other(raw) => raw,
		}
	}

	/// Display fill of nodes of this type.
	pub fn color(&self) -> &'static str {
		match self {
			Self::Folder => "#ffd180",
			Self::File => "#90caf9",
			Self::Class => "#f48fb1",
			Self::Method => "#a5d6a7",
			Self::Object => "#ce93d8",
			Self::Function => "#80cbc4",
			Self::ExternalFunction => "#ffab91",
			Self::Variable => "#ffe082",
			Self::LocalLibrary => "#b39ddb",
			Self::ExternalLibrary => "#c5e1a5",
			Self::Module => "#90a4ae",
			Self::Other(_) => DEFAULT_NODE_COLOR,
		}
	}

	/// Section label before bucket normalization.
	pub fn section_name(&self) -> &str {
		match self {
			Self::Module | Self::Folder | Self::File => "Files",
			Self::Class => "Classes",
			Self::Method => "Methods",
			Self::Object => "Objects",
			Self::Function => "Local Functions",
			Self::ExternalFunction => "External Functions",
			Self::Variable => "Variables",
			Self::LocalLibrary => "Local Libraries",
			Self::ExternalLibrary => "External Libraries",
			Self::Other(raw) if raw.is_empty() => "unknown",
			Self::Other(raw) => raw,
		}
	}

	/// Normalized display bucket, e.g. "Functions" for both local and external functions.
	pub fn bucket(&self) -> &str {
		normalize_bucket(self.section_name())
	}
}

/// Folds the local/external variants into one bucket.
pub fn normalize_bucket(name: &str) -> &str {
	match name {
		"Local Functions" | "External Functions" => "Functions",
		"Local Libraries" | "External Libraries" => "Libraries",
		other => other,
	}
}

/// Position of a bucket in display order; unknown buckets sort last.
pub fn bucket_priority(bucket: &str) -> usize {
	BUCKET_PRIORITY
		.iter()
		.position(|b| *b == bucket)
		.unwrap_or(usize::MAX)
}

/// Orders two (type, name) pairs by bucket priority, then by name ignoring
/// case, then by name.
pub fn display_order(a: (&NodeType, &str), b: (&NodeType, &str)) -> Ordering {
	bucket_priority(a.0.bucket())
		.cmp(&bucket_priority(b.0.bucket()))
		.then_with(|| a.1.to_lowercase().cmp(&b.1.to_lowercase()))
		.then_with(|| a.1.cmp(b.1))
}

/// Color of a section header, looked up by its normalized name.
pub fn section_color(name: &str) -> Option<&'static str> {
	let normalized = normalize_bucket(name);
	SECTION_COLORS
		.iter()
		.find(|(bucket, _)| *bucket == normalized)
		.map(|(_, color)| *color)
}

/// Styling of a relation label and, optionally, its line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationStyle {
	/// Label pill background.
	pub label_bg: &'static str,
	/// Label pill border.
	pub label_border: &'static str,
	/// Label text color.
	pub label_color: &'static str,
	/// `None` lets the resolver derive the stroke from endpoint kinds.
	pub stroke: Option<&'static str>,
}

const DEFAULT_RELATION_STYLE: RelationStyle = RelationStyle {
	label_bg: "rgba(255, 182, 193, 0.15)",
	label_border: "rgba(255, 182, 193, 0.4)",
	label_color: "white",
	stroke: None,
};

/// Style for a relation label; unknown relations get the neutral style.
///
/// `contains` and `uses` never reach this table, the parser keeps them out of
/// the relationship list.
pub fn relation_style(relation: &str) -> RelationStyle {
	match relation {
		"imports" => RelationStyle {
			label_bg: "rgba(255, 182, 193, 0.15)",
			label_border: "rgba(255, 182, 193, 0.4)",
			label_color: "white",
			stroke: Some("blue"),
		},
		_ => DEFAULT_RELATION_STYLE,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn type_strings_survive_parsing() {
		for raw in ["file", "External Function", "Local Library", "widget"] {
			assert_eq!(NodeType::parse(raw).as_str(), raw);
		}
	}

	#[test]
	fn local_and_external_share_a_bucket() {
		assert_eq!(NodeType::Function.bucket(), "Functions");
		assert_eq!(NodeType::ExternalFunction.bucket(), "Functions");
		assert_eq!(NodeType::ExternalLibrary.bucket(), "Libraries");
		assert_eq!(NodeType::Other(String::new()).bucket(), "unknown");
	}

	#[test]
	fn display_order_puts_files_before_functions_and_unknown_last() {
		let file = NodeType::File;
		let func = NodeType::Function;
		let odd = NodeType::Other("gizmo".into());
		assert_eq!(display_order((&file, "z"), (&func, "a")), Ordering::Less);
		assert_eq!(display_order((&odd, "a"), (&func, "z")), Ordering::Greater);
		assert_eq!(display_order((&func, "a"), (&func, "b")), Ordering::Less);
	}

	#[test]
	fn display_order_ignores_case_within_a_bucket() {
		let func = NodeType::Function;
		let mut names = vec!["Zeta", "alpha", "Beta"];
		names.sort_by(|a, b| display_order((&func, *a), (&func, *b)));
		assert_eq!(names, vec!["alpha", "Beta", "Zeta"]);
		assert_eq!(display_order((&func, "A"), (&func, "a")), Ordering::Less);
	}

	#[test]
	fn unknown_relation_has_no_stroke_override() {
		assert_eq!(relation_style("calls").stroke, None);
		assert_eq!(relation_style("imports").stroke, Some("blue"));
		assert_eq!(relation_style("contains"), DEFAULT_RELATION_STYLE);
		assert_eq!(section_color("External Functions"), Some("#4caf50"));
	}
}
