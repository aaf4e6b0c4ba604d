//! Stamps parent back-references onto the draft forest.

use super::parser::DraftForest;

/// Walks every root and records, for each node below it, the owning node and
/// (for section members) the owning section.
///
/// The input must be a forest; cycles are not reachable from roots because a
/// root by definition has no parent.
pub(crate) fn annotate_hierarchy(forest: &mut DraftForest, roots: &[String]) {
	for root in roots {
		annotate(forest, root, None, None);
	}
}

fn annotate(
	forest: &mut DraftForest,
	id: &str,
	parent_node_id: Option<&str>,
	parent_section_id: Option<&str>,
) {
	let Some(node) = forest.nodes.get_mut(id) else {
		return;
	};
	node.parent_node_id = parent_node_id.map(str::to_string);
	node.parent_section_id = parent_section_id.map(str::to_string);

	let mut sections = Vec::with_capacity(node.sections.len());
	for section in &mut node.sections {
		section.parent_node_id = Some(id.to_string());
		sections.push((section.id.clone(), section.members.clone()));
	}
	let subnodes = node.subnodes.clone();

	for (section_id, members) in sections {
		for member in members {
			annotate(forest, &member, Some(id), Some(&section_id));
		}
	}
	for child in subnodes {
		annotate(forest, &child, Some(id), None);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::document::{GraphDocument, RawNode, RawSection};
	use crate::graph::parser::parse;
	use pretty_assertions::assert_eq;

	#[test]
	fn nested_section_members_point_at_owner_and_section() {
		let leaf = RawNode {
			id: "leaf".into(),
			scope: vec!["member".into()],
			..Default::default()
		};
		let owner = RawNode {
			id: "owner".into(),
			sections: vec![RawSection {
				id: "sec".into(),
				name: None,
				subnodes: vec![RawNode {
					id: "member".into(),
					..Default::default()
				}],
			}],
			..Default::default()
		};
		let parsed = parse(&GraphDocument {
			nodes: vec![owner, leaf],
			edges: vec![],
		});

		let member = &parsed.node_map["member"];
		assert_eq!(member.parent_node_id.as_deref(), Some("owner"));
		assert_eq!(member.parent_section_id.as_deref(), Some("sec"));
		let leaf = &parsed.node_map["leaf"];
		assert_eq!(leaf.parent_node_id.as_deref(), Some("member"));
		assert_eq!(leaf.parent_section_id, None);
		assert_eq!(parsed.roots[0].parent_node_id, None);
	}
}
