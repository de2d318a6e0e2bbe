use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::error::GraphError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
	pub id: String,
}

impl GraphNode {
	#[cfg(test)]
	pub fn new(id: impl Into<String>) -> Self {
		Self { id: id.into() }
	}
}

/// A directed dependency edge, `source` is used by `target`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphLink {
	pub source: String,
	pub target: String,
}

impl GraphLink {
	#[cfg(test)]
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphData {
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	#[serde(default)]
	pub links: Vec<GraphLink>,
}

impl GraphData {
	pub fn from_json(json: &str) -> Result<Self, GraphError> {
		Ok(serde_json::from_str(json)?)
	}

	/// Fails on the first link endpoint that names no node.
	pub fn validate(&self) -> Result<(), GraphError> {
		let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
		self.links
			.iter()
			.flat_map(|l| [&l.source, &l.target])
			.find(|id| !ids.contains(id.as_str()))
			.map_or(Ok(()), |id| Err(GraphError::NodeNotFound(id.clone())))
	}
}

/// Collects `uses` relations between theorem labels as the document is read.
///
/// Nodes and edges are sets, so repeated declarations collapse, and both are
/// ordered so the produced [`GraphData`] is stable across runs.
#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
	nodes: BTreeSet<String>,
	edges: BTreeSet<(String, String)>,
}

impl DependencyGraph {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records that `node` relies on every label in `used`.
	pub fn uses<I, S>(&mut self, node: &str, used: I) -> &mut Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.nodes.insert(node.to_owned());
		for thm in used {
			let thm = thm.into();
			self.nodes.insert(thm.clone());
			self.edges.insert((thm, node.to_owned()));
		}
		self
	}

	#[cfg(test)]
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	#[cfg(test)]
	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	pub fn into_data(self) -> GraphData {
		GraphData {
			nodes: self.nodes.into_iter().map(|id| GraphNode { id }).collect(),
			links: self
				.edges
				.into_iter()
				.map(|(source, target)| GraphLink { source, target })
				.collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn parses_graph_json() {
		let data = GraphData::from_json(
			r#"{"nodes":[{"id":"A"},{"id":"B"}],"links":[{"source":"A","target":"B"}]}"#,
		)
		.unwrap();
		assert_eq!(data.nodes, vec![GraphNode::new("A"), GraphNode::new("B")]);
		assert_eq!(data.links, vec![GraphLink::new("A", "B")]);
	}

	#[test]
	fn missing_links_default_to_empty() {
		let data = GraphData::from_json(r#"{"nodes":[{"id":"lone"}]}"#).unwrap();
		assert_eq!(data.nodes.len(), 1);
		assert!(data.links.is_empty());
	}

	#[test]
	fn malformed_json_is_an_error() {
		let err = GraphData::from_json(r#"{"nodes":[{"name":"A"}]}"#).unwrap_err();
		assert!(matches!(err, GraphError::Json(_)));
	}

	#[test]
	fn validate_reports_first_dangling_endpoint() {
		let mut data = GraphData {
			nodes: vec![GraphNode::new("A"), GraphNode::new("B")],
			links: vec![GraphLink::new("A", "B")],
		};
		assert!(data.validate().is_ok());
		data.links.push(GraphLink::new("C", "A"));
		data.links.push(GraphLink::new("B", "D"));
		let err = data.validate().unwrap_err();
		assert!(matches!(err, GraphError::NodeNotFound(id) if id == "C"));
	}

	#[test]
	fn uses_points_edges_at_the_user() {
		let mut graph = DependencyGraph::new();
		graph.uses("thm:main", ["lem:a", "lem:b"]);
		graph.uses("lem:b", ["def:x"]);
		let data = graph.into_data();

		let ids: Vec<_> = data.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, vec!["def:x", "lem:a", "lem:b", "thm:main"]);
		assert_eq!(
			data.links,
			vec![
				GraphLink::new("def:x", "lem:b"),
				GraphLink::new("lem:a", "thm:main"),
				GraphLink::new("lem:b", "thm:main"),
			]
		);
	}

	#[test]
	fn repeated_uses_collapse() {
		let mut graph = DependencyGraph::new();
		graph.uses("thm", ["lem"]).uses("thm", ["lem"]);
		assert_eq!(graph.node_count(), 2);
		assert_eq!(graph.edge_count(), 1);
	}
}
