use serde::{Deserialize, Serialize};

/// Tunables for a dependency graph view.
///
/// Everything has a default, so a host only overrides what it cares about,
/// either in code or from a JSON object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphViewConfig {
	/// Page title shown above the graph.
	pub title: String,
	/// Circle radius in graph units.
	pub node_radius: f64,
	/// Pointer hit radius in screen pixels.
	pub hit_radius: f64,
	/// Stroke width of edges in graph units.
	pub link_width: f64,
	/// Rest length of the link force.
	pub link_distance: f64,
	/// Many-body strength, negative values repel.
	pub charge_strength: f64,
	/// Point the centering force pulls toward; the canvas center when unset.
	pub center: Option<(f64, f64)>,
	/// Alpha target held while at least one node is being dragged.
	pub drag_alpha_target: f64,
	/// Allowed zoom range as `(min, max)`.
	pub scale_extent: (f64, f64),
	/// Selector matching every theorem panel on the page.
	pub panel_selector: String,
	/// Id of the `<script type="application/json">` element holding the graph.
	pub data_element_id: String,
}

impl Default for GraphViewConfig {
	fn default() -> Self {
		Self {
			title: "Dependencies".into(),
			node_radius: 1.5,
			hit_radius: 6.0,
			link_width: 0.3,
			link_distance: 30.0,
			charge_strength: -50.0,
			center: None,
			drag_alpha_target: 0.3,
			scale_extent: (1.0 / 8.0, 8.0),
			panel_selector: ".thm".into(),
			data_element_id: "dep-graph-data".into(),
		}
	}
}

impl GraphViewConfig {
	pub fn center_for(&self, width: f64, height: f64) -> (f64, f64) {
		self.center.unwrap_or((width / 2.0, height / 2.0))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_json_keeps_defaults() {
		let config: GraphViewConfig =
			serde_json::from_str(r#"{"charge_strength": -80.0, "center": [50.0, 50.0]}"#).unwrap();
		assert_eq!(config.charge_strength, -80.0);
		assert_eq!(config.center_for(800.0, 600.0), (50.0, 50.0));
		assert_eq!(config.node_radius, 1.5);
		assert_eq!(config.panel_selector, ".thm");
	}

	#[test]
	fn center_defaults_to_canvas_middle() {
		let config = GraphViewConfig::default();
		assert_eq!(config.center_for(800.0, 600.0), (400.0, 300.0));
	}
}
