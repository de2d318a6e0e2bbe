//! Drawable description of the graph.
//!
//! A [`Scene`] is built once from the view state, then [`Scene::sync`] copies
//! node coordinates, style flags and the zoom transform into it after every
//! state change. Painting only ever reads the scene.

use super::state::{GraphViewState, NodeFlags};
use super::zoom::ViewTransform;

/// Arrowhead drawn at the end of every edge, in stroke-width units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrowMarker {
	pub ref_x: f64,
	pub ref_y: f64,
	pub path: [(f64, f64); 4],
}

pub const ARROW: ArrowMarker = ArrowMarker {
	ref_x: 6.0,
	ref_y: 3.0,
	path: [(0.0, 0.0), (6.0, 3.0), (0.0, 6.0), (1.5, 3.0)],
};

impl ArrowMarker {
	/// Marker outline placed on the end of `line`, oriented along it.
	pub fn place(&self, line: &LineShape, stroke_width: f64) -> Option<[(f64, f64); 4]> {
		let (dx, dy) = (line.x2 - line.x1, line.y2 - line.y1);
		let len = (dx * dx + dy * dy).sqrt();
		if len < 1e-9 {
			return None;
		}
		let (ux, uy) = (dx / len, dy / len);
		let (nx, ny) = (-uy, ux);
		Some(self.path.map(|(px, py)| {
			let along = (px - self.ref_x) * stroke_width;
			let across = (py - self.ref_y) * stroke_width;
			(
				line.x2 + ux * along + nx * across,
				line.y2 + uy * along + ny * across,
			)
		}))
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LineShape {
	pub source: usize,
	pub target: usize,
	pub x1: f64,
	pub y1: f64,
	pub x2: f64,
	pub y2: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CircleShape {
	pub cx: f64,
	pub cy: f64,
	pub r: f64,
	pub flags: NodeFlags,
}

/// Hidden label carrying a node id, shown while the node is hovered.
#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
	pub text: String,
	pub visible: bool,
}

#[derive(Clone, Debug)]
pub struct Scene {
	pub transform: ViewTransform,
	pub marker: ArrowMarker,
	pub link_width: f64,
	pub lines: Vec<LineShape>,
	pub circles: Vec<CircleShape>,
	pub tooltips: Vec<Tooltip>,
	pub width: f64,
	pub height: f64,
}

impl Scene {
	pub fn new(state: &GraphViewState) -> Self {
		let lines = state
			.simulation
			.link_endpoints()
			.map(|(source, target)| LineShape {
				source,
				target,
				..LineShape::default()
			})
			.collect();
		let circles = state
			.ids
			.iter()
			.map(|_| CircleShape {
				r: state.config.node_radius,
				..CircleShape::default()
			})
			.collect();
		let tooltips = state
			.ids
			.iter()
			.map(|id| Tooltip {
				text: id.clone(),
				visible: false,
			})
			.collect();

		let mut scene = Self {
			transform: state.zoom.transform,
			marker: ARROW,
			link_width: state.config.link_width,
			lines,
			circles,
			tooltips,
			width: state.width,
			height: state.height,
		};
		scene.sync(state);
		scene
	}

	pub fn sync(&mut self, state: &GraphViewState) {
		let nodes = state.simulation.nodes();
		for line in &mut self.lines {
			let (s, t) = (&nodes[line.source], &nodes[line.target]);
			line.x1 = s.x;
			line.y1 = s.y;
			line.x2 = t.x;
			line.y2 = t.y;
		}
		for ((circle, node), flags) in self.circles.iter_mut().zip(nodes).zip(&state.flags) {
			circle.cx = node.x;
			circle.cy = node.y;
			circle.flags = *flags;
		}
		for (i, tip) in self.tooltips.iter_mut().enumerate() {
			tip.visible = state.hovered == Some(i);
		}
		self.transform = state.zoom.transform;
		self.width = state.width;
		self.height = state.height;
	}

	pub fn visible_tooltip(&self) -> Option<&str> {
		self.tooltips
			.iter()
			.find(|t| t.visible)
			.map(|t| t.text.as_str())
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::components::dep_graph::config::GraphViewConfig;
	use crate::components::dep_graph::state::GraphEvent;
	use crate::components::dep_graph::types::GraphData;

	fn two_nodes() -> GraphViewState {
		let data = GraphData::from_json(
			r#"{"nodes":[{"id":"A"},{"id":"B"}],"links":[{"source":"A","target":"B"}]}"#,
		)
		.unwrap();
		GraphViewState::new(&data, GraphViewConfig::default(), 200.0, 200.0).unwrap()
	}

	#[test]
	fn one_shape_per_link_and_node() {
		let scene = Scene::new(&two_nodes());
		assert_eq!(scene.lines.len(), 1);
		assert_eq!(scene.circles.len(), 2);
		assert!(scene.circles.iter().all(|c| c.r == 1.5));
		let titles: Vec<_> = scene.tooltips.iter().map(|t| t.text.as_str()).collect();
		assert_eq!(titles, vec!["A", "B"]);
		assert_eq!(scene.visible_tooltip(), None);
	}

	#[test]
	fn sync_projects_node_positions() {
		let mut state = two_nodes();
		let mut scene = Scene::new(&state);
		for (idx, (x, y)) in [(10.0, 20.0), (30.0, 40.0)].into_iter().enumerate() {
			let n = state.simulation.node_mut(idx).unwrap();
			n.fx = Some(x);
			n.fy = Some(y);
		}
		state.handle(GraphEvent::Tick);
		scene.sync(&state);

		assert_eq!(
			scene.lines[0],
			LineShape {
				source: 0,
				target: 1,
				x1: 10.0,
				y1: 20.0,
				x2: 30.0,
				y2: 40.0,
			}
		);
		assert_eq!((scene.circles[0].cx, scene.circles[0].cy), (10.0, 20.0));
		assert_eq!((scene.circles[1].cx, scene.circles[1].cy), (30.0, 40.0));
	}

	#[test]
	fn sync_carries_flags_tooltip_and_zoom() {
		let mut state = two_nodes();
		let mut scene = Scene::new(&state);
		state.handle(GraphEvent::Click(1));
		state.set_hover(Some(0));
		state.handle(GraphEvent::Wheel {
			delta_y: -500.0,
			delta_mode: 0,
			x: 0.0,
			y: 0.0,
		});
		scene.sync(&state);

		assert!(scene.circles[1].flags.active);
		assert!(scene.circles[0].flags.highlight);
		assert_eq!(scene.visible_tooltip(), Some("A"));
		assert_eq!(scene.transform.k, 2.0);
	}

	#[test]
	fn arrow_tip_sits_on_line_end() {
		let line = LineShape {
			x2: 10.0,
			..LineShape::default()
		};
		let points = ARROW.place(&line, 1.0).unwrap();
		assert_eq!(points[1], (10.0, 0.0));
		assert_eq!(points[0], (4.0, -3.0));
		assert_eq!(points[2], (4.0, 3.0));
		assert_eq!(points[3], (5.5, 0.0));
	}

	#[test]
	fn arrow_scales_with_stroke_and_skips_degenerate_lines() {
		let line = LineShape {
			y2: 10.0,
			..LineShape::default()
		};
		let points = ARROW.place(&line, 0.5).unwrap();
		assert_eq!(points[1], (0.0, 10.0));
		assert_eq!(points[3], (0.0, 7.75));
		assert!(ARROW.place(&LineShape::default(), 1.0).is_none());
	}
}
