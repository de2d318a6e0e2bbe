use std::collections::HashMap;

use log::{debug, info, warn};

use super::config::GraphViewConfig;
use super::error::GraphError;
use super::panels::{PanelEffect, id_selector};
#[cfg(test)]
use super::simulation::SimNode;
use super::simulation::{Simulation, SimulationParameters};
use super::types::GraphData;
use super::zoom::ZoomBehavior;

pub type NodeIdx = usize;

/// Presses that travel further than this many screen pixels are drags, not clicks.
const CLICK_DISTANCE: f64 = 3.0;

/// `MouseEvent.button` of the primary button.
const PRIMARY_BUTTON: i16 = 0;

/// Per-node style flags, mirrored onto the circle when drawing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeFlags {
	pub active: bool,
	pub highlight: bool,
	pub active_highlight: bool,
}

/// Everything that can happen to the view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GraphEvent {
	Tick,
	HoverEnter(NodeIdx),
	HoverExit(NodeIdx),
	Click(NodeIdx),
	DragStart(NodeIdx),
	/// Pointer position in graph coordinates.
	DragMove { node: NodeIdx, x: f64, y: f64 },
	DragEnd(NodeIdx),
	PanStart { x: f64, y: f64 },
	PanMove { x: f64, y: f64 },
	PanEnd,
	/// Screen-space wheel zoom anchored at `(x, y)`.
	Wheel { delta_y: f64, delta_mode: u32, x: f64, y: f64 },
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active_drags: usize,
	pub node_idx: Option<NodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	/// Node center minus the grab point, in graph coordinates.
	pub grab_dx: f64,
	pub grab_dy: f64,
	pub moved: bool,
}

pub struct GraphViewState {
	pub config: GraphViewConfig,
	pub ids: Vec<String>,
	pub flags: Vec<NodeFlags>,
	pub simulation: Simulation,
	pub zoom: ZoomBehavior,
	pub drag: DragState,
	pub hovered: Option<NodeIdx>,
	pub width: f64,
	pub height: f64,
}

impl GraphViewState {
	pub fn new(
		data: &GraphData,
		config: GraphViewConfig,
		width: f64,
		height: f64,
	) -> Result<Self, GraphError> {
		let mut id_to_idx = HashMap::new();
		let mut ids = Vec::with_capacity(data.nodes.len());
		for (i, node) in data.nodes.iter().enumerate() {
			if id_to_idx.insert(node.id.clone(), i).is_some() {
				warn!("duplicate node id {:?}, links bind to the last one", node.id);
			}
			ids.push(node.id.clone());
		}

		let edges = data
			.links
			.iter()
			.map(|link| -> Result<(NodeIdx, NodeIdx), GraphError> {
				let find = |id: &String| {
					id_to_idx
						.get(id)
						.copied()
						.ok_or_else(|| GraphError::NodeNotFound(id.clone()))
				};
				Ok((find(&link.source)?, find(&link.target)?))
			})
			.collect::<Result<Vec<_>, GraphError>>()?;

		let params = SimulationParameters::from_config(&config, width, height);
		let simulation = Simulation::new(ids.len(), &edges, params);
		info!("dependency graph: {} nodes, {} links", ids.len(), edges.len());

		Ok(Self {
			flags: vec![NodeFlags::default(); ids.len()],
			ids,
			simulation,
			zoom: ZoomBehavior::new(config.scale_extent),
			config,
			drag: DragState::default(),
			hovered: None,
			width,
			height,
		})
	}

	#[cfg(test)]
	pub fn node(&self, idx: NodeIdx) -> Option<&SimNode> {
		self.simulation.node(idx)
	}

	#[cfg(test)]
	pub fn active_node(&self) -> Option<NodeIdx> {
		self.flags.iter().position(|f| f.active)
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		self.zoom.transform.invert(sx, sy)
	}

	/// Topmost node under a screen position.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<NodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		// hit radius is fixed in screen pixels but never smaller than the circle
		let r = (self.config.hit_radius / self.zoom.transform.k).max(self.config.node_radius);
		self.simulation
			.nodes()
			.iter()
			.enumerate()
			.rev()
			.find(|(_, n)| (n.x - gx).powi(2) + (n.y - gy).powi(2) < r * r)
			.map(|(i, _)| i)
	}

	/// Applies one event and returns the panel changes it causes.
	pub fn handle(&mut self, event: GraphEvent) -> Vec<PanelEffect> {
		match event {
			GraphEvent::Tick => {
				self.simulation.step();
			}
			GraphEvent::HoverEnter(idx) => {
				if let Some(f) = self.flags.get_mut(idx) {
					if f.active {
						f.active_highlight = true;
					} else {
						f.highlight = true;
					}
				}
			}
			GraphEvent::HoverExit(idx) => {
				if let Some(f) = self.flags.get_mut(idx) {
					f.highlight = false;
					f.active_highlight = false;
				}
			}
			GraphEvent::Click(idx) => return self.select(idx),
			GraphEvent::DragStart(idx) => self.drag_start(idx),
			GraphEvent::DragMove { node, x, y } => {
				if let Some(n) = self.simulation.node_mut(node) {
					n.fx = Some(x);
					n.fy = Some(y);
				}
			}
			GraphEvent::DragEnd(idx) => self.drag_end(idx),
			GraphEvent::PanStart { x, y } => self.zoom.pan_start(x, y),
			GraphEvent::PanMove { x, y } => self.zoom.pan_move(x, y),
			GraphEvent::PanEnd => self.zoom.pan_end(),
			GraphEvent::Wheel {
				delta_y,
				delta_mode,
				x,
				y,
			} => self.zoom.wheel(delta_y, delta_mode, x, y),
		}
		Vec::new()
	}

	fn select(&mut self, idx: NodeIdx) -> Vec<PanelEffect> {
		let Some(id) = self.ids.get(idx) else {
			return Vec::new();
		};
		debug!("selected {id}");
		for f in &mut self.flags {
			*f = NodeFlags::default();
		}
		self.flags[idx] = NodeFlags {
			active: true,
			highlight: false,
			active_highlight: true,
		};
		vec![
			PanelEffect::HideAll(self.config.panel_selector.clone()),
			PanelEffect::Show(id_selector(id)),
		]
	}

	fn drag_start(&mut self, idx: NodeIdx) {
		if self.simulation.node(idx).is_none() {
			return;
		}
		if self.drag.active_drags == 0 {
			self.simulation.set_alpha_target(self.config.drag_alpha_target);
			self.simulation.restart();
		}
		self.drag.active_drags += 1;
		if let Some(n) = self.simulation.node_mut(idx) {
			n.fx = Some(n.x);
			n.fy = Some(n.y);
		}
	}

	fn drag_end(&mut self, idx: NodeIdx) {
		let Some(n) = self.simulation.node_mut(idx) else {
			return;
		};
		// leave the node where it was last held
		if let (Some(fx), Some(fy)) = (n.fx.take(), n.fy.take()) {
			n.x = fx;
			n.y = fy;
		}
		self.drag.active_drags = self.drag.active_drags.saturating_sub(1);
		if self.drag.active_drags == 0 {
			self.simulation.set_alpha_target(0.0);
		}
	}

	/// Moves the hover to `node`, emitting exit/enter for the change.
	pub fn set_hover(&mut self, node: Option<NodeIdx>) {
		if self.hovered == node {
			return;
		}
		if let Some(prev) = self.hovered.take() {
			self.handle(GraphEvent::HoverExit(prev));
		}
		if let Some(idx) = node {
			self.handle(GraphEvent::HoverEnter(idx));
		}
		self.hovered = node;
	}

	/// Starts a drag on the node under the pointer, or a pan elsewhere.
	/// Only the primary button starts a gesture.
	pub fn pointer_down(&mut self, sx: f64, sy: f64, button: i16) {
		if button != PRIMARY_BUTTON {
			return;
		}
		match self.node_at_position(sx, sy) {
			Some(idx) => {
				let (gx, gy) = self.screen_to_graph(sx, sy);
				let (nx, ny) = self
					.simulation
					.node(idx)
					.map_or((gx, gy), |n| (n.x, n.y));
				self.drag = DragState {
					active_drags: self.drag.active_drags,
					node_idx: Some(idx),
					start_x: sx,
					start_y: sy,
					grab_dx: nx - gx,
					grab_dy: ny - gy,
					moved: false,
				};
				self.handle(GraphEvent::DragStart(idx));
			}
			None => {
				self.handle(GraphEvent::PanStart { x: sx, y: sy });
			}
		}
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if let Some(idx) = self.drag.node_idx {
			let (dx, dy) = (sx - self.drag.start_x, sy - self.drag.start_y);
			if (dx * dx + dy * dy).sqrt() > CLICK_DISTANCE {
				self.drag.moved = true;
			}
			let (gx, gy) = self.screen_to_graph(sx, sy);
			self.handle(GraphEvent::DragMove {
				node: idx,
				x: gx + self.drag.grab_dx,
				y: gy + self.drag.grab_dy,
			});
		} else if self.zoom.pan.active {
			self.handle(GraphEvent::PanMove { x: sx, y: sy });
		} else {
			let hovered = self.node_at_position(sx, sy);
			self.set_hover(hovered);
		}
	}

	/// Ends the current gesture. A press that did not travel is a click.
	pub fn pointer_up(&mut self) -> Vec<PanelEffect> {
		let mut effects = Vec::new();
		if let Some(idx) = self.drag.node_idx.take() {
			self.handle(GraphEvent::DragEnd(idx));
			if !self.drag.moved {
				effects = self.handle(GraphEvent::Click(idx));
			}
		}
		self.handle(GraphEvent::PanEnd);
		effects
	}

	pub fn pointer_leave(&mut self) {
		if let Some(idx) = self.drag.node_idx.take() {
			self.handle(GraphEvent::DragEnd(idx));
		}
		self.handle(GraphEvent::PanEnd);
		self.set_hover(None);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.simulation
			.set_center(self.config.center_for(width, height));
	}
}
