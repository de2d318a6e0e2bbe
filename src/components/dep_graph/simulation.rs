//! Velocity-Verlet force simulation.
//!
//! Nodes carry a position and a velocity. Every tick the forces nudge
//! velocities, scaled by `alpha`, and velocities are then damped and applied.
//! `alpha` eases toward `alpha_target`; once it falls below `alpha_min` the
//! simulation stops stepping until [`Simulation::restart`] is called.

use std::f64::consts::PI;

use super::config::GraphViewConfig;

const INITIAL_RADIUS: f64 = 10.0;
const DISTANCE_MIN2: f64 = 1.0;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimNode {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	/// Pinned x coordinate, overrides forces while set.
	pub fx: Option<f64>,
	/// Pinned y coordinate, overrides forces while set.
	pub fy: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationParameters {
	pub link_distance: f64,
	pub charge_strength: f64,
	pub center: (f64, f64),
	pub alpha_min: f64,
	pub alpha_decay: f64,
	pub velocity_decay: f64,
}

impl Default for SimulationParameters {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			link_distance: 30.0,
			charge_strength: -30.0,
			center: (0.0, 0.0),
			alpha_min,
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			velocity_decay: 0.4,
		}
	}
}

impl SimulationParameters {
	pub fn from_config(config: &GraphViewConfig, width: f64, height: f64) -> Self {
		Self {
			link_distance: config.link_distance,
			charge_strength: config.charge_strength,
			center: config.center_for(width, height),
			..Self::default()
		}
	}
}

#[derive(Clone, Debug)]
struct SimLink {
	source: usize,
	target: usize,
	strength: f64,
	bias: f64,
}

/// Linear congruential generator used to break ties between coincident nodes.
#[derive(Clone, Debug)]
struct Lcg(u64);

impl Lcg {
	const A: u64 = 1_664_525;
	const C: u64 = 1_013_904_223;
	const M: u64 = 1 << 32;

	fn next(&mut self) -> f64 {
		self.0 = (Self::A * self.0 + Self::C) % Self::M;
		self.0 as f64 / Self::M as f64
	}

	fn jiggle(&mut self) -> f64 {
		(self.next() - 0.5) * 1e-6
	}
}

#[derive(Clone, Debug)]
pub struct Simulation {
	nodes: Vec<SimNode>,
	links: Vec<SimLink>,
	params: SimulationParameters,
	alpha: f64,
	alpha_target: f64,
	stepping: bool,
	rng: Lcg,
}

impl Simulation {
	/// Builds a simulation over `node_count` nodes joined by `(source, target)`
	/// index pairs. Nodes start on a phyllotaxis spiral around the origin.
	pub fn new(node_count: usize, edges: &[(usize, usize)], params: SimulationParameters) -> Self {
		let angle_step = PI * (3.0 - 5f64.sqrt());
		let nodes = (0..node_count)
			.map(|i| {
				let radius = INITIAL_RADIUS * (i as f64).sqrt();
				let angle = i as f64 * angle_step;
				SimNode {
					x: radius * angle.cos(),
					y: radius * angle.sin(),
					..SimNode::default()
				}
			})
			.collect();

		let mut degree = vec![0usize; node_count];
		for &(src, tgt) in edges {
			degree[src] += 1;
			degree[tgt] += 1;
		}
		let links = edges
			.iter()
			.map(|&(source, target)| {
				let (ds, dt) = (degree[source] as f64, degree[target] as f64);
				SimLink {
					source,
					target,
					strength: 1.0 / ds.min(dt),
					bias: ds / (ds + dt),
				}
			})
			.collect();

		Self {
			nodes,
			links,
			params,
			alpha: 1.0,
			alpha_target: 0.0,
			stepping: true,
			rng: Lcg(1),
		}
	}

	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	pub fn node(&self, idx: usize) -> Option<&SimNode> {
		self.nodes.get(idx)
	}

	pub fn node_mut(&mut self, idx: usize) -> Option<&mut SimNode> {
		self.nodes.get_mut(idx)
	}

	pub fn link_endpoints(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
		self.links.iter().map(|l| (l.source, l.target))
	}

	#[cfg(test)]
	pub fn params(&self) -> &SimulationParameters {
		&self.params
	}

	/// Moves the point the centering force pulls toward.
	pub fn set_center(&mut self, center: (f64, f64)) {
		self.params.center = center;
	}

	#[cfg(test)]
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	#[cfg(test)]
	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	pub fn restart(&mut self) {
		self.stepping = true;
	}

	#[cfg(test)]
	pub fn stop(&mut self) {
		self.stepping = false;
	}

	#[cfg(test)]
	pub fn is_running(&self) -> bool {
		self.stepping
	}

	/// Advances one frame if running. Returns whether a tick happened.
	pub fn step(&mut self) -> bool {
		if !self.stepping {
			return false;
		}
		self.tick();
		if self.alpha < self.params.alpha_min {
			self.stepping = false;
		}
		true
	}

	/// Runs a single integration step regardless of the running state.
	pub fn tick(&mut self) {
		self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;
		let alpha = self.alpha;

		self.apply_links(alpha);
		self.apply_charge(alpha);
		self.apply_center();

		let damping = 1.0 - self.params.velocity_decay;
		for node in &mut self.nodes {
			match node.fx {
				Some(fx) => {
					node.x = fx;
					node.vx = 0.0;
				}
				None => {
					node.vx *= damping;
					node.x += node.vx;
				}
			}
			match node.fy {
				Some(fy) => {
					node.y = fy;
					node.vy = 0.0;
				}
				None => {
					node.vy *= damping;
					node.y += node.vy;
				}
			}
		}
	}

	fn apply_links(&mut self, alpha: f64) {
		let distance = self.params.link_distance;
		for link in &self.links {
			let (s, t) = (&self.nodes[link.source], &self.nodes[link.target]);
			let mut x = t.x + t.vx - s.x - s.vx;
			let mut y = t.y + t.vy - s.y - s.vy;
			if x == 0.0 {
				x = self.rng.jiggle();
			}
			if y == 0.0 {
				y = self.rng.jiggle();
			}
			let len = (x * x + y * y).sqrt();
			let l = (len - distance) / len * alpha * link.strength;
			let (x, y) = (x * l, y * l);

			let target = &mut self.nodes[link.target];
			target.vx -= x * link.bias;
			target.vy -= y * link.bias;
			let source = &mut self.nodes[link.source];
			source.vx += x * (1.0 - link.bias);
			source.vy += y * (1.0 - link.bias);
		}
	}

	fn apply_charge(&mut self, alpha: f64) {
		let strength = self.params.charge_strength;
		let positions: Vec<(f64, f64)> = self.nodes.iter().map(|n| (n.x, n.y)).collect();
		for (i, node) in self.nodes.iter_mut().enumerate() {
			for (j, &(ox, oy)) in positions.iter().enumerate() {
				if i == j {
					continue;
				}
				let mut x = ox - node.x;
				let mut y = oy - node.y;
				let mut l = x * x + y * y;
				if x == 0.0 {
					x = self.rng.jiggle();
					l += x * x;
				}
				if y == 0.0 {
					y = self.rng.jiggle();
					l += y * y;
				}
				if l < DISTANCE_MIN2 {
					l = (DISTANCE_MIN2 * l).sqrt();
				}
				node.vx += x * strength * alpha / l;
				node.vy += y * strength * alpha / l;
			}
		}
	}

	fn apply_center(&mut self) {
		if self.nodes.is_empty() {
			return;
		}
		let n = self.nodes.len() as f64;
		let (cx, cy) = self.params.center;
		let (sx, sy) = self
			.nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		let (sx, sy) = (sx / n - cx, sy / n - cy);
		for node in &mut self.nodes {
			node.x -= sx;
			node.y -= sy;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn params() -> SimulationParameters {
		SimulationParameters {
			charge_strength: -50.0,
			center: (50.0, 50.0),
			..SimulationParameters::default()
		}
	}

	fn distance(a: &SimNode, b: &SimNode) -> f64 {
		((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
	}

	#[test]
	fn initial_layout_is_a_spiral() {
		let sim = Simulation::new(3, &[], params());
		assert_eq!((sim.nodes()[0].x, sim.nodes()[0].y), (0.0, 0.0));
		let r1 = (sim.nodes()[1].x.powi(2) + sim.nodes()[1].y.powi(2)).sqrt();
		let r2 = (sim.nodes()[2].x.powi(2) + sim.nodes()[2].y.powi(2)).sqrt();
		assert!((r1 - 10.0).abs() < 1e-9);
		assert!((r2 - 10.0 * 2f64.sqrt()).abs() < 1e-9);
	}

	#[test]
	fn alpha_decays_until_stopped() {
		let mut sim = Simulation::new(2, &[(0, 1)], params());
		let mut ticks = 0;
		while sim.step() {
			ticks += 1;
			assert!(ticks < 1000, "simulation never settled");
		}
		assert!(!sim.is_running());
		assert!(sim.alpha() < sim.params().alpha_min);
		// alpha_decay is chosen so that decay takes about 300 ticks
		assert!((290..=310).contains(&ticks), "took {ticks} ticks");
	}

	#[test]
	fn stopped_simulation_does_not_move() {
		let mut sim = Simulation::new(2, &[(0, 1)], params());
		sim.stop();
		let before = sim.nodes().to_vec();
		assert!(!sim.step());
		assert_eq!(sim.nodes(), before.as_slice());
	}

	#[test]
	fn alpha_target_keeps_simulation_warm() {
		let mut sim = Simulation::new(2, &[(0, 1)], params());
		sim.set_alpha_target(0.3);
		for _ in 0..2000 {
			assert!(sim.step());
		}
		assert!((sim.alpha() - 0.3).abs() < 1e-3);
	}

	#[test]
	fn linked_nodes_settle_near_link_distance() {
		let mut sim = Simulation::new(2, &[(0, 1)], params());
		while sim.step() {}
		let d = distance(&sim.nodes()[0], &sim.nodes()[1]);
		// charge pushes the pair slightly past the rest length
		assert!(d > 25.0 && d < 60.0, "distance {d}");
	}

	#[test]
	fn unlinked_nodes_repel() {
		let mut sim = Simulation::new(2, &[], params());
		let start = distance(&sim.nodes()[0], &sim.nodes()[1]);
		for _ in 0..50 {
			sim.tick();
		}
		assert!(distance(&sim.nodes()[0], &sim.nodes()[1]) > start);
	}

	#[test]
	fn centering_keeps_mean_on_center() {
		let mut sim = Simulation::new(5, &[(0, 1), (1, 2), (2, 3), (3, 4)], params());
		while sim.step() {}
		// centering runs before integration, so the mean is off by the last
		// tick's mean velocity at most
		let n = sim.nodes().len() as f64;
		let mx = sim.nodes().iter().map(|n| n.x).sum::<f64>() / n;
		let my = sim.nodes().iter().map(|n| n.y).sum::<f64>() / n;
		assert!((mx - 50.0).abs() < 1.0 && (my - 50.0).abs() < 1.0);
	}

	#[test]
	fn pinned_node_stays_put() {
		let mut sim = Simulation::new(3, &[(0, 1), (1, 2)], params());
		let node = sim.node_mut(1).unwrap();
		node.fx = Some(123.0);
		node.fy = Some(-7.0);
		for _ in 0..30 {
			sim.tick();
			let pinned = sim.node(1).unwrap();
			assert_eq!((pinned.x, pinned.y), (123.0, -7.0));
			assert_eq!((pinned.vx, pinned.vy), (0.0, 0.0));
		}
	}

	#[test]
	fn coincident_nodes_separate() {
		let mut sim = Simulation::new(2, &[], params());
		for node in 0..2 {
			let n = sim.node_mut(node).unwrap();
			n.x = 5.0;
			n.y = 5.0;
		}
		sim.tick();
		let (a, b) = (&sim.nodes()[0], &sim.nodes()[1]);
		assert!(a.x != b.x || a.y != b.y);
		assert!(a.x.is_finite() && a.y.is_finite());
	}
}
