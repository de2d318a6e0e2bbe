/// Screen-space translate + uniform scale applied to the whole scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl ViewTransform {
	pub const IDENTITY: Self = Self {
		x: 0.0,
		y: 0.0,
		k: 1.0,
	};

	#[cfg(test)]
	pub fn apply(&self, gx: f64, gy: f64) -> (f64, f64) {
		(gx * self.k + self.x, gy * self.k + self.y)
	}

	pub fn invert(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Pan and wheel-zoom gestures with a bounded scale.
#[derive(Clone, Debug)]
pub struct ZoomBehavior {
	pub transform: ViewTransform,
	pub pan: PanState,
	scale_extent: (f64, f64),
}

impl ZoomBehavior {
	pub fn new(scale_extent: (f64, f64)) -> Self {
		Self {
			transform: ViewTransform::IDENTITY,
			pan: PanState::default(),
			scale_extent,
		}
	}

	/// Multiplies the scale by `factor`, keeping the graph point under
	/// `(sx, sy)` in place.
	pub fn scale_by(&mut self, factor: f64, sx: f64, sy: f64) {
		let (min, max) = self.scale_extent;
		let t = &mut self.transform;
		let new_k = (t.k * factor).clamp(min, max);
		let ratio = new_k / t.k;
		t.x = sx - (sx - t.x) * ratio;
		t.y = sy - (sy - t.y) * ratio;
		t.k = new_k;
	}

	/// Zooms for a wheel event. Line and page delta modes count as 120px.
	pub fn wheel(&mut self, delta_y: f64, delta_mode: u32, sx: f64, sy: f64) {
		self.scale_by(wheel_factor(delta_y, delta_mode), sx, sy);
	}

	pub fn pan_start(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	pub fn pan_move(&mut self, sx: f64, sy: f64) {
		if !self.pan.active {
			return;
		}
		self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
		self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
	}

	pub fn pan_end(&mut self) {
		self.pan.active = false;
	}
}

pub fn wheel_factor(delta_y: f64, delta_mode: u32) -> f64 {
	let unit = if delta_mode == 0 { 1.0 } else { 120.0 };
	2f64.powf(-delta_y * unit / 500.0)
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn zoom() -> ZoomBehavior {
		ZoomBehavior::new((1.0 / 8.0, 8.0))
	}

	#[test]
	fn invert_undoes_apply() {
		let t = ViewTransform {
			x: 40.0,
			y: -12.0,
			k: 2.5,
		};
		let (sx, sy) = t.apply(3.0, 7.0);
		assert_eq!((sx, sy), (47.5, 5.5));
		assert_eq!(t.invert(sx, sy), (3.0, 7.0));
	}

	#[test]
	fn scale_is_clamped_both_ways() {
		let mut z = zoom();
		for _ in 0..50 {
			z.wheel(-10_000.0, 0, 100.0, 100.0);
			assert!(z.transform.k <= 8.0);
		}
		assert_eq!(z.transform.k, 8.0);
		for _ in 0..50 {
			z.wheel(10_000.0, 1, 100.0, 100.0);
			assert!(z.transform.k >= 1.0 / 8.0);
		}
		assert_eq!(z.transform.k, 1.0 / 8.0);
	}

	#[test]
	fn zoom_keeps_pointer_anchored() {
		let mut z = zoom();
		let before = z.transform.invert(200.0, 150.0);
		z.scale_by(2.0, 200.0, 150.0);
		let after = z.transform.invert(200.0, 150.0);
		assert!((before.0 - after.0).abs() < 1e-9);
		assert!((before.1 - after.1).abs() < 1e-9);
		assert_eq!(z.transform.k, 2.0);
	}

	#[test]
	fn wheel_factor_matches_delta_modes() {
		assert_eq!(wheel_factor(0.0, 0), 1.0);
		assert_eq!(wheel_factor(-500.0, 0), 2.0);
		assert_eq!(wheel_factor(12.5, 1), 0.125);
	}

	#[test]
	fn pan_translates_without_scaling() {
		let mut z = zoom();
		z.scale_by(2.0, 0.0, 0.0);
		z.pan_start(10.0, 10.0);
		z.pan_move(25.0, 5.0);
		assert_eq!(
			z.transform,
			ViewTransform {
				x: 15.0,
				y: -5.0,
				k: 2.0
			}
		);
		z.pan_end();
		z.pan_move(100.0, 100.0);
		assert_eq!(z.transform.x, 15.0);
	}
}
