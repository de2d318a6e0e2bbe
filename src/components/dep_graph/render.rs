use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::scene::{CircleShape, Scene};
use super::state::NodeFlags;

const BACKGROUND: &str = "#ffffff";
const LINK_COLOR: &str = "#999999";
const ARROW_COLOR: &str = "black";

fn node_fill(flags: &NodeFlags) -> &'static str {
	match flags {
		NodeFlags {
			active_highlight: true,
			..
		} => "#ff7f0e",
		NodeFlags { active: true, .. } => "#d62728",
		NodeFlags {
			highlight: true, ..
		} => "#1f77b4",
		_ => "#555555",
	}
}

/// Grows hovered and selected circles so they stand out at any zoom.
fn node_radius(circle: &CircleShape) -> f64 {
	let f = &circle.flags;
	if f.highlight || f.active_highlight {
		circle.r * 1.6
	} else if f.active {
		circle.r * 1.3
	} else {
		circle.r
	}
}

pub fn render(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, scene.width, scene.height);
	ctx.save();
	let _ = ctx.translate(scene.transform.x, scene.transform.y);
	let _ = ctx.scale(scene.transform.k, scene.transform.k);
	draw_links(scene, ctx);
	draw_nodes(scene, ctx);
	ctx.restore();
}

fn draw_links(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	ctx.set_stroke_style_str(LINK_COLOR);
	ctx.set_line_width(scene.link_width);
	ctx.begin_path();
	for line in &scene.lines {
		ctx.move_to(line.x1, line.y1);
		ctx.line_to(line.x2, line.y2);
	}
	ctx.stroke();

	ctx.set_fill_style_str(ARROW_COLOR);
	for line in &scene.lines {
		let Some([p0, p1, p2, p3]) = scene.marker.place(line, scene.link_width) else {
			continue;
		};
		ctx.begin_path();
		ctx.move_to(p0.0, p0.1);
		ctx.line_to(p1.0, p1.1);
		ctx.line_to(p2.0, p2.1);
		ctx.line_to(p3.0, p3.1);
		ctx.close_path();
		ctx.fill();
	}
}

fn draw_nodes(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	for circle in &scene.circles {
		ctx.begin_path();
		let _ = ctx.arc(circle.cx, circle.cy, node_radius(circle), 0.0, 2.0 * PI);
		ctx.set_fill_style_str(node_fill(&circle.flags));
		ctx.fill();
	}
}
