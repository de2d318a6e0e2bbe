use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{error, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::config::GraphViewConfig;
use super::panels::{DomPanels, PanelEffect, PanelHost};
use super::render;
use super::scene::Scene;
use super::state::{GraphEvent, GraphViewState};
use super::types::GraphData;

/// Live view: simulation state, the scene drawn from it and the page panels.
struct Mounted {
	state: GraphViewState,
	scene: Scene,
	panels: DomPanels,
}

impl Mounted {
	fn apply(&mut self, effects: Vec<PanelEffect>) {
		if let Err(err) = self.panels.apply(&effects) {
			warn!("panel update failed: {err}");
		}
	}
}

type Shared = Rc<RefCell<Option<Mounted>>>;

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn canvas_element(canvas_ref: NodeRef<leptos::html::Canvas>) -> Option<HtmlCanvasElement> {
	canvas_ref.get().map(Into::into)
}

fn local_point(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

#[component]
pub fn DepGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(optional)] config: GraphViewConfig,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let mounted: Shared = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (mounted_init, animate_init, resize_cb_init) =
		(mounted.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			let parent = canvas.parent_element();
			(
				width.unwrap_or_else(|| {
					parent.as_ref().map(|p| p.client_width() as f64).unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					parent.as_ref().map(|p| p.client_height() as f64).unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("canvas has no 2d context");
			return;
		};
		let state = match GraphViewState::new(&data.get(), config.clone(), w, h) {
			Ok(state) => state,
			Err(err) => {
				error!("cannot build dependency graph: {err}");
				return;
			}
		};
		let panels = match DomPanels::from_window() {
			Ok(panels) => panels,
			Err(err) => {
				error!("{err}");
				return;
			}
		};
		let scene = Scene::new(&state);
		*mounted_init.borrow_mut() = Some(Mounted {
			state,
			scene,
			panels,
		});

		if fullscreen {
			let (mounted_resize, canvas_resize) = (mounted_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut m) = *mounted_resize.borrow_mut() {
					m.state.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (mounted_anim, animate_inner) = (mounted_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut m) = *mounted_anim.borrow_mut() {
				m.state.handle(GraphEvent::Tick);
				m.scene.sync(&m.state);
				render::render(&m.scene, &ctx);
			}
			if let (Some(win), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let mounted_md = mounted.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_element(canvas_ref) else {
			return;
		};
		let (x, y) = local_point(&canvas, &ev);
		if let Some(ref mut m) = *mounted_md.borrow_mut() {
			m.state.pointer_down(x, y, ev.button());
		}
	};

	let mounted_mm = mounted.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_element(canvas_ref) else {
			return;
		};
		let (x, y) = local_point(&canvas, &ev);
		if let Some(ref mut m) = *mounted_mm.borrow_mut() {
			m.state.pointer_move(x, y);
			m.scene.sync(&m.state);
			canvas.set_title(m.scene.visible_tooltip().unwrap_or_default());
			let cursor = if m.state.hovered.is_some() { "pointer" } else { "grab" };
			let _ = web_sys::HtmlElement::style(&canvas).set_property("cursor", cursor);
		}
	};

	let mounted_mu = mounted.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut m) = *mounted_mu.borrow_mut() {
			let effects = m.state.pointer_up();
			m.apply(effects);
		}
	};

	let mounted_ml = mounted.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut m) = *mounted_ml.borrow_mut() {
			m.state.pointer_leave();
		}
		if let Some(canvas) = canvas_element(canvas_ref) {
			canvas.set_title("");
		}
	};

	let mounted_wh = mounted.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_element(canvas_ref) else {
			return;
		};
		let (x, y) = local_point(&canvas, &ev);
		if let Some(ref mut m) = *mounted_wh.borrow_mut() {
			m.state.handle(GraphEvent::Wheel {
				delta_y: ev.delta_y(),
				delta_mode: ev.delta_mode(),
				x,
				y,
			});
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="dep-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
