use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use super::error::GraphError;

/// Side effect on the theorem panels that live outside the graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PanelEffect {
	/// Hide every element matching the selector.
	HideAll(String),
	/// Reveal the single element matching the selector.
	Show(String),
}

/// Something that can hide and reveal content panels.
pub trait PanelHost {
	fn hide_all(&mut self, selector: &str) -> Result<(), GraphError>;
	fn show(&mut self, selector: &str) -> Result<(), GraphError>;

	fn apply(&mut self, effects: &[PanelEffect]) -> Result<(), GraphError> {
		for effect in effects {
			match effect {
				PanelEffect::HideAll(selector) => self.hide_all(selector)?,
				PanelEffect::Show(selector) => self.show(selector)?,
			}
		}
		Ok(())
	}
}

/// Selector for the element whose id is exactly `id`.
pub fn id_selector(id: &str) -> String {
	format!("#{}", css_escape(id))
}

/// Escapes `ident` for use inside a CSS selector, following `CSS.escape`.
pub fn css_escape(ident: &str) -> String {
	let chars: Vec<char> = ident.chars().collect();
	let mut out = String::with_capacity(ident.len());
	for (i, &c) in chars.iter().enumerate() {
		match c {
			'\0' => out.push('\u{FFFD}'),
			'\u{1}'..='\u{1f}' | '\u{7f}' => push_code_point(&mut out, c),
			'0'..='9' if i == 0 || (i == 1 && chars[0] == '-') => push_code_point(&mut out, c),
			'-' if i == 0 && chars.len() == 1 => out.push_str("\\-"),
			c if c >= '\u{80}' || c == '-' || c == '_' || c.is_ascii_alphanumeric() => out.push(c),
			c => {
				out.push('\\');
				out.push(c);
			}
		}
	}
	out
}

fn push_code_point(out: &mut String, c: char) {
	out.push_str(&format!("\\{:x} ", c as u32));
}

/// Toggles panels in the live document through inline `display` styles.
pub struct DomPanels {
	document: Document,
}

impl DomPanels {
	pub fn new(document: Document) -> Self {
		Self { document }
	}

	pub fn from_window() -> Result<Self, GraphError> {
		web_sys::window()
			.and_then(|w| w.document())
			.map(Self::new)
			.ok_or_else(|| GraphError::MissingElement("document".into()))
	}
}

impl PanelHost for DomPanels {
	fn hide_all(&mut self, selector: &str) -> Result<(), GraphError> {
		let panels = self
			.document
			.query_selector_all(selector)
			.map_err(GraphError::from_js)?;
		for i in 0..panels.length() {
			if let Some(panel) = panels.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) {
				let _ = panel.style().set_property("display", "none");
			}
		}
		Ok(())
	}

	fn show(&mut self, selector: &str) -> Result<(), GraphError> {
		let panel = self
			.document
			.query_selector(selector)
			.map_err(GraphError::from_js)?
			.and_then(|el| el.dyn_into::<HtmlElement>().ok())
			.ok_or_else(|| GraphError::MissingElement(selector.to_owned()))?;
		let _ = panel.style().remove_property("display");
		Ok(())
	}
}
