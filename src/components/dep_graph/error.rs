use thiserror::Error;

/// Errors raised while loading graph data or binding it to the page.
#[derive(Debug, Error)]
pub enum GraphError {
	#[error("node not found: {0}")]
	NodeNotFound(String),

	#[error("invalid graph data: {0}")]
	Json(#[from] serde_json::Error),

	#[error("missing page element: {0}")]
	MissingElement(String),

	#[error("DOM error: {0}")]
	Dom(String),
}

impl GraphError {
	pub(crate) fn from_js(value: wasm_bindgen::JsValue) -> Self {
		Self::Dom(value.as_string().unwrap_or_else(|| format!("{value:?}")))
	}
}
