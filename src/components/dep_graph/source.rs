use log::debug;
use wasm_bindgen::JsValue;
use web_sys::Window;

use super::config::GraphViewConfig;
use super::error::GraphError;
use super::types::GraphData;

/// Name of the page global that older document templates assign the graph to.
const GRAPH_GLOBAL: &str = "graph";

/// Reads the graph the hosting page embedded.
///
/// Looks for a JSON `<script>` element with the configured id first, then for
/// a `graph` global set by an inline script.
pub fn load_page_graph(config: &GraphViewConfig) -> Result<GraphData, GraphError> {
	let window = web_sys::window().ok_or_else(|| GraphError::MissingElement("window".into()))?;

	if let Some(json) = embedded_json(&window, &config.data_element_id) {
		debug!("graph data from #{}", config.data_element_id);
		return GraphData::from_json(&json);
	}

	let global = js_sys::Reflect::get(&window, &JsValue::from_str(GRAPH_GLOBAL))
		.map_err(GraphError::from_js)?;
	if global.is_undefined() || global.is_null() {
		return Err(GraphError::MissingElement(format!(
			"#{} or window.{GRAPH_GLOBAL}",
			config.data_element_id
		)));
	}
	let json: String = js_sys::JSON::stringify(&global)
		.map_err(GraphError::from_js)?
		.into();
	debug!("graph data from window.{GRAPH_GLOBAL}");
	GraphData::from_json(&json)
}

fn embedded_json(window: &Window, element_id: &str) -> Option<String> {
	window
		.document()?
		.get_element_by_id(element_id)?
		.text_content()
		.filter(|text| !text.trim().is_empty())
}
