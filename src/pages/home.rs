use leptos::prelude::*;
use leptos_meta::Title;
use log::info;

use crate::components::dep_graph::{
	DepGraphCanvas, DependencyGraph, GraphData, GraphError, GraphViewConfig, load_page_graph,
};

/// Statements for the sample graph, shown when the page embeds no data.
const SAMPLE: &[(&str, &str, &[&str])] = &[
	("def:triangle", "A triangle is three non-collinear points.", &[]),
	("def:right", "A right angle measures a quarter turn.", &[]),
	(
		"lem:similar",
		"Triangles with equal angles have proportional sides.",
		&["def:triangle"],
	),
	(
		"thm:pythagoras",
		"In a right triangle, a² + b² = c².",
		&["def:right", "lem:similar"],
	),
	(
		"thm:cosine",
		"In any triangle, c² = a² + b² − 2ab·cos γ.",
		&["thm:pythagoras"],
	),
	(
		"cor:distance",
		"The distance between (x₁, y₁) and (x₂, y₂) is √((x₂−x₁)² + (y₂−y₁)²).",
		&["thm:pythagoras"],
	),
];

fn sample_graph() -> GraphData {
	let mut graph = DependencyGraph::new();
	for (id, _, uses) in SAMPLE {
		graph.uses(id, uses.iter().copied());
	}
	graph.into_data()
}

/// Embedded graph if the page has one, the sample otherwise.
fn page_graph(config: &GraphViewConfig) -> (Result<GraphData, GraphError>, bool) {
	match load_page_graph(config) {
		Ok(data) => (data.validate().map(|_| data), false),
		Err(GraphError::MissingElement(what)) => {
			info!("no embedded graph ({what}), showing sample");
			(Ok(sample_graph()), true)
		}
		Err(err) => (Err(err), false),
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let config = GraphViewConfig::default();
	let (graph, is_sample) = page_graph(&config);
	let title = config.title.clone();

	view! {
		<Title text=title.clone() />
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				{graph.map(|data| {
					view! {
						<DepGraphCanvas
							data=Signal::derive(move || data.clone())
							config=config
							fullscreen=true
						/>
					}
				})}
				<div class="graph-overlay">
					<h1>{title}</h1>
					<p class="subtitle">"Click a node to show its statement. Drag nodes to reposition. Scroll to zoom."</p>
				</div>
				{is_sample.then(|| {
					SAMPLE
						.iter()
						.map(|(id, statement, _)| {
							view! {
								<section class="thm" id=*id style="display: none;">
									<h2>{*id}</h2>
									<p>{*statement}</p>
								</section>
							}
						})
						.collect_view()
				})}
			</div>
		</ErrorBoundary>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sample_graph_is_consistent() {
		let data = sample_graph();
		assert_eq!(data.nodes.len(), SAMPLE.len());
		assert!(data.validate().is_ok());
		assert_eq!(data.links.len(), 5);
	}
}
