use leptos::prelude::*;

use crate::components::knowledge_graph::KnowledgeGraphCanvas;
use crate::graph::{GraphDocument, GraphError};

const SAMPLE_GRAPH: &str = include_str!("../data/sample_graph.json");

/// Decode the bundled sample graph.
fn sample_document() -> Result<GraphDocument, GraphError> {
	GraphDocument::from_json(SAMPLE_GRAPH)
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	view! {
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
				{move || {
					sample_document()
						.map(|document| {
							let document = Signal::derive(move || document.clone());
							view! { <KnowledgeGraphCanvas document=document fullscreen=true /> }
						})
				}}
				<div class="graph-overlay">
					<h1>"Code Knowledge Graph"</h1>
					<p class="subtitle">
						"Click + to expand, click a card to pull it out of its folder. Shift-drag to connect. Scroll to zoom."
					</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
