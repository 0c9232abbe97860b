//! canvas-viewer: Pannable, zoomable JSON Canvas viewer.
//!
//! This crate provides a WASM-based viewer component that draws a JSON Canvas
//! document on an HTML canvas, keeps interactive node content in DOM overlays
//! aligned with the view, and resolves mouse, touch, and trackpad input into
//! pan, zoom, and click intents.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

use components::canvas_viewer::ControlSchema;

pub use components::canvas_viewer::{
	CanvasData, CanvasEdge, CanvasNode, CanvasViewer, CanvasViewerState, Interaction, ViewerConfig, ViewerError,
	ViewerEvent,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("canvas-viewer: logging initialized");
}

/// Text content of a `<script>` element, by id.
fn script_text(id: &str) -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Parses the JSON inside a script element, logging parse failures.
fn load_json<T: DeserializeOwned>(id: &str) -> Option<T> {
	let json_text = script_text(id)?;
	match serde_json::from_str::<T>(&json_text) {
		Ok(value) => Some(value),
		Err(e) => {
			warn!("canvas-viewer: failed to parse #{id}: {e}");
			None
		}
	}
}

/// Load the canvas document from a script element with id="canvas-data".
/// Expected format: JSON Canvas, `{ nodes: [...], edges: [...] }`.
fn load_canvas_data() -> Option<CanvasData> {
	let data: CanvasData = load_json("canvas-data")?;
	info!(
		"canvas-viewer: loaded {} nodes, {} edges",
		data.nodes.len(),
		data.edges.len()
	);
	Some(data)
}

/// Viewer options from a script element with id="viewer-options"; missing
/// fields keep their defaults.
fn load_viewer_options() -> ViewerConfig {
	load_json("viewer-options").unwrap_or_default()
}

/// One-line usage hint for the wheel behavior of `schema`.
fn usage_hint(schema: ControlSchema) -> &'static str {
	match schema {
		ControlSchema::Trackpad => {
			"Drag or two-finger scroll to pan. Pinch or ctrl+scroll to zoom. Click a card to focus it."
		}
		ControlSchema::Auto => {
			"Drag to pan. Scroll or pinch to zoom; two-finger swipes pan on a trackpad. Click a card to focus it."
		}
		ControlSchema::Mouse => "Drag to pan. Scroll or pinch to zoom. Click a card to focus it.",
	}
}

/// Main application component.
/// Loads the canvas and options from the DOM and renders the viewer.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let canvas_data = load_canvas_data().unwrap_or_default();
	let canvas_signal = Signal::derive(move || canvas_data.clone());
	let config = load_viewer_options();
	let subtitle = usage_hint(config.gestures.control_schema);

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Canvas Viewer" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-canvas">
			<CanvasViewer data=canvas_signal config=config fullscreen=true minimap=true />
			<div class="canvas-overlay">
				<p class="subtitle">{subtitle}</p>
			</div>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn usage_hint_matches_wheel_behavior() {
		assert!(usage_hint(ControlSchema::Auto).contains("Scroll or pinch to zoom"));
		assert!(usage_hint(ControlSchema::Mouse).contains("Scroll or pinch to zoom"));
		assert!(!usage_hint(ControlSchema::Auto).contains("scroll to pan"));
		assert!(usage_hint(ControlSchema::Trackpad).contains("two-finger scroll to pan"));
	}
}
