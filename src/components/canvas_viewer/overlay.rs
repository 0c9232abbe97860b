//! DOM overlays for interactive node content.
//!
//! Text, link, and file nodes get one absolutely positioned element each,
//! placed at the node rectangle in world units inside a single layer. The
//! layer receives the viewport's `translate(..) scale(..)` every frame, so
//! overlays track the canvas without per-element layout. Elements whose
//! rectangle leaves the visible area (plus a margin) are hidden.

use std::collections::HashMap;

use log::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use super::theme::NodeColors;
use super::transform::{Rect, Viewport};
use super::types::{CanvasNode, NodeKind};

/// Keeps overlay elements aligned with the viewport.
pub trait OverlaySync {
	/// Called after every rendered frame with the current viewport.
	fn sync(&mut self, view: &Viewport);
	/// Marks one overlay as active, or none.
	fn select(&mut self, id: Option<&str>);
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp"];

/// What an overlay element shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverlayContent {
	/// Plain text; formatted rendering is left to the host.
	Text(String),
	/// An embedded frame.
	Link(String),
	/// An image source URL.
	Image(String),
	/// A non-image file, shown by name.
	File(String),
}

impl OverlayContent {
	/// Overlay content for a node, or `None` for groups and empty nodes.
	/// Local file paths are resolved against `base_dir`.
	pub fn for_node(node: &CanvasNode, base_dir: &str) -> Option<Self> {
		match node.kind {
			NodeKind::Group => None,
			NodeKind::Text => Some(Self::Text(node.text.clone().unwrap_or_default())),
			NodeKind::Link => node.url.clone().map(Self::Link),
			NodeKind::File => {
				let file = node.file.as_deref()?;
				let is_image = file
					.rsplit_once('.')
					.is_some_and(|(_, ext)| IMAGE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)));
				if !is_image {
					return Some(Self::File(file.to_string()));
				}
				let src = if file.contains("http") {
					file.to_string()
				} else {
					format!("{base_dir}{file}")
				};
				Some(Self::Image(src))
			}
		}
	}
}

/// CSS transform mapping world units to container pixels.
pub fn layer_transform(view: &Viewport) -> String {
	let offset = view.offset();
	format!("translate({}px, {}px) scale({})", offset.x, offset.y, view.scale())
}

/// Area within which overlays stay shown.
pub fn retention_rect(view: &Viewport, margin: f64) -> Rect {
	view.visible_rect().expand(margin)
}

struct OverlayElement {
	element: HtmlElement,
	rect: Rect,
	shown: bool,
}

/// Overlay layer backed by real DOM elements.
pub struct OverlayLayer {
	layer: HtmlElement,
	overlays: HashMap<String, OverlayElement>,
	selected: Option<String>,
	margin: f64,
}

fn create(document: &Document, tag: &str, class: &str) -> Option<HtmlElement> {
	let element = document.create_element(tag).ok()?.dyn_into::<HtmlElement>().ok()?;
	element.set_class_name(class);
	Some(element)
}

impl OverlayLayer {
	/// Creates the layer inside `container` with one element per overlay node.
	pub fn new(
		document: &Document,
		container: &Element,
		nodes: &[CanvasNode],
		base_dir: &str,
		margin: f64,
	) -> Option<Self> {
		let layer = create(document, "div", "overlays")?;
		let style = layer.style();
		let _ = style.set_property("position", "absolute");
		let _ = style.set_property("left", "0");
		let _ = style.set_property("top", "0");
		let _ = style.set_property("transform-origin", "0 0");
		let _ = container.append_child(&layer);

		let mut overlays = HashMap::new();
		for node in nodes {
			let Some(content) = OverlayContent::for_node(node, base_dir) else {
				continue;
			};
			match Self::construct(document, node, &content) {
				Some(element) => {
					let _ = layer.append_child(&element);
					overlays.insert(node.id.clone(), OverlayElement {
						element,
						rect: node.rect(),
						shown: true,
					});
				}
				None => warn!("canvas-viewer: could not create overlay for {}", node.id),
			}
		}
		debug!("canvas-viewer: {} overlays created", overlays.len());

		Some(Self {
			layer,
			overlays,
			selected: None,
			margin,
		})
	}

	fn construct(document: &Document, node: &CanvasNode, content: &OverlayContent) -> Option<HtmlElement> {
		let colors = NodeColors::resolve(node.color.as_deref());
		let overlay = create(document, "div", "overlay-container")?;
		overlay.set_id(&node.id);
		let style = overlay.style();
		let _ = style.set_property("position", "absolute");
		let _ = style.set_property("left", &format!("{}px", node.x));
		let _ = style.set_property("top", &format!("{}px", node.y));
		let _ = style.set_property("width", &format!("{}px", node.width));
		let _ = style.set_property("height", &format!("{}px", node.height));
		let _ = style.set_property("background-color", &colors.background.to_css());
		let _ = style.set_property("--active-color", &colors.active.to_css());

		let border = create(document, "div", "overlay-border")?;
		let _ = border.style().set_property("border-color", &colors.border.to_css());
		let _ = overlay.append_child(&border);

		match content {
			OverlayContent::Text(text) | OverlayContent::File(text) => {
				let wrapper = create(document, "div", "parsed-content-wrapper")?;
				wrapper.set_text_content(Some(text));
				let _ = overlay.class_list().add_1("markdown-content");
				let _ = overlay.append_child(&wrapper);
			}
			OverlayContent::Link(url) => {
				let frame = create(document, "iframe", "link-iframe")?;
				let _ = frame.set_attribute("src", url);
				let _ = frame.set_attribute("sandbox", "allow-scripts allow-same-origin");
				let _ = frame.set_attribute("loading", "lazy");
				let _ = overlay.append_child(&frame);
				let click_layer = create(document, "div", "link-click-layer")?;
				let _ = overlay.append_child(&click_layer);
			}
			OverlayContent::Image(src) => {
				let image = create(document, "img", "")?;
				let _ = image.set_attribute("src", src);
				let _ = image.set_attribute("loading", "lazy");
				let _ = overlay.append_child(&image);
			}
		}
		Some(overlay)
	}

	/// Removes the layer and all overlays from the document.
	pub fn dispose(&mut self) {
		self.overlays.clear();
		self.layer.remove();
	}
}

impl OverlaySync for OverlayLayer {
	fn sync(&mut self, view: &Viewport) {
		let _ = self.layer.style().set_property("transform", &layer_transform(view));
		let area = retention_rect(view, self.margin);
		for overlay in self.overlays.values_mut() {
			let show = overlay.rect.intersects(&area);
			if show != overlay.shown {
				let display = if show { "flex" } else { "none" };
				let _ = overlay.element.style().set_property("display", display);
				overlay.shown = show;
			}
		}
	}

	fn select(&mut self, id: Option<&str>) {
		if let Some(previous) = self.selected.as_deref().and_then(|id| self.overlays.get(id)) {
			let _ = previous.element.class_list().remove_1("active");
		}
		if let Some(current) = id.and_then(|id| self.overlays.get(id)) {
			let _ = current.element.class_list().add_1("active");
		}
		self.selected = id.map(str::to_string);
	}
}

#[cfg(test)]
mod tests {
	use super::super::transform::Point;
	use super::*;

	fn node(kind: NodeKind) -> CanvasNode {
		CanvasNode {
			id: "n".into(),
			kind,
			x: 0.0,
			y: 0.0,
			width: 100.0,
			height: 100.0,
			color: None,
			label: None,
			text: None,
			file: None,
			url: None,
		}
	}

	#[test]
	fn content_per_kind() {
		assert_eq!(OverlayContent::for_node(&node(NodeKind::Group), "/"), None);
		assert_eq!(
			OverlayContent::for_node(&node(NodeKind::Text), "/"),
			Some(OverlayContent::Text(String::new()))
		);
		let link = CanvasNode {
			url: Some("https://example.org".into()),
			..node(NodeKind::Link)
		};
		assert_eq!(
			OverlayContent::for_node(&link, "/"),
			Some(OverlayContent::Link("https://example.org".into()))
		);
		assert_eq!(OverlayContent::for_node(&node(NodeKind::Link), "/"), None);
	}

	#[test]
	fn file_content_resolves_images() {
		let file = |name: &str| CanvasNode {
			file: Some(name.into()),
			..node(NodeKind::File)
		};
		assert_eq!(
			OverlayContent::for_node(&file("photo.PNG"), "assets/"),
			Some(OverlayContent::Image("assets/photo.PNG".into()))
		);
		assert_eq!(
			OverlayContent::for_node(&file("https://cdn.example.org/a.jpg"), "assets/"),
			Some(OverlayContent::Image("https://cdn.example.org/a.jpg".into()))
		);
		assert_eq!(
			OverlayContent::for_node(&file("notes.md"), "assets/"),
			Some(OverlayContent::File("notes.md".into()))
		);
	}

	#[test]
	fn transform_and_retention() {
		let view = Viewport::with_transform(800.0, 600.0, Point::new(50.0, -20.0), 2.0);
		assert_eq!(layer_transform(&view), "translate(50px, -20px) scale(2)");
		let area = retention_rect(&view, 100.0);
		assert_eq!(area, Rect::new(-125.0, -90.0, 475.0, 410.0));
	}
}
