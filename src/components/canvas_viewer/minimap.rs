//! Minimap viewport indicator.
//!
//! The minimap shows every node scaled into a fixed display box; the
//! indicator is a rectangle marking the part of the canvas that is currently
//! visible. Only the indicator is maintained here.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use super::transform::{Point, Rect, Viewport};
use super::types::NodeBounds;

/// Receives the viewport after every rendered frame.
pub trait ViewportIndicator {
	/// Moves the indicator to the visible part of `view`.
	fn update(&mut self, view: &Viewport);
}

/// Fraction of the display box the node bounds occupy.
const FIT_RATIO: f64 = 0.9;

/// Maps world coordinates into the minimap display box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinimapProjection {
	scale: f64,
	display_center: Point,
	world_center: Point,
}

impl MinimapProjection {
	/// Fits `bounds` into a `width` x `height` box, centered.
	pub fn new(bounds: &NodeBounds, width: f64, height: f64) -> Self {
		let fit = (width / bounds.width.max(1.0)).min(height / bounds.height.max(1.0));
		Self {
			scale: fit * FIT_RATIO,
			display_center: Point::new(width / 2.0, height / 2.0),
			world_center: Point::new(bounds.center_x, bounds.center_y),
		}
	}

	pub fn project(&self, world: Point) -> Point {
		Point::new(
			self.display_center.x + (world.x - self.world_center.x) * self.scale,
			self.display_center.y + (world.y - self.world_center.y) * self.scale,
		)
	}

	/// Indicator rectangle in display coordinates.
	pub fn indicator(&self, view: &Viewport) -> Rect {
		let visible = view.visible_rect();
		let top_left = self.project(Point::new(visible.left, visible.top));
		let bottom_right = self.project(Point::new(visible.right, visible.bottom));
		Rect::new(top_left.x, top_left.y, bottom_right.x, bottom_right.y)
	}
}

/// Absolutely positioned element tracking the visible area.
pub struct MinimapIndicator {
	element: HtmlElement,
	projection: MinimapProjection,
}

impl MinimapIndicator {
	/// Appends a `viewport-rectangle` element to `minimap`, whose client size
	/// is the display box.
	pub fn new(document: &Document, minimap: &Element, bounds: &NodeBounds) -> Option<Self> {
		let element = document.create_element("div").ok()?.dyn_into::<HtmlElement>().ok()?;
		element.set_class_name("viewport-rectangle");
		let _ = element.style().set_property("position", "absolute");
		let _ = minimap.append_child(&element);
		let projection = MinimapProjection::new(
			bounds,
			f64::from(minimap.client_width()),
			f64::from(minimap.client_height()),
		);
		Some(Self { element, projection })
	}

	pub fn dispose(&self) {
		self.element.remove();
	}
}

impl ViewportIndicator for MinimapIndicator {
	fn update(&mut self, view: &Viewport) {
		let rect = self.projection.indicator(view);
		let style = self.element.style();
		let _ = style.set_property("left", &format!("{}px", rect.left));
		let _ = style.set_property("top", &format!("{}px", rect.top));
		let _ = style.set_property("width", &format!("{}px", rect.width()));
		let _ = style.set_property("height", &format!("{}px", rect.height()));
	}
}

#[cfg(test)]
mod tests {
	use super::super::types::{CanvasNode, NodeKind};
	use super::*;

	fn bounds() -> NodeBounds {
		let node = |x: f64, y: f64| CanvasNode {
			id: format!("{x},{y}"),
			kind: NodeKind::Text,
			x,
			y,
			width: 100.0,
			height: 100.0,
			color: None,
			label: None,
			text: None,
			file: None,
			url: None,
		};
		NodeBounds::from_nodes(&[node(0.0, 0.0), node(900.0, 400.0)]).unwrap()
	}

	#[test]
	fn fits_bounds_into_box() {
		// 1000 x 500 world into 200 x 150: limited by width, 0.2 * 0.9.
		let projection = MinimapProjection::new(&bounds(), 200.0, 150.0);
		assert!((projection.scale - 0.18).abs() < 1e-12);
		assert_eq!(projection.project(Point::new(500.0, 250.0)), Point::new(100.0, 75.0));
	}

	#[test]
	fn indicator_tracks_visible_rect() {
		let projection = MinimapProjection::new(&bounds(), 200.0, 150.0);
		let view = Viewport::with_transform(1000.0, 500.0, Point::new(0.0, 0.0), 1.0);
		let rect = projection.indicator(&view);
		assert!((rect.left - 10.0).abs() < 1e-9);
		assert!((rect.top - 30.0).abs() < 1e-9);
		assert!((rect.width() - 180.0).abs() < 1e-9);
		assert!((rect.height() - 90.0).abs() < 1e-9);

		let zoomed = Viewport::with_transform(1000.0, 500.0, Point::new(-500.0, -250.0), 2.0);
		let rect = projection.indicator(&zoomed);
		assert!((rect.width() - 90.0).abs() < 1e-9);
		assert!((rect.left - 55.0).abs() < 1e-9);
	}
}
