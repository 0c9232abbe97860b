//! Viewport state and the coordinate chain shared by gestures, rendering,
//! and overlay placement.
//!
//! # Coordinate Spaces
//!
//! - **Screen**: device pixels as reported by pointer events (`clientX/Y`).
//! - **Container**: screen minus the viewer container's on-screen origin.
//! - **Content**: container minus the pan offset. Still in screen pixels.
//! - **World**: content divided by the scale. Node rectangles live here.
//!
//! Every step has an exposed inverse; overlay placement walks the chain
//! backwards from world to screen.

use super::types::NodeBounds;

/// Smallest allowed scale.
pub const MIN_SCALE: f64 = 0.05;
/// Largest allowed scale.
pub const MAX_SCALE: f64 = 20.0;

/// Clamps `scale` to [`MIN_SCALE`]..=[`MAX_SCALE`].
pub fn clamp_scale(scale: f64) -> f64 {
	scale.clamp(MIN_SCALE, MAX_SCALE)
}

/// A 2D point or vector.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate.
	pub y: f64,
}

impl Point {
	/// Point at `(x, y)`.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Euclidean distance.
	pub fn distance(self, other: Point) -> f64 {
		let (dx, dy) = (self.x - other.x, self.y - other.y);
		(dx * dx + dy * dy).sqrt()
	}

	/// Halfway point.
	pub fn midpoint(self, other: Point) -> Point {
		Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
	}

	/// Taxicab distance, used for tap detection.
	pub fn manhattan(self, other: Point) -> f64 {
		(self.x - other.x).abs() + (self.y - other.y).abs()
	}
}

impl std::ops::Add for Point {
	type Output = Point;

	fn add(self, rhs: Point) -> Point {
		Point::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl std::ops::Sub for Point {
	type Output = Point;

	fn sub(self, rhs: Point) -> Point {
		Point::new(self.x - rhs.x, self.y - rhs.y)
	}
}

/// Axis-aligned rectangle given by its edges.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
	/// Smallest x.
	pub left: f64,
	/// Smallest y.
	pub top: f64,
	/// Largest x.
	pub right: f64,
	/// Largest y.
	pub bottom: f64,
}

impl Rect {
	/// Rectangle from its edges.
	pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
		Self {
			left,
			top,
			right,
			bottom,
		}
	}

	/// Horizontal extent.
	pub fn width(&self) -> f64 {
		self.right - self.left
	}

	/// Vertical extent.
	pub fn height(&self) -> f64 {
		self.bottom - self.top
	}

	/// Whether `inner` lies entirely within this rectangle, edges included.
	pub fn contains_rect(&self, inner: &Rect) -> bool {
		inner.left >= self.left
			&& inner.top >= self.top
			&& inner.right <= self.right
			&& inner.bottom <= self.bottom
	}

	/// Whether the rectangles overlap or touch.
	pub fn intersects(&self, other: &Rect) -> bool {
		self.left <= other.right
			&& other.left <= self.right
			&& self.top <= other.bottom
			&& other.top <= self.bottom
	}

	/// Grows the rectangle by `margin` on every side.
	pub fn expand(&self, margin: f64) -> Rect {
		Rect::new(
			self.left - margin,
			self.top - margin,
			self.right + margin,
			self.bottom + margin,
		)
	}
}

/// Screen → container: subtract the container's on-screen origin.
pub fn screen_to_container(p: Point, origin: Point) -> Point {
	p - origin
}

/// Container → screen.
pub fn container_to_screen(p: Point, origin: Point) -> Point {
	p + origin
}

/// Container → content: subtract the pan offset.
pub fn container_to_content(p: Point, view: &Viewport) -> Point {
	p - view.offset()
}

/// Content → container.
pub fn content_to_container(p: Point, view: &Viewport) -> Point {
	p + view.offset()
}

/// Content → world: divide out the scale.
pub fn content_to_world(p: Point, view: &Viewport) -> Point {
	Point::new(p.x / view.scale(), p.y / view.scale())
}

/// World → content.
pub fn world_to_content(p: Point, view: &Viewport) -> Point {
	Point::new(p.x * view.scale(), p.y * view.scale())
}

/// Container → world, the path hit-testing takes.
pub fn container_to_world(p: Point, view: &Viewport) -> Point {
	content_to_world(container_to_content(p, view), view)
}

/// World → container, the path overlay placement takes.
pub fn world_to_container(p: Point, view: &Viewport) -> Point {
	content_to_container(world_to_content(p, view), view)
}

/// Full forward chain.
pub fn screen_to_world(p: Point, origin: Point, view: &Viewport) -> Point {
	container_to_world(screen_to_container(p, origin), view)
}

/// Full inverse chain.
pub fn world_to_screen(p: Point, origin: Point, view: &Viewport) -> Point {
	container_to_screen(world_to_container(p, view), origin)
}

/// Pan offset, scale, and container size.
///
/// The engine is the single writer. Every mutation that touches the scale
/// clamps it to [`MIN_SCALE`]..=[`MAX_SCALE`].
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
	offset_x: f64,
	offset_y: f64,
	scale: f64,
	width: f64,
	height: f64,
}

impl Default for Viewport {
	fn default() -> Self {
		Self::new(0.0, 0.0)
	}
}

impl Viewport {
	/// Unpanned, unzoomed view of a `width` x `height` container.
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			offset_x: 0.0,
			offset_y: 0.0,
			scale: 1.0,
			width,
			height,
		}
	}

	/// Builds a viewport at an explicit pan/scale; the scale is clamped.
	pub fn with_transform(width: f64, height: f64, offset: Point, scale: f64) -> Self {
		Self {
			offset_x: offset.x,
			offset_y: offset.y,
			scale: clamp_scale(scale),
			width,
			height,
		}
	}

	/// Pan offset in container pixels.
	pub fn offset(&self) -> Point {
		Point::new(self.offset_x, self.offset_y)
	}

	/// Container pixels per world unit.
	pub fn scale(&self) -> f64 {
		self.scale
	}

	/// Container width.
	pub fn width(&self) -> f64 {
		self.width
	}

	/// Container height.
	pub fn height(&self) -> f64 {
		self.height
	}

	/// Container center in container coordinates.
	pub fn center(&self) -> Point {
		Point::new(self.width / 2.0, self.height / 2.0)
	}

	/// Moves the content by a container-pixel delta.
	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.offset_x += dx;
		self.offset_y += dy;
	}

	/// Centers the given world point in the container.
	pub fn pan_to(&mut self, world: Point) {
		self.offset_x = self.width / 2.0 - world.x * self.scale;
		self.offset_y = self.height / 2.0 - world.y * self.scale;
	}

	/// Multiplies the scale by `factor`, keeping `anchor` (container coords) fixed.
	pub fn zoom_by(&mut self, factor: f64, anchor: Point) -> bool {
		self.zoom_to(self.scale * factor, anchor)
	}

	/// Sets the scale, keeping the world point under `anchor` (container
	/// coords) under it afterwards. Returns `false` when the clamped scale is
	/// unchanged.
	pub fn zoom_to(&mut self, scale: f64, anchor: Point) -> bool {
		if !scale.is_finite() {
			return false;
		}
		let scale = clamp_scale(scale);
		if scale == self.scale {
			return false;
		}
		let content = container_to_content(anchor, self);
		let ratio = scale / self.scale;
		self.offset_x = anchor.x - content.x * ratio;
		self.offset_y = anchor.y - content.y * ratio;
		self.scale = scale;
		true
	}

	/// Changes the container size, keeping the previous center fixed.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.offset_x += (width - self.width) / 2.0;
		self.offset_y += (height - self.height) / 2.0;
		self.width = width;
		self.height = height;
	}

	/// Fits `bounds` plus `padding` on every side into the container.
	pub fn fit(&mut self, bounds: &NodeBounds, padding: f64) {
		let content_width = bounds.width + padding * 2.0;
		let content_height = bounds.height + padding * 2.0;
		let scale_x = self.width / content_width;
		let scale_y = self.height / content_height;
		let fitted = (scale_x.min(scale_y) * 1000.0).round() / 1000.0;
		self.scale = if fitted.is_finite() {
			clamp_scale(fitted)
		} else {
			1.0
		};
		self.offset_x = self.width / 2.0 - bounds.center_x * self.scale;
		self.offset_y = self.height / 2.0 - bounds.center_y * self.scale;
	}

	/// World-space rectangle currently shown in the container.
	pub fn visible_rect(&self) -> Rect {
		let left = -self.offset_x / self.scale;
		let top = -self.offset_y / self.scale;
		Rect::new(
			left,
			top,
			left + self.width / self.scale,
			top + self.height / self.scale,
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn close(a: Point, b: Point) -> bool {
		(a.x - b.x).abs() < 1e-9 * (1.0 + a.x.abs()) && (a.y - b.y).abs() < 1e-9 * (1.0 + a.y.abs())
	}

	#[test]
	fn chain_round_trips() {
		let origins = [Point::new(0.0, 0.0), Point::new(37.5, -12.0), Point::new(800.0, 600.0)];
		let offsets = [Point::new(0.0, 0.0), Point::new(-1234.5, 87.25), Point::new(50.0, 50.0)];
		let scales = [MIN_SCALE, 0.3, 1.0, 2.75, MAX_SCALE];
		let points = [Point::new(0.0, 0.0), Point::new(75.0, 75.0), Point::new(-5000.0, 1e4)];
		for &origin in &origins {
			for &offset in &offsets {
				for &scale in &scales {
					let view = Viewport::with_transform(800.0, 600.0, offset, scale);
					for &p in &points {
						let back = world_to_screen(screen_to_world(p, origin, &view), origin, &view);
						assert!(close(back, p), "{p:?} -> {back:?}");
					}
				}
			}
		}
	}

	#[test]
	fn click_resolves_through_each_space() {
		let view = Viewport::with_transform(800.0, 600.0, Point::new(50.0, 50.0), 1.0);
		let container = screen_to_container(Point::new(75.0, 75.0), Point::default());
		assert_eq!(container, Point::new(75.0, 75.0));
		let content = container_to_content(container, &view);
		assert_eq!(content, Point::new(25.0, 25.0));
		assert_eq!(content_to_world(content, &view), Point::new(25.0, 25.0));
	}

	#[test]
	fn zoom_preserves_anchor() {
		let mut view = Viewport::with_transform(800.0, 600.0, Point::new(120.0, -40.0), 1.3);
		let anchor = Point::new(310.0, 222.0);
		let before = container_to_world(anchor, &view);
		assert!(view.zoom_to(4.2, anchor));
		let after = container_to_world(anchor, &view);
		assert!(close(before, after));
	}

	#[test]
	fn scale_is_clamped_at_every_mutation() {
		let mut view = Viewport::new(800.0, 600.0);
		view.zoom_by(1000.0, Point::new(10.0, 10.0));
		assert_eq!(view.scale(), MAX_SCALE);
		assert!(!view.zoom_by(2.0, Point::default()));
		view.zoom_to(0.0001, Point::default());
		assert_eq!(view.scale(), MIN_SCALE);
		assert!(!view.zoom_to(f64::NAN, Point::default()));
		assert_eq!(Viewport::with_transform(1.0, 1.0, Point::default(), 99.0).scale(), MAX_SCALE);
	}

	#[test]
	fn visible_rect_follows_pan_and_scale() {
		let mut view = Viewport::new(1000.0, 1000.0);
		assert_eq!(view.visible_rect(), Rect::new(0.0, 0.0, 1000.0, 1000.0));
		view.zoom_to(2.0, Point::new(500.0, 500.0));
		assert_eq!(view.visible_rect(), Rect::new(250.0, 250.0, 750.0, 750.0));
		view.pan_by(100.0, 0.0);
		assert_eq!(view.visible_rect().left, 200.0);
	}

	#[test]
	fn fit_centers_bounds() {
		let bounds = NodeBounds {
			min_x: 0.0,
			min_y: 0.0,
			max_x: 600.0,
			max_y: 200.0,
			width: 600.0,
			height: 200.0,
			center_x: 300.0,
			center_y: 100.0,
		};
		let mut view = Viewport::new(800.0, 600.0);
		view.fit(&bounds, 100.0);
		assert_eq!(view.scale(), 1.0);
		let center = container_to_world(view.center(), &view);
		assert!(close(center, Point::new(300.0, 100.0)));
	}

	#[test]
	fn resize_keeps_center() {
		let mut view = Viewport::with_transform(800.0, 600.0, Point::new(10.0, 20.0), 2.0);
		let before = container_to_world(view.center(), &view);
		view.resize(1200.0, 500.0);
		assert!(close(container_to_world(view.center(), &view), before));
	}

	#[test]
	fn pan_to_centers_world_point() {
		let mut view = Viewport::with_transform(800.0, 600.0, Point::default(), 0.5);
		view.pan_to(Point::new(1000.0, -400.0));
		assert!(close(container_to_world(view.center(), &view), Point::new(1000.0, -400.0)));
	}
}
