//! Edge curve geometry.
//!
//! Control points are derived from the two anchors and their fixed sides and
//! memoized per edge id in [`EdgeGeometryCache`]. An entry is reused only
//! while both anchors are unchanged.

use std::collections::HashMap;

use super::transform::Point;
use super::types::{CanvasEdge, CanvasNode, Side};

/// Arrowhead length in world units.
pub const ARROW_LENGTH: f64 = 12.0;
/// Arrowhead half-width in world units.
pub const ARROW_WIDTH: f64 = 7.0;
const MIN_CONTROL_ARM: f64 = 60.0;
const MAX_CONTROL_ARM: f64 = 300.0;

/// A cubic Bézier from one anchor to another.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeCurve {
	/// Source anchor.
	pub start: Point,
	/// Control point pushed out from `start`.
	pub start_control: Point,
	/// Control point pushed out from `end`.
	pub end_control: Point,
	/// Target anchor.
	pub end: Point,
}

impl EdgeCurve {
	/// Curve between two anchors leaving and entering on the given sides.
	pub fn between(start: Point, from_side: Option<Side>, end: Point, to_side: Option<Side>) -> Self {
		let (start_control, end_control) = control_points(start, from_side, end, to_side);
		Self {
			start,
			start_control,
			end_control,
			end,
		}
	}

	/// Point on the curve at parameter `t` in [0, 1].
	pub fn point_at(&self, t: f64) -> Point {
		let u = 1.0 - t;
		let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
		Point::new(
			a * self.start.x + b * self.start_control.x + c * self.end_control.x + d * self.end.x,
			a * self.start.y + b * self.start_control.y + c * self.end_control.y + d * self.end.y,
		)
	}

	/// Arrowhead triangle at the end of the curve, pointing along the final
	/// tangent. `None` when the end control point coincides with the tip.
	pub fn arrowhead(&self) -> Option<[Point; 3]> {
		arrowhead(self.end, self.end_control)
	}
}

/// Length of the control arms for a pair of anchors.
///
/// The smaller axis delta counts fully and the larger one partially, so
/// near and far pairs both get proportionate curves.
pub fn control_arm(start: Point, end: Point) -> f64 {
	let (dx, dy) = ((end.x - start.x).abs(), (end.y - start.y).abs());
	let weighted = dx.min(dy) + 0.3 * dx.max(dy);
	(weighted * 0.5).clamp(MIN_CONTROL_ARM, MAX_CONTROL_ARM)
}

fn push_out(p: Point, side: Option<Side>, arm: f64) -> Point {
	match side {
		Some(Side::Top) => Point::new(p.x, p.y - arm),
		Some(Side::Bottom) => Point::new(p.x, p.y + arm),
		Some(Side::Left) => Point::new(p.x - arm, p.y),
		Some(Side::Right) => Point::new(p.x + arm, p.y),
		None => p,
	}
}

pub fn control_points(start: Point, from_side: Option<Side>, end: Point, to_side: Option<Side>) -> (Point, Point) {
	let arm = control_arm(start, end);
	(push_out(start, from_side, arm), push_out(end, to_side, arm))
}

/// Triangle with its tip at `tip`, oriented away from `from`.
pub fn arrowhead(tip: Point, from: Point) -> Option<[Point; 3]> {
	let (dx, dy) = (tip.x - from.x, tip.y - from.y);
	let length = (dx * dx + dy * dy).sqrt();
	if length == 0.0 {
		return None;
	}
	let (ux, uy) = (dx / length, dy / length);
	let left = Point::new(
		tip.x - ux * ARROW_LENGTH - uy * ARROW_WIDTH,
		tip.y - uy * ARROW_LENGTH + ux * ARROW_WIDTH,
	);
	let right = Point::new(
		tip.x - ux * ARROW_LENGTH + uy * ARROW_WIDTH,
		tip.y - uy * ARROW_LENGTH - ux * ARROW_WIDTH,
	);
	Some([tip, left, right])
}

/// Side table of computed curves keyed by edge id.
#[derive(Clone, Debug, Default)]
pub struct EdgeGeometryCache {
	curves: HashMap<String, EdgeCurve>,
	computed: usize,
}

impl EdgeGeometryCache {
	/// Returns the cached curve, recomputing it if either anchor moved.
	pub fn curve(&mut self, edge: &CanvasEdge, from: &CanvasNode, to: &CanvasNode) -> EdgeCurve {
		let start = from.anchor(edge.from_side);
		let end = to.anchor(edge.to_side);
		if let Some(curve) = self.curves.get(&edge.id)
			&& curve.start == start
			&& curve.end == end
		{
			return *curve;
		}
		let curve = EdgeCurve::between(start, edge.from_side, end, edge.to_side);
		self.curves.insert(edge.id.clone(), curve);
		self.computed += 1;
		curve
	}

	/// Number of curves computed so far, including recomputations.
	pub fn computed(&self) -> usize {
		self.computed
	}

	/// Drops every cached curve.
	pub fn clear(&mut self) {
		self.curves.clear();
	}
}

#[cfg(test)]
mod tests {
	use super::super::types::NodeKind;
	use super::*;

	fn node(id: &str, x: f64, y: f64) -> CanvasNode {
		CanvasNode {
			id: id.into(),
			kind: NodeKind::Text,
			x,
			y,
			width: 100.0,
			height: 50.0,
			color: None,
			label: None,
			text: None,
			file: None,
			url: None,
		}
	}

	fn edge() -> CanvasEdge {
		CanvasEdge {
			id: "e".into(),
			from_node: "a".into(),
			from_side: Some(Side::Right),
			to_node: "b".into(),
			to_side: Some(Side::Left),
			label: None,
		}
	}

	#[test]
	fn control_arm_is_clamped() {
		assert_eq!(control_arm(Point::new(0.0, 0.0), Point::new(10.0, 0.0)), 60.0);
		assert_eq!(control_arm(Point::new(0.0, 0.0), Point::new(10_000.0, 10_000.0)), 300.0);
		// min 200 + 0.3 * 600 = 380, halved.
		assert_eq!(control_arm(Point::new(0.0, 0.0), Point::new(600.0, 200.0)), 190.0);
	}

	#[test]
	fn controls_push_out_from_sides() {
		let (a, b) = control_points(Point::new(0.0, 0.0), Some(Side::Right), Point::new(600.0, 200.0), Some(Side::Top));
		assert_eq!(a, Point::new(190.0, 0.0));
		assert_eq!(b, Point::new(600.0, 10.0));
		let (c, _) = control_points(Point::new(5.0, 5.0), None, Point::new(6.0, 6.0), None);
		assert_eq!(c, Point::new(5.0, 5.0));
	}

	#[test]
	fn curve_endpoints_and_midpoint() {
		let curve = EdgeCurve::between(Point::new(0.0, 0.0), Some(Side::Right), Point::new(400.0, 0.0), Some(Side::Left));
		assert_eq!(curve.point_at(0.0), curve.start);
		assert_eq!(curve.point_at(1.0), curve.end);
		assert_eq!(curve.point_at(0.5), Point::new(200.0, 0.0));
	}

	#[test]
	fn arrowhead_points_along_tangent() {
		let [tip, left, right] = arrowhead(Point::new(100.0, 0.0), Point::new(0.0, 0.0)).unwrap();
		assert_eq!(tip, Point::new(100.0, 0.0));
		assert_eq!(left, Point::new(88.0, 7.0));
		assert_eq!(right, Point::new(88.0, -7.0));
		assert!(arrowhead(Point::new(1.0, 1.0), Point::new(1.0, 1.0)).is_none());
	}

	#[test]
	fn cache_reuses_until_anchor_moves() {
		let mut cache = EdgeGeometryCache::default();
		let (a, b) = (node("a", 0.0, 0.0), node("b", 400.0, 0.0));
		let first = cache.curve(&edge(), &a, &b);
		let again = cache.curve(&edge(), &a, &b);
		assert_eq!(first, again);
		assert_eq!(cache.computed(), 1);

		let moved = node("b", 400.0, 300.0);
		let recomputed = cache.curve(&edge(), &a, &moved);
		assert_eq!(cache.computed(), 2);
		assert_eq!(recomputed.end, moved.anchor(Some(Side::Left)));
	}
}
