//! Eased zoom toward a requested scale.
//!
//! Each frame covers a fixed fraction of the remaining distance, so the
//! animation length depends on the frame rate rather than a fixed duration.
//! The pan offset is recomputed every frame to keep the anchor fixed.

use super::config::ZoomConfig;
use super::transform::{Point, Viewport, clamp_scale};

#[derive(Clone, Copy, Debug, PartialEq)]
struct ZoomTarget {
	scale: f64,
	/// Container coordinates.
	anchor: Point,
}

#[derive(Clone, Debug)]
pub struct ZoomAnimator {
	config: ZoomConfig,
	target: Option<ZoomTarget>,
}

impl ZoomAnimator {
	pub fn new(config: ZoomConfig) -> Self {
		Self {
			config: config.validated(),
			target: None,
		}
	}

	/// Replaces any pending target; requests are not queued.
	pub fn request_zoom(&mut self, scale: f64, anchor: Point) {
		if !scale.is_finite() {
			return;
		}
		self.target = Some(ZoomTarget {
			scale: clamp_scale(scale),
			anchor,
		});
	}

	pub fn is_active(&self) -> bool {
		self.target.is_some()
	}

	pub fn target_scale(&self) -> Option<f64> {
		self.target.map(|t| t.scale)
	}

	pub fn cancel(&mut self) {
		self.target = None;
	}

	/// Advances one frame. Returns `true` if the viewport changed.
	pub fn step(&mut self, view: &mut Viewport) -> bool {
		let Some(target) = self.target else {
			return false;
		};
		let current = view.scale();
		let remaining = target.scale - current;
		let tolerance = target.scale * self.config.relative_epsilon + self.config.absolute_epsilon;

		let next = if remaining.abs() < tolerance {
			self.target = None;
			target.scale
		} else {
			current + remaining * self.config.smoothing
		};
		view.zoom_to(next, target.anchor)
	}
}

#[cfg(test)]
mod tests {
	use super::super::transform::{MAX_SCALE, MIN_SCALE, container_to_world};
	use super::*;

	fn run(animator: &mut ZoomAnimator, view: &mut Viewport) -> usize {
		let mut frames = 0;
		while animator.is_active() {
			animator.step(view);
			frames += 1;
			assert!(frames < 1000, "zoom never converged");
		}
		frames
	}

	#[test]
	fn converges_exactly_to_target() {
		let mut view = Viewport::new(800.0, 600.0);
		let mut animator = ZoomAnimator::new(ZoomConfig::default());
		animator.request_zoom(3.7, view.center());
		let frames = run(&mut animator, &mut view);
		assert!(frames > 1);
		assert_eq!(view.scale(), 3.7);
	}

	#[test]
	fn anchor_stays_fixed_across_requests() {
		let mut view = Viewport::with_transform(800.0, 600.0, Point::new(-35.0, 80.0), 0.8);
		let mut animator = ZoomAnimator::new(ZoomConfig::default());
		let anchor = Point::new(123.0, 456.0);
		for target in [2.5, 0.3, 11.0, 1.0, 0.06] {
			let before = container_to_world(anchor, &view);
			animator.request_zoom(target, anchor);
			run(&mut animator, &mut view);
			let after = container_to_world(anchor, &view);
			assert!((before.x - after.x).abs() < 1e-6, "{before:?} vs {after:?}");
			assert!((before.y - after.y).abs() < 1e-6, "{before:?} vs {after:?}");
		}
	}

	#[test]
	fn requests_are_clamped() {
		let mut view = Viewport::new(800.0, 600.0);
		let mut animator = ZoomAnimator::new(ZoomConfig::default());
		animator.request_zoom(500.0, view.center());
		assert_eq!(animator.target_scale(), Some(MAX_SCALE));
		while animator.is_active() {
			animator.step(&mut view);
			assert!((MIN_SCALE..=MAX_SCALE).contains(&view.scale()));
		}
		animator.request_zoom(-3.0, view.center());
		assert_eq!(animator.target_scale(), Some(MIN_SCALE));
	}

	#[test]
	fn new_request_replaces_target() {
		let mut view = Viewport::new(800.0, 600.0);
		let mut animator = ZoomAnimator::new(ZoomConfig::default());
		animator.request_zoom(4.0, view.center());
		animator.step(&mut view);
		animator.request_zoom(0.5, Point::default());
		run(&mut animator, &mut view);
		assert_eq!(view.scale(), 0.5);
	}

	#[test]
	fn degenerate_smoothing_still_converges() {
		for smoothing in [0.0, 1.0, -1.0, f64::NAN] {
			let mut view = Viewport::new(800.0, 600.0);
			let mut animator = ZoomAnimator::new(ZoomConfig {
				smoothing,
				..ZoomConfig::default()
			});
			animator.request_zoom(3.0, view.center());
			run(&mut animator, &mut view);
			assert_eq!(view.scale(), 3.0, "smoothing {smoothing}");
		}
	}

	#[test]
	fn idle_step_is_a_no_op() {
		let mut view = Viewport::new(800.0, 600.0);
		let mut animator = ZoomAnimator::new(ZoomConfig::default());
		assert!(!animator.step(&mut view));
		animator.request_zoom(1.0, Point::default());
		animator.step(&mut view);
		assert!(!animator.is_active());
	}
}
