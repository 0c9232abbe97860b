//! Per-frame render scheduling.
//!
//! The scheduler is the only place deciding whether a frame is redrawn in
//! full. When the view only zoomed within the rectangle drawn last time, the
//! previous raster is scaled and translated in screen space instead; that
//! approximation is bounded by a throttle window and followed by a full
//! redraw once input settles.

use log::debug;

use super::config::RenderConfig;
use super::geometry::EdgeGeometryCache;
use super::minimap::ViewportIndicator;
use super::overlay::OverlaySync;
use super::transform::{Rect, Viewport};
use super::types::CanvasDocument;

/// Screen-space transform applied to the previous raster. The transform
/// origin is the top-left corner of the surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenTransform {
	/// Horizontal shift (px).
	pub translate_x: f64,
	/// Vertical shift (px).
	pub translate_y: f64,
	/// Scale relative to the last full redraw.
	pub scale: f64,
}

impl ScreenTransform {
	/// CSS `transform` value.
	pub fn to_css(self) -> String {
		format!(
			"translate({}px, {}px) scale({})",
			self.translate_x, self.translate_y, self.scale
		)
	}
}

/// What a frame did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameDecision {
	/// Nothing changed.
	Skip,
	/// Vector content was redrawn.
	Full,
	/// The previous raster was transformed.
	Approximate(ScreenTransform),
}

/// Everything a full redraw reads.
pub struct Scene<'a> {
	/// Nodes and edges to draw.
	pub document: &'a CanvasDocument,
	/// Current view.
	pub viewport: &'a Viewport,
	/// Memoized edge curves.
	pub edges: &'a mut EdgeGeometryCache,
}

/// The 2D raster surface.
pub trait RenderSurface {
	/// Clears any approximation transform and redraws everything.
	fn draw_full(&mut self, scene: Scene<'_>);
	/// Transforms the previously drawn raster.
	fn apply_approximation(&mut self, transform: ScreenTransform);
}

/// Collaborators invoked by a frame.
pub struct FrameTargets<'a> {
	/// Raster surface.
	pub surface: &'a mut dyn RenderSurface,
	/// DOM overlays, if any.
	pub overlay: Option<&'a mut dyn OverlaySync>,
	/// Minimap indicator, if any.
	pub indicator: Option<&'a mut dyn ViewportIndicator>,
}

#[derive(Clone, Copy, Debug)]
struct DrawnFrame {
	rect: Rect,
	scale: f64,
	/// Timestamp (ms) of the full redraw.
	at: f64,
}

#[derive(Clone, Debug)]
pub struct RenderScheduler {
	config: RenderConfig,
	last: Option<DrawnFrame>,
	/// Time (ms) after which a full redraw replaces the approximation.
	settle_at: Option<f64>,
	dirty: bool,
}

impl RenderScheduler {
	pub fn new(config: RenderConfig) -> Self {
		Self {
			config: config.validated(),
			last: None,
			settle_at: None,
			dirty: true,
		}
	}

	/// Requests a frame; the scheduler still picks the cheapest valid path.
	pub fn mark_dirty(&mut self) {
		self.dirty = true;
	}

	/// Forgets the last drawn frame so the next frame is a full redraw.
	pub fn invalidate(&mut self) {
		self.last = None;
		self.dirty = true;
	}

	pub fn is_dirty(&self) -> bool {
		self.dirty
	}

	/// Decides how to render at `now` (ms) without drawing anything.
	pub fn decide(&mut self, view: &Viewport, now: f64) -> FrameDecision {
		let settle_due = self.settle_at.is_some_and(|at| now >= at);
		if !self.dirty && !settle_due {
			return FrameDecision::Skip;
		}
		self.dirty = false;

		if let Some(last) = self.last
			&& !settle_due
			&& view.scale() != last.scale
			&& now - last.at < self.config.throttle_ms
		{
			let current = view.visible_rect();
			if last.rect.contains_rect(&current) {
				self.settle_at = Some(now + self.config.settle_ms);
				return FrameDecision::Approximate(ScreenTransform {
					translate_x: (last.rect.left - current.left) * view.scale(),
					translate_y: (last.rect.top - current.top) * view.scale(),
					scale: view.scale() / last.scale,
				});
			}
		}
		FrameDecision::Full
	}

	/// Records a completed full redraw.
	pub fn record_full(&mut self, view: &Viewport, now: f64) {
		self.last = Some(DrawnFrame {
			rect: view.visible_rect(),
			scale: view.scale(),
			at: now,
		});
		self.settle_at = None;
	}

	/// Runs one frame: decide, draw, then sync overlays and the minimap.
	pub fn run_frame(&mut self, now: f64, scene: Scene<'_>, targets: FrameTargets<'_>) -> FrameDecision {
		let view = scene.viewport;
		let decision = self.decide(view, now);
		match decision {
			FrameDecision::Skip => return decision,
			FrameDecision::Full => {
				targets.surface.draw_full(scene);
				self.record_full(view, now);
			}
			FrameDecision::Approximate(transform) => {
				debug!("canvas-viewer: approximating frame with {}", transform.to_css());
				targets.surface.apply_approximation(transform);
			}
		}
		if let Some(overlay) = targets.overlay {
			overlay.sync(view);
		}
		if let Some(indicator) = targets.indicator {
			indicator.update(view);
		}
		decision
	}
}
