//! Canvas 2D rendering of groups, file captions, and edges.
//!
//! A full redraw runs in passes for correct z-ordering:
//! 1. Background (screen space)
//! 2. Group backgrounds with their label bars, file-name captions (world space)
//! 3. Edges with arrowheads and labels (world space)
//!
//! Text, link, and file content is not drawn here; overlays show it. The
//! cheap approximation path only sets a CSS transform on the canvas element.

use std::collections::HashSet;

use log::warn;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::geometry::EdgeCurve;
use super::scale::{ScaleConfig, ScaledValues};
use super::scheduler::{RenderSurface, Scene, ScreenTransform};
use super::theme::{NodeColors, Theme};
use super::transform::{Point, Rect};
use super::types::{CanvasNode, NodeKind};

const EDGE_LABEL_PADDING: f64 = 8.0;
const EDGE_LABEL_HEIGHT: f64 = 20.0;
const EDGE_LABEL_RADIUS: f64 = 4.0;

/// Traces a rounded rectangle as the current path.
fn round_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, width: f64, height: f64, radius: f64) {
	let r = radius.min(width / 2.0).min(height / 2.0).max(0.0);
	ctx.begin_path();
	ctx.move_to(x + r, y);
	ctx.line_to(x + width - r, y);
	ctx.quadratic_curve_to(x + width, y, x + width, y + r);
	ctx.line_to(x + width, y + height - r);
	ctx.quadratic_curve_to(x + width, y + height, x + width - r, y + height);
	ctx.line_to(x + r, y + height);
	ctx.quadratic_curve_to(x, y + height, x, y + height - r);
	ctx.line_to(x, y + r);
	ctx.quadratic_curve_to(x, y, x + r, y);
	ctx.close_path();
}

/// Bounding box of a curve's control polygon, which contains the curve.
fn curve_bounds(curve: &EdgeCurve) -> Rect {
	let points = [curve.start, curve.start_control, curve.end_control, curve.end];
	points.iter().fold(
		Rect::new(f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
		|r, p| Rect::new(r.left.min(p.x), r.top.min(p.y), r.right.max(p.x), r.bottom.max(p.y)),
	)
}

/// Canvas element plus its 2D context.
pub struct CanvasSurface {
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	config: ScaleConfig,
	theme: Theme,
	width: f64,
	height: f64,
	pixel_ratio: f64,
	/// Edges already reported as unresolvable.
	warned: HashSet<String>,
}

impl CanvasSurface {
	pub fn new(canvas: HtmlCanvasElement, config: ScaleConfig, theme: Theme) -> Option<Self> {
		let ctx = canvas
			.get_context("2d")
			.ok()
			.flatten()?
			.dyn_into::<CanvasRenderingContext2d>()
			.ok()?;
		let _ = canvas.style().set_property("transform-origin", "0 0");
		Some(Self {
			canvas,
			ctx,
			config,
			theme,
			width: 0.0,
			height: 0.0,
			pixel_ratio: 1.0,
			warned: HashSet::new(),
		})
	}

	/// Sizes the backing store for the device pixel ratio, keeping the CSS
	/// size at `width` x `height`.
	pub fn resize(&mut self, width: f64, height: f64, pixel_ratio: f64) {
		self.width = width;
		self.height = height;
		self.pixel_ratio = if pixel_ratio > 0.0 { pixel_ratio } else { 1.0 };
		self.canvas.set_width((width * self.pixel_ratio) as u32);
		self.canvas.set_height((height * self.pixel_ratio) as u32);
		let style = self.canvas.style();
		let _ = style.set_property("width", &format!("{width}px"));
		let _ = style.set_property("height", &format!("{height}px"));
	}

	fn draw_background(&self) {
		let ctx = &self.ctx;
		let _ = ctx.set_transform(self.pixel_ratio, 0.0, 0.0, self.pixel_ratio, 0.0, 0.0);
		ctx.clear_rect(0.0, 0.0, self.width, self.height);
		ctx.set_fill_style_str(&self.theme.background.to_css());
		ctx.fill_rect(0.0, 0.0, self.width, self.height);
	}

	fn draw_group(&self, node: &CanvasNode, scale: &ScaledValues) {
		let ctx = &self.ctx;
		let colors = NodeColors::resolve(node.color.as_deref());
		let radius = self.theme.node.corner_radius;

		ctx.set_fill_style_str(&colors.background.to_css());
		round_rect(ctx, node.x + 1.0, node.y + 1.0, node.width - 2.0, node.height - 2.0, radius);
		ctx.fill();
		ctx.set_stroke_style_str(&colors.border.to_css());
		ctx.set_line_width(scale.border_width);
		round_rect(ctx, node.x, node.y, node.width, node.height, radius);
		ctx.stroke();

		if let Some(label) = node.label.as_deref().filter(|l| !l.is_empty()) {
			self.draw_label_bar(node, label, &colors, scale);
		}
	}

	/// Rounded bar above the group's top-left corner.
	fn draw_label_bar(&self, node: &CanvasNode, label: &str, colors: &NodeColors, scale: &ScaledValues) {
		let ctx = &self.ctx;
		let bar = &scale.label_bar;
		ctx.set_font(&scale.label_font(self.theme.node.label_font_family));
		let text_width = ctx.measure_text(label).map(|m| m.width()).unwrap_or(0.0);
		let (x, y) = (node.x, node.y - bar.gap - bar.height);

		ctx.set_fill_style_str(&colors.border.to_css());
		round_rect(ctx, x, y, text_width + 2.0 * bar.padding, bar.height, bar.radius);
		ctx.fill();
		ctx.set_fill_style_str(&self.theme.node.label_color.to_css());
		let _ = ctx.fill_text(label, x + bar.padding, y + bar.height * 0.65);
	}

	fn draw_file_caption(&self, node: &CanvasNode) {
		let Some(file) = node.file.as_deref() else {
			return;
		};
		let ctx = &self.ctx;
		ctx.set_fill_style_str(&self.theme.node.caption_color.to_css());
		ctx.set_font(self.theme.node.caption_font);
		let _ = ctx.fill_text(file, node.x + 5.0, node.y - 10.0);
	}

	fn draw_edge(&self, curve: &EdgeCurve, label: Option<&str>, scale: &ScaledValues) {
		let ctx = &self.ctx;
		let style = &self.theme.edge;

		ctx.begin_path();
		ctx.move_to(curve.start.x, curve.start.y);
		ctx.bezier_curve_to(
			curve.start_control.x,
			curve.start_control.y,
			curve.end_control.x,
			curve.end_control.y,
			curve.end.x,
			curve.end.y,
		);
		ctx.set_stroke_style_str(&style.color.to_css());
		ctx.set_line_width(scale.edge_line_width);
		ctx.stroke();

		if let Some([tip, left, right]) = curve.arrowhead() {
			let sized = |p: Point| Point::new(
				tip.x + (p.x - tip.x) * scale.arrow_scale,
				tip.y + (p.y - tip.y) * scale.arrow_scale,
			);
			let (left, right) = (sized(left), sized(right));
			ctx.begin_path();
			ctx.move_to(tip.x, tip.y);
			ctx.line_to(left.x, left.y);
			ctx.line_to(right.x, right.y);
			ctx.close_path();
			ctx.set_fill_style_str(&style.color.to_css());
			ctx.fill();
		}

		let Some(label) = label.filter(|l| !l.is_empty()) else {
			return;
		};
		if scale.edge_label_alpha <= 0.0 {
			return;
		}
		let at = curve.point_at(0.5);
		ctx.set_global_alpha(scale.edge_label_alpha);
		ctx.set_font(style.label_font);
		let text_width = ctx.measure_text(label).map(|m| m.width()).unwrap_or(0.0);
		let box_width = text_width + EDGE_LABEL_PADDING * 2.0;
		ctx.set_fill_style_str(&style.label_background.to_css());
		round_rect(
			ctx,
			at.x - box_width / 2.0,
			at.y - EDGE_LABEL_HEIGHT / 2.0 - 2.0,
			box_width,
			EDGE_LABEL_HEIGHT,
			EDGE_LABEL_RADIUS,
		);
		ctx.fill();
		ctx.set_fill_style_str(&style.label_color.to_css());
		ctx.set_text_align("center");
		ctx.set_text_baseline("middle");
		let _ = ctx.fill_text(label, at.x, at.y - 2.0);
		ctx.set_text_align("left");
		ctx.set_text_baseline("alphabetic");
		ctx.set_global_alpha(1.0);
	}
}

impl RenderSurface for CanvasSurface {
	fn draw_full(&mut self, scene: Scene<'_>) {
		let _ = self.canvas.style().remove_property("transform");
		self.draw_background();

		let view = scene.viewport;
		let visible = view.visible_rect();
		let scale = ScaledValues::new(&self.config, view.scale());
		let offset = view.offset();

		self.ctx.save();
		let _ = self.ctx.translate(offset.x, offset.y);
		let _ = self.ctx.scale(view.scale(), view.scale());
		let _ = self.ctx.set_line_dash(&js_sys::Array::new());

		// Label bars and captions sit above their node.
		let margin = scale.label_bar.height + scale.label_bar.gap;
		for node in scene.document.nodes() {
			if !node.rect().expand(margin).intersects(&visible) {
				continue;
			}
			match node.kind {
				NodeKind::Group => self.draw_group(node, &scale),
				NodeKind::File => self.draw_file_caption(node),
				NodeKind::Text | NodeKind::Link => {}
			}
		}

		for edge in scene.document.edges() {
			match scene.document.endpoints(edge) {
				Ok((from, to)) => {
					let curve = scene.edges.curve(edge, from, to);
					if curve_bounds(&curve).expand(EDGE_LABEL_HEIGHT).intersects(&visible) {
						self.draw_edge(&curve, edge.label.as_deref(), &scale);
					}
				}
				Err(err) => {
					if self.warned.insert(edge.id.clone()) {
						warn!("canvas-viewer: skipping edge: {err}");
					}
				}
			}
		}

		self.ctx.restore();
	}

	fn apply_approximation(&mut self, transform: ScreenTransform) {
		let _ = self.canvas.style().set_property("transform", &transform.to_css());
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn curve_bounds_cover_control_polygon() {
		let curve = EdgeCurve {
			start: Point::new(0.0, 0.0),
			start_control: Point::new(100.0, -40.0),
			end_control: Point::new(-20.0, 80.0),
			end: Point::new(60.0, 50.0),
		};
		assert_eq!(curve_bounds(&curve), Rect::new(-20.0, -40.0, 100.0, 80.0));
	}
}
