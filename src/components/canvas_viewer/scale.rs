//! Zoom-dependent sizes for canvas strokes and labels.
//!
//! Drawing happens after the viewport transform has been applied, so every
//! value produced here is in world units. Three behaviors decide how a base
//! size reacts to the current scale `k`:
//!
//! - [`ScaleBehavior::World`]: constant world size, grows when zoomed in.
//! - [`ScaleBehavior::Screen`]: constant pixel size, divided by `k`.
//! - [`ScaleBehavior::Clamped`]: world size whose on-screen size is kept
//!   within `min_screen..=max_screen` pixels.

/// How a visual size scales with zoom level.
#[derive(Clone, Debug, PartialEq)]
pub enum ScaleBehavior {
	/// Constant world-space size.
	World,
	/// Constant screen-space size (pixels).
	Screen,
	/// World-space size, clamped to a screen-space pixel range.
	Clamped {
		/// Smallest on-screen size.
		min_screen: f64,
		/// Largest on-screen size; `f64::INFINITY` for unbounded.
		max_screen: f64,
	},
}

impl ScaleBehavior {
	/// World-space size for a base value at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// How opacity fades with zoom level.
#[derive(Clone, Debug, PartialEq)]
pub enum AlphaBehavior {
	/// Always opaque.
	Constant,
	/// Invisible at `zero_alpha_k` and below, opaque from `full_alpha_k`.
	Fade {
		/// Zoom level at which alpha reaches 0.
		zero_alpha_k: f64,
		/// Zoom level at which alpha reaches 1.
		full_alpha_k: f64,
	},
}

impl AlphaBehavior {
	/// Opacity in `0..=1` at zoom `k`.
	pub fn apply(&self, k: f64) -> f64 {
		match self {
			AlphaBehavior::Constant => 1.0,
			AlphaBehavior::Fade {
				zero_alpha_k,
				full_alpha_k,
			} => {
				if zero_alpha_k == full_alpha_k {
					return 1.0;
				}
				((k - zero_alpha_k) / (full_alpha_k - zero_alpha_k)).clamp(0.0, 1.0)
			}
		}
	}
}

/// Group label bar dimensions, in the units of `behavior`.
#[derive(Clone, Debug)]
pub struct LabelBarConfig {
	/// Bar height.
	pub height: f64,
	/// Corner radius.
	pub radius: f64,
	/// Gap between the bar and the group's top edge.
	pub gap: f64,
	/// Label font size.
	pub font_size: f64,
	/// Horizontal text padding.
	pub padding: f64,
	/// Applied to every dimension above.
	pub behavior: ScaleBehavior,
}

/// Edge stroke and arrowhead sizing.
#[derive(Clone, Debug)]
pub struct EdgeScaleConfig {
	/// Base stroke width.
	pub line_width: f64,
	/// How `line_width` scales.
	pub line_behavior: ScaleBehavior,
	/// Multiplier on the arrowhead geometry.
	pub arrow_size: f64,
	/// How `arrow_size` scales.
	pub arrow_behavior: ScaleBehavior,
	/// Edge label fade-out when zoomed far out.
	pub label_alpha: AlphaBehavior,
}

/// All zoom-dependent visual parameters.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	/// Base node border width.
	pub border_width: f64,
	/// How `border_width` scales.
	pub border_behavior: ScaleBehavior,
	/// Group label bars.
	pub label_bar: LabelBarConfig,
	/// Edges.
	pub edge: EdgeScaleConfig,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			border_width: 2.0,
			border_behavior: ScaleBehavior::Clamped {
				min_screen: 1.0,
				max_screen: f64::INFINITY,
			},
			label_bar: LabelBarConfig {
				height: 30.0,
				radius: 6.0,
				gap: 8.0,
				font_size: 16.0,
				padding: 6.0,
				behavior: ScaleBehavior::Screen,
			},
			edge: EdgeScaleConfig {
				line_width: 2.0,
				line_behavior: ScaleBehavior::Clamped {
					min_screen: 1.0,
					max_screen: f64::INFINITY,
				},
				arrow_size: 1.0,
				arrow_behavior: ScaleBehavior::World,
				label_alpha: AlphaBehavior::Fade {
					zero_alpha_k: 0.15,
					full_alpha_k: 0.35,
				},
			},
		}
	}
}

/// World-space label bar dimensions for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelBar {
	/// Bar height.
	pub height: f64,
	/// Corner radius.
	pub radius: f64,
	/// Gap above the group.
	pub gap: f64,
	/// Font size.
	pub font_size: f64,
	/// Horizontal text padding.
	pub padding: f64,
}

/// Sizes for one zoom level. Computed once per full redraw.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// Zoom level these values were computed for.
	pub k: f64,
	/// Node border width.
	pub border_width: f64,
	/// Edge stroke width.
	pub edge_line_width: f64,
	/// Arrowhead multiplier.
	pub arrow_scale: f64,
	/// Edge label opacity.
	pub edge_label_alpha: f64,
	/// Group label bar.
	pub label_bar: LabelBar,
}

impl ScaledValues {
	/// Resolves every behavior in `config` at zoom `k`.
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let bar = &config.label_bar;
		let size = |base: f64| bar.behavior.apply(base, k);
		Self {
			k,
			border_width: config.border_behavior.apply(config.border_width, k),
			edge_line_width: config.edge.line_behavior.apply(config.edge.line_width, k),
			arrow_scale: config.edge.arrow_behavior.apply(config.edge.arrow_size, k),
			edge_label_alpha: config.edge.label_alpha.apply(k),
			label_bar: LabelBar {
				height: size(bar.height),
				radius: size(bar.radius),
				gap: size(bar.gap),
				font_size: size(bar.font_size),
				padding: size(bar.padding),
			},
		}
	}

	/// CSS font shorthand for group labels.
	pub fn label_font(&self, family: &str) -> String {
		format!("{}px {}", self.label_bar.font_size, family)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn behaviors() {
		assert_eq!(ScaleBehavior::World.apply(4.0, 2.0), 4.0);
		assert_eq!(ScaleBehavior::Screen.apply(4.0, 2.0), 2.0);
		let clamped = ScaleBehavior::Clamped {
			min_screen: 1.0,
			max_screen: 10.0,
		};
		// 2 world units at k = 0.25 would be 0.5px on screen.
		assert_eq!(clamped.apply(2.0, 0.25), 4.0);
		assert_eq!(clamped.apply(2.0, 1.0), 2.0);
		assert_eq!(clamped.apply(2.0, 10.0), 1.0);
	}

	#[test]
	fn alpha_fade() {
		let fade = AlphaBehavior::Fade {
			zero_alpha_k: 0.2,
			full_alpha_k: 0.4,
		};
		assert_eq!(fade.apply(0.1), 0.0);
		assert!((fade.apply(0.3) - 0.5).abs() < 1e-12);
		assert_eq!(fade.apply(2.0), 1.0);
		assert_eq!(AlphaBehavior::Constant.apply(0.01), 1.0);
	}

	#[test]
	fn label_bar_keeps_screen_size() {
		let config = ScaleConfig::default();
		let zoomed = ScaledValues::new(&config, 2.0);
		assert_eq!(zoomed.label_bar.height, 15.0);
		assert_eq!(zoomed.label_font("sans-serif"), "8px sans-serif");
		let unit = ScaledValues::new(&config, 1.0);
		assert_eq!(unit.label_bar.height, 30.0);
		assert_eq!(unit.edge_line_width, 2.0);
	}
}
