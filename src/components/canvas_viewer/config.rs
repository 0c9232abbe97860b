//! Tunable engine parameters.
//!
//! Read from a `<script id="viewer-options">` JSON element by the app; every
//! field has a default so partial option objects are accepted.

use log::warn;
use serde::Deserialize;

use super::spatial::{DEFAULT_CELL_SIZE, DEFAULT_THRESHOLD};

/// How wheel input is interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlSchema {
	/// Start as a mouse wheel, switch to trackpad panning once detected.
	#[default]
	Auto,
	/// Wheel always zooms.
	Mouse,
	/// Wheel pans; zoom only with the zoom modifier held.
	Trackpad,
}

/// Pointer and wheel recognition parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GestureConfig {
	/// Max taxicab displacement (px) for a contact to count as a tap.
	pub tap_threshold: f64,
	/// Zoom speed per wheel delta unit.
	pub wheel_zoom_speed: f64,
	/// Horizontal wheel delta must exceed `trackpad_ratio * |delta_y|` to
	/// classify the input device as a trackpad.
	pub trackpad_ratio: f64,
	/// Initial wheel interpretation.
	pub control_schema: ControlSchema,
	/// Disables the automatic switch from mouse to trackpad mode.
	pub lock_control_schema: bool,
}

impl Default for GestureConfig {
	fn default() -> Self {
		Self {
			tap_threshold: 5.0,
			wheel_zoom_speed: 0.002,
			trackpad_ratio: 1.0,
			control_schema: ControlSchema::Auto,
			lock_control_schema: false,
		}
	}
}

impl GestureConfig {
	/// Copy with out-of-range fields reset to their defaults.
	pub fn validated(self) -> Self {
		let default = Self::default();
		Self {
			tap_threshold: checked("gestures.tapThreshold", self.tap_threshold, default.tap_threshold, |v| v > 0.0),
			wheel_zoom_speed: checked(
				"gestures.wheelZoomSpeed",
				self.wheel_zoom_speed,
				default.wheel_zoom_speed,
				|v| v > 0.0,
			),
			trackpad_ratio: checked(
				"gestures.trackpadRatio",
				self.trackpad_ratio,
				default.trackpad_ratio,
				|v| v >= 0.0,
			),
			..self
		}
	}
}

/// Zoom animation parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ZoomConfig {
	/// Fraction of the remaining distance covered per frame, in (0, 1).
	pub smoothing: f64,
	/// Convergence tolerance relative to the target scale.
	pub relative_epsilon: f64,
	/// Absolute part of the convergence tolerance.
	pub absolute_epsilon: f64,
	/// Factor used by zoom-in / zoom-out buttons.
	pub step: f64,
}

impl Default for ZoomConfig {
	fn default() -> Self {
		Self {
			smoothing: 0.25,
			relative_epsilon: 0.01,
			absolute_epsilon: 0.002,
			step: 1.2,
		}
	}
}

impl ZoomConfig {
	/// Copy with out-of-range fields reset to their defaults.
	pub fn validated(self) -> Self {
		let default = Self::default();
		Self {
			smoothing: checked("zoom.smoothing", self.smoothing, default.smoothing, |v| v > 0.0 && v < 1.0),
			relative_epsilon: checked(
				"zoom.relativeEpsilon",
				self.relative_epsilon,
				default.relative_epsilon,
				|v| v >= 0.0,
			),
			absolute_epsilon: checked(
				"zoom.absoluteEpsilon",
				self.absolute_epsilon,
				default.absolute_epsilon,
				|v| v > 0.0,
			),
			step: checked("zoom.step", self.step, default.step, |v| v > 1.0),
		}
	}
}

/// Frame scheduling parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
	/// Longest time (ms) the cheap approximation may stand in for a redraw.
	pub throttle_ms: f64,
	/// Quiet time (ms) after an approximate frame before a full redraw.
	pub settle_ms: f64,
}

impl Default for RenderConfig {
	fn default() -> Self {
		Self {
			throttle_ms: 500.0,
			settle_ms: 60.0,
		}
	}
}

impl RenderConfig {
	/// Copy with out-of-range fields reset to their defaults.
	pub fn validated(self) -> Self {
		let default = Self::default();
		Self {
			throttle_ms: checked("render.throttleMs", self.throttle_ms, default.throttle_ms, |v| v >= 0.0),
			settle_ms: checked("render.settleMs", self.settle_ms, default.settle_ms, |v| v >= 0.0),
		}
	}
}

/// Hit-test index parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpatialConfig {
	/// Grid cell edge length (world units).
	pub cell_size: f64,
	/// Node count above which the grid is built; smaller documents are scanned.
	pub threshold: usize,
}

impl Default for SpatialConfig {
	fn default() -> Self {
		Self {
			cell_size: DEFAULT_CELL_SIZE,
			threshold: DEFAULT_THRESHOLD,
		}
	}
}

impl SpatialConfig {
	/// Copy with out-of-range fields reset to their defaults.
	pub fn validated(self) -> Self {
		Self {
			cell_size: checked("spatial.cellSize", self.cell_size, DEFAULT_CELL_SIZE, |v| v > 0.0),
			..self
		}
	}
}

/// Complete engine configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
	/// Pointer and wheel recognition.
	pub gestures: GestureConfig,
	/// Zoom easing.
	pub zoom: ZoomConfig,
	/// Frame scheduling.
	pub render: RenderConfig,
	/// Hit-test index.
	pub spatial: SpatialConfig,
	/// Padding (world units) around the node bounds when resetting the view.
	pub initial_padding: f64,
	/// Margin (world units) around the visible rect within which overlays stay shown.
	pub overlay_margin: f64,
	/// Freeze the viewer until a tap inside it, and again whenever the user
	/// presses outside of it.
	pub prevent_mistouch: bool,
}

impl Default for ViewerConfig {
	fn default() -> Self {
		Self {
			gestures: GestureConfig::default(),
			zoom: ZoomConfig::default(),
			render: RenderConfig::default(),
			spatial: SpatialConfig::default(),
			initial_padding: 100.0,
			overlay_margin: 200.0,
			prevent_mistouch: false,
		}
	}
}

impl ViewerConfig {
	/// Copy with every out-of-range field reset to its default.
	pub fn validated(self) -> Self {
		let default = Self::default();
		Self {
			gestures: self.gestures.validated(),
			zoom: self.zoom.validated(),
			render: self.render.validated(),
			spatial: self.spatial.validated(),
			initial_padding: checked(
				"initialPadding",
				self.initial_padding,
				default.initial_padding,
				|v| v >= 0.0,
			),
			overlay_margin: checked("overlayMargin", self.overlay_margin, default.overlay_margin, |v| v >= 0.0),
			..self
		}
	}
}

/// `value` if finite and accepted by `valid`, otherwise `default`.
fn checked(name: &str, value: f64, default: f64, valid: impl Fn(f64) -> bool) -> f64 {
	if value.is_finite() && valid(value) {
		value
	} else {
		warn!("canvas-viewer: option {name} = {value} is out of range, using {default}");
		default
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_options_fill_defaults() {
		let config: ViewerConfig = serde_json::from_str(
			r#"{ "gestures": { "tapThreshold": 8, "controlSchema": "trackpad" }, "render": { "throttleMs": 250 } }"#,
		)
		.unwrap();
		assert_eq!(config.gestures.tap_threshold, 8.0);
		assert_eq!(config.gestures.control_schema, ControlSchema::Trackpad);
		assert_eq!(config.gestures.wheel_zoom_speed, 0.002);
		assert_eq!(config.render.throttle_ms, 250.0);
		assert_eq!(config.render.settle_ms, 60.0);
		assert_eq!(config.spatial, SpatialConfig::default());
	}

	#[test]
	fn empty_object_is_default() {
		let config: ViewerConfig = serde_json::from_str("{}").unwrap();
		assert_eq!(config, ViewerConfig::default());
	}

	#[test]
	fn defaults_survive_validation() {
		assert_eq!(ViewerConfig::default().validated(), ViewerConfig::default());
	}

	#[test]
	fn smoothing_outside_unit_interval_is_reset() {
		for smoothing in [0.0, 1.0, -0.5, 3.0, f64::NAN] {
			let zoom = ZoomConfig {
				smoothing,
				..ZoomConfig::default()
			}
			.validated();
			assert_eq!(zoom.smoothing, 0.25, "smoothing {smoothing}");
		}
		let zoom = ZoomConfig {
			smoothing: 0.6,
			..ZoomConfig::default()
		}
		.validated();
		assert_eq!(zoom.smoothing, 0.6);
	}

	#[test]
	fn zoom_step_must_grow() {
		let zoom = ZoomConfig {
			step: 1.0,
			absolute_epsilon: 0.0,
			..ZoomConfig::default()
		}
		.validated();
		assert_eq!((zoom.step, zoom.absolute_epsilon), (1.2, 0.002));
	}

	#[test]
	fn gesture_thresholds_are_checked() {
		let gestures = GestureConfig {
			tap_threshold: 0.0,
			wheel_zoom_speed: f64::INFINITY,
			trackpad_ratio: -2.0,
			control_schema: ControlSchema::Mouse,
			lock_control_schema: true,
		}
		.validated();
		assert_eq!(gestures.tap_threshold, 5.0);
		assert_eq!(gestures.wheel_zoom_speed, 0.002);
		assert_eq!(gestures.trackpad_ratio, 1.0);
		assert_eq!(gestures.control_schema, ControlSchema::Mouse);
		assert!(gestures.lock_control_schema);

		let gestures = GestureConfig {
			trackpad_ratio: 0.0,
			..GestureConfig::default()
		}
		.validated();
		assert_eq!(gestures.trackpad_ratio, 0.0);
	}

	#[test]
	fn render_timings_must_be_non_negative() {
		let render = RenderConfig {
			throttle_ms: -10.0,
			settle_ms: f64::NAN,
		}
		.validated();
		assert_eq!(render, RenderConfig::default());
		let render = RenderConfig {
			throttle_ms: 0.0,
			settle_ms: 0.0,
		}
		.validated();
		assert_eq!((render.throttle_ms, render.settle_ms), (0.0, 0.0));
	}

	#[test]
	fn deserialized_nonsense_is_reset_by_validation() {
		let config: ViewerConfig = serde_json::from_str(
			r#"{ "zoom": { "smoothing": 0 }, "spatial": { "cellSize": -5, "threshold": 3 }, "overlayMargin": -1, "preventMistouch": true }"#,
		)
		.unwrap();
		let config = config.validated();
		assert_eq!(config.zoom.smoothing, 0.25);
		assert_eq!(config.spatial.cell_size, DEFAULT_CELL_SIZE);
		assert_eq!(config.spatial.threshold, 3);
		assert_eq!(config.overlay_margin, 200.0);
		assert!(config.prevent_mistouch);
	}
}
