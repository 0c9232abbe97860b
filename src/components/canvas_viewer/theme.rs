//! Visual theming for the canvas viewer.
//!
//! Node colors follow the JSON Canvas convention: either one of six preset
//! indices ("1" to "6") or a `#rrggbb` hex string. Each resolved color yields
//! a border, background, and active variant that differ only in alpha.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Alpha in `0..=1`.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with alpha.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same color, new alpha.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Parses `#rrggbb` (the leading `#` is optional).
	pub fn from_hex(hex: &str) -> Option<Self> {
		let hex = hex.trim().trim_start_matches('#');
		if hex.len() != 6 || !hex.is_ascii() {
			return None;
		}
		let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
		Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
	}

	/// `#rrggbb` when opaque, `rgba(..)` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// The six JSON Canvas presets, red through purple.
pub const PRESET_COLORS: [Color; 6] = [
	Color::rgb(255, 120, 129),
	Color::rgb(251, 187, 131),
	Color::rgb(255, 232, 139),
	Color::rgb(124, 211, 124),
	Color::rgb(134, 223, 226),
	Color::rgb(203, 158, 255),
];

/// Used when a node has no color or an unrecognized one.
pub const FALLBACK_COLOR: Color = Color::rgb(140, 140, 140);

const BORDER_ALPHA: f64 = 0.75;
const BACKGROUND_ALPHA: f64 = 0.1;

/// Alpha variants of one node color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeColors {
	/// Rectangle stroke.
	pub border: Color,
	/// Rectangle fill.
	pub background: Color,
	/// Selected node stroke and group label bar.
	pub active: Color,
}

impl NodeColors {
	/// Derives the variants from an opaque base color.
	pub fn from_base(base: Color) -> Self {
		Self {
			border: base.with_alpha(BORDER_ALPHA),
			background: base.with_alpha(BACKGROUND_ALPHA),
			active: base.with_alpha(1.0),
		}
	}

	/// Resolves a node's `color` attribute.
	pub fn resolve(color: Option<&str>) -> Self {
		let base = match color {
			Some(index) if index.len() == 1 => index
				.parse::<usize>()
				.ok()
				.and_then(|i| i.checked_sub(1))
				.and_then(|i| PRESET_COLORS.get(i).copied()),
			Some(hex) => Color::from_hex(hex),
			None => None,
		};
		Self::from_base(base.unwrap_or(FALLBACK_COLOR))
	}
}

/// Edge stroke and label colors.
#[derive(Clone, Debug)]
pub struct EdgeStyle {
	/// Stroke and arrowhead.
	pub color: Color,
	/// Fill of the label box.
	pub label_background: Color,
	/// Label text.
	pub label_color: Color,
	/// CSS font of edge labels.
	pub label_font: &'static str,
}

/// Node text colors.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Group label bar text.
	pub label_color: Color,
	/// Font family for group labels; the size comes from [`ScaledValues`](super::scale::ScaledValues).
	pub label_font_family: &'static str,
	/// File-name caption above file nodes.
	pub caption_color: Color,
	/// CSS font of file-name captions.
	pub caption_font: &'static str,
	/// Corner radius of node rectangles in world units.
	pub corner_radius: f64,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Name accepted by [`Theme::by_name`].
	pub name: &'static str,
	/// Canvas clear color.
	pub background: Color,
	/// Edge colors.
	pub edge: EdgeStyle,
	/// Node text colors.
	pub node: NodeStyle,
}

impl Theme {
	/// Dark theme (default).
	pub fn dark() -> Self {
		Self {
			name: "dark",
			background: Color::rgb(30, 30, 30),
			edge: EdgeStyle {
				color: Color::rgb(204, 204, 204),
				label_background: Color::rgb(34, 34, 34),
				label_color: Color::rgb(204, 204, 204),
				label_font: "18px sans-serif",
			},
			node: NodeStyle {
				label_color: Color::rgb(255, 255, 255),
				label_font_family: "'Inter', sans-serif",
				caption_color: Color::rgb(255, 255, 255),
				caption_font: "16px sans-serif",
				corner_radius: 12.0,
			},
		}
	}

	/// Light theme.
	pub fn light() -> Self {
		Self {
			name: "light",
			background: Color::rgb(250, 250, 250),
			edge: EdgeStyle {
				color: Color::rgb(110, 110, 110),
				label_background: Color::rgb(235, 235, 235),
				label_color: Color::rgb(50, 50, 50),
				label_font: "18px sans-serif",
			},
			node: NodeStyle {
				label_color: Color::rgb(255, 255, 255),
				label_font_family: "'Inter', sans-serif",
				caption_color: Color::rgb(40, 40, 40),
				caption_font: "16px sans-serif",
				corner_radius: 12.0,
			},
		}
	}

	/// Looks up a built-in theme.
	pub fn by_name(name: &str) -> Option<Self> {
		match name {
			"dark" => Some(Self::dark()),
			"light" => Some(Self::light()),
			_ => None,
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::dark()
	}
}
