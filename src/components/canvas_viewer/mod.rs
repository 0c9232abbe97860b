//! JSON Canvas viewer component.
//!
//! Renders a canvas document of positioned nodes and curved edges on an HTML
//! canvas with:
//! - Drag, pinch, wheel, and trackpad pan/zoom resolved into normalized intents
//! - Eased zoom that keeps the zoom anchor fixed on screen
//! - Grid-accelerated hit-testing for click selection
//! - Per-frame choice between a full redraw and a CSS-transform approximation
//! - DOM overlays for text, link, and file content kept aligned with the view
//!
//! The engine ([`CanvasViewerState`]) is plain Rust; the DOM-facing parts
//! implement its collaborator traits ([`RenderSurface`], [`OverlaySync`],
//! [`ViewportIndicator`]) and stay private to the component.
//!
//! # Example
//!
//! ```ignore
//! use canvas_viewer::{CanvasData, CanvasViewer};
//!
//! let data = CanvasData::from_json(r#"{"nodes": [], "edges": []}"#)?;
//! view! { <CanvasViewer data=data fullscreen=true minimap=true /> }
//! ```

mod classifier;
mod component;
pub mod config;
mod error;
mod geometry;
mod gesture;
mod minimap;
mod mistouch;
mod overlay;
mod render;
pub mod scale;
mod scheduler;
mod spatial;
mod state;
pub mod theme;
pub mod transform;
mod types;
mod zoom;

pub use classifier::{DefaultClassifier, Interaction, NodeClassifier};
pub use component::CanvasViewer;
pub use config::{ControlSchema, ViewerConfig};
pub use error::{Result, ViewerError};
pub use geometry::{EdgeCurve, EdgeGeometryCache};
pub use gesture::{ContactTarget, Intent, PointerId, PointerInput, WheelInput};
pub use minimap::ViewportIndicator;
pub use overlay::OverlaySync;
pub use scheduler::{FrameDecision, FrameTargets, RenderSurface, Scene, ScreenTransform};
pub use state::{CanvasViewerState, ViewerEvent};
pub use theme::Theme;
pub use transform::{Point, Rect, Viewport};
pub use types::{CanvasData, CanvasDocument, CanvasEdge, CanvasNode, NodeBounds, NodeKind, Side};
