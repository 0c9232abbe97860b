//! Policy deciding how nodes respond to clicks.

use super::types::{CanvasNode, NodeKind};

/// Response to a resolved click on a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interaction {
	/// Focus the node's overlay.
	Select,
	/// Open the node's content in a modal preview.
	Preview,
	/// Clicks pass through the node.
	NonInteractive,
}

/// Decides the click response for a node. Hit-testing skips nodes that
/// classify as [`Interaction::NonInteractive`].
pub trait NodeClassifier {
	/// Click response for `node`.
	fn classify(&self, node: &CanvasNode) -> Interaction;

	/// Whether hit-testing may return `node`.
	fn is_interactive(&self, node: &CanvasNode) -> bool {
		self.classify(node) != Interaction::NonInteractive
	}
}

/// Text and link nodes select; markdown and audio files select, other files
/// preview; groups never respond.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultClassifier;

const SELECTABLE_FILES: &[&str] = &["md", "wav", "mp3"];

impl NodeClassifier for DefaultClassifier {
	fn classify(&self, node: &CanvasNode) -> Interaction {
		match node.kind {
			NodeKind::Text | NodeKind::Link => Interaction::Select,
			NodeKind::Group => Interaction::NonInteractive,
			NodeKind::File => match node.file.as_deref().and_then(extension) {
				Some(ext) if SELECTABLE_FILES.iter().any(|s| s.eq_ignore_ascii_case(ext)) => Interaction::Select,
				Some(_) => Interaction::Preview,
				None => Interaction::NonInteractive,
			},
		}
	}
}

fn extension(file: &str) -> Option<&str> {
	file.rsplit_once('.').map(|(_, ext)| ext)
}
