//! Error types for the viewer engine.

/// Errors surfaced by the viewer engine.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
	/// The engine was used after `dispose()`.
	#[error("viewer has not been set up or has been disposed")]
	Disposed,

	/// The canvas document could not be parsed.
	#[error("invalid canvas document: {0}")]
	InvalidDocument(#[from] serde_json::Error),

	/// An edge references a node that is not in the document.
	#[error("edge {edge} references missing node {node}")]
	MissingNode {
		/// Edge id.
		edge: String,
		/// The id that did not resolve.
		node: String,
	},
}

/// Result alias for engine operations.
pub type Result<T, E = ViewerError> = std::result::Result<T, E>;
