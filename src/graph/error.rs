//! Errors raised while loading a graph document.

/// Failure to turn input into a [`GraphDocument`](super::GraphDocument).
///
/// Everything past decoding degrades silently; see the parser.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
	/// The document is not valid JSON or does not match the expected shape.
	#[error("invalid graph document: {0}")]
	InvalidDocument(#[from] serde_json::Error),
}
