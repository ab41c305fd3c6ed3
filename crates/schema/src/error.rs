//! Error types for the schema bootstrap registry.

use thiserror::Error;

/// Result alias for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Errors produced by schema decoding and default-value lookup.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SchemaError {
	/// Invariant violation: correct generated code over a consistent schema
	/// corpus can never reach this state.
	#[error("invariant violation: unreachable code")]
	Unreachable,

	/// A type identifier string was not valid hexadecimal.
	#[error("invalid type id {0:?}")]
	InvalidTypeId(String),

	/// The embedded payload was not valid base64.
	#[error("base64 decode failed: {0}")]
	Base64(#[from] base64::DecodeError),

	/// The compressed payload could not be inflated.
	#[error("decompression failed: {0}")]
	Inflate(#[source] std::io::Error),

	/// The packed document could not be compressed for embedding.
	#[error("compression failed: {0}")]
	Deflate(#[source] std::io::Error),

	/// The decoded buffer was not a well-formed message.
	#[error(transparent)]
	Wire(#[from] weft_wire::Error),
}
