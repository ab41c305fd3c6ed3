//! Error types for wire-format decoding.

use thiserror::Error;

/// Result alias for wire operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while decoding wire data.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
	/// The stream framing header is truncated or inconsistent with the buffer.
	#[error("malformed stream framing: {0}")]
	MalformedFraming(&'static str),

	/// A pointer referenced a segment id the message does not contain.
	#[error("segment {0} out of range")]
	SegmentOutOfRange(u32),

	/// A pointer or its content lies outside its segment.
	#[error("pointer target out of bounds in segment {segment}")]
	PointerOutOfBounds {
		/// Segment the pointer resolved into.
		segment: u32,
	},

	/// A pointer of one kind was found where another kind was expected.
	#[error("expected {expected} pointer, found {found}")]
	UnexpectedPointer {
		/// The kind the caller asked for.
		expected: &'static str,
		/// The kind actually encoded.
		found: &'static str,
	},

	/// A far pointer's landing pad did not resolve to content.
	#[error("unresolvable far pointer chain in segment {0}")]
	BadFarPointer(u32),

	/// List element index past the end of the list.
	#[error("list index {index} out of bounds (len {len})")]
	IndexOutOfBounds {
		/// The requested element index.
		index: u32,
		/// The list length.
		len: u32,
	},

	/// A list element access did not match the list's element size class.
	#[error("cannot read {wanted} element from {actual} list")]
	WrongElementType {
		/// The element class the caller asked for.
		wanted: &'static str,
		/// The element class the list encodes.
		actual: &'static str,
	},

	/// Text content was not valid UTF-8.
	#[error("text is not valid UTF-8: {0}")]
	InvalidUtf8(#[from] std::str::Utf8Error),

	/// Text content was missing its NUL terminator.
	#[error("text is missing its NUL terminator")]
	MissingNulTerminator,

	/// Packed codec input was not a whole number of words.
	#[error("packed codec input length {0} is not word-aligned")]
	UnalignedInput(usize),

	/// Packed data ended in the middle of a run.
	#[error("packed data is truncated")]
	TruncatedPacked,
}
