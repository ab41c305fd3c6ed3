//! Non-owning message views over byte-slice segments.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::pointer::WORD_SIZE;
use crate::read::PointerReader;

/// An immutable message: an ordered set of borrowed segments.
///
/// Cloning is cheap (the segment table is shared), so readers carry their
/// message by value and can be returned from constructor functions.
#[derive(Debug, Clone)]
pub struct Message<'a> {
	segments: Arc<[&'a [u8]]>,
}

impl<'a> Message<'a> {
	/// Wraps a single buffer as segment 0.
	pub fn single_segment(data: &'a [u8]) -> Self {
		Self { segments: Arc::from(vec![data]) }
	}

	/// Builds a message from pre-split segments.
	pub fn from_segments(segments: Vec<&'a [u8]>) -> Self {
		Self { segments: segments.into() }
	}

	/// Parses the stream framing: a little-endian `u32` segment count minus
	/// one, one `u32` word length per segment, padding to a word boundary,
	/// then the segment bodies.
	pub fn from_stream(buf: &'a [u8]) -> Result<Self> {
		let count = read_u32(buf, 0).ok_or(Error::MalformedFraming("missing segment count"))? as usize + 1;
		let table_end = 4 + count * 4;
		let mut cursor = table_end.div_ceil(WORD_SIZE) * WORD_SIZE;
		let mut segments = Vec::with_capacity(count);
		for index in 0..count {
			let words =
				read_u32(buf, 4 + index * 4).ok_or(Error::MalformedFraming("truncated segment table"))? as usize;
			let bytes = words * WORD_SIZE;
			let Some(segment) = buf.get(cursor..cursor + bytes) else {
				return Err(Error::MalformedFraming("segment body extends past end of buffer"));
			};
			segments.push(segment);
			cursor += bytes;
		}
		Ok(Self { segments: segments.into() })
	}

	/// Number of segments.
	pub fn segment_count(&self) -> u32 {
		self.segments.len() as u32
	}

	/// Returns the segment with the given id.
	pub fn segment(&self, id: u32) -> Result<&'a [u8]> {
		self.segments.get(id as usize).copied().ok_or(Error::SegmentOutOfRange(id))
	}

	/// Resolves the root pointer at word 0 of segment 0.
	pub fn root(&self) -> Result<PointerReader<'a>> {
		PointerReader::at(self.clone(), 0, 0)
	}
}

pub(crate) fn read_u32(buf: &[u8], offset: usize) -> Option<u32> {
	let b = buf.get(offset..offset + 4)?;
	Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

pub(crate) fn read_word(segment: &[u8], word: u32) -> Option<u64> {
	let offset = word as usize * WORD_SIZE;
	let b = segment.get(offset..offset + WORD_SIZE)?;
	Some(u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
}
