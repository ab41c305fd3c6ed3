//! Constant view synthesis over caller-supplied buffers.
//!
//! Generated code embeds compile-time constants as raw little-endian words.
//! Rather than paying for the mutable builder path (or a writable backing
//! store), these helpers wrap such a buffer as a single-segment non-owning
//! message, fabricate the pointer descriptor a normal message would encode,
//! and return the typed read-only view directly.
//!
//! The caller guarantees the buffer already matches the shape's encoded
//! layout, including enough bytes for every element; no validation is
//! performed here, mirroring the trust-the-caller contract of the rest of
//! the pointer layer.

use crate::message::Message;
use crate::pointer::{ListShape, StructShape};
use crate::read::{ListReader, StructReader};

/// Fabricates a read-only struct view over `data`.
///
/// The view's data section starts at word 0 of the buffer, with the pointer
/// section immediately after it; the buffer is borrowed, never copied.
pub fn make_const_struct(shape: StructShape, data: &[u8]) -> StructReader<'_> {
	StructReader::synthetic(Message::single_segment(data), shape)
}

/// Fabricates a read-only list view of `len` elements over `data`.
///
/// Constant buffers carry no composite tag word: for composite element
/// shapes, element `i` begins at word `i × (data_words + pointer_words)`,
/// with the count and per-element footprint carried by the synthesized
/// descriptor instead.
pub fn make_const_list(shape: ListShape, data: &[u8], len: u32) -> ListReader<'_> {
	ListReader::synthetic(Message::single_segment(data), shape, len)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::pointer::ElementSize;
	use crate::testutil::words;

	#[test]
	fn const_struct_reads_raw_words() {
		let data = words(&[0x1111_2222_3333_4444, 0x5555_6666_7777_8888, 0]);
		let shape = StructShape { data_words: 2, pointer_words: 1 };
		let view = make_const_struct(shape, &data);
		assert_eq!(view.get_u64(0), 0x1111_2222_3333_4444);
		assert_eq!(view.get_u64(1), 0x5555_6666_7777_8888);
		assert_eq!(view.get_u32(1), 0x1111_2222);
		assert!(view.get_pointer(0).unwrap().is_null());
	}

	#[test]
	fn const_composite_list_elements_start_at_word_zero() {
		let data = words(&[10, 20, 30, 40]);
		let shape = ListShape {
			element_size: ElementSize::Composite,
			composite: Some(StructShape { data_words: 1, pointer_words: 0 }),
		};
		let view = make_const_list(shape, &data, 4);
		assert_eq!(view.len(), 4);
		for (index, expected) in [10u64, 20, 30, 40].into_iter().enumerate() {
			assert_eq!(view.get_struct(index as u32).unwrap().get_u64(0), expected);
		}
	}

	#[test]
	fn const_scalar_list_reads_elements() {
		let data = words(&[7, 8, 9]);
		let shape = ListShape { element_size: ElementSize::EightBytes, composite: None };
		let view = make_const_list(shape, &data, 3);
		assert_eq!(view.get_u64(0).unwrap(), 7);
		assert_eq!(view.get_u64(2).unwrap(), 9);
		assert!(view.get_u64(3).is_err());
	}

	#[test]
	fn const_composite_list_resolves_interior_pointers() {
		// Two elements of one data word and one pointer word each; the
		// second element's pointer targets text placed after the elements.
		let text = u64::from_le_bytes(*b"hi\0\0\0\0\0\0");
		let data = words(&[
			1,
			0,
			2,
			crate::pointer::list_pointer(0, ElementSize::Byte, 3),
			text,
		]);
		let shape = ListShape {
			element_size: ElementSize::Composite,
			composite: Some(StructShape { data_words: 1, pointer_words: 1 }),
		};
		let view = make_const_list(shape, &data, 2);
		let second = view.get_struct(1).unwrap();
		assert_eq!(second.get_u64(0), 2);
		assert_eq!(second.get_pointer(0).unwrap().to_text().unwrap(), "hi");
	}
}
