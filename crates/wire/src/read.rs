//! Typed read-only views over message content.
//!
//! Readers follow the wire default-value conventions: scalar reads beyond a
//! struct's data section yield zero, pointer reads beyond its pointer
//! section yield a null pointer, and a null pointer reads as an empty
//! struct, list, or text. Structural inconsistencies (wrong pointer kind,
//! out-of-segment content) are reported errors.

use crate::error::{Error, Result};
use crate::message::{Message, read_word};
use crate::pointer::{ElementSize, ListShape, RawPointer, StructShape, WORD_SIZE};

/// A pointer resolved to its content location.
#[derive(Debug, Clone)]
pub struct PointerReader<'a> {
	msg: Message<'a>,
	/// Segment holding the content.
	segment: u32,
	/// First word of the content within `segment`.
	content: u32,
	/// Descriptor after far-pointer resolution; never `Far`.
	descriptor: RawPointer,
}

impl<'a> PointerReader<'a> {
	/// Reads and resolves the pointer word at `(segment, word)`.
	pub(crate) fn at(msg: Message<'a>, segment: u32, word: u32) -> Result<Self> {
		let seg = msg.segment(segment)?;
		let raw = read_word(seg, word).ok_or(Error::PointerOutOfBounds { segment })?;
		Self::resolve(msg, segment, word, RawPointer::parse(raw))
	}

	fn resolve(msg: Message<'a>, segment: u32, word: u32, parsed: RawPointer) -> Result<Self> {
		match parsed {
			RawPointer::Far { double, word: pad, segment: target } => {
				let seg = msg.segment(target)?;
				let pad_word = read_word(seg, pad).ok_or(Error::PointerOutOfBounds { segment: target })?;
				let pad_ptr = RawPointer::parse(pad_word);
				if !double {
					if matches!(pad_ptr, RawPointer::Far { .. }) {
						return Err(Error::BadFarPointer(target));
					}
					return Self::resolve(msg, target, pad, pad_ptr);
				}
				// Double-far: the pad is a one-hop far pointer to the content
				// start, and the word after it is the descriptor with its
				// offset field unused.
				let RawPointer::Far { double: false, word: content, segment: content_segment } = pad_ptr else {
					return Err(Error::BadFarPointer(target));
				};
				let tag_word = read_word(seg, pad + 1).ok_or(Error::PointerOutOfBounds { segment: target })?;
				let descriptor = RawPointer::parse(tag_word);
				if matches!(descriptor, RawPointer::Far { .. }) {
					return Err(Error::BadFarPointer(target));
				}
				Ok(Self { msg, segment: content_segment, content, descriptor })
			}
			descriptor => {
				let content = match descriptor {
					RawPointer::Struct { offset, .. } | RawPointer::List { offset, .. } => {
						(i64::from(word) + 1 + i64::from(offset)) as u32
					}
					_ => 0,
				};
				Ok(Self { msg, segment, content, descriptor })
			}
		}
	}

	/// A null pointer attached to `msg`.
	pub(crate) fn null(msg: Message<'a>) -> Self {
		Self { msg, segment: 0, content: 0, descriptor: RawPointer::Null }
	}

	/// Returns true if the pointer is null.
	pub fn is_null(&self) -> bool {
		matches!(self.descriptor, RawPointer::Null)
	}

	/// The resolved descriptor.
	pub fn descriptor(&self) -> RawPointer {
		self.descriptor
	}

	/// Views the target as a struct.
	pub fn to_struct(&self) -> Result<StructReader<'a>> {
		match self.descriptor {
			RawPointer::Null => Ok(StructReader::empty(self.msg.clone())),
			RawPointer::Struct { data_words, pointer_words, .. } => Ok(StructReader {
				msg: self.msg.clone(),
				segment: self.segment,
				data_start: self.content,
				data_words,
				ptr_start: self.content + u32::from(data_words),
				pointer_words,
			}),
			other => Err(Error::UnexpectedPointer { expected: "struct", found: other.kind_name() }),
		}
	}

	/// Views the target as a list.
	pub fn to_list(&self) -> Result<ListReader<'a>> {
		match self.descriptor {
			RawPointer::Null => Ok(ListReader::empty(self.msg.clone())),
			RawPointer::List { element_size: ElementSize::Composite, .. } => {
				// Composite content begins with a tag word carrying the
				// element count and per-element section sizes.
				let seg = self.msg.segment(self.segment)?;
				let tag = read_word(seg, self.content).ok_or(Error::PointerOutOfBounds { segment: self.segment })?;
				let (count, data_words, pointer_words) = match RawPointer::parse(tag) {
					RawPointer::Null => (0, 0, 0),
					RawPointer::Struct { offset, data_words, pointer_words } => {
						(offset.max(0) as u32, data_words, pointer_words)
					}
					other => {
						return Err(Error::UnexpectedPointer {
							expected: "composite list tag",
							found: other.kind_name(),
						});
					}
				};
				Ok(ListReader {
					msg: self.msg.clone(),
					segment: self.segment,
					content: self.content + 1,
					len: count,
					element_size: ElementSize::Composite,
					data_words,
					pointer_words,
				})
			}
			RawPointer::List { element_size, count, .. } => Ok(ListReader {
				msg: self.msg.clone(),
				segment: self.segment,
				content: self.content,
				len: count,
				element_size,
				data_words: 0,
				pointer_words: 0,
			}),
			other => Err(Error::UnexpectedPointer { expected: "list", found: other.kind_name() }),
		}
	}

	/// Views the target as NUL-terminated UTF-8 text.
	pub fn to_text(&self) -> Result<&'a str> {
		if self.is_null() {
			return Ok("");
		}
		let bytes = self.byte_content("text")?;
		let Some((&0, body)) = bytes.split_last() else {
			return Err(Error::MissingNulTerminator);
		};
		Ok(std::str::from_utf8(body)?)
	}

	/// Views the target as a raw data blob.
	pub fn to_data(&self) -> Result<&'a [u8]> {
		if self.is_null() {
			return Ok(&[]);
		}
		self.byte_content("data")
	}

	fn byte_content(&self, expected: &'static str) -> Result<&'a [u8]> {
		match self.descriptor {
			RawPointer::List { element_size: ElementSize::Byte, count, .. } => {
				let seg = self.msg.segment(self.segment)?;
				let start = self.content as usize * WORD_SIZE;
				seg.get(start..start + count as usize)
					.ok_or(Error::PointerOutOfBounds { segment: self.segment })
			}
			other => Err(Error::UnexpectedPointer { expected, found: other.kind_name() }),
		}
	}
}

/// A read-only struct view: a data section and a pointer section.
#[derive(Debug, Clone)]
pub struct StructReader<'a> {
	msg: Message<'a>,
	segment: u32,
	data_start: u32,
	data_words: u16,
	ptr_start: u32,
	pointer_words: u16,
}

impl<'a> StructReader<'a> {
	pub(crate) fn empty(msg: Message<'a>) -> Self {
		Self { msg, segment: 0, data_start: 0, data_words: 0, ptr_start: 0, pointer_words: 0 }
	}

	/// A struct view at word 0 of segment 0, shaped by `shape` rather than
	/// by an encoded pointer. Used for constant views.
	pub(crate) fn synthetic(msg: Message<'a>, shape: StructShape) -> Self {
		Self {
			msg,
			segment: 0,
			data_start: 0,
			data_words: shape.data_words,
			ptr_start: u32::from(shape.data_words),
			pointer_words: shape.pointer_words,
		}
	}

	/// Data section size in words.
	pub fn data_words(&self) -> u16 {
		self.data_words
	}

	/// Pointer section size in words.
	pub fn pointer_words(&self) -> u16 {
		self.pointer_words
	}

	fn data_bytes(&self, offset: usize, len: usize) -> Option<&'a [u8]> {
		if offset + len > self.data_words as usize * WORD_SIZE {
			return None;
		}
		let seg = self.msg.segment(self.segment).ok()?;
		let start = self.data_start as usize * WORD_SIZE + offset;
		seg.get(start..start + len)
	}

	/// Reads the `index`th 64-bit data slot; out-of-section reads are zero.
	pub fn get_u64(&self, index: u32) -> u64 {
		self.data_bytes(index as usize * 8, 8)
			.map(|b| u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
			.unwrap_or(0)
	}

	/// Reads the `index`th 32-bit data slot.
	pub fn get_u32(&self, index: u32) -> u32 {
		self.data_bytes(index as usize * 4, 4).map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]])).unwrap_or(0)
	}

	/// Reads the `index`th 16-bit data slot.
	pub fn get_u16(&self, index: u32) -> u16 {
		self.data_bytes(index as usize * 2, 2).map(|b| u16::from_le_bytes([b[0], b[1]])).unwrap_or(0)
	}

	/// Reads the `index`th byte of the data section.
	pub fn get_u8(&self, index: u32) -> u8 {
		self.data_bytes(index as usize, 1).map(|b| b[0]).unwrap_or(0)
	}

	/// Reads the `bit`th bit of the data section.
	pub fn get_bool(&self, bit: u32) -> bool {
		self.get_u8(bit / 8) & (1 << (bit % 8)) != 0
	}

	/// Resolves the `index`th pointer; out-of-section reads yield null.
	pub fn get_pointer(&self, index: u16) -> Result<PointerReader<'a>> {
		if index >= self.pointer_words {
			return Ok(PointerReader::null(self.msg.clone()));
		}
		PointerReader::at(self.msg.clone(), self.segment, self.ptr_start + u32::from(index))
	}
}

/// A read-only list view.
#[derive(Debug, Clone)]
pub struct ListReader<'a> {
	msg: Message<'a>,
	segment: u32,
	/// First element word; the composite tag word is already skipped.
	content: u32,
	len: u32,
	element_size: ElementSize,
	data_words: u16,
	pointer_words: u16,
}

impl<'a> ListReader<'a> {
	pub(crate) fn empty(msg: Message<'a>) -> Self {
		Self { msg, segment: 0, content: 0, len: 0, element_size: ElementSize::Void, data_words: 0, pointer_words: 0 }
	}

	/// A list view at word 0 of segment 0, shaped by `shape` rather than by
	/// an encoded pointer. Constant buffers carry no tag word, so composite
	/// element `i` begins at word `i × (data_words + pointer_words)`.
	pub(crate) fn synthetic(msg: Message<'a>, shape: ListShape, len: u32) -> Self {
		let composite = shape.composite.unwrap_or(StructShape { data_words: 0, pointer_words: 0 });
		Self {
			msg,
			segment: 0,
			content: 0,
			len,
			element_size: shape.element_size,
			data_words: composite.data_words,
			pointer_words: composite.pointer_words,
		}
	}

	/// Number of elements.
	pub fn len(&self) -> u32 {
		self.len
	}

	/// Returns true if the list has no elements.
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	fn check(&self, index: u32) -> Result<()> {
		if index < self.len { Ok(()) } else { Err(Error::IndexOutOfBounds { index, len: self.len }) }
	}

	fn stride_words(&self) -> u32 {
		u32::from(self.data_words) + u32::from(self.pointer_words)
	}

	/// Views composite element `index` as a struct.
	pub fn get_struct(&self, index: u32) -> Result<StructReader<'a>> {
		self.check(index)?;
		match self.element_size {
			ElementSize::Composite => {
				let start = self.content + index * self.stride_words();
				Ok(StructReader {
					msg: self.msg.clone(),
					segment: self.segment,
					data_start: start,
					data_words: self.data_words,
					ptr_start: start + u32::from(self.data_words),
					pointer_words: self.pointer_words,
				})
			}
			ElementSize::Pointer => self.get_pointer(index)?.to_struct(),
			other => Err(Error::WrongElementType { wanted: "struct", actual: other.name() }),
		}
	}

	/// Reads eight-byte scalar element `index`.
	pub fn get_u64(&self, index: u32) -> Result<u64> {
		self.check(index)?;
		if self.element_size != ElementSize::EightBytes {
			return Err(Error::WrongElementType { wanted: "eight-byte", actual: self.element_size.name() });
		}
		let seg = self.msg.segment(self.segment)?;
		read_word(seg, self.content + index).ok_or(Error::PointerOutOfBounds { segment: self.segment })
	}

	/// Reads byte element `index`.
	pub fn get_u8(&self, index: u32) -> Result<u8> {
		self.check(index)?;
		if self.element_size != ElementSize::Byte {
			return Err(Error::WrongElementType { wanted: "byte", actual: self.element_size.name() });
		}
		let seg = self.msg.segment(self.segment)?;
		let offset = self.content as usize * WORD_SIZE + index as usize;
		seg.get(offset).copied().ok_or(Error::PointerOutOfBounds { segment: self.segment })
	}

	/// Resolves pointer element `index`.
	pub fn get_pointer(&self, index: u32) -> Result<PointerReader<'a>> {
		self.check(index)?;
		if self.element_size != ElementSize::Pointer {
			return Err(Error::WrongElementType { wanted: "pointer", actual: self.element_size.name() });
		}
		PointerReader::at(self.msg.clone(), self.segment, self.content + index)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::pointer::{composite_tag, list_pointer, struct_pointer};
	use crate::testutil::words;

	#[test]
	fn struct_reads_beyond_data_section_are_zero() {
		let data = words(&[struct_pointer(0, 1, 0), 0x0102_0304_0506_0708]);
		let msg = Message::single_segment(&data);
		let root = msg.root().unwrap().to_struct().unwrap();
		assert_eq!(root.get_u64(0), 0x0102_0304_0506_0708);
		assert_eq!(root.get_u64(1), 0);
		assert_eq!(root.get_u32(2), 0);
		assert_eq!(root.get_u16(0), 0x0708);
		assert_eq!(root.get_u8(7), 0x01);
		assert!(root.get_bool(3));
		assert!(root.get_pointer(0).unwrap().is_null());
	}

	#[test]
	fn null_pointer_reads_as_empty_views() {
		let data = words(&[0]);
		let msg = Message::single_segment(&data);
		let root = msg.root().unwrap();
		assert!(root.is_null());
		assert_eq!(root.to_struct().unwrap().get_u64(0), 0);
		assert!(root.to_list().unwrap().is_empty());
		assert_eq!(root.to_text().unwrap(), "");
		assert_eq!(root.to_data().unwrap(), &[] as &[u8]);
	}

	#[test]
	fn reads_text_with_nul_terminator() {
		let mut seg = vec![list_pointer(0, ElementSize::Byte, 6)];
		seg.push(u64::from_le_bytes(*b"hello\0\0\0"));
		let data = words(&seg);
		let msg = Message::single_segment(&data);
		assert_eq!(msg.root().unwrap().to_text().unwrap(), "hello");
	}

	#[test]
	fn text_without_terminator_is_an_error() {
		let mut seg = vec![list_pointer(0, ElementSize::Byte, 5)];
		seg.push(u64::from_le_bytes(*b"hello\0\0\0"));
		let data = words(&seg);
		let msg = Message::single_segment(&data);
		assert!(matches!(msg.root().unwrap().to_text(), Err(Error::MissingNulTerminator)));
	}

	#[test]
	fn composite_list_skips_tag_word() {
		let data = words(&[
			list_pointer(0, ElementSize::Composite, 4),
			composite_tag(2, 2, 0),
			10,
			11,
			20,
			21,
		]);
		let msg = Message::single_segment(&data);
		let list = msg.root().unwrap().to_list().unwrap();
		assert_eq!(list.len(), 2);
		assert_eq!(list.get_struct(0).unwrap().get_u64(1), 11);
		assert_eq!(list.get_struct(1).unwrap().get_u64(0), 20);
		assert!(matches!(list.get_struct(2), Err(Error::IndexOutOfBounds { index: 2, len: 2 })));
	}

	#[test]
	fn far_pointer_resolves_across_segments() {
		let seg0 = words(&[RawPointer::Far { double: false, word: 0, segment: 1 }.encode()]);
		let seg1 = words(&[struct_pointer(0, 1, 0), 77]);
		let msg = Message::from_segments(vec![seg0.as_slice(), seg1.as_slice()]);
		let root = msg.root().unwrap().to_struct().unwrap();
		assert_eq!(root.get_u64(0), 77);
	}

	#[test]
	fn double_far_pointer_resolves_to_tagged_content() {
		let seg0 = words(&[RawPointer::Far { double: true, word: 0, segment: 1 }.encode()]);
		let seg1 = words(&[
			RawPointer::Far { double: false, word: 0, segment: 2 }.encode(),
			struct_pointer(0, 1, 0),
		]);
		let seg2 = words(&[99]);
		let msg = Message::from_segments(vec![seg0.as_slice(), seg1.as_slice(), seg2.as_slice()]);
		let root = msg.root().unwrap().to_struct().unwrap();
		assert_eq!(root.get_u64(0), 99);
	}

	#[test]
	fn struct_pointer_where_list_expected_is_an_error() {
		let data = words(&[struct_pointer(0, 1, 0), 5]);
		let msg = Message::single_segment(&data);
		assert!(matches!(msg.root().unwrap().to_list(), Err(Error::UnexpectedPointer { .. })));
	}
}
