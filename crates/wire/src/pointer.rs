//! Raw pointer words and shape descriptors.
//!
//! All layout is in 8-byte little-endian words. A pointer word's low two
//! bits select its kind; the remaining fields depend on the kind.

/// Size of one word in bytes.
pub const WORD_SIZE: usize = 8;

/// Element size classes for list pointers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementSize {
	/// Zero-size elements.
	Void = 0,
	/// Single-bit elements.
	Bit = 1,
	/// One-byte elements.
	Byte = 2,
	/// Two-byte elements.
	TwoBytes = 3,
	/// Four-byte elements.
	FourBytes = 4,
	/// Eight-byte scalar elements.
	EightBytes = 5,
	/// Pointer elements.
	Pointer = 6,
	/// Inline composite (struct) elements, described by a tag word.
	Composite = 7,
}

impl ElementSize {
	pub(crate) fn from_raw(raw: u64) -> Self {
		match raw & 7 {
			0 => Self::Void,
			1 => Self::Bit,
			2 => Self::Byte,
			3 => Self::TwoBytes,
			4 => Self::FourBytes,
			5 => Self::EightBytes,
			6 => Self::Pointer,
			_ => Self::Composite,
		}
	}

	pub(crate) fn name(self) -> &'static str {
		match self {
			Self::Void => "void",
			Self::Bit => "bit",
			Self::Byte => "byte",
			Self::TwoBytes => "two-byte",
			Self::FourBytes => "four-byte",
			Self::EightBytes => "eight-byte",
			Self::Pointer => "pointer",
			Self::Composite => "composite",
		}
	}
}

/// Data and pointer section sizes of a struct type.
///
/// Generated accessor code carries one of these per struct type; constant
/// view synthesis uses it to fabricate the descriptor a normal message
/// would encode in its pointer word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructShape {
	/// Words in the data section.
	pub data_words: u16,
	/// Words in the pointer section.
	pub pointer_words: u16,
}

/// Element layout of a list type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListShape {
	/// Encoded element size class.
	pub element_size: ElementSize,
	/// Per-element section sizes; present only for composite elements.
	pub composite: Option<StructShape>,
}

/// A decoded pointer word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawPointer {
	/// The all-zero word: absent content.
	Null,
	/// Struct pointer: signed word offset from the end of the pointer to
	/// the start of the data section, plus section sizes.
	Struct {
		/// Content offset in words.
		offset: i32,
		/// Data section size in words.
		data_words: u16,
		/// Pointer section size in words.
		pointer_words: u16,
	},
	/// List pointer. For composite elements `count` is the total content
	/// word count excluding the tag word; otherwise it is the element count.
	List {
		/// Content offset in words.
		offset: i32,
		/// Element size class.
		element_size: ElementSize,
		/// Element count, or content words for composite lists.
		count: u32,
	},
	/// Far pointer into another segment.
	Far {
		/// Whether the landing pad is two words (pad + descriptor).
		double: bool,
		/// Word offset of the landing pad within `segment`.
		word: u32,
		/// Target segment id.
		segment: u32,
	},
	/// Capability index (unused by this crate beyond recognition).
	Capability {
		/// Index into the message's capability table.
		index: u32,
	},
}

impl RawPointer {
	/// Decodes one pointer word.
	pub fn parse(word: u64) -> Self {
		if word == 0 {
			return Self::Null;
		}
		match word & 3 {
			0 => Self::Struct {
				offset: offset_field(word),
				data_words: (word >> 32) as u16,
				pointer_words: (word >> 48) as u16,
			},
			1 => Self::List {
				offset: offset_field(word),
				element_size: ElementSize::from_raw(word >> 32),
				count: ((word >> 35) & 0x1fff_ffff) as u32,
			},
			2 => Self::Far {
				double: word & 4 != 0,
				word: ((word >> 3) & 0x1fff_ffff) as u32,
				segment: (word >> 32) as u32,
			},
			_ => Self::Capability { index: (word >> 32) as u32 },
		}
	}

	/// Encodes this pointer back into its word form.
	pub fn encode(self) -> u64 {
		match self {
			Self::Null => 0,
			Self::Struct { offset, data_words, pointer_words } => struct_pointer(offset, data_words, pointer_words),
			Self::List { offset, element_size, count } => list_pointer(offset, element_size, count),
			Self::Far { double, word, segment } => {
				2 | (u64::from(double) << 2) | (u64::from(word) << 3) | (u64::from(segment) << 32)
			}
			Self::Capability { index } => 3 | (u64::from(index) << 32),
		}
	}

	pub(crate) fn kind_name(self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Struct { .. } => "struct",
			Self::List { .. } => "list",
			Self::Far { .. } => "far",
			Self::Capability { .. } => "capability",
		}
	}
}

/// Signed 30-bit offset field occupying bits 2..32.
fn offset_field(word: u64) -> i32 {
	(word as u32 as i32) >> 2
}

/// Encodes a struct pointer.
pub fn struct_pointer(offset: i32, data_words: u16, pointer_words: u16) -> u64 {
	u64::from((offset as u32) << 2) | (u64::from(data_words) << 32) | (u64::from(pointer_words) << 48)
}

/// Encodes a list pointer.
pub fn list_pointer(offset: i32, element_size: ElementSize, count: u32) -> u64 {
	u64::from(((offset as u32) << 2) | 1) | ((element_size as u64) << 32) | (u64::from(count) << 35)
}

/// Encodes the tag word leading a composite list's content.
///
/// Same layout as a struct pointer, with the offset field holding the
/// element count.
pub fn composite_tag(count: u32, data_words: u16, pointer_words: u16) -> u64 {
	struct_pointer(count as i32, data_words, pointer_words)
}
