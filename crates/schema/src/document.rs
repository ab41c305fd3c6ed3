//! Decoded schema documents and typed readers over their node tree.
//!
//! The bootstrap is self-referential: the schema-description format is
//! itself described by a schema, and the layout constants below are that
//! schema's own compiled wire shape. Documents are therefore parsed with
//! the raw root shape supplied at registration, never through the registry.

use weft_wire::{ListReader, Message, PointerReader, StructReader, StructShape};

use crate::error::{Result, SchemaError};
use crate::id::TypeId;

/// Root shape of a schema-description message (the code-generator request).
pub const REQUEST_ROOT_SHAPE: StructShape = StructShape { data_words: 0, pointer_words: 2 };

/// Wire layout of the schema-description format.
mod layout {
	/// Pointer slot of the flattened node list on the request root.
	pub const REQUEST_NODES_PTR: u16 = 0;

	/// 64-bit data slot holding a node's id.
	pub const NODE_ID_DATA: u32 = 0;
	/// 16-bit data slot holding the node body union discriminant.
	pub const NODE_WHICH: u32 = 6;
	/// Discriminant marking a struct node.
	pub const NODE_WHICH_STRUCT: u16 = 1;
	/// Pointer slot of a node's nested-node list.
	pub const NODE_NESTED_PTR: u16 = 1;
	/// Pointer slot of a struct node's field list.
	pub const NODE_FIELDS_PTR: u16 = 3;

	/// 64-bit data slot holding a nested node entry's id.
	pub const NESTED_ID_DATA: u32 = 0;

	/// 16-bit data slot holding the field union discriminant.
	pub const FIELD_WHICH: u32 = 4;
	/// Discriminant marking a slot (non-group) field.
	pub const FIELD_WHICH_SLOT: u16 = 0;
	/// Pointer slot of a slot field's default value.
	pub const FIELD_DEFAULT_PTR: u16 = 3;

	/// 16-bit data slot holding the value union discriminant.
	pub const VALUE_WHICH: u32 = 0;
	/// Pointer slot of a value's pointer-shaped payload.
	pub const VALUE_POINTER_PTR: u16 = 0;
}

/// Wire discriminants of the default-value union.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
	/// No value.
	Void,
	/// Boolean scalar.
	Bool,
	/// 8-bit signed scalar.
	Int8,
	/// 16-bit signed scalar.
	Int16,
	/// 32-bit signed scalar.
	Int32,
	/// 64-bit signed scalar.
	Int64,
	/// 8-bit unsigned scalar.
	Uint8,
	/// 16-bit unsigned scalar.
	Uint16,
	/// 32-bit unsigned scalar.
	Uint32,
	/// 64-bit unsigned scalar.
	Uint64,
	/// 32-bit float scalar.
	Float32,
	/// 64-bit float scalar.
	Float64,
	/// NUL-terminated UTF-8 text.
	Text,
	/// Raw data blob.
	Data,
	/// List value.
	List,
	/// Enumerant scalar.
	Enum,
	/// Struct value.
	Struct,
	/// Interface (capability) value.
	Interface,
	/// Untyped pointer value.
	AnyPointer,
}

impl ValueKind {
	fn from_raw(raw: u16) -> Option<Self> {
		Some(match raw {
			0 => Self::Void,
			1 => Self::Bool,
			2 => Self::Int8,
			3 => Self::Int16,
			4 => Self::Int32,
			5 => Self::Int64,
			6 => Self::Uint8,
			7 => Self::Uint16,
			8 => Self::Uint32,
			9 => Self::Uint64,
			10 => Self::Float32,
			11 => Self::Float64,
			12 => Self::Text,
			13 => Self::Data,
			14 => Self::List,
			15 => Self::Enum,
			16 => Self::Struct,
			17 => Self::Interface,
			18 => Self::AnyPointer,
			_ => return None,
		})
	}
}

/// One decoded schema-description message and every node reachable from it.
///
/// Owns the unpacked message bytes; never mutated after decode. Lookups
/// borrow from the document, and the registry shares one document across
/// all type ids it covers.
pub struct SchemaDocument {
	bytes: Vec<u8>,
	root_shape: StructShape,
}

impl SchemaDocument {
	/// Decodes an unpacked message stream (framing plus segment bodies).
	///
	/// The framing and root pointer are validated once, up front.
	pub fn from_message_bytes(bytes: Vec<u8>, root_shape: StructShape) -> Result<Self> {
		Message::from_stream(&bytes)?.root()?.to_struct()?;
		Ok(Self { bytes, root_shape })
	}

	/// The unpacked message stream backing this document.
	pub fn message_bytes(&self) -> &[u8] {
		&self.bytes
	}

	/// The root shape the document was registered with.
	pub fn root_shape(&self) -> StructShape {
		self.root_shape
	}

	fn message(&self) -> Result<Message<'_>> {
		Ok(Message::from_stream(&self.bytes)?)
	}

	/// Typed reader over the document root.
	pub fn root(&self) -> Result<DocumentReader<'_>> {
		Ok(DocumentReader { inner: self.message()?.root()?.to_struct()? })
	}

	/// Finds the node with the given identifier.
	///
	/// A decoded document that lacks a requested node means the embedded
	/// payload and its claimed ids are inconsistent, which is a generator
	/// bug: unreachable, not recoverable.
	pub fn find_node(&self, id: TypeId) -> Result<NodeReader<'_>> {
		let nodes = self.root()?.nodes()?;
		for index in 0..nodes.len() {
			let node = nodes.get(index)?;
			if node.id() == id {
				return Ok(node);
			}
		}
		Err(SchemaError::Unreachable)
	}

	/// Resolves the default value of field `field_index` of type `id`.
	pub fn default_value(&self, id: TypeId, field_index: u32) -> Result<ValueReader<'_>> {
		self.find_node(id)?.field(field_index)?.default_value()
	}
}

/// Reader over the document root.
pub struct DocumentReader<'a> {
	inner: StructReader<'a>,
}

impl<'a> DocumentReader<'a> {
	/// The document's flattened node list.
	pub fn nodes(&self) -> Result<NodeList<'a>> {
		Ok(NodeList { inner: self.inner.get_pointer(layout::REQUEST_NODES_PTR)?.to_list()? })
	}
}

/// The flattened node list of one document.
pub struct NodeList<'a> {
	inner: ListReader<'a>,
}

impl<'a> NodeList<'a> {
	/// Number of nodes.
	pub fn len(&self) -> u32 {
		self.inner.len()
	}

	/// Returns true if the document has no nodes.
	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	/// The node at `index`.
	pub fn get(&self, index: u32) -> Result<NodeReader<'a>> {
		Ok(NodeReader { inner: self.inner.get_struct(index)? })
	}
}

/// Reader over one schema node.
pub struct NodeReader<'a> {
	inner: StructReader<'a>,
}

impl<'a> NodeReader<'a> {
	/// The node's type identifier.
	pub fn id(&self) -> TypeId {
		TypeId::new(self.inner.get_u64(layout::NODE_ID_DATA))
	}

	/// Identifiers of the nodes nested one level below this one.
	pub fn nested_ids(&self) -> Result<Vec<TypeId>> {
		let list = self.inner.get_pointer(layout::NODE_NESTED_PTR)?.to_list()?;
		let mut ids = Vec::with_capacity(list.len() as usize);
		for index in 0..list.len() {
			ids.push(TypeId::new(list.get_struct(index)?.get_u64(layout::NESTED_ID_DATA)));
		}
		Ok(ids)
	}

	/// Whether the node describes a struct type.
	pub fn is_struct(&self) -> bool {
		self.inner.get_u16(layout::NODE_WHICH) == layout::NODE_WHICH_STRUCT
	}

	/// The node's field at `index`.
	///
	/// Only struct nodes carry fields; asking anything else is unreachable
	/// for a consistent corpus.
	pub fn field(&self, index: u32) -> Result<FieldReader<'a>> {
		if !self.is_struct() {
			return Err(SchemaError::Unreachable);
		}
		let fields = self.inner.get_pointer(layout::NODE_FIELDS_PTR)?.to_list()?;
		Ok(FieldReader { inner: fields.get_struct(index)? })
	}
}

/// Reader over one struct field.
pub struct FieldReader<'a> {
	inner: StructReader<'a>,
}

impl<'a> FieldReader<'a> {
	fn is_slot(&self) -> bool {
		self.inner.get_u16(layout::FIELD_WHICH) == layout::FIELD_WHICH_SLOT
	}

	/// The field's declared default value.
	pub fn default_value(&self) -> Result<ValueReader<'a>> {
		// Group fields have no slot, hence no default value either.
		if !self.is_slot() {
			return Err(SchemaError::Unreachable);
		}
		Ok(ValueReader { inner: self.inner.get_pointer(layout::FIELD_DEFAULT_PTR)?.to_struct()? })
	}
}

/// Reader over one tagged default value.
pub struct ValueReader<'a> {
	inner: StructReader<'a>,
}

impl<'a> ValueReader<'a> {
	/// The value's union discriminant.
	pub fn which(&self) -> Result<ValueKind> {
		ValueKind::from_raw(self.inner.get_u16(layout::VALUE_WHICH)).ok_or(SchemaError::Unreachable)
	}

	fn expect(&self, kind: ValueKind) -> Result<()> {
		if self.which()? == kind { Ok(()) } else { Err(SchemaError::Unreachable) }
	}

	/// The value as text; any other stored kind is an invariant violation.
	pub fn text(&self) -> Result<&'a str> {
		self.expect(ValueKind::Text)?;
		Ok(self.inner.get_pointer(layout::VALUE_POINTER_PTR)?.to_text()?)
	}

	/// The value as a raw data blob.
	pub fn data(&self) -> Result<&'a [u8]> {
		self.expect(ValueKind::Data)?;
		Ok(self.inner.get_pointer(layout::VALUE_POINTER_PTR)?.to_data()?)
	}

	/// The value's pointer payload, dispatched on the stored kind.
	///
	/// Scalar kinds carry no pointer; requesting one is an invariant
	/// violation.
	pub fn pointer(&self) -> Result<PointerDefault<'a>> {
		let reader = self.inner.get_pointer(layout::VALUE_POINTER_PTR)?;
		match self.which()? {
			ValueKind::AnyPointer => Ok(PointerDefault::AnyPointer(reader)),
			ValueKind::Data => Ok(PointerDefault::Data(reader)),
			ValueKind::List => Ok(PointerDefault::List(reader)),
			ValueKind::Struct => Ok(PointerDefault::Struct(reader)),
			_ => Err(SchemaError::Unreachable),
		}
	}
}

/// A pointer-shaped default value.
#[derive(Debug, Clone)]
pub enum PointerDefault<'a> {
	/// Untyped pointer default.
	AnyPointer(PointerReader<'a>),
	/// Data blob default.
	Data(PointerReader<'a>),
	/// List default.
	List(PointerReader<'a>),
	/// Struct default.
	Struct(PointerReader<'a>),
}
