//! The schema bootstrap registry and its embedded-payload pipeline.
//!
//! Generated code embeds each compiled schema file as base64 chunks of a
//! zlib-compressed, packed message. Registration reassembles and decodes
//! that payload once, then maps the file id and every directly nested type
//! id to the shared decoded document so later default-value queries can
//! address any of them.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use tracing::warn;
use weft_wire::StructShape;

use crate::document::{PointerDefault, SchemaDocument, ValueKind, ValueReader};
use crate::error::{Result, SchemaError};
use crate::id::TypeId;

/// Default number of characters per embedded payload chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 112;

/// Table mapping type identifiers to their owning decoded documents.
///
/// Registration is expected to happen once per embedded schema file at
/// load time, strictly before lookups begin; entries are never removed, and
/// re-registering an id replaces the prior entry.
#[derive(Default)]
pub struct SchemaRegistry {
	documents: HashMap<TypeId, Arc<SchemaDocument>>,
}

impl SchemaRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Decodes an embedded payload and registers its document under the
	/// file id and every node id nested one level below the file node.
	///
	/// A payload that fails any decode stage is logged and skipped, not
	/// propagated: the rest of the generated code stays usable, and only
	/// default-value lookups against this file will fail later. A document
	/// that decodes but lacks its own declared file node is a generator
	/// bug and surfaces as the invariant error.
	pub fn register<S: AsRef<str>>(&mut self, root_shape: StructShape, file_id: TypeId, chunks: &[S]) -> Result<()> {
		let doc = match decode_payload(root_shape, chunks) {
			Ok(doc) => Arc::new(doc),
			Err(error) => {
				warn!(file_id = %file_id, error = %error, "failed to register schema; default values will not work");
				eprintln!("failed to register schema for {file_id}; default values will not work!");
				return Ok(());
			}
		};
		let nested = doc.find_node(file_id)?.nested_ids()?;
		self.documents.insert(file_id, Arc::clone(&doc));
		for id in nested {
			self.documents.insert(id, Arc::clone(&doc));
		}
		Ok(())
	}

	/// Returns the document owning `id`, if registered.
	pub fn document(&self, id: TypeId) -> Option<&Arc<SchemaDocument>> {
		self.documents.get(&id)
	}

	/// Number of registered type ids.
	pub fn len(&self) -> usize {
		self.documents.len()
	}

	/// Returns true if nothing has been registered.
	pub fn is_empty(&self) -> bool {
		self.documents.is_empty()
	}

	/// Resolves the default value of field `field_index` of type `id`.
	///
	/// An unregistered id indicates a build or registration-ordering bug in
	/// the caller, surfaced as the invariant error.
	pub fn default_value(&self, id: TypeId, field_index: u32) -> Result<ValueReader<'_>> {
		let doc = self.documents.get(&id).ok_or(SchemaError::Unreachable)?;
		doc.default_value(id, field_index)
	}

	/// Resolves a text default.
	pub fn text_default(&self, id: TypeId, field_index: u32) -> Result<&str> {
		self.default_value(id, field_index)?.text()
	}

	/// Resolves a pointer-shaped default.
	pub fn pointer_default(&self, id: TypeId, field_index: u32) -> Result<PointerDefault<'_>> {
		self.default_value(id, field_index)?.pointer()
	}
}

/// Produces the embedded payload for a document: pack, compress, encode,
/// then split into `chunk_size`-character pieces suitable for string
/// literals in generated source.
///
/// Registering the result reconstructs an equivalent document.
pub fn dump_schema(doc: &SchemaDocument, chunk_size: usize) -> Result<Vec<String>> {
	let packed = weft_wire::pack(doc.message_bytes())?;
	let compressed = deflate(&packed).map_err(SchemaError::Deflate)?;
	let encoded = STANDARD.encode(&compressed);
	Ok(encoded
		.as_bytes()
		.chunks(chunk_size.max(1))
		.map(|chunk| String::from_utf8_lossy(chunk).into_owned())
		.collect())
}

fn decode_payload<S: AsRef<str>>(root_shape: StructShape, chunks: &[S]) -> Result<SchemaDocument> {
	let mut encoded = String::new();
	for chunk in chunks {
		encoded.push_str(chunk.as_ref());
	}
	let compressed = STANDARD.decode(encoded.as_bytes())?;
	let packed = inflate(&compressed).map_err(SchemaError::Inflate)?;
	let stream = weft_wire::unpack(&packed)?;
	SchemaDocument::from_message_bytes(stream, root_shape)
}

fn inflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
	let mut out = Vec::new();
	ZlibDecoder::new(data).read_to_end(&mut out)?;
	Ok(out)
}

fn deflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
	let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
	encoder.write_all(data)?;
	encoder.finish()
}

static REGISTRY: LazyLock<RwLock<SchemaRegistry>> = LazyLock::new(|| RwLock::new(SchemaRegistry::new()));

/// Registers an embedded schema payload in the process-wide registry.
///
/// `file_id` is the compiled file's hexadecimal type identifier, as emitted
/// into generated source alongside the chunked payload.
pub fn register_schema<S: AsRef<str>>(root_shape: StructShape, file_id: &str, chunks: &[S]) -> Result<()> {
	let id = TypeId::from_hex(file_id)?;
	let mut registry = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
	registry.register(root_shape, id, chunks)
}

/// An owned handle on one default value inside a shared decoded document.
///
/// The handle keeps the document alive; accessors re-traverse the immutable
/// document on demand.
pub struct DefaultValue {
	doc: Arc<SchemaDocument>,
	id: TypeId,
	field_index: u32,
}

impl DefaultValue {
	/// The stored union discriminant.
	pub fn kind(&self) -> Result<ValueKind> {
		self.reader()?.which()
	}

	/// Borrowed reader over the value.
	pub fn reader(&self) -> Result<ValueReader<'_>> {
		self.doc.default_value(self.id, self.field_index)
	}

	/// The value as owned text.
	pub fn to_text(&self) -> Result<String> {
		Ok(self.reader()?.text()?.to_string())
	}

	/// The value's pointer payload.
	pub fn pointer(&self) -> Result<PointerDefault<'_>> {
		self.reader()?.pointer()
	}
}

/// Looks up a default value in the process-wide registry.
///
/// The full traversal is validated before the handle is returned, so an
/// unregistered id, missing node, or missing field fails here.
pub fn get_default_value(id: &str, field_index: u32) -> Result<DefaultValue> {
	let type_id = TypeId::from_hex(id)?;
	let registry = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
	let doc = Arc::clone(registry.document(type_id).ok_or(SchemaError::Unreachable)?);
	doc.default_value(type_id, field_index)?;
	Ok(DefaultValue { doc, id: type_id, field_index })
}

/// Looks up a text default in the process-wide registry.
pub fn get_text_default(id: &str, field_index: u32) -> Result<String> {
	get_default_value(id, field_index)?.to_text()
}

/// Looks up a pointer-shaped default in the process-wide registry, failing
/// on any scalar kind.
pub fn get_pointer_default(id: &str, field_index: u32) -> Result<DefaultValue> {
	let value = get_default_value(id, field_index)?;
	match value.kind()? {
		ValueKind::AnyPointer | ValueKind::Data | ValueKind::List | ValueKind::Struct => Ok(value),
		_ => Err(SchemaError::Unreachable),
	}
}
