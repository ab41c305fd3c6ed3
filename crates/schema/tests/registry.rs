//! End-to-end tests over a hand-encoded schema document: the embedded
//! payload pipeline, registry population, and default-value dispatch.

use weft_schema::{
	DEFAULT_CHUNK_SIZE, PointerDefault, REQUEST_ROOT_SHAPE, SchemaDocument, SchemaError, SchemaRegistry, TypeId,
	ValueKind, dump_schema,
};
use weft_wire::{ElementSize, composite_tag, list_pointer, struct_pointer};

const FILE_ID: TypeId = TypeId::new(0xa3f1_7c09_5d22_8e01);
const NODE_A: TypeId = TypeId::new(0xa3f1_7c09_5d22_8e02);
const NODE_B: TypeId = TypeId::new(0xa3f1_7c09_5d22_8e03);

/// Single-segment message builder with forward-reference patching.
struct Seg {
	words: Vec<u64>,
}

impl Seg {
	fn new() -> Self {
		Self { words: Vec::new() }
	}

	fn push(&mut self, word: u64) -> usize {
		self.words.push(word);
		self.words.len() - 1
	}

	fn reserve(&mut self) -> usize {
		self.push(0)
	}

	fn here(&self) -> usize {
		self.words.len()
	}

	fn push_bytes(&mut self, bytes: &[u8]) {
		for chunk in bytes.chunks(8) {
			let mut word = [0u8; 8];
			word[..chunk.len()].copy_from_slice(chunk);
			self.push(u64::from_le_bytes(word));
		}
	}

	fn patch_struct(&mut self, at: usize, target: usize, data_words: u16, pointer_words: u16) {
		self.words[at] = struct_pointer(offset(at, target), data_words, pointer_words);
	}

	fn patch_list(&mut self, at: usize, target: usize, element_size: ElementSize, count: u32) {
		self.words[at] = list_pointer(offset(at, target), element_size, count);
	}

	fn stream(&self) -> Vec<u8> {
		let mut out = Vec::new();
		out.extend_from_slice(&0u32.to_le_bytes());
		out.extend_from_slice(&(self.words.len() as u32).to_le_bytes());
		for word in &self.words {
			out.extend_from_slice(&word.to_le_bytes());
		}
		out
	}
}

fn offset(ptr: usize, target: usize) -> i32 {
	target as i32 - ptr as i32 - 1
}

/// Builds a document whose file node nests two struct nodes. All three
/// nodes share one field list: field 0 defaults to `text`, field 1 to the
/// byte list `[1, 2, 3]`.
fn sample_document_with(text: &str) -> SchemaDocument {
	// Shapes: node (5 data, 6 ptr), field (3, 4), value (2, 1), nested (1, 1).
	let mut s = Seg::new();
	let root = s.reserve();
	let nodes_ptr = s.reserve();
	s.push(0); // requested-files pointer, unused here
	s.patch_struct(root, nodes_ptr, 0, 2);

	let tag = s.push(composite_tag(3, 5, 6));
	s.patch_list(nodes_ptr, tag, ElementSize::Composite, 3 * 11);

	let mut nested_ptrs = Vec::new();
	let mut fields_ptrs = Vec::new();
	for id in [FILE_ID, NODE_A, NODE_B] {
		s.push(id.raw()); // id
		s.push(1 << 32); // body union discriminant: struct
		s.push(0);
		s.push(0);
		s.push(0);
		s.push(0); // display name
		nested_ptrs.push(s.reserve()); // nested nodes
		s.push(0); // annotations
		fields_ptrs.push(s.reserve()); // fields
		s.push(0);
		s.push(0);
	}

	let nested_tag = s.push(composite_tag(2, 1, 1));
	s.patch_list(nested_ptrs[0], nested_tag, ElementSize::Composite, 2 * 2);
	s.push(NODE_A.raw());
	s.push(0);
	s.push(NODE_B.raw());
	s.push(0);

	let fields_tag = s.push(composite_tag(2, 3, 4));
	for &at in &fields_ptrs {
		s.patch_list(at, fields_tag, ElementSize::Composite, 2 * 7);
	}
	let mut defaults = Vec::new();
	for _ in 0..2 {
		s.push(0); // code order, discriminant value
		s.push(0); // field union discriminant: slot
		s.push(0);
		s.push(0); // name
		s.push(0); // annotations
		s.push(0); // type
		defaults.push(s.reserve()); // default value
	}

	let value0 = s.here();
	s.push(12); // value union discriminant: text
	s.push(0);
	let text_ptr = s.reserve();
	s.patch_struct(defaults[0], value0, 2, 1);
	let text_body = s.here();
	let mut bytes = text.as_bytes().to_vec();
	bytes.push(0);
	let text_len = bytes.len() as u32;
	s.push_bytes(&bytes);
	s.patch_list(text_ptr, text_body, ElementSize::Byte, text_len);

	let value1 = s.here();
	s.push(14); // value union discriminant: list
	s.push(0);
	let list_ptr = s.reserve();
	s.patch_struct(defaults[1], value1, 2, 1);
	let list_body = s.here();
	s.push_bytes(&[1, 2, 3]);
	s.patch_list(list_ptr, list_body, ElementSize::Byte, 3);

	SchemaDocument::from_message_bytes(s.stream(), REQUEST_ROOT_SHAPE).expect("fixture decodes")
}

fn sample_document() -> SchemaDocument {
	sample_document_with("hello")
}

#[test]
fn resolves_defaults_directly_from_a_document() {
	let doc = sample_document();
	let value = doc.default_value(NODE_A, 0).unwrap();
	assert_eq!(value.which().unwrap(), ValueKind::Text);
	assert_eq!(value.text().unwrap(), "hello");

	let value = doc.default_value(NODE_A, 1).unwrap();
	assert_eq!(value.which().unwrap(), ValueKind::List);
	let PointerDefault::List(list) = value.pointer().unwrap() else {
		panic!("expected a list default");
	};
	let list = list.to_list().unwrap();
	assert_eq!(list.len(), 3);
	assert_eq!(list.get_u8(0).unwrap(), 1);
	assert_eq!(list.get_u8(2).unwrap(), 3);
}

#[test]
fn dump_then_register_round_trips() {
	let doc = sample_document();
	for chunk_size in [16, DEFAULT_CHUNK_SIZE, 4096] {
		let chunks = dump_schema(&doc, chunk_size).unwrap();
		assert!(chunks.iter().all(|chunk| chunk.len() <= chunk_size));
		let mut registry = SchemaRegistry::new();
		registry.register(REQUEST_ROOT_SHAPE, FILE_ID, &chunks).unwrap();
		for id in [FILE_ID, NODE_A, NODE_B] {
			assert_eq!(registry.text_default(id, 0).unwrap(), "hello");
		}
	}
}

#[test]
fn chunking_only_changes_the_split() {
	let doc = sample_document();
	let whole = dump_schema(&doc, usize::MAX).unwrap().concat();
	let small = dump_schema(&doc, 7).unwrap();
	assert!(small.len() > 1);
	assert_eq!(small.concat(), whole);
}

#[test]
fn nested_ids_share_one_document() {
	let chunks = dump_schema(&sample_document(), DEFAULT_CHUNK_SIZE).unwrap();
	let mut registry = SchemaRegistry::new();
	registry.register(REQUEST_ROOT_SHAPE, FILE_ID, &chunks).unwrap();
	assert_eq!(registry.len(), 3);
	let file_doc = registry.document(FILE_ID).unwrap();
	assert!(std::sync::Arc::ptr_eq(file_doc, registry.document(NODE_A).unwrap()));
	assert!(std::sync::Arc::ptr_eq(file_doc, registry.document(NODE_B).unwrap()));
}

#[test]
fn re_registration_replaces_prior_answers() {
	let mut registry = SchemaRegistry::new();
	let chunks = dump_schema(&sample_document(), DEFAULT_CHUNK_SIZE).unwrap();
	registry.register(REQUEST_ROOT_SHAPE, FILE_ID, &chunks).unwrap();
	registry.register(REQUEST_ROOT_SHAPE, FILE_ID, &chunks).unwrap();
	assert_eq!(registry.len(), 3);
	assert_eq!(registry.text_default(NODE_A, 0).unwrap(), "hello");

	let replacement = dump_schema(&sample_document_with("world"), DEFAULT_CHUNK_SIZE).unwrap();
	registry.register(REQUEST_ROOT_SHAPE, FILE_ID, &replacement).unwrap();
	for id in [FILE_ID, NODE_A, NODE_B] {
		assert_eq!(registry.text_default(id, 0).unwrap(), "world");
	}
}

#[test]
fn corrupt_payloads_register_nothing() {
	let mut chunks = dump_schema(&sample_document(), 24).unwrap();
	chunks[1] = "!!definitely not base64!!".to_string();
	let mut registry = SchemaRegistry::new();
	registry.register(REQUEST_ROOT_SHAPE, FILE_ID, &chunks).unwrap();
	assert!(registry.is_empty());
	assert!(matches!(registry.text_default(FILE_ID, 0), Err(SchemaError::Unreachable)));

	// Valid base64 that is not a zlib stream is swallowed the same way.
	registry.register(REQUEST_ROOT_SHAPE, FILE_ID, &["aGVsbG8gd29ybGQ=".to_string()]).unwrap();
	assert!(registry.is_empty());
}

#[test]
fn truncated_payloads_register_nothing() {
	let chunks = dump_schema(&sample_document(), 24).unwrap();
	let mut registry = SchemaRegistry::new();
	registry.register(REQUEST_ROOT_SHAPE, FILE_ID, &chunks[..chunks.len() / 2]).unwrap();
	assert!(registry.is_empty());
}

#[test]
fn kind_mismatch_is_an_invariant_error() {
	let doc = sample_document();
	// Field 1 stores a list; reading it as text must fail rather than
	// returning garbage.
	assert!(matches!(doc.default_value(NODE_A, 1).unwrap().text(), Err(SchemaError::Unreachable)));
	// Field 0 stores text, which is not a pointer-shaped kind.
	assert!(matches!(doc.default_value(NODE_A, 0).unwrap().pointer(), Err(SchemaError::Unreachable)));
}

#[test]
fn unknown_ids_are_an_invariant_error() {
	let registry = SchemaRegistry::new();
	assert!(matches!(registry.default_value(TypeId::new(1), 0), Err(SchemaError::Unreachable)));
	let doc = sample_document();
	assert!(matches!(doc.find_node(TypeId::new(1)), Err(SchemaError::Unreachable)));
}

#[test]
fn non_struct_nodes_have_no_fields() {
	let mut s = Seg::new();
	let root = s.reserve();
	let nodes_ptr = s.reserve();
	s.push(0);
	s.patch_struct(root, nodes_ptr, 0, 2);
	let tag = s.push(composite_tag(1, 5, 6));
	s.patch_list(nodes_ptr, tag, ElementSize::Composite, 11);
	s.push(FILE_ID.raw());
	for _ in 0..10 {
		s.push(0);
	}

	let doc = SchemaDocument::from_message_bytes(s.stream(), REQUEST_ROOT_SHAPE).unwrap();
	let node = doc.find_node(FILE_ID).unwrap();
	assert!(!node.is_struct());
	assert!(matches!(node.field(0), Err(SchemaError::Unreachable)));
}

#[test]
fn global_registry_serves_generated_code() {
	let chunks = dump_schema(&sample_document(), DEFAULT_CHUNK_SIZE).unwrap();
	weft_schema::register_schema(REQUEST_ROOT_SHAPE, &FILE_ID.to_hex(), &chunks).unwrap();

	assert_eq!(weft_schema::get_text_default(&NODE_A.to_hex(), 0).unwrap(), "hello");
	let value = weft_schema::get_pointer_default(&NODE_B.to_hex(), 1).unwrap();
	assert_eq!(value.kind().unwrap(), ValueKind::List);
	assert!(matches!(value.pointer().unwrap(), PointerDefault::List(_)));
	assert!(matches!(weft_schema::get_pointer_default(&NODE_A.to_hex(), 0), Err(SchemaError::Unreachable)));
	assert!(matches!(weft_schema::get_text_default("deadbeefdeadbeef", 0), Err(SchemaError::Unreachable)));
}
