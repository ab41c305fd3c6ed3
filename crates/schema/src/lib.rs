//! Self-describing schema bootstrap.
//!
//! Decodes the schema compiler's own serialized output — embedded in
//! generated code as compressed, base64-chunked text — and answers "what is
//! the default value of field N of type T" queries at runtime.
//!
//! Two surfaces:
//! * [`SchemaRegistry`]: an owned table, for tests and embedders that want
//!   an explicit lifecycle
//! * the free functions ([`register_schema`], [`get_text_default`],
//!   [`get_pointer_default`]): the process-wide registry generated code
//!   talks to at load time
//!
//! Registration swallows and logs payload decode failures so one corrupt
//! embedded schema degrades only its own default-value lookups, never the
//! rest of the generated code.

#![warn(missing_docs)]

pub mod document;
pub mod error;
pub mod id;
pub mod registry;

pub use document::{
	DocumentReader, FieldReader, NodeList, NodeReader, PointerDefault, REQUEST_ROOT_SHAPE, SchemaDocument, ValueKind,
	ValueReader,
};
pub use error::{Result, SchemaError};
pub use id::TypeId;
pub use registry::{
	DEFAULT_CHUNK_SIZE, DefaultValue, SchemaRegistry, dump_schema, get_default_value, get_pointer_default,
	get_text_default, register_schema,
};
