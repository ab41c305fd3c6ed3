//! Read-only wire-format primitives.
//!
//! This crate provides the decode side of the word-oriented wire format:
//! * [`Message`]: a non-owning view over one or more byte-slice segments
//! * [`PointerReader`], [`StructReader`], [`ListReader`]: typed traversal
//! * [`pack`]/[`unpack`]: the word-oriented packed codec
//! * [`make_const_struct`]/[`make_const_list`]: constant views fabricated
//!   directly over static buffers, bypassing the builder path entirely
//!
//! Nothing in this crate mutates a buffer; every view borrows the caller's
//! bytes and never copies them.

#![warn(missing_docs)]

pub mod constant;
pub mod error;
pub mod message;
pub mod pack;
pub mod pointer;
pub mod read;

pub use constant::{make_const_list, make_const_struct};
pub use error::{Error, Result};
pub use message::Message;
pub use pack::{pack, unpack};
pub use pointer::{
	ElementSize, ListShape, RawPointer, StructShape, WORD_SIZE, composite_tag, list_pointer, struct_pointer,
};
pub use read::{ListReader, PointerReader, StructReader};
