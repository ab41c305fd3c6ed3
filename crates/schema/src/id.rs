//! 64-bit schema type identifiers.

use std::fmt;

use crate::error::{Result, SchemaError};

/// A globally unique 64-bit type identifier.
///
/// Identifiers compare as exact 64-bit values; the 16-digit lowercase
/// hexadecimal form is only a rendering used at the generated-code boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u64);

impl TypeId {
	/// Creates an identifier from its raw value.
	pub const fn new(raw: u64) -> Self {
		Self(raw)
	}

	/// Returns the raw 64-bit value.
	pub const fn raw(self) -> u64 {
		self.0
	}

	/// Parses a hexadecimal identifier, with or without a `0x` prefix.
	pub fn from_hex(s: &str) -> Result<Self> {
		let digits = s.strip_prefix("0x").unwrap_or(s);
		u64::from_str_radix(digits, 16).map(Self).map_err(|_| SchemaError::InvalidTypeId(s.to_string()))
	}

	/// Renders the canonical 16-digit lowercase hexadecimal form.
	pub fn to_hex(self) -> String {
		self.to_string()
	}
}

impl fmt::Display for TypeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:016x}", self.0)
	}
}

impl From<u64> for TypeId {
	fn from(raw: u64) -> Self {
		Self(raw)
	}
}
