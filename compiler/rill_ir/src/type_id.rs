//! Static result types of expression nodes.
//!
//! Types are identified by a `u32` so equality is an integer compare.
//! The primitive types used by constants are pre-defined; hosts that need
//! richer types allocate ids starting at [`TypeId::FIRST_HOST`].

use std::fmt;

/// Identifier for the static type of an expression.
///
/// # Pre-defined Types
/// - `OBJECT` is the type of untyped values (including `null`)
/// - `VOID`, `BOOL`, `INT`, `FLOAT`, `STR` cover the constant payloads
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    pub const OBJECT: TypeId = TypeId(0);
    pub const VOID: TypeId = TypeId(1);
    pub const BOOL: TypeId = TypeId(2);
    pub const INT: TypeId = TypeId(3);
    pub const FLOAT: TypeId = TypeId(4);
    pub const STR: TypeId = TypeId(5);

    /// First ID available to host-defined types.
    pub const FIRST_HOST: u32 = 16;

    /// Create a `TypeId` from a raw index.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        TypeId(raw)
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Check if this is one of the pre-defined types.
    #[inline]
    pub const fn is_primitive(self) -> bool {
        self.0 < Self::FIRST_HOST
    }

    /// Check if this is `VOID`.
    #[inline]
    pub const fn is_void(self) -> bool {
        self.0 == Self::VOID.0
    }

    fn primitive_name(self) -> Option<&'static str> {
        match self {
            Self::OBJECT => Some("object"),
            Self::VOID => Some("void"),
            Self::BOOL => Some("bool"),
            Self::INT => Some("int"),
            Self::FLOAT => Some("float"),
            Self::STR => Some("str"),
            _ => None,
        }
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.primitive_name() {
            Some(name) => write!(f, "TypeId::{}", name.to_uppercase()),
            None => write!(f, "TypeId({})", self.0),
        }
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.primitive_name() {
            Some(name) => f.write_str(name),
            None => write!(f, "type#{}", self.0),
        }
    }
}

impl Default for TypeId {
    fn default() -> Self {
        Self::OBJECT
    }
}
