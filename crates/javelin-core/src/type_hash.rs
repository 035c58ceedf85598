//! Deterministic hash-based type identity.
//!
//! [`TypeHash`] is a 64-bit hash computed from a fully qualified type name, so
//! the same name always yields the same identity regardless of registration
//! order. Methods get their own hash domain that mixes in the owner and the
//! erased parameter types.
//!
//! # Examples
//!
//! ```
//! use javelin_core::{TypeHash, primitives};
//!
//! let string = TypeHash::from_name("java.lang.String");
//! assert_eq!(string, primitives::STRING);
//! assert_ne!(string, TypeHash::from_name("java.lang.Object"));
//! ```

use std::fmt;
use xxhash_rust::const_xxh64::xxh64;

/// Domain-specific mixing constants for hash computation.
pub mod hash_constants {
    /// Separator between hashed components.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for type hashes.
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for method hashes.
    pub const METHOD: u64 = 0x7d3c8b4a92e15f6d;

    /// Domain marker for constructor hashes.
    pub const CONSTRUCTOR: u64 = 0x9a7f3d5e2b8c4601;

    /// Domain marker for field hashes.
    pub const FIELD: u64 = 0x1a095090689d4647;

    /// Parameter position mixing constants, so parameter order matters.
    pub const PARAM_MARKERS: [u64; 8] = [
        0x9e3779b97f4a7c15,
        0xbf58476d1ce4e5b9,
        0x94d049bb133111eb,
        0xd6e8feb86659fd93,
        0xe7037ed1a0b428db,
        0xc6a4a7935bd1e995,
        0x8648dbbc94d49b8d,
        0xa2b48b2c69e0d657,
    ];
}

/// A deterministic 64-bit hash identifying a type or member.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a type hash from a fully qualified type name.
    #[inline]
    pub const fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Create a method hash from its owner, name and erased parameter types.
    pub fn from_method(owner: TypeHash, name: &str, params: &[TypeHash]) -> Self {
        Self::member(hash_constants::METHOD, owner, name, params)
    }

    /// Create a constructor hash from its owner and erased parameter types.
    pub fn from_constructor(owner: TypeHash, params: &[TypeHash]) -> Self {
        Self::member(hash_constants::CONSTRUCTOR, owner, "<init>", params)
    }

    /// Create a field hash from its owner and name.
    pub fn from_field(owner: TypeHash, name: &str) -> Self {
        Self::member(hash_constants::FIELD, owner, name, &[])
    }

    fn member(domain: u64, owner: TypeHash, name: &str, params: &[TypeHash]) -> Self {
        let mut hash = domain ^ owner.0.rotate_left(17) ^ xxh64(name.as_bytes(), 0);
        for (i, param) in params.iter().enumerate() {
            let marker = hash_constants::PARAM_MARKERS[i % hash_constants::PARAM_MARKERS.len()];
            hash = hash.rotate_left(5) ^ hash_constants::SEP ^ param.0.wrapping_mul(marker);
        }
        TypeHash(hash)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Hashes for primitive types and the handful of library types the
/// front end refers to directly.
pub mod primitives {
    use super::TypeHash;

    pub const VOID: TypeHash = TypeHash::from_name("void");
    pub const BOOLEAN: TypeHash = TypeHash::from_name("boolean");
    pub const BYTE: TypeHash = TypeHash::from_name("byte");
    pub const SHORT: TypeHash = TypeHash::from_name("short");
    pub const CHAR: TypeHash = TypeHash::from_name("char");
    pub const INT: TypeHash = TypeHash::from_name("int");
    pub const LONG: TypeHash = TypeHash::from_name("long");
    pub const FLOAT: TypeHash = TypeHash::from_name("float");
    pub const DOUBLE: TypeHash = TypeHash::from_name("double");

    /// Type of the `null` literal.
    pub const NULL: TypeHash = TypeHash::from_name("<null>");

    pub const OBJECT: TypeHash = TypeHash::from_name("java.lang.Object");
    pub const STRING: TypeHash = TypeHash::from_name("java.lang.String");
    pub const CLASS: TypeHash = TypeHash::from_name("java.lang.Class");

    /// Look up a primitive hash by keyword.
    pub fn from_keyword(keyword: &str) -> Option<TypeHash> {
        Some(match keyword {
            "void" => VOID,
            "boolean" => BOOLEAN,
            "byte" => BYTE,
            "short" => SHORT,
            "char" => CHAR,
            "int" => INT,
            "long" => LONG,
            "float" => FLOAT,
            "double" => DOUBLE,
            _ => return None,
        })
    }

    /// Whether `hash` names one of the eight primitive value types.
    pub fn is_primitive(hash: TypeHash) -> bool {
        [BOOLEAN, BYTE, SHORT, CHAR, INT, LONG, FLOAT, DOUBLE].contains(&hash)
    }

    /// Numeric rank used for binary promotion; `None` for non-numeric types.
    pub fn numeric_rank(hash: TypeHash) -> Option<u8> {
        match hash {
            h if h == BYTE => Some(1),
            h if h == SHORT => Some(2),
            h if h == CHAR => Some(2),
            h if h == INT => Some(3),
            h if h == LONG => Some(4),
            h if h == FLOAT => Some(5),
            h if h == DOUBLE => Some(6),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_is_deterministic() {
        assert_eq!(TypeHash::from_name("a.B"), TypeHash::from_name("a.B"));
        assert_ne!(TypeHash::from_name("a.B"), TypeHash::from_name("a.C"));
    }

    #[test]
    fn primitive_constants_match_runtime_hash() {
        assert_eq!(primitives::INT, TypeHash::from_name("int"));
        assert_eq!(primitives::STRING, TypeHash::from_name("java.lang.String"));
        assert_eq!(primitives::from_keyword("double"), Some(primitives::DOUBLE));
        assert_eq!(primitives::from_keyword("String"), None);
    }

    #[test]
    fn method_hash_depends_on_parameter_order() {
        let owner = TypeHash::from_name("util.Ext");
        let ab = TypeHash::from_method(owner, "f", &[primitives::INT, primitives::LONG]);
        let ba = TypeHash::from_method(owner, "f", &[primitives::LONG, primitives::INT]);
        assert_ne!(ab, ba);
    }

    #[test]
    fn member_domains_do_not_collide() {
        let owner = TypeHash::from_name("util.Ext");
        assert_ne!(
            TypeHash::from_method(owner, "x", &[]),
            TypeHash::from_field(owner, "x")
        );
    }

    #[test]
    fn numeric_rank_orders_widening() {
        let int = primitives::numeric_rank(primitives::INT);
        let double = primitives::numeric_rank(primitives::DOUBLE);
        assert!(int < double);
        assert_eq!(primitives::numeric_rank(primitives::BOOLEAN), None);
    }
}
