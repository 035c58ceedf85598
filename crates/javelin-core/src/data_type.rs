//! DataType - a resolved type as seen by attribution.
//!
//! A `DataType` is the erased base type plus the number of array dimensions.
//! Generic arguments are erased, so `List<String>` and `List<Integer>` are the
//! same `DataType`.
//!
//! # Example
//!
//! ```
//! use javelin_core::{DataType, primitives};
//!
//! let int = DataType::simple(primitives::INT);
//! let matrix = DataType::array(primitives::INT, 2);
//! assert_ne!(int, matrix);
//! assert_eq!(matrix.element(), DataType::array(primitives::INT, 1));
//! ```

use std::fmt::{self, Display, Formatter};

use crate::{TypeHash, primitives};

/// A complete erased type. `Copy`, so it can be passed around freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataType {
    /// The base (element) type.
    pub type_hash: TypeHash,
    /// Array dimensions, 0 for a non-array.
    pub dims: u8,
}

impl DataType {
    #[inline]
    pub const fn simple(type_hash: TypeHash) -> Self {
        Self { type_hash, dims: 0 }
    }

    #[inline]
    pub const fn array(type_hash: TypeHash, dims: u8) -> Self {
        Self { type_hash, dims }
    }

    pub const fn void() -> Self {
        Self::simple(primitives::VOID)
    }

    pub const fn null() -> Self {
        Self::simple(primitives::NULL)
    }

    pub fn is_array(&self) -> bool {
        self.dims > 0
    }

    pub fn is_void(&self) -> bool {
        self.dims == 0 && self.type_hash == primitives::VOID
    }

    /// Whether this is one of the eight primitive value types.
    pub fn is_primitive(&self) -> bool {
        self.dims == 0 && primitives::is_primitive(self.type_hash)
    }

    /// Element type of an array; unchanged for non-arrays.
    pub fn element(&self) -> Self {
        Self {
            type_hash: self.type_hash,
            dims: self.dims.saturating_sub(1),
        }
    }

    /// Add `extra` array dimensions.
    pub fn with_dims(&self, extra: u8) -> Self {
        Self {
            type_hash: self.type_hash,
            dims: self.dims.saturating_add(extra),
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_hash)?;
        for _ in 0..self.dims {
            write!(f, "[]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrays_are_distinct_from_elements() {
        let s = DataType::simple(primitives::STRING);
        let arr = s.with_dims(1);
        assert!(arr.is_array());
        assert_ne!(s, arr);
        assert_eq!(arr.element(), s);
    }

    #[test]
    fn primitive_detection() {
        assert!(DataType::simple(primitives::INT).is_primitive());
        assert!(!DataType::array(primitives::INT, 1).is_primitive());
        assert!(!DataType::simple(primitives::STRING).is_primitive());
        assert!(DataType::void().is_void());
    }
}
