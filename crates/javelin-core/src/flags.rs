//! Declaration modifier flags.

use bitflags::bitflags;

bitflags! {
    /// Modifiers and kind markers attached to type and member declarations.
    ///
    /// `INTERFACE`, `ANNOTATION` and `ENUM` are set on type symbols to record
    /// their declaration kind, matching how class files encode it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flags: u32 {
        const PUBLIC       = 1 << 0;
        const PRIVATE      = 1 << 1;
        const PROTECTED    = 1 << 2;
        const STATIC       = 1 << 3;
        const FINAL        = 1 << 4;
        const SYNCHRONIZED = 1 << 5;
        const VOLATILE     = 1 << 6;
        const TRANSIENT    = 1 << 7;
        const NATIVE       = 1 << 8;
        const INTERFACE    = 1 << 9;
        const ABSTRACT     = 1 << 10;
        const STRICTFP     = 1 << 11;
        const ANNOTATION   = 1 << 13;
        const ENUM         = 1 << 14;
        const VARARGS      = 1 << 15;
        const DEFAULT      = 1 << 16;
    }
}

impl Flags {
    /// Map a modifier keyword to its flag.
    pub fn from_keyword(keyword: &str) -> Option<Flags> {
        Some(match keyword {
            "public" => Flags::PUBLIC,
            "private" => Flags::PRIVATE,
            "protected" => Flags::PROTECTED,
            "static" => Flags::STATIC,
            "final" => Flags::FINAL,
            "synchronized" => Flags::SYNCHRONIZED,
            "volatile" => Flags::VOLATILE,
            "transient" => Flags::TRANSIENT,
            "native" => Flags::NATIVE,
            "abstract" => Flags::ABSTRACT,
            "strictfp" => Flags::STRICTFP,
            "default" => Flags::DEFAULT,
            _ => return None,
        })
    }

    /// Visibility flags only.
    pub fn access(self) -> Flags {
        self & (Flags::PUBLIC | Flags::PRIVATE | Flags::PROTECTED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_round_trip_to_flags() {
        assert_eq!(Flags::from_keyword("static"), Some(Flags::STATIC));
        assert_eq!(Flags::from_keyword("class"), None);
    }

    #[test]
    fn access_masks_other_bits() {
        let flags = Flags::PUBLIC | Flags::STATIC | Flags::FINAL;
        assert_eq!(flags.access(), Flags::PUBLIC);
    }
}
