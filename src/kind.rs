use std::fmt;

use crate::Error;

/// The closed set of integer widths a [`crate::Codec`] can obfuscate.
///
/// Each kind is backed by its own string codec instance. Decoded values are
/// range-checked against the kind's width, so a string minted for a wide kind
/// never silently truncates into a narrower one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NumericKind {
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
}

impl NumericKind {
    /// All supported kinds, in backend-table order.
    pub const ALL: [NumericKind; 6] = [
        NumericKind::Int16,
        NumericKind::UInt16,
        NumericKind::Int32,
        NumericKind::UInt32,
        NumericKind::Int64,
        NumericKind::UInt64,
    ];

    /// The largest raw value that fits this kind.
    ///
    /// Signed kinds top out at their positive maximum; negative values are
    /// outside the codec's domain and are never encoded.
    pub fn max_raw(self) -> u64 {
        match self {
            NumericKind::Int16 => i16::MAX as u64,
            NumericKind::UInt16 => u16::MAX as u64,
            NumericKind::Int32 => i32::MAX as u64,
            NumericKind::UInt32 => u32::MAX as u64,
            NumericKind::Int64 => i64::MAX as u64,
            NumericKind::UInt64 => u64::MAX,
        }
    }

    /// Short label used for key derivation and log events.
    pub fn label(self) -> &'static str {
        match self {
            NumericKind::Int16 => "i16",
            NumericKind::UInt16 => "u16",
            NumericKind::Int32 => "i32",
            NumericKind::UInt32 => "u32",
            NumericKind::Int64 => "i64",
            NumericKind::UInt64 => "u64",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Integer types that can live behind an obfuscated identifier.
///
/// Implemented for exactly the six widths in [`NumericKind`]; the trait is
/// sealed, so codec dispatch is closed at compile time and there is no
/// "unsupported type" failure path at runtime. The `FromStr` bound is what
/// the numeric fallback in [`crate::Binder`] parses with.
pub trait CloakedInt:
    sealed::Sealed + Copy + fmt::Debug + fmt::Display + std::str::FromStr
{
    /// The kind tag this type dispatches to.
    const KIND: NumericKind;

    /// Widens the value into the codec's raw `u64` domain.
    ///
    /// Fails with [`Error::OutOfRange`] for negative values.
    fn to_raw(self) -> Result<u64, Error>;

    /// Narrows a raw value back into this type, or `None` if it does not fit.
    fn from_raw(raw: u64) -> Option<Self>;
}

macro_rules! cloaked_int {
    ($t:ty, $kind:expr) => {
        impl sealed::Sealed for $t {}

        impl CloakedInt for $t {
            const KIND: NumericKind = $kind;

            fn to_raw(self) -> Result<u64, Error> {
                u64::try_from(self).map_err(|_| Error::OutOfRange {
                    value: self as i128,
                    kind: $kind,
                })
            }

            fn from_raw(raw: u64) -> Option<Self> {
                <$t>::try_from(raw).ok()
            }
        }
    };
}

cloaked_int!(i16, NumericKind::Int16);
cloaked_int!(u16, NumericKind::UInt16);
cloaked_int!(i32, NumericKind::Int32);
cloaked_int!(u32, NumericKind::UInt32);
cloaked_int!(i64, NumericKind::Int64);
cloaked_int!(u64, NumericKind::UInt64);
