use std::fmt;

use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};

use crate::kind::CloakedInt;
use crate::{Codec, Error};

/// An obfuscated ID field (a wrapped integer).
///
/// Wrapping a struct field in `Cloaked` is what marks it for obfuscation;
/// unwrapped numeric fields serialize as ordinary numbers and never touch
/// the codec. When serialized with Serde, the wrapped value is encoded into
/// an opaque string through the codec installed with [`Codec::set_global`].
/// Deserialization accepts only the canonical encoded string and fails the
/// payload on anything else; the binding fallback never applies here, since
/// a programmatic payload must round-trip exactly.
///
/// Optional fields are expressed as `Option<Cloaked<T>>`: a JSON null maps
/// to `None` before the codec is ever consulted. A null against a plain
/// `Cloaked<T>` fails with [`Error::MissingRequiredValue`].
///
/// # Examples
///
/// ```
/// use cloakid::{Cloaked, Codec, CodecOptions};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Account {
///     pub id: Cloaked<i64>,
///     pub parent: Option<Cloaked<i64>>,
/// }
///
/// Codec::set_global(Codec::new(&CodecOptions::new().min_length(6)));
///
/// let account = Account { id: Cloaked::from(12345), parent: None };
/// let json = serde_json::to_string(&account).unwrap();
/// let value: serde_json::Value = serde_json::from_str(&json).unwrap();
/// assert!(value["id"].is_string());
/// assert!(value["parent"].is_null());
///
/// let back: Account = serde_json::from_str(&json).unwrap();
/// assert_eq!(back.id.get(), 12345);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cloaked<T: CloakedInt> {
    value: T,
}

impl<T: CloakedInt> Cloaked<T> {
    /// Wraps a raw value for obfuscation.
    pub fn from(value: T) -> Self {
        Cloaked { value }
    }

    /// Returns the raw wrapped value.
    pub fn get(self) -> T {
        self.value
    }
}

impl<T: CloakedInt> fmt::Display for Cloaked<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Cloaked({})", self.value)
    }
}

macro_rules! cloaked_from {
    ($t:ty) => {
        impl From<$t> for Cloaked<$t> {
            fn from(value: $t) -> Self {
                Cloaked::from(value)
            }
        }

        impl From<Cloaked<$t>> for $t {
            /// Returns the raw wrapped value.
            fn from(field: Cloaked<$t>) -> Self {
                field.value
            }
        }
    };
}

cloaked_from!(i16);
cloaked_from!(u16);
cloaked_from!(i32);
cloaked_from!(u32);
cloaked_from!(i64);
cloaked_from!(u64);

impl<T: CloakedInt> Serialize for Cloaked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let codec =
            Codec::global().ok_or_else(|| ser::Error::custom("Global codec is not configured"))?;
        let encoded = codec.encode(self.value).map_err(ser::Error::custom)?;
        serializer.serialize_str(&encoded)
    }
}

impl<'de, T: CloakedInt> Deserialize<'de> for Cloaked<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = match Option::<String>::deserialize(deserializer)? {
            Some(encoded) => encoded,
            None => return Err(de::Error::custom(Error::MissingRequiredValue)),
        };
        let codec =
            Codec::global().ok_or_else(|| de::Error::custom("Global codec is not configured"))?;
        let value = codec.decode::<T>(&encoded).map_err(de::Error::custom)?;
        Ok(Cloaked::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CodecOptions;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize)]
    struct Record {
        pub id: Cloaked<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct OptionalRecord {
        pub id: Option<Cloaked<i64>>,
    }

    fn init_global() {
        Codec::set_global(Codec::new(&CodecOptions::new().min_length(6)));
    }

    #[test]
    fn test_serializes_as_string() {
        init_global();
        let json = serde_json::to_value(Record {
            id: Cloaked::from(12345),
        })
        .unwrap();

        assert!(json["id"].is_string());
        assert!(json["id"].as_str().unwrap().len() >= 6);
    }

    #[test]
    fn test_roundtrip() {
        init_global();
        let json = serde_json::to_string(&Record {
            id: Cloaked::from(987654321),
        })
        .unwrap();
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id.get(), 987654321);
    }

    #[test]
    fn test_optional_null_never_touches_codec() {
        init_global();
        let back: OptionalRecord = serde_json::from_value(json!({ "id": null })).unwrap();
        assert!(back.id.is_none());

        let json = serde_json::to_value(OptionalRecord { id: None }).unwrap();
        assert!(json["id"].is_null());
    }

    #[test]
    fn test_null_fails_for_required_field() {
        init_global();
        let err = serde_json::from_value::<Record>(json!({ "id": null })).unwrap_err();
        assert!(err.to_string().contains("required field"));
    }

    #[test]
    fn test_rejects_plain_numbers() {
        init_global();
        // An obfuscated field on the wire is a string, never a number.
        assert!(serde_json::from_value::<Record>(json!({ "id": 12345 })).is_err());
    }

    #[test]
    fn test_rejects_garbage_strings() {
        init_global();
        assert!(serde_json::from_value::<Record>(json!({ "id": "!!!" })).is_err());
    }

    #[test]
    fn test_conversions() {
        let field: Cloaked<i64> = 42.into();
        assert_eq!(i64::from(field), 42);
        assert_eq!(field.to_string(), "Cloaked(42)");
    }
}
