use std::fmt;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::backend::{SqidsBackend, StringCodec};
use crate::fpe::FpeBackend;
use crate::kind::{CloakedInt, NumericKind};
use crate::{CodecOptions, FpeConfig};

static GLOBAL_CODEC: Lazy<Mutex<Option<Arc<Codec>>>> = Lazy::new(|| Mutex::new(None));

/// Error returned for encode/decode failures.
#[derive(Debug, PartialEq)]
pub enum Error {
    /// The backend could not produce a string for the value.
    EncodingFailed,
    /// The text is empty, malformed, or denotes no value for the kind.
    InvalidInput,
    /// Null was found where a required value was expected.
    MissingRequiredValue,
    /// The text decodes to a value, but is not that value's canonical
    /// encoding. Two distinct accepted strings must never denote the same
    /// identifier, so these inputs are rejected and worth alerting on.
    NonCanonical { received: String, canonical: String },
    /// The value does not fit the kind (e.g. a negative signed value).
    OutOfRange { value: i128, kind: NumericKind },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::EncodingFailed => {
                write!(f, "Encoding value failed")
            }
            Error::InvalidInput => {
                write!(f, "Invalid or undecodable encoded ID")
            }
            Error::MissingRequiredValue => {
                write!(f, "Missing value for a required field")
            }
            Error::NonCanonical { received, canonical } => {
                write!(
                    f,
                    "Non-canonical encoded ID {}, canonical form is {}",
                    received, canonical
                )
            }
            Error::OutOfRange { value, kind } => {
                write!(f, "Value {} is out of range for {}", value, kind)
            }
        }
    }
}

impl std::error::Error for Error {}

/// Core encoder/decoder over the six supported integer widths.
///
/// Owns one [`StringCodec`] instance per [`NumericKind`] and enforces the
/// canonical-form invariant on every decode: an accepted string is always
/// byte-for-byte what re-encoding its value produces. All state is immutable
/// after construction, so a `Codec` can be shared freely across threads.
pub struct Codec {
    backends: [Box<dyn StringCodec + Send + Sync>; 6],
}

impl Codec {
    /// Creates a `Codec` with the default sqids backend.
    ///
    /// # Examples
    ///
    /// ```
    /// use cloakid::{Codec, CodecOptions};
    ///
    /// let codec = Codec::new(&CodecOptions::new().min_length(6));
    /// let encoded = codec.encode(123456i32).unwrap();
    /// assert!(encoded.len() >= 6);
    /// assert_eq!(codec.decode::<i32>(&encoded).unwrap(), 123456);
    /// ```
    pub fn new(options: &CodecOptions) -> Codec {
        Codec::from_backends(|_| Box::new(SqidsBackend::new(options)))
    }

    /// Creates a `Codec` with the encrypting FPE backend.
    ///
    /// The `name` becomes the prefix of every encoded string and scopes the
    /// subkeys derived from the master key in `config`.
    pub fn with_fpe(name: &str, config: &FpeConfig) -> Codec {
        Codec::from_backends(|kind| Box::new(FpeBackend::new(name, kind, config)))
    }

    /// Creates a `Codec` from an arbitrary backend per kind.
    pub fn from_backends<F>(mut backend_for: F) -> Codec
    where
        F: FnMut(NumericKind) -> Box<dyn StringCodec + Send + Sync>,
    {
        Codec {
            backends: NumericKind::ALL.map(|kind| backend_for(kind)),
        }
    }

    /// Installs `codec` as the process-wide instance used by
    /// [`crate::Cloaked`] during serialization. This should be called once
    /// at startup, before any field is serialized.
    pub fn set_global(codec: Codec) {
        let mut global_codec = GLOBAL_CODEC.lock().unwrap();
        *global_codec = Some(Arc::new(codec));
    }

    /// Accesses the process-wide codec, if set.
    pub fn global() -> Option<Arc<Codec>> {
        GLOBAL_CODEC.lock().unwrap().clone()
    }

    /// Encodes a value into its canonical opaque string.
    pub fn encode<T: CloakedInt>(&self, value: T) -> Result<String, Error> {
        self.encode_raw(value.to_raw()?, T::KIND)
    }

    /// Decodes an opaque string back into a value of type `T`.
    ///
    /// Only canonical strings are accepted; see [`Codec::decode_raw`].
    pub fn decode<T: CloakedInt>(&self, text: &str) -> Result<T, Error> {
        let raw = self.decode_raw(text, T::KIND)?;
        T::from_raw(raw).ok_or(Error::InvalidInput)
    }

    /// Encodes a raw value under an explicit kind tag.
    pub fn encode_raw(&self, value: u64, kind: NumericKind) -> Result<String, Error> {
        if value > kind.max_raw() {
            return Err(Error::OutOfRange {
                value: value as i128,
                kind,
            });
        }
        self.backend(kind).encode(value)
    }

    /// Decodes a string under an explicit kind tag.
    ///
    /// The input must be non-empty, decodable by the kind's backend, within
    /// the kind's width, and equal to the re-encoding of its own value.
    /// A decodable but non-canonical string fails with
    /// [`Error::NonCanonical`] so callers can alert on it separately.
    pub fn decode_raw(&self, text: &str, kind: NumericKind) -> Result<u64, Error> {
        if text.is_empty() {
            return Err(Error::InvalidInput);
        }
        let backend = self.backend(kind);
        let value = match backend.decode(text) {
            Some(value) => value,
            None => {
                debug!(%kind, "encoded ID did not decode");
                return Err(Error::InvalidInput);
            }
        };
        if value > kind.max_raw() {
            debug!(%kind, value, "decoded value exceeds kind width");
            return Err(Error::InvalidInput);
        }
        let canonical = backend.encode(value)?;
        if canonical != text {
            warn!(%kind, received = text, "rejected non-canonical encoded ID");
            return Err(Error::NonCanonical {
                received: text.to_string(),
                canonical,
            });
        }
        Ok(value)
    }

    fn backend(&self, kind: NumericKind) -> &(dyn StringCodec + Send + Sync) {
        self.backends[kind.index()].as_ref()
    }
}
