use sqids::Sqids;

use crate::{CodecOptions, Error};

/// The pluggable string codec primitive behind a single numeric kind.
///
/// Implementations map a non-negative integer to a short string and back.
/// They do not need to reject non-canonical inputs themselves; the wrapping
/// [`crate::Codec`] re-encodes every decoded value and compares, so a decode
/// here only has to answer "does this string denote a value at all".
pub trait StringCodec {
    /// Encodes a raw value into its canonical string form.
    fn encode(&self, value: u64) -> Result<String, Error>;

    /// Decodes a string, or `None` if the backend finds no value in it.
    fn decode(&self, text: &str) -> Option<u64>;
}

/// Default [`StringCodec`] backed by the sqids alphabet permutation.
///
/// Sqids output is obfuscated but not encrypted; pair it with the canonical
/// check for ID-substitution resistance, or use [`crate::FpeBackend`] when
/// the mapping itself must be key-dependent.
pub struct SqidsBackend {
    sqids: Sqids,
}

impl SqidsBackend {
    /// Builds a backend from validated [`CodecOptions`].
    pub fn new(options: &CodecOptions) -> SqidsBackend {
        // CodecOptions::alphabet() already enforced every rule sqids checks.
        let sqids = match &options.alphabet {
            Some(alphabet) => Sqids::builder()
                .min_length(options.min_length)
                .alphabet(alphabet.chars().collect())
                .build(),
            None => Sqids::builder().min_length(options.min_length).build(),
        }
        .expect("Alphabet should be pre-validated");
        SqidsBackend { sqids }
    }
}

impl StringCodec for SqidsBackend {
    fn encode(&self, value: u64) -> Result<String, Error> {
        self.sqids.encode(&[value]).map_err(|_| Error::EncodingFailed)
    }

    fn decode(&self, text: &str) -> Option<u64> {
        self.sqids.decode(text).first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let backend = SqidsBackend::new(&CodecOptions::new());
        for value in [0, 1, 2, 123, 123456, u64::MAX] {
            let encoded = backend.encode(value).unwrap();
            assert!(!encoded.is_empty());
            assert_eq!(backend.decode(&encoded), Some(value));
        }
    }

    #[test]
    fn test_min_length_pads_output() {
        let backend = SqidsBackend::new(&CodecOptions::new().min_length(12));
        let encoded = backend.encode(1).unwrap();
        assert!(encoded.len() >= 12);
        assert_eq!(backend.decode(&encoded), Some(1));
    }

    #[test]
    fn test_custom_alphabet_constrains_output() {
        let options = CodecOptions::new().alphabet("abc").unwrap();
        let backend = SqidsBackend::new(&options);
        let encoded = backend.encode(123456).unwrap();
        assert!(encoded.chars().all(|c| "abc".contains(c)));
        assert_eq!(backend.decode(&encoded), Some(123456));
    }

    #[test]
    fn test_decode_rejects_foreign_characters() {
        let options = CodecOptions::new().alphabet("abc").unwrap();
        let backend = SqidsBackend::new(&options);
        assert_eq!(backend.decode("xyz"), None);
        assert_eq!(backend.decode("a+b"), None);
    }
}
