use std::fmt;

use aes::Aes256;
use fpe::ff1::{BinaryNumeralString, FF1};
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use crate::backend::StringCodec;
use crate::{Error, FpeConfig, NumericKind};

type HmacSha256 = Hmac<Sha256>;

// Maximum number of bytes we can base62 encode (an u128).
const MAX_BUFFER: usize = 16;

// The sentinel byte, in case we don't fill the full 16 bytes.
const SENTINEL: u8 = 1;

/// Internal decode failures of the FPE backend.
#[derive(Debug, PartialEq)]
enum FpeError {
    DecodingFailed,
    DecryptionFailed,
    IncorrectMac,
    InvalidDataLength,
    InvalidPrefix { received: String, expected: String },
    SentinelMismatch { received: u8, expected: u8 },
}

impl fmt::Display for FpeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FpeError::DecodingFailed => {
                write!(f, "Decoding string failed")
            }
            FpeError::DecryptionFailed => {
                write!(f, "FF1 decryption failed")
            }
            FpeError::IncorrectMac => {
                write!(f, "Incorrect MAC")
            }
            FpeError::InvalidDataLength => {
                write!(f, "Invalid data length")
            }
            FpeError::InvalidPrefix { received, expected } => {
                write!(f, "Prefix was {}, expected {}", received, expected)
            }
            FpeError::SentinelMismatch { received, expected } => {
                write!(f, "Sentinel byte was {}, expected {}", received, expected)
            }
        }
    }
}

impl From<base62::DecodeError> for FpeError {
    fn from(_: base62::DecodeError) -> FpeError {
        FpeError::DecodingFailed
    }
}

/// Encrypting [`StringCodec`] using format-preserving encryption (FF1 with
/// AES-256) plus a truncated HMAC-SHA256 integrity tag, rendered as base62
/// with a name prefix.
///
/// Unlike [`crate::SqidsBackend`], the value-to-string mapping is
/// key-dependent, so identifiers reveal nothing about the underlying
/// sequence even to someone who knows the scheme. Subkeys are derived per
/// numeric kind, so a string minted for one kind fails the MAC check under
/// any other kind.
pub struct FpeBackend {
    ff1: FF1<Aes256>,
    hmac: HmacSha256,
    hmac_length: usize,
    prefix: String,
    zero_pad_length: usize,
}

impl FpeBackend {
    /// Creates a backend for one numeric kind.
    ///
    /// The `name` becomes the output prefix, and together with the kind it
    /// selects the HKDF subkeys derived from the master key in `config`.
    pub fn new(name: &str, kind: NumericKind, config: &FpeConfig) -> FpeBackend {
        let hkdf = Hkdf::<Sha256>::new(None, config.key);
        let mut ff1_key = [0u8; 32];
        let mut hmac_key = [0u8; 32];
        hkdf.expand(format!("{}/{}/ff1", name, kind.label()).as_bytes(), &mut ff1_key)
            .expect("Length 32 should be valid");
        hkdf.expand(format!("{}/{}/hmac", name, kind.label()).as_bytes(), &mut hmac_key)
            .expect("Length 32 should be valid");
        FpeBackend {
            ff1: FF1::<Aes256>::new(&ff1_key, 2).expect("Radix 2 should be valid"),
            hmac: HmacSha256::new_from_slice(&hmac_key).expect("Key length 32 should be valid"),
            hmac_length: config.hmac_length as usize,
            prefix: format!("{}_", name),
            zero_pad_length: config.zero_pad_length as usize,
        }
    }

    /// Encrypts `num` into a 128 bit value.  Note that high order bits may be
    /// zeroes, so that a short string representation can be made.
    fn encode_u128(&self, num: u64) -> u128 {
        let bytes = self.encrypt_number(num);
        let mut num_array = [0u8; MAX_BUFFER];
        num_array[..bytes.len()].copy_from_slice(&bytes);
        if bytes.len() < num_array.len() {
            num_array[bytes.len()] = SENTINEL;
        }
        u128::from_le_bytes(num_array)
    }

    fn encode_inner(&self, num: u64) -> String {
        let encoded = base62::encode(self.encode_u128(num));
        format!("{}{}", self.prefix, encoded)
    }

    fn decode_inner(&self, encoded: &str) -> Result<u64, FpeError> {
        // Ensure prefix matches (from last underscore).
        let received = match encoded.rfind('_') {
            None => "".to_string(),
            Some(i) => encoded[..i + 1].to_string(),
        };
        if received != self.prefix {
            let expected = self.prefix.clone();
            return Err(FpeError::InvalidPrefix { received, expected });
        }

        let tail = &encoded[self.prefix.len()..];
        let num = base62::decode(tail).map_err(FpeError::from)?;
        let num_array = num.to_le_bytes();

        let length;
        if self.hmac_length + self.zero_pad_length < MAX_BUFFER {
            length = last_nonzero(&num_array);
            if num_array[length] != SENTINEL {
                return Err(FpeError::SentinelMismatch {
                    received: num_array[length],
                    expected: SENTINEL,
                });
            }
        } else {
            length = MAX_BUFFER;
        }

        self.decrypt_number(&num_array[..length])
    }

    fn encrypt_number(&self, num: u64) -> Vec<u8> {
        // Encrypt `num` using form-preserving encryption.
        let pt = num_to_le_vec(num, self.zero_pad_length);
        let encrypted_num = self
            .ff1
            .encrypt(&[], &BinaryNumeralString::from_bytes_le(&pt))
            .expect("Radix 2 should be valid")
            .to_bytes_le();

        // Compute a truncated MAC from the ciphertext.
        let mut hmac: HmacSha256 = self.hmac.clone();
        hmac.update(&encrypted_num);
        let truncated_mac = &hmac.finalize().into_bytes()[..self.hmac_length];

        // Return the combined bytes.
        let mut result = encrypted_num.to_vec();
        result.extend_from_slice(truncated_mac);

        result
    }

    fn decrypt_number(&self, encrypted_data: &[u8]) -> Result<u64, FpeError> {
        if encrypted_data.len() < self.hmac_length + self.zero_pad_length {
            return Err(FpeError::InvalidDataLength);
        }
        let (encrypted_num, received_mac) =
            encrypted_data.split_at(encrypted_data.len() - self.hmac_length);

        // Verify MAC
        let mut hmac: HmacSha256 = self.hmac.clone();
        hmac.update(encrypted_num);
        let truncated_mac = &hmac.finalize().into_bytes()[..self.hmac_length];
        if truncated_mac != received_mac {
            return Err(FpeError::IncorrectMac);
        }

        // Decrypt the number
        let decrypted_num = self
            .ff1
            .decrypt(&[], &BinaryNumeralString::from_bytes_le(encrypted_num))
            .map_err(|_| FpeError::DecryptionFailed)?;

        // Convert decrypted bytes back to number
        Ok(le_vec_to_num(&decrypted_num.to_bytes_le()))
    }
}

impl StringCodec for FpeBackend {
    fn encode(&self, value: u64) -> Result<String, Error> {
        Ok(self.encode_inner(value))
    }

    fn decode(&self, text: &str) -> Option<u64> {
        match self.decode_inner(text) {
            Ok(value) => Some(value),
            Err(err) => {
                debug!(%err, "fpe decode failed");
                None
            }
        }
    }
}

fn last_nonzero(bytes: &[u8]) -> usize {
    bytes.iter().rposition(|&b| b != 0).unwrap_or(0)
}

// Returns a memory representation of `num` as a byte vector in little-endian
// byte order, leaving out trailing zero bytes beyond `min_length`.
fn num_to_le_vec(num: u64, min_length: usize) -> Vec<u8> {
    let bytes = num.to_le_bytes();
    let prefix_length = (last_nonzero(&bytes) + 1).max(min_length);
    bytes[..prefix_length].to_vec()
}

fn le_vec_to_num(bytes: &[u8]) -> u64 {
    let mut arr = [0; 8];
    arr[..bytes.len()].copy_from_slice(bytes);
    u64::from_le_bytes(arr)
}
