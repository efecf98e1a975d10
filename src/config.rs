use std::collections::HashSet;
use std::fmt;

/// Construction-time validation errors.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    AlphabetMultibyte,
    AlphabetNotUnique,
    AlphabetTooShort,
    AlphabetWhitespace,
    InvalidMacLength,
    InvalidZeroPadLength,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::AlphabetMultibyte => {
                write!(f, "Alphabet must not contain multibyte characters")
            }
            ConfigError::AlphabetNotUnique => {
                write!(f, "Alphabet characters must be unique")
            }
            ConfigError::AlphabetTooShort => {
                write!(f, "Alphabet must contain at least 3 characters")
            }
            ConfigError::AlphabetWhitespace => {
                write!(f, "Alphabet must not contain whitespace")
            }
            ConfigError::InvalidMacLength => {
                write!(f, "MAC length must be between 0 and 8")
            }
            ConfigError::InvalidZeroPadLength => {
                write!(f, "Zero pad length must be between 0 and 8")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Options for the default (sqids-backed) string codec.
///
/// The alphabet is validated here, before any codec is built; encode and
/// decode never see a malformed alphabet.
#[derive(Clone, Debug)]
pub struct CodecOptions {
    pub(crate) min_length: u8,
    pub(crate) alphabet: Option<String>,
}

impl CodecOptions {
    /// Creates options with no minimum length and the backend's default
    /// alphabet.
    pub fn new() -> Self {
        CodecOptions {
            min_length: 0,
            alphabet: None,
        }
    }

    /// Sets the minimum length of encoded strings. Shorter encodings are
    /// padded up to this length.
    pub fn min_length(mut self, min_length: u8) -> Self {
        self.min_length = min_length;
        self
    }

    /// Sets a custom output alphabet.
    ///
    /// The alphabet must contain at least 3 unique, single-byte,
    /// non-whitespace characters.
    pub fn alphabet(mut self, alphabet: &str) -> Result<Self, ConfigError> {
        validate_alphabet(alphabet)?;
        self.alphabet = Some(alphabet.to_string());
        Ok(self)
    }
}

impl Default for CodecOptions {
    fn default() -> Self {
        CodecOptions::new()
    }
}

fn validate_alphabet(alphabet: &str) -> Result<(), ConfigError> {
    let chars: Vec<char> = alphabet.chars().collect();
    if chars.len() < 3 {
        return Err(ConfigError::AlphabetTooShort);
    }
    if chars.iter().any(|c| c.is_whitespace()) {
        return Err(ConfigError::AlphabetWhitespace);
    }
    if chars.iter().any(|c| !c.is_ascii()) {
        return Err(ConfigError::AlphabetMultibyte);
    }
    let unique: HashSet<char> = chars.iter().copied().collect();
    if unique.len() != chars.len() {
        return Err(ConfigError::AlphabetNotUnique);
    }
    Ok(())
}

/// Options for the encrypting (FPE-backed) string codec.
/// - `hmac_length` defaults to 4, which is large enough to make guessing
///   impractical but still keeps the strings relatively short.
/// - `zero_pad_length` defaults to 4, which is large enough for most
///   applications to never see encoded strings increase in size.
#[derive(Clone)]
pub struct FpeConfig<'a> {
    pub(crate) hmac_length: u8,
    pub(crate) key: &'a [u8],
    pub(crate) zero_pad_length: u8,
}

impl<'a> FpeConfig<'a> {
    /// Creates a new configuration with the given master `key` and other
    /// settings at default values.
    ///
    /// **Security note:** In order to be secure, you must provide a secure
    /// random `key` with sufficient entropy, and manage it appropriately.
    pub fn new(key: &'a [u8]) -> Self {
        FpeConfig {
            hmac_length: 4,
            key,
            zero_pad_length: 4,
        }
    }

    /// Sets the number of bytes in the HMAC.
    /// The value must be between 0 and 8.
    pub fn hmac_length(mut self, hmac_length: u8) -> Result<Self, ConfigError> {
        if hmac_length > 8 {
            Err(ConfigError::InvalidMacLength)
        } else {
            self.hmac_length = hmac_length;
            Ok(self)
        }
    }

    /// Sets the number of bytes to zero-pad numbers before encoding.
    /// The value must be between 0 and 8.
    pub fn zero_pad_length(mut self, zero_pad_length: u8) -> Result<Self, ConfigError> {
        if zero_pad_length > 8 {
            Err(ConfigError::InvalidZeroPadLength)
        } else {
            self.zero_pad_length = zero_pad_length;
            Ok(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_too_short() {
        assert_eq!(
            CodecOptions::new().alphabet("ab").unwrap_err(),
            ConfigError::AlphabetTooShort
        );
        assert_eq!(
            CodecOptions::new().alphabet("").unwrap_err(),
            ConfigError::AlphabetTooShort
        );
    }

    #[test]
    fn test_alphabet_duplicates() {
        assert_eq!(
            CodecOptions::new().alphabet("aab").unwrap_err(),
            ConfigError::AlphabetNotUnique
        );
    }

    #[test]
    fn test_alphabet_whitespace() {
        assert_eq!(
            CodecOptions::new().alphabet("ab c").unwrap_err(),
            ConfigError::AlphabetWhitespace
        );
        assert_eq!(
            CodecOptions::new().alphabet("ab\tc").unwrap_err(),
            ConfigError::AlphabetWhitespace
        );
    }

    #[test]
    fn test_alphabet_multibyte() {
        assert_eq!(
            CodecOptions::new().alphabet("abé").unwrap_err(),
            ConfigError::AlphabetMultibyte
        );
    }

    #[test]
    fn test_alphabet_valid() {
        let options = CodecOptions::new().alphabet("xyz").unwrap();
        assert_eq!(options.alphabet.as_deref(), Some("xyz"));
    }

    #[test]
    fn test_fpe_config_limits() {
        assert!(FpeConfig::new(b"key").hmac_length(8).is_ok());
        assert!(FpeConfig::new(b"key").hmac_length(9).is_err());
        assert!(FpeConfig::new(b"key").zero_pad_length(8).is_ok());
        assert!(FpeConfig::new(b"key").zero_pad_length(9).is_err());
    }
}
