//! `cloakid` obfuscates numeric surrogate keys as short, reversible opaque
//! strings, so your public APIs never expose raw database IDs while you keep
//! the performance benefits of monotonically increasing integer keys.
//!
//! The library covers three layers:
//!
//! - [`Codec`]: bidirectional encode/decode over six integer widths
//!   (16/32/64-bit, signed and unsigned), with canonical-form validation.
//!   A string is accepted only if it is byte-for-byte what re-encoding its
//!   value produces, which closes the ID-substitution channel where two
//!   distinct strings silently denote the same record.
//! - [`Cloaked`]: a generic field type for automatic encoding and decoding
//!   with Serde. Obfuscated fields appear on the wire as JSON strings,
//!   never as numbers.
//! - [`Binder`] and [`BindingPolicy`]: decode inbound request parameters,
//!   with an explicit, off-by-default policy for falling back to plain
//!   base-10 IDs from legacy clients.
//!
//! The string primitive itself is pluggable through the [`StringCodec`]
//! trait. Two backends are provided: [`SqidsBackend`] (default, alphabet
//! permutation) and [`FpeBackend`] (format-preserving encryption with
//! AES-256 plus an HMAC integrity tag, for key-dependent mappings).
//!
//! # Usage
//!
//! ## Generic `Cloaked` field API (recommended)
//!
//! ```
//! use cloakid::{Cloaked, Codec, CodecOptions};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Account {
//!     pub id: Cloaked<i64>,
//! }
//!
//! Codec::set_global(Codec::new(&CodecOptions::new().min_length(6)));
//!
//! let account = Account { id: Cloaked::from(12345) };
//! let json = serde_json::to_string(&account).unwrap();
//! let back: Account = serde_json::from_str(&json).unwrap();
//! assert_eq!(back.id.get(), 12345);
//! ```
//!
//! ## Low level API
//!
//! `Codec` provides a simple API to encode and decode integers.
//!
//! ```
//! use cloakid::{Codec, CodecOptions};
//!
//! let codec = Codec::new(&CodecOptions::new());
//! let encoded = codec.encode(12345u32).unwrap();
//! let decoded: u32 = codec.decode(&encoded).unwrap();
//! assert_eq!(decoded, 12345);
//! ```
//!
//! ## Binding request parameters
//!
//! ```
//! use cloakid::{Binder, BindingOutcome, BindingPolicy, Codec, CodecOptions};
//!
//! let codec = Codec::new(&CodecOptions::new());
//! let binder = Binder::new(&codec, BindingPolicy::new());
//!
//! let encoded = codec.encode(7u64).unwrap();
//! assert_eq!(binder.bind::<u64>(&encoded).unwrap(), Some(7));
//!
//! // Plain numeric IDs are rejected unless the fallback is enabled.
//! assert!(binder.bind::<u64>("7th-floor").is_err());
//! ```

mod backend;
mod bind;
mod codec;
mod config;
mod field;
mod fpe;
mod kind;
mod policy;

pub use backend::{SqidsBackend, StringCodec};
pub use bind::Binder;
pub use codec::{Codec, Error};
pub use config::{CodecOptions, ConfigError, FpeConfig};
pub use field::Cloaked;
pub use fpe::FpeBackend;
pub use kind::{CloakedInt, NumericKind};
pub use policy::{BindingOutcome, BindingPolicy};
