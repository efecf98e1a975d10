use tracing::{debug, warn};

use crate::kind::CloakedInt;
use crate::policy::{BindingOutcome, BindingPolicy};
use crate::Codec;

/// Binds inbound request parameters through a [`Codec`] under a
/// [`BindingPolicy`].
///
/// Every input is attempted as an encoded ID first, even when it looks like
/// a plain number; the base-10 fallback only runs after decoding has failed
/// and only when the policy allows it. A plain-digit input can therefore
/// never bypass the obfuscation layer.
pub struct Binder<'a> {
    codec: &'a Codec,
    policy: BindingPolicy,
}

impl<'a> Binder<'a> {
    /// Creates a binder over an existing codec.
    pub fn new(codec: &'a Codec, policy: BindingPolicy) -> Binder<'a> {
        Binder { codec, policy }
    }

    /// Decodes one parameter and maps the result through the policy.
    ///
    /// The outcome is final for this parameter; callers must not retry.
    pub fn bind_outcome<T: CloakedInt>(&self, raw: &str) -> BindingOutcome<T> {
        let outcome = self.policy.apply(self.codec.decode::<T>(raw));
        match &outcome {
            BindingOutcome::Success(_) => {
                debug!(kind = %T::KIND, "bound encoded parameter");
            }
            BindingOutcome::Rejected(err) => {
                warn!(kind = %T::KIND, %err, "rejected parameter");
            }
            BindingOutcome::DeferToFallback => {
                debug!(kind = %T::KIND, "deferring parameter to numeric fallback");
            }
        }
        outcome
    }

    /// Runs the complete binding flow for one parameter.
    ///
    /// Returns `Ok(Some(value))` when the input was a canonical encoded ID,
    /// or when the fallback is allowed and the input parsed as plain
    /// base-10. Returns `Ok(None)` when the fallback was allowed but the
    /// input parsed as neither; the parameter is then simply left unbound.
    /// Returns `Err` when the policy rejects the input, which callers
    /// surface as a per-parameter validation error.
    pub fn bind<T: CloakedInt>(&self, raw: &str) -> Result<Option<T>, crate::Error> {
        match self.bind_outcome::<T>(raw) {
            BindingOutcome::Success(value) => Ok(Some(value)),
            BindingOutcome::Rejected(err) => Err(err),
            BindingOutcome::DeferToFallback => match raw.parse::<T>() {
                Ok(value) => {
                    // Worth watching: frequent fallbacks suggest clients
                    // probing with raw IDs, or an integration that still
                    // sends unobfuscated values.
                    warn!(kind = %T::KIND, "bound parameter via numeric fallback");
                    Ok(Some(value))
                }
                Err(_) => {
                    debug!(kind = %T::KIND, "fallback parse failed, leaving parameter unbound");
                    Ok(None)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::StringCodec;
    use crate::{CodecOptions, Error};

    /// Backend that only understands "id<n>" strings, so plain digits are
    /// never valid encodings.
    struct TaggedBackend;

    impl StringCodec for TaggedBackend {
        fn encode(&self, value: u64) -> Result<String, Error> {
            Ok(format!("id{}", value))
        }

        fn decode(&self, text: &str) -> Option<u64> {
            text.strip_prefix("id").and_then(|t| t.parse().ok())
        }
    }

    fn tagged_codec() -> Codec {
        Codec::from_backends(|_| Box::new(TaggedBackend))
    }

    #[test]
    fn test_encoded_input_binds_under_any_policy() {
        let codec = tagged_codec();
        for allow in [false, true] {
            let binder = Binder::new(&codec, BindingPolicy::new().allow_numeric_fallback(allow));
            assert_eq!(binder.bind_outcome::<u32>("id7"), BindingOutcome::Success(7));
            assert_eq!(binder.bind::<u32>("id7").unwrap(), Some(7));
        }
    }

    #[test]
    fn test_plain_number_rejected_without_fallback() {
        let codec = tagged_codec();
        let binder = Binder::new(&codec, BindingPolicy::new());

        assert_eq!(
            binder.bind_outcome::<u32>("123"),
            BindingOutcome::Rejected(Error::InvalidInput)
        );
        assert_eq!(binder.bind::<u32>("123"), Err(Error::InvalidInput));
    }

    #[test]
    fn test_plain_number_parses_with_fallback() {
        let codec = tagged_codec();
        let binder = Binder::new(&codec, BindingPolicy::new().allow_numeric_fallback(true));

        assert_eq!(binder.bind_outcome::<u32>("123"), BindingOutcome::DeferToFallback);
        assert_eq!(binder.bind::<u32>("123").unwrap(), Some(123));
    }

    #[test]
    fn test_unparseable_fallback_leaves_parameter_unbound() {
        let codec = tagged_codec();
        let binder = Binder::new(&codec, BindingPolicy::new().allow_numeric_fallback(true));

        assert_eq!(binder.bind::<u32>("not-a-number").unwrap(), None);
        // Negative numbers decode to nothing and don't parse as u32 either.
        assert_eq!(binder.bind::<u32>("-5").unwrap(), None);
    }

    #[test]
    fn test_non_canonical_input_follows_policy() {
        let codec = tagged_codec();
        // "id007" decodes to 7 but re-encodes as "id7".
        let strict = Binder::new(&codec, BindingPolicy::new());
        assert!(matches!(
            strict.bind_outcome::<u32>("id007"),
            BindingOutcome::Rejected(Error::NonCanonical { .. })
        ));

        let lenient = Binder::new(&codec, BindingPolicy::new().allow_numeric_fallback(true));
        assert_eq!(lenient.bind_outcome::<u32>("id007"), BindingOutcome::DeferToFallback);
        // "id007" is not base-10 either, so the parameter stays unbound.
        assert_eq!(lenient.bind::<u32>("id007").unwrap(), None);
    }

    #[test]
    fn test_binds_real_encodings() {
        let codec = Codec::new(&CodecOptions::new().min_length(6));
        let binder = Binder::new(&codec, BindingPolicy::new());
        let encoded = codec.encode(123456i64).unwrap();

        assert_eq!(binder.bind::<i64>(&encoded).unwrap(), Some(123456));
    }
}
