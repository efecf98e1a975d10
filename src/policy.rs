use crate::Error;

/// Governs what happens when decoding an inbound parameter fails.
///
/// The default rejects anything that is not a canonical encoded ID.
/// Allowing the numeric fallback keeps pre-existing clients that send plain
/// numeric IDs working, at the cost of accepting both forms; that weakens
/// the obfuscation, so the fallback is off unless explicitly enabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct BindingPolicy {
    pub(crate) allow_numeric_fallback: bool,
}

impl BindingPolicy {
    /// Creates the default policy: decode failures are rejected.
    pub fn new() -> Self {
        BindingPolicy {
            allow_numeric_fallback: false,
        }
    }

    /// Enables or disables the plain base-10 fallback for inputs that fail
    /// to decode.
    pub fn allow_numeric_fallback(mut self, allow: bool) -> Self {
        self.allow_numeric_fallback = allow;
        self
    }
}

/// The final result of one binding attempt. Produced once per parameter per
/// request; never retried.
#[derive(Debug, PartialEq)]
pub enum BindingOutcome<T> {
    /// The input was a canonical encoded ID.
    Success(T),
    /// The input failed to decode and the policy forbids falling back; the
    /// caller must surface a per-parameter validation error.
    Rejected(Error),
    /// The input failed to decode and the policy allows trying it as a
    /// plain base-10 number instead.
    DeferToFallback,
}

impl BindingPolicy {
    /// Maps a decode result to its binding outcome.
    ///
    /// Only `InvalidInput` and `NonCanonical` are fallback candidates;
    /// anything else is a configuration or programming error and is fatal
    /// regardless of policy.
    pub fn apply<T>(&self, result: Result<T, Error>) -> BindingOutcome<T> {
        match result {
            Ok(value) => BindingOutcome::Success(value),
            Err(err @ (Error::InvalidInput | Error::NonCanonical { .. })) => {
                if self.allow_numeric_fallback {
                    BindingOutcome::DeferToFallback
                } else {
                    BindingOutcome::Rejected(err)
                }
            }
            Err(err) => BindingOutcome::Rejected(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NumericKind;

    #[test]
    fn test_success_passes_through() {
        let policy = BindingPolicy::new();
        assert_eq!(policy.apply(Ok(42u64)), BindingOutcome::Success(42));
    }

    #[test]
    fn test_rejects_without_fallback() {
        let policy = BindingPolicy::new();
        assert_eq!(
            policy.apply::<u64>(Err(Error::InvalidInput)),
            BindingOutcome::Rejected(Error::InvalidInput)
        );
    }

    #[test]
    fn test_defers_with_fallback() {
        let policy = BindingPolicy::new().allow_numeric_fallback(true);
        assert_eq!(
            policy.apply::<u64>(Err(Error::InvalidInput)),
            BindingOutcome::DeferToFallback
        );
        assert_eq!(
            policy.apply::<u64>(Err(Error::NonCanonical {
                received: "uno".to_string(),
                canonical: "one".to_string(),
            })),
            BindingOutcome::DeferToFallback
        );
    }

    #[test]
    fn test_range_errors_are_fatal_regardless_of_policy() {
        let policy = BindingPolicy::new().allow_numeric_fallback(true);
        let err = Error::OutOfRange {
            value: -1,
            kind: NumericKind::Int32,
        };
        assert_eq!(
            policy.apply::<u64>(Err(err)),
            BindingOutcome::Rejected(Error::OutOfRange {
                value: -1,
                kind: NumericKind::Int32,
            })
        );
    }
}
