//! Two-shape result value returned by every invocation.

use serde::{Deserialize, Serialize};

/// Tag of an [`Outcome`], for logging and reporting without touching the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    Success,
    Failure,
}

impl OutcomeKind {
    /// Lower-case label used in tracing fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

/// Either the result of a completed invocation or the reason it failed.
///
/// Exactly one variant is set and the payload cannot be reached without
/// matching on it first. Serializes as `{"kind": "SUCCESS", "value": ...}`
/// or `{"kind": "FAILURE", "value": ...}`.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome<R, F> {
    /// The operation and every after-middleware completed.
    Success(R),
    /// Some step failed; later steps did not run.
    Failure(F),
}

impl<R, F> Outcome<R, F> {
    /// Wrap a success payload.
    pub fn success(result: R) -> Self {
        Self::Success(result)
    }

    /// Wrap a failure payload.
    pub fn failure(failure: F) -> Self {
        Self::Failure(failure)
    }

    /// Which of the two shapes this is.
    #[must_use]
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Success(_) => OutcomeKind::Success,
            Self::Failure(_) => OutcomeKind::Failure,
        }
    }

    /// `true` for `Success`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// `true` for `Failure`.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Borrow the success payload, if this is a success.
    #[must_use]
    pub fn as_success(&self) -> Option<&R> {
        match self {
            Self::Success(r) => Some(r),
            Self::Failure(_) => None,
        }
    }

    /// Borrow the failure payload, if this is a failure.
    #[must_use]
    pub fn as_failure(&self) -> Option<&F> {
        match self {
            Self::Success(_) => None,
            Self::Failure(f) => Some(f),
        }
    }

    /// Take the success payload, discarding a failure.
    #[must_use]
    pub fn into_success(self) -> Option<R> {
        match self {
            Self::Success(r) => Some(r),
            Self::Failure(_) => None,
        }
    }

    /// Take the failure payload, discarding a success.
    #[must_use]
    pub fn into_failure(self) -> Option<F> {
        match self {
            Self::Success(_) => None,
            Self::Failure(f) => Some(f),
        }
    }

    /// Convert into a `Result` so callers can use `?` on the outcome.
    ///
    /// # Errors
    ///
    /// Returns the failure payload when the outcome is a failure.
    pub fn into_result(self) -> Result<R, F> {
        match self {
            Self::Success(r) => Ok(r),
            Self::Failure(f) => Err(f),
        }
    }

    /// Transform the success payload; failures pass through unchanged.
    pub fn map<T>(self, f: impl FnOnce(R) -> T) -> Outcome<T, F> {
        match self {
            Self::Success(r) => Outcome::Success(f(r)),
            Self::Failure(e) => Outcome::Failure(e),
        }
    }

    /// Transform the failure payload; successes pass through unchanged.
    pub fn map_failure<G>(self, f: impl FnOnce(F) -> G) -> Outcome<R, G> {
        match self {
            Self::Success(r) => Outcome::Success(r),
            Self::Failure(e) => Outcome::Failure(f(e)),
        }
    }
}

impl<R, F> From<Result<R, F>> for Outcome<R, F> {
    fn from(result: Result<R, F>) -> Self {
        match result {
            Ok(r) => Self::Success(r),
            Err(f) => Self::Failure(f),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_exposes_only_success_payload() {
        let o: Outcome<u32, String> = Outcome::success(7);
        assert!(o.is_success());
        assert!(!o.is_failure());
        assert_eq!(o.kind(), OutcomeKind::Success);
        assert_eq!(o.as_success(), Some(&7));
        assert_eq!(o.as_failure(), None);
    }

    #[test]
    fn failure_exposes_only_failure_payload() {
        let o: Outcome<u32, String> = Outcome::failure("boom".to_string());
        assert!(o.is_failure());
        assert_eq!(o.as_success(), None);
        assert_eq!(o.into_failure().as_deref(), Some("boom"));
    }

    #[test]
    fn result_conversion_preserves_tag() {
        let ok: Outcome<u32, String> = Ok(1).into();
        let err: Outcome<u32, String> = Err("x".to_string()).into();
        assert_eq!(ok.into_result(), Ok(1));
        assert_eq!(err.into_result(), Err("x".to_string()));
    }

    #[test]
    fn map_leaves_failure_untouched() {
        let o: Outcome<u32, &str> = Outcome::failure("nope");
        let mapped = o.map(|n| n * 2);
        assert_eq!(mapped, Outcome::Failure("nope"));

        let o: Outcome<u32, &str> = Outcome::success(21);
        assert_eq!(o.map(|n| n * 2), Outcome::Success(42));
    }

    #[test]
    fn map_failure_leaves_success_untouched() {
        let o: Outcome<u32, &str> = Outcome::failure("nope");
        assert_eq!(o.map_failure(str::len), Outcome::Failure(4));

        let o: Outcome<u32, &str> = Outcome::success(3);
        assert_eq!(o.map_failure(str::len), Outcome::Success(3));
    }

    #[test]
    fn serializes_with_screaming_kind_tag() {
        let o: Outcome<u32, String> = Outcome::success(5);
        let v = serde_json::to_value(&o).unwrap();
        assert_eq!(v["kind"], "SUCCESS");
        assert_eq!(v["value"], 5);

        let o: Outcome<u32, String> = Outcome::failure("bad".to_string());
        let v = serde_json::to_value(&o).unwrap();
        assert_eq!(v["kind"], "FAILURE");
        assert_eq!(v["value"], "bad");
    }

    mod props {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn result_round_trip_keeps_payload(n in any::<i64>(), ok in any::<bool>()) {
                let result: Result<i64, i64> = if ok { Ok(n) } else { Err(n) };
                let outcome = Outcome::from(result.clone());
                prop_assert_eq!(outcome.is_success(), ok);
                prop_assert_eq!(outcome.into_result(), result);
            }

            #[test]
            fn map_composes(n in -1000_i64..1000) {
                let o: Outcome<i64, ()> = Outcome::success(n);
                let composed = o.clone().map(|v| v + 1).map(|v| v * 3);
                prop_assert_eq!(composed, o.map(|v| (v + 1) * 3));
            }
        }
    }
}
