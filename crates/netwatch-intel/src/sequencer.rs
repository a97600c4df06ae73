//! Running adapters in order or all at once.

use futures_util::future::join_all;
use netwatch_core::{IntelError, Result, SourceAdapter, SourceResult};
use tracing::{debug, warn};

/// Boxed adapter for query `Q` producing fragment `F`
pub type Adapter<Q, F> = Box<dyn SourceAdapter<Q, Fragment = F>>;

/// A fragment together with the provider that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<F> {
    /// Provider name
    pub source: &'static str,
    /// Provider data
    pub fragment: F,
}

/// Try each adapter in preference order and stop at the first success.
///
/// Any failure moves on to the next adapter; none is retried. When the whole
/// chain fails the error of the last adapter tried is returned.
pub async fn first_success<Q, F>(adapters: &[Adapter<Q, F>], query: &Q) -> Result<Sourced<F>>
where
    Q: ?Sized + Sync,
    F: Send,
{
    let mut last = None;

    for adapter in adapters {
        match adapter.fetch(query).await {
            Ok(fragment) => {
                debug!(provider = adapter.name(), "source answered");
                return Ok(Sourced {
                    source: adapter.name(),
                    fragment,
                });
            }
            Err(e) => {
                warn!(provider = adapter.name(), error = %e, "source failed, trying next");
                last = Some(e);
            }
        }
    }

    Err(IntelError::AllSourcesFailed { last })
}

/// Query every adapter concurrently and wait for all of them.
///
/// Outcomes come back in declaration order regardless of which provider
/// answered first, so callers can inspect them deterministically.
pub async fn fan_out<Q, F>(
    adapters: &[Adapter<Q, F>],
    query: &Q,
) -> Vec<(&'static str, SourceResult<F>)>
where
    Q: ?Sized + Sync,
    F: Send,
{
    let outcomes = join_all(adapters.iter().map(|adapter| async move {
        (adapter.name(), adapter.fetch(query).await)
    }))
    .await;

    for (provider, outcome) in &outcomes {
        if let Err(e) = outcome {
            warn!(provider, error = %e, "source failed");
        }
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stubs::Stub;
    use netwatch_core::SourceError;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    fn chain(stubs: Vec<Stub<u32>>) -> Vec<Adapter<str, u32>> {
        stubs
            .into_iter()
            .map(|s| Box::new(s) as Adapter<str, u32>)
            .collect()
    }

    #[tokio::test]
    async fn stops_at_first_success() {
        let second = Stub::ok("second", 2);
        let third = Stub::ok("third", 3);
        let third_calls = third.calls();
        let adapters = chain(vec![
            Stub::err("first", SourceError::unavailable("first", "HTTP 500")),
            second,
            third,
        ]);

        let answer = assert_ok!(first_success(&adapters, "q").await);
        assert_eq!(answer.source, "second");
        assert_eq!(answer.fragment, 2);
        assert_eq!(third_calls.get(), 0);
    }

    #[tokio::test]
    async fn not_found_and_malformed_fall_through() {
        let adapters = chain(vec![
            Stub::err("a", SourceError::NotFound { provider: "a" }),
            Stub::err("b", SourceError::malformed("b", "bad json")),
            Stub::ok("c", 7),
        ]);
        assert_eq!(first_success(&adapters, "q").await.unwrap().source, "c");
    }

    #[tokio::test]
    async fn exhausted_chain_reports_last_error() {
        let adapters = chain(vec![
            Stub::err("a", SourceError::unavailable("a", "timeout")),
            Stub::err("b", SourceError::unavailable("b", "HTTP 503")),
        ]);
        let err = assert_err!(first_success(&adapters, "q").await);
        assert_eq!(
            err,
            IntelError::AllSourcesFailed {
                last: Some(SourceError::unavailable("b", "HTTP 503"))
            }
        );
    }

    #[tokio::test]
    async fn empty_chain_fails_without_cause() {
        let err = first_success(&chain(vec![]), "q").await.unwrap_err();
        assert_eq!(err, IntelError::AllSourcesFailed { last: None });
    }

    #[tokio::test]
    async fn fan_out_keeps_declaration_order() {
        let adapters = chain(vec![
            Stub::ok("slow", 1).delayed(Duration::from_millis(50)),
            Stub::err("broken", SourceError::unavailable("broken", "down")),
            Stub::ok("fast", 3),
        ]);

        let outcomes = fan_out(&adapters, "q").await;
        let names: Vec<_> = outcomes.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["slow", "broken", "fast"]);
        assert_eq!(outcomes[0].1, Ok(1));
        assert!(outcomes[1].1.is_err());
        assert_eq!(outcomes[2].1, Ok(3));
    }

    #[tokio::test]
    async fn fan_out_calls_every_adapter_once() {
        let a = Stub::err("a", SourceError::unavailable("a", "down"));
        let b = Stub::ok("b", 2);
        let (a_calls, b_calls) = (a.calls(), b.calls());

        fan_out(&chain(vec![a, b]), "q").await;
        assert_eq!(a_calls.get(), 1);
        assert_eq!(b_calls.get(), 1);
    }
}
