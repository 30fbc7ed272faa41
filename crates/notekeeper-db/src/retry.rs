//! Bounded retry for optimistic transaction conflicts.
//!
//! Concurrent writers touching the same record (a `_sequence` counter,
//! a note being edited twice) make all but one transaction fail with a
//! write conflict. Those transactions are run again after a short
//! randomised pause.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use crate::error::DbError;

const MAX_ATTEMPTS: u32 = 16;
const BASE_DELAY_MS: u64 = 2;
const MAX_DELAY_MS: u64 = 100;

/// Run `attempt` until it succeeds, fails with something other than a
/// transaction conflict, or `MAX_ATTEMPTS` is reached.
pub(crate) async fn retry_on_conflict<T, F, Fut>(operation: &'static str, mut attempt: F) -> Result<T, DbError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbError>>,
{
    let mut tries = 1;
    loop {
        match attempt().await {
            Err(e) if e.is_conflict() && tries < MAX_ATTEMPTS => {
                let ceiling = (BASE_DELAY_MS << tries.min(6)).min(MAX_DELAY_MS);
                let delay_ms = rand::rng().random_range(1..=ceiling);
                debug!(operation, tries, delay_ms, "Transaction conflict, retrying");
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                tries += 1;
            }
            Err(e) => {
                if e.is_conflict() {
                    warn!(operation, tries, "Giving up after repeated transaction conflicts");
                }
                return Err(e);
            }
            ok => return ok,
        }
    }
}
