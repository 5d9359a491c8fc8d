//! Batch hydration of ordered ID lists.

use std::future::Future;

use fedimoji_common::{AppError, AppResult};
use tracing::warn;

/// Resolve each ID in order with `resolve`.
///
/// An empty `ids` slice is reported as [`AppError::NoEntries`] without
/// calling `resolve`. A failed ID is logged and skipped, so the output may
/// be shorter than the input but never contains a placeholder. Cancellation
/// and timeouts abort the whole batch.
pub async fn hydrate<T, F, Fut>(
    kind: &'static str,
    ids: &[String],
    mut resolve: F,
) -> AppResult<Vec<T>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    if ids.is_empty() {
        return Err(AppError::NoEntries);
    }

    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        match resolve(id.clone()).await {
            Ok(entity) => out.push(entity),
            Err(err) if err.is_interrupted() => return Err(err),
            Err(err) => {
                warn!(kind, id = %id, error = %err, "Skipping entry that failed to load");
            }
        }
    }

    Ok(out)
}
