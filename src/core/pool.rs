// src/core/pool.rs

use futures::{StreamExt, stream};
use std::future::Future;

/// Runs `f` over `items` with at most `limit` futures in flight at once.
///
/// This is the single concurrency limiter shared by the enrichment and port
/// probe stages, sized to respect third-party rate limits regardless of how
/// many IPs an analysis produced. Completion order is not preserved; callers
/// collect into keyed maps.
pub async fn bounded_map<I, T, F, Fut>(items: Vec<I>, limit: usize, f: F) -> Vec<T>
where
    F: Fn(I) -> Fut,
    Fut: Future<Output = T>,
{
    stream::iter(items)
        .map(f)
        .buffer_unordered(limit.max(1))
        .collect()
        .await
}
