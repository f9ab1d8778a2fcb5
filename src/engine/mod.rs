//! Core engine — the leagues → scoreboards → live → odds refresh cycle.

pub mod catalog;
pub mod scoreboard;
pub mod live;
pub mod odds;
pub mod orchestrator;

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use std::future::Future;

/// Drive every future to completion and return their outputs in input
/// order. Each future must contain its own failures; nothing here
/// short-circuits.
///
/// With `limit` set, at most that many run at once.
pub(crate) async fn fan_out<I, Fut>(futures: I, limit: Option<usize>) -> Vec<Fut::Output>
where
    I: IntoIterator<Item = Fut>,
    Fut: Future,
{
    match limit {
        Some(n) if n > 0 => stream::iter(futures).buffered(n).collect().await,
        _ => join_all(futures).await,
    }
}
