//! Live event selection.

use std::collections::HashMap;

use crate::types::{Event, League};

/// An in-progress event together with the league it was fetched under.
#[derive(Debug, Clone, Copy)]
pub struct LiveEvent<'a> {
    pub league: &'a League,
    pub event: &'a Event,
}

/// Every event whose state is `"in"`, in league order then
/// within-league order.
pub fn select_live<'a>(
    leagues: &'a [League],
    scores: &'a HashMap<String, Vec<Event>>,
) -> Vec<LiveEvent<'a>> {
    leagues
        .iter()
        .flat_map(|league| {
            scores
                .get(&league.id)
                .into_iter()
                .flatten()
                .filter(|event| event.is_live())
                .map(move |event| LiveEvent { league, event })
        })
        .collect()
}
