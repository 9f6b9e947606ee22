//! Collector thread
//!
//! Receives partials from all workers until every sender is gone. With
//! [`MergeStrategy::Sort`] the partials are kept as-is and later sorted and
//! coalesced; with [`MergeStrategy::Map`] they are folded into one
//! aggregate per key as they arrive.

use crossbeam_channel::Receiver;
use std::collections::HashMap;

use crate::aggregate::Aggregate;
use crate::config::MergeStrategy;
use crate::sort::sort_aggregates;

#[derive(Debug)]
pub enum Collected {
    Partials(Vec<Aggregate>),
    ByKey(HashMap<i32, Aggregate>),
}

impl Collected {
    pub fn new(strategy: MergeStrategy) -> Self {
        match strategy {
            MergeStrategy::Sort => Collected::Partials(Vec::new()),
            MergeStrategy::Map => Collected::ByKey(HashMap::new()),
        }
    }

    pub fn push(&mut self, partial: Aggregate) {
        match self {
            Collected::Partials(partials) => partials.push(partial),
            Collected::ByKey(by_key) => match by_key.get_mut(&partial.key) {
                Some(existing) => existing.merge(&partial),
                None => {
                    by_key.insert(partial.key, partial);
                }
            },
        }
    }

    /// Number of held aggregates
    pub fn len(&self) -> usize {
        match self {
            Collected::Partials(partials) => partials.len(),
            Collected::ByKey(by_key) => by_key.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Aggregates ordered by key, equal keys adjacent
    pub fn into_sorted(self) -> Vec<Aggregate> {
        let mut aggregates = match self {
            Collected::Partials(partials) => partials,
            Collected::ByKey(by_key) => by_key.into_values().collect(),
        };
        sort_aggregates(&mut aggregates);
        aggregates
    }
}

/// Collector thread: drains the partials channel
pub(crate) fn collector_thread(partials: Receiver<Aggregate>, strategy: MergeStrategy) -> Collected {
    let mut collected = Collected::new(strategy);
    for partial in partials {
        collected.push(partial);
    }
    collected
}
