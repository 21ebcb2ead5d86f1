//! Aggregation of parsed events into per-page, per-client, per-browser and
//! per-severity views.
//!
//! Every view remembers the order in which its keys were first seen, so the
//! descending-count ranking can break ties by first appearance in the log.

use crate::{AccessEvent, BrowserCategory, ErrorEvent};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Insertion-ordered map from key to accumulated value
#[derive(Debug, Clone)]
pub struct FirstSeen<K, V> {
    entries: Vec<(K, V)>,
    index: HashMap<K, usize>,
}

impl<K, V> FirstSeen<K, V>
where
    K: Eq + Hash + Clone,
    V: Default,
{
    pub fn new() -> Self {
        Self { entries: Vec::new(), index: HashMap::new() }
    }

    /// Value for `key`, created on first observation
    pub fn entry(&mut self, key: &K) -> &mut V {
        let idx = match self.index.get(key) {
            Some(&idx) => idx,
            None => {
                self.entries.push((key.clone(), V::default()));
                self.index.insert(key.clone(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&idx| &self.entries[idx].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Entries by descending count; equal counts keep first-seen order
    pub fn ranked_by<F>(&self, count: F) -> Vec<(&K, &V)>
    where
        F: Fn(&V) -> usize,
    {
        let mut ranked: Vec<_> = self.iter().collect();
        // sort_by is stable
        ranked.sort_by(|a, b| count(b.1).cmp(&count(a.1)));
        ranked
    }
}

impl<K, V> Default for FirstSeen<K, V>
where
    K: Eq + Hash + Clone,
    V: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

// PAGE STATS //

/// Everything observed for one request path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageStat {
    pub hit_count: usize,
    pub clients: Vec<String>,
    pub timestamps: Vec<i64>,
    pub browsers: Vec<BrowserCategory>,
}

impl PageStat {
    pub fn distinct_clients(&self) -> usize {
        self.clients.iter().collect::<HashSet<_>>().len()
    }
}

// SEVERITY STATS //

/// Everything observed for one severity tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeverityStat {
    pub hit_count: usize,
    pub clients: Vec<String>,
    pub timestamps: Vec<i64>,
}

impl SeverityStat {
    pub fn distinct_clients(&self) -> usize {
        self.clients.iter().collect::<HashSet<_>>().len()
    }
}

/// Page, client and browser views over the access events
#[derive(Debug, Clone, Default)]
pub struct AccessAggregates {
    pub pages: FirstSeen<String, PageStat>,
    pub clients: FirstSeen<String, usize>,
    pub browsers: FirstSeen<BrowserCategory, usize>,
}

impl AccessAggregates {
    pub fn from_events(events: &[AccessEvent]) -> Self {
        let mut aggregates = Self::default();

        for event in events {
            let page = aggregates.pages.entry(&event.request_path);
            page.hit_count += 1;
            page.clients.push(event.client_address.clone());
            page.timestamps.push(event.timestamp);
            page.browsers.push(event.browser_category);

            *aggregates.clients.entry(&event.client_address) += 1;
            *aggregates.browsers.entry(&event.browser_category) += 1;
        }

        aggregates
    }

    pub fn ranked_pages(&self) -> Vec<(&String, &PageStat)> {
        self.pages.ranked_by(|stat| stat.hit_count)
    }

    pub fn ranked_clients(&self) -> Vec<(&String, &usize)> {
        self.clients.ranked_by(|count| *count)
    }

    pub fn ranked_browsers(&self) -> Vec<(&BrowserCategory, &usize)> {
        self.browsers.ranked_by(|count| *count)
    }

    pub fn total_hits(&self) -> usize {
        self.pages.iter().map(|(_, stat)| stat.hit_count).sum()
    }
}

/// Severity view over the error events
#[derive(Debug, Clone, Default)]
pub struct SeverityAggregates {
    pub severities: FirstSeen<String, SeverityStat>,
}

impl SeverityAggregates {
    pub fn from_events(events: &[ErrorEvent]) -> Self {
        let mut aggregates = Self::default();

        for event in events {
            let stat = aggregates.severities.entry(&event.severity_level);
            stat.hit_count += 1;
            stat.clients.push(event.client_address.clone());
            stat.timestamps.push(event.timestamp);
        }

        aggregates
    }

    pub fn ranked(&self) -> Vec<(&String, &SeverityStat)> {
        self.severities.ranked_by(|stat| stat.hit_count)
    }

    pub fn total_hits(&self) -> usize {
        self.severities.iter().map(|(_, stat)| stat.hit_count).sum()
    }
}
