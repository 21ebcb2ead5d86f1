// Hourly timeline of event counts
// Buckets are keyed by their numeric start, so ordering never depends on label format.

use crate::timestamp::{bucket_start, format_hour};
use chrono::FixedOffset;
use serde::Serialize;
use std::collections::BTreeMap;

/// One hour bucket, serialized as a chart point `{"x": label, "y": count}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelinePoint {
    #[serde(skip)]
    pub bucket_start: i64,

    #[serde(rename = "x")]
    pub label: String,

    #[serde(rename = "y")]
    pub count: usize,
}

/// Count timestamps per hour, ascending by bucket start
pub fn build_timeline<I>(timestamps: I, offset: &FixedOffset) -> Vec<TimelinePoint>
where
    I: IntoIterator<Item = i64>,
{
    let mut buckets: BTreeMap<i64, usize> = BTreeMap::new();
    for ts in timestamps {
        *buckets.entry(bucket_start(ts)).or_insert(0) += 1;
    }

    buckets
        .into_iter()
        .map(|(start, count)| TimelinePoint {
            bucket_start: start,
            label: format_hour(start, offset),
            count,
        })
        .collect()
}
