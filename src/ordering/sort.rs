//! Weight-then-hue ordering of image records
//!
//! Higher weights always come first. Within a weight, records are ordered by
//! the hue of their current color in the configured direction. Saturation and
//! lightness are never consulted, so achromatic colors sort as hue 0. The sort
//! is stable: records that compare equal keep their collection order.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::BuildHasher;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::library::record::{ImageRecord, RecordId, Weight};

/// Direction in which hue is ordered within a weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
pub enum HueDirection {
    /// Red, yellow, green, blue, magenta
    #[default]
    #[serde(rename = "hue-asc")]
    #[value(name = "asc", alias = "ascending")]
    Ascending,
    /// Magenta, blue, green, yellow, red
    #[serde(rename = "hue-desc")]
    #[value(name = "desc", alias = "descending")]
    Descending,
}

impl HueDirection {
    /// The opposite direction
    pub const fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// Apply this direction to an ascending comparison
    pub const fn orient(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// Sort key snapshot taken once per record
#[derive(Debug, Clone, Copy)]
struct SortKey {
    id: RecordId,
    weight: Weight,
    hue: f64,
}

impl SortKey {
    fn of(record: &ImageRecord) -> Self {
        Self {
            id: record.id(),
            weight: record.weight(),
            hue: record.hue(),
        }
    }
}

fn compare_keys(a: &SortKey, b: &SortKey, direction: HueDirection) -> Ordering {
    b.weight
        .cmp(&a.weight)
        .then_with(|| direction.orient(a.hue.total_cmp(&b.hue)))
}

/// Compare two records by weight descending, then hue in `direction`
pub fn compare_records(a: &ImageRecord, b: &ImageRecord, direction: HueDirection) -> Ordering {
    compare_keys(&SortKey::of(a), &SortKey::of(b), direction)
}

/// Derived display order over a record set
///
/// Holds identifiers only; it is recomputed from the records, never edited
/// except to drop deleted entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortedView {
    order: Vec<RecordId>,
}

impl SortedView {
    /// Ordered identifiers
    pub fn ids(&self) -> &[RecordId] {
        &self.order
    }

    /// Number of ordered records
    pub const fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the view is empty
    pub const fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// At most the first `limit` identifiers
    pub fn first(&self, limit: usize) -> &[RecordId] {
        self.order.get(..limit.min(self.order.len())).unwrap_or(&[])
    }

    /// Position of a record in the order
    pub fn position(&self, id: RecordId) -> Option<usize> {
        self.order.iter().position(|&candidate| candidate == id)
    }

    /// Drop deleted records, keeping the order of the rest
    pub fn remove<S: BuildHasher>(&mut self, deleted: &HashSet<RecordId, S>) {
        self.order.retain(|id| !deleted.contains(id));
    }
}

/// Order records by weight descending, then hue
///
/// Each record's hue is computed once. Equal keys keep input order.
pub fn sort_records<'a, I>(records: I, direction: HueDirection) -> SortedView
where
    I: IntoIterator<Item = &'a ImageRecord>,
{
    let mut keys: Vec<SortKey> = records.into_iter().map(SortKey::of).collect();
    keys.sort_by(|a, b| compare_keys(a, b, direction));

    SortedView {
        order: keys.into_iter().map(|key| key.id).collect(),
    }
}
