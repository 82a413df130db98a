//! List Projection
//!
//! Activity log view: newest first, narrowed by calendar day and broadcast
//! type.

use chrono::{Local, NaiveDate, TimeZone};

use crate::domain::{BroadcastType, HistoryEntry, LiveResult, LiveViewError};

/// Broadcast type selector ("all" or one type)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(BroadcastType),
}

impl TypeFilter {
    pub fn matches(&self, broadcast_type: BroadcastType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(wanted) => *wanted == broadcast_type,
        }
    }

    /// Parse a selector value: `"all"` or a broadcast type label
    pub fn parse(raw: &str) -> LiveResult<Self> {
        if raw == "all" {
            return Ok(TypeFilter::All);
        }
        BroadcastType::from_label(raw)
            .map(TypeFilter::Only)
            .ok_or_else(|| LiveViewError::Validation(format!("unknown broadcast type {:?}", raw)))
    }

    pub fn value(&self) -> &'static str {
        match self {
            TypeFilter::All => "all",
            TypeFilter::Only(t) => t.label(),
        }
    }
}

/// Filter inputs of the activity log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryFilter {
    pub date: Option<NaiveDate>,
    pub broadcast_type: TypeFilter,
}

impl HistoryFilter {
    /// Today's entries of every type
    pub fn today() -> Self {
        Self {
            date: Some(Local::now().date_naive()),
            broadcast_type: TypeFilter::All,
        }
    }

    pub fn is_active(&self) -> bool {
        self.date.is_some() || self.broadcast_type != TypeFilter::All
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Project in the local time zone
pub fn project_history(entries: &[HistoryEntry], filter: &HistoryFilter) -> Vec<HistoryEntry> {
    project_history_in(entries, filter, &Local)
}

/// Sort newest first (stable on equal timestamps), then keep entries whose
/// day in `tz` and type match the filter. The input is left untouched.
pub fn project_history_in<Tz: TimeZone>(
    entries: &[HistoryEntry],
    filter: &HistoryFilter,
    tz: &Tz,
) -> Vec<HistoryEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted.retain(|entry| {
        let date_match = filter.date.map_or(true, |day| entry.day_in(tz) == day);
        date_match && filter.broadcast_type.matches(entry.broadcast_type)
    });
    sorted
}
