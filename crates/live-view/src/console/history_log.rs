//! Broadcast Activity Log

use std::rc::Rc;

use chrono::{NaiveDate, TimeZone};
use tokio::sync::watch;

use crate::domain::{HistoryEntry, Scope};
use crate::projection::{project_history, project_history_in, HistoryFilter, TypeFilter};
use crate::query::{build_query, RemoteHandle};
use crate::remote::LiveCollection;
use crate::subscription::{LiveState, SubscriptionManager};

pub struct HistoryLog {
    scope: Option<Scope>,
    remote: Option<RemoteHandle>,
    live: SubscriptionManager<HistoryEntry>,
    filter: HistoryFilter,
}

impl HistoryLog {
    pub fn new(
        scope: Option<Scope>,
        remote: Option<RemoteHandle>,
        collection: Rc<dyn LiveCollection>,
        default_to_today: bool,
    ) -> Self {
        let filter = if default_to_today {
            HistoryFilter::today()
        } else {
            HistoryFilter::default()
        };
        let mut log = Self {
            scope,
            remote,
            live: SubscriptionManager::new(collection),
            filter,
        };
        log.refresh_query();
        log
    }

    pub fn filter(&self) -> &HistoryFilter {
        &self.filter
    }

    pub fn set_date(&mut self, date: Option<NaiveDate>) {
        self.filter.date = date;
    }

    pub fn set_type(&mut self, broadcast_type: TypeFilter) {
        self.filter.broadcast_type = broadcast_type;
    }

    pub fn clear_filters(&mut self) {
        self.filter.clear();
    }

    pub fn live(&self) -> LiveState<HistoryEntry> {
        self.live.state()
    }

    pub fn watch(&self) -> watch::Receiver<LiveState<HistoryEntry>> {
        self.live.watch()
    }

    /// Filtered entries, newest first
    pub fn entries(&self) -> Vec<HistoryEntry> {
        project_history(&self.live.state().records, &self.filter)
    }

    pub fn entries_in<Tz: TimeZone>(&self, tz: &Tz) -> Vec<HistoryEntry> {
        project_history_in(&self.live.state().records, &self.filter, tz)
    }

    /// Entries from several branches are mixed, so show which is which
    pub fn shows_branch_column(&self) -> bool {
        self.scope.as_ref().is_some_and(Scope::is_all)
    }

    pub fn rescope(&mut self, scope: Option<Scope>) {
        self.scope = scope;
        self.refresh_query();
    }

    pub fn detach(&mut self) {
        self.live.detach();
    }

    fn refresh_query(&mut self) {
        let query = build_query::<HistoryEntry>(self.remote.as_ref(), self.scope.as_ref());
        self.live.set_query(query);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BranchId, BroadcastType};
    use crate::remote::MemoryCollection;
    use chrono::Utc;
    use serde_json::json;

    fn seeded() -> MemoryCollection {
        let store = MemoryCollection::new();
        let entry = |upc: &str, ts: &str, kind: &str| {
            json!({
                "timestamp": ts,
                "type": kind,
                "customerName": "Budi",
                "customerIdentifier": "N/A",
                "status": "Notifikasi Terkirim",
                "template": "pengingat",
                "adminUser": "sari",
                "upc": upc
            })
        };
        store.insert_json("history", "h1", entry("12001", "2024-05-01T08:00:00Z", "Gadaian Broadcast"));
        store.insert_json("history", "h2", entry("12001", "2024-05-02T08:00:00Z", "Angsuran Broadcast"));
        store.insert_json("history", "h3", entry("12002", "2024-05-01T09:00:00Z", "Gadaian Broadcast"));
        store
    }

    fn ids(entries: &[HistoryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_branch_scope_sees_own_entries() {
        let store = seeded();
        let log = HistoryLog::new(
            Some(Scope::Branch(BranchId::new("12001"))),
            Some(RemoteHandle::new("naviga")),
            Rc::new(store.clone()),
            false,
        );
        assert!(log.live().is_loading);
        store.flush();
        assert_eq!(ids(&log.entries_in(&Utc)), vec!["h2", "h1"]);
        assert!(!log.shows_branch_column());
    }

    #[test]
    fn test_filters_and_clear() {
        let store = seeded();
        let mut log = HistoryLog::new(Some(Scope::All), Some(RemoteHandle::new("naviga")), Rc::new(store.clone()), true);
        assert!(log.filter().is_active());
        store.flush();
        assert!(log.shows_branch_column());

        log.set_date(NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(ids(&log.entries_in(&Utc)), vec!["h3", "h1"]);

        log.set_type(TypeFilter::Only(BroadcastType::Installment));
        assert!(log.entries_in(&Utc).is_empty());

        log.clear_filters();
        assert!(!log.filter().is_active());
        assert_eq!(log.entries_in(&Utc).len(), 3);
    }

    #[test]
    fn test_no_scope_no_query() {
        let store = seeded();
        let log = HistoryLog::new(None, Some(RemoteHandle::new("naviga")), Rc::new(store.clone()), false);
        assert_eq!(store.listener_count(), 0);
        assert!(!log.live().is_loading);
        assert!(log.entries().is_empty());
    }
}
