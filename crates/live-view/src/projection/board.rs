//! Board Projection
//!
//! Groups records into a fixed, ordered set of columns keyed by status.
//! The board is rebuilt from the whole snapshot every time; nothing is
//! patched in place, so it can never drift from the source records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Record, Task};

/// Column definition from configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub id: String,
    pub title: String,
}

impl ColumnSpec {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Records that can sit on a board
pub trait BoardCard: Record {
    /// Status text matched against column titles
    fn column_title(&self) -> &str;

    /// Secondary key for ordering inside a column
    fn sort_title(&self) -> &str;
}

impl BoardCard for Task {
    fn column_title(&self) -> &str {
        self.status.title()
    }

    fn sort_title(&self) -> &str {
        &self.title
    }
}

/// One projected column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub id: String,
    pub title: String,
    pub task_ids: Vec<String>,
}

/// Render-ready board
#[derive(Debug, Clone, PartialEq)]
pub struct Board<R> {
    /// Every record of the snapshot, by id
    pub records: BTreeMap<String, R>,
    pub columns: BTreeMap<String, Column>,
    /// Fixed display order of `columns`
    pub column_order: Vec<String>,
}

impl<R> Default for Board<R> {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
            columns: BTreeMap::new(),
            column_order: Vec::new(),
        }
    }
}

impl<R: BoardCard> Board<R> {
    /// Board with no records
    pub fn empty(specs: &[ColumnSpec]) -> Self {
        project_board(&[], specs)
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.get(column_id)
    }

    pub fn first_column(&self) -> Option<&Column> {
        self.column_order.first().and_then(|id| self.columns.get(id))
    }

    /// Columns in display order
    pub fn ordered_columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.column_order.iter().filter_map(move |id| self.columns.get(id))
    }

    /// Records of a column in display order
    pub fn cards(&self, column_id: &str) -> Vec<&R> {
        self.columns
            .get(column_id)
            .map(|column| {
                column
                    .task_ids
                    .iter()
                    .filter_map(|id| self.records.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Column currently holding `record_id`
    pub fn column_of(&self, record_id: &str) -> Option<&Column> {
        self.ordered_columns()
            .find(|column| column.task_ids.iter().any(|id| id == record_id))
    }

    pub fn record(&self, record_id: &str) -> Option<&R> {
        self.records.get(record_id)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Project `records` onto the fixed `specs` columns.
///
/// A record whose status matches no column title goes to the first column.
/// Columns are ordered by title, then id.
pub fn project_board<R: BoardCard>(records: &[R], specs: &[ColumnSpec]) -> Board<R> {
    let mut index: BTreeMap<String, R> = BTreeMap::new();
    for record in records {
        index.insert(record.id().to_string(), record.clone());
    }

    let mut columns: BTreeMap<String, Column> = specs
        .iter()
        .map(|spec| {
            (
                spec.id.clone(),
                Column {
                    id: spec.id.clone(),
                    title: spec.title.clone(),
                    task_ids: Vec::new(),
                },
            )
        })
        .collect();
    let column_order: Vec<String> = specs.iter().map(|spec| spec.id.clone()).collect();

    for record in index.values() {
        let target = specs
            .iter()
            .find(|spec| spec.title == record.column_title())
            .or_else(|| specs.first());
        let Some(target) = target else {
            continue;
        };
        if let Some(column) = columns.get_mut(&target.id) {
            let id = record.id();
            if !column.task_ids.iter().any(|existing| existing == id) {
                column.task_ids.push(id.to_string());
            }
        }
    }

    for column in columns.values_mut() {
        column.task_ids.sort_by(|a, b| {
            let title_a = index.get(a).map(|r| r.sort_title()).unwrap_or_default();
            let title_b = index.get(b).map(|r| r.sort_title()).unwrap_or_default();
            title_a.cmp(title_b).then_with(|| a.cmp(b))
        });
    }

    Board {
        records: index,
        columns,
        column_order,
    }
}
