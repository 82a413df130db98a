//! Live Query Builder
//!
//! Turns the session scope into a query over a remote collection. No query
//! is produced until both the connection and the scope are known, so an
//! unscoped read can never go out before authorization context exists.

use serde::Serialize;

use crate::domain::{Document, Record, Scope, BRANCH_FIELD};

/// Connection to the remote document store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteHandle {
    database: String,
}

impl RemoteHandle {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
        }
    }

    pub fn database(&self) -> &str {
        &self.database
    }
}

/// Equality filter on one document field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldFilter {
    pub field: String,
    pub value: String,
}

impl FieldFilter {
    pub fn matches(&self, doc: &Document) -> bool {
        doc.field_str(&self.field) == Some(self.value.as_str())
    }
}

/// A standing query over one collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescriptor {
    pub database: String,
    pub collection: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FieldFilter>,
}

impl QueryDescriptor {
    pub fn matches(&self, collection: &str, doc: &Document) -> bool {
        self.collection == collection && self.filter.as_ref().map_or(true, |f| f.matches(doc))
    }

    pub fn is_scoped(&self) -> bool {
        self.filter.is_some()
    }
}

/// Build the query for `R` under `scope`.
///
/// Returns `None` while either the connection or the scope is missing.
pub fn build_query<R: Record>(remote: Option<&RemoteHandle>, scope: Option<&Scope>) -> Option<QueryDescriptor> {
    let (remote, scope) = (remote?, scope?);
    let filter = match scope {
        Scope::All => None,
        Scope::Branch(branch) => Some(FieldFilter {
            field: BRANCH_FIELD.to_string(),
            value: branch.as_str().to_string(),
        }),
    };
    Some(QueryDescriptor {
        database: remote.database().to_string(),
        collection: R::COLLECTION.to_string(),
        filter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BranchId, HistoryEntry, Task};
    use serde_json::json;

    fn remote() -> RemoteHandle {
        RemoteHandle::new("naviga")
    }

    #[test]
    fn test_no_query_without_scope_or_connection() {
        assert_eq!(build_query::<Task>(Some(&remote()), None), None);
        assert_eq!(build_query::<Task>(None, Some(&Scope::All)), None);
        assert_eq!(build_query::<Task>(None, None), None);
    }

    #[test]
    fn test_branch_scope_is_always_filtered() {
        let scope = Scope::Branch(BranchId::new("12001"));
        let query = build_query::<HistoryEntry>(Some(&remote()), Some(&scope)).unwrap();
        assert_eq!(query.collection, "history");
        assert!(query.is_scoped());
        assert_eq!(
            query.filter,
            Some(FieldFilter {
                field: "upc".to_string(),
                value: "12001".to_string()
            })
        );
    }

    #[test]
    fn test_all_scope_has_no_filter() {
        let query = build_query::<Task>(Some(&remote()), Some(&Scope::All)).unwrap();
        assert_eq!(query.collection, "tasks");
        assert!(!query.is_scoped());
    }

    #[test]
    fn test_descriptor_matching() {
        let scope = Scope::Branch(BranchId::new("12001"));
        let query = build_query::<Task>(Some(&remote()), Some(&scope)).unwrap();
        let own = Document::from_value("a", json!({"upc": "12001"}));
        let other = Document::from_value("b", json!({"upc": "12002"}));
        assert!(query.matches("tasks", &own));
        assert!(!query.matches("tasks", &other));
        assert!(!query.matches("history", &own));
    }
}
