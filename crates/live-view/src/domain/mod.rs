//! Domain Layer
//!
//! Records, session scope, edit permissions and the error taxonomy.

mod access;
mod error;
mod history;
mod record;
mod scope;
mod task;

pub use access::{BranchEditPolicy, EditPolicy};
pub use error::{LiveResult, LiveViewError, Operation, RemoteError, RemoteErrorCode};
pub use history::{BroadcastType, DeliveryStatus, HistoryEntry, TemplateTone};
pub use record::{decode_documents, to_fields, Document, Record, BRANCH_FIELD};
pub use scope::{BranchId, Scope, ScopeResolver, SessionCache, SessionContext, ALL_BRANCHES};
pub use task::{Task, TaskDraft, TaskPatch, TaskStatus};
