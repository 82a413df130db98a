//! NAVIGA Live View
//!
//! Client-side live-view layer of the operations console.
//!
//! Layered architecture:
//! - domain: Records, session scope, edit policy and errors
//! - query / subscription: Scoped live queries and their latest state
//! - projection: Pure board and list derivations
//! - mutation / drag: Non-blocking writes and drag reassignment
//! - console: The task board and activity log as UI-facing surfaces
//! - remote: Collaborator contracts and an in-memory store

pub mod config;
pub mod console;
pub mod domain;
pub mod drag;
pub mod mutation;
pub mod projection;
pub mod query;
pub mod remote;
pub mod subscription;
pub mod validation;


pub use config::{BoardConfig, ConsoleConfig, HistoryConfig};
pub use console::{Console, Dispatch, HistoryLog, TaskBoard, TaskIntent};
pub use domain::{LiveResult, LiveViewError};
pub use drag::{DragSession, DragState, DropOutcome};
pub use mutation::{ErrorBus, LocalTask, MutationSink, Spawner};
#[cfg(not(target_arch = "wasm32"))]
pub use mutation::TokioLocalSpawner;
pub use query::{build_query, QueryDescriptor, RemoteHandle};
pub use subscription::{LiveState, SubscriptionManager};
