//! Remote Store Layer
//!
//! Collaborator contracts and an in-memory implementation.

mod memory;
mod traits;

pub use memory::MemoryCollection;
pub use traits::{ListenerRegistration, LiveCollection, MutationTransport, RemoteEvent, SnapshotListener};
