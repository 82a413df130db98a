//! Console Views
//!
//! The two screens of the operations console, wired to the remote store:
//! the branch task board and the broadcast activity log.

mod history_log;
mod task_board;

pub use history_log::HistoryLog;
pub use task_board::{Dispatch, TaskBoard, TaskIntent};

use std::rc::Rc;

use crate::config::ConsoleConfig;
use crate::domain::{Scope, ScopeResolver, SessionCache, SessionContext};
use crate::mutation::{ErrorBus, MutationSink, Spawner};
use crate::remote::{LiveCollection, MutationTransport};

/// Everything a logged-in console session needs
pub struct Console {
    session: Option<SessionContext>,
    scope: Option<Scope>,
    pub tasks: TaskBoard,
    pub history: HistoryLog,
    pub errors: ErrorBus,
}

impl Console {
    /// Resolve the session scope once and open both views
    pub fn open(
        config: &ConsoleConfig,
        cache: &dyn SessionCache,
        collection: Rc<dyn LiveCollection>,
        transport: Rc<dyn MutationTransport>,
        spawner: Rc<dyn Spawner>,
    ) -> Self {
        let session = cache.read();
        let scope = ScopeResolver::from_session(session.as_ref()).scope().cloned();
        let errors = ErrorBus::default();
        let sink = MutationSink::new(transport, spawner, errors.clone());
        let remote = Some(config.remote());

        let tasks = TaskBoard::new(
            scope.clone(),
            remote.clone(),
            config.board.columns.clone(),
            Rc::clone(&collection),
            sink,
        );
        let history = HistoryLog::new(scope.clone(), remote, collection, config.history.default_to_today);

        Self {
            session,
            scope,
            tasks,
            history,
            errors,
        }
    }

    pub fn session(&self) -> Option<&SessionContext> {
        self.session.as_ref()
    }

    pub fn scope(&self) -> Option<&Scope> {
        self.scope.as_ref()
    }

    /// Close both live queries
    pub fn close(&mut self) {
        self.tasks.detach();
        self.history.detach();
    }
}
