//! Task Board
//!
//! UI-facing surface of the branch Kanban board. Intents are checked
//! locally (scope, edit guard, input) and turned into at most one remote
//! write each. The board shown to the user is always re-projected from the
//! latest snapshot.

use std::rc::Rc;

use tokio::sync::watch;

use crate::domain::{
    BranchEditPolicy, EditPolicy, LiveResult, LiveViewError, Record, Scope, Task, TaskDraft, TaskPatch,
    TaskStatus,
};
use crate::drag::{DragSession, DropOutcome};
use crate::mutation::MutationSink;
use crate::projection::{project_board, Board, ColumnSpec};
use crate::query::{build_query, RemoteHandle};
use crate::remote::LiveCollection;
use crate::subscription::{LiveState, SubscriptionManager};
use crate::validation::{normalize_label, validate_title};

/// User actions on the board
#[derive(Debug, Clone, PartialEq)]
pub enum TaskIntent {
    Create { column_id: String, draft: TaskDraft },
    Update { task_id: String, patch: TaskPatch },
    Delete { task_id: String },
    AddLabel { task_id: String, label: String },
    RemoveLabel { task_id: String, label: String },
    BeginDrag { task_id: String },
    CancelDrag,
    /// Release over a column, or over nothing
    Drop { destination: Option<String> },
}

/// Result of a successfully handled intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// A remote write went out
    Issued,
    /// Nothing to do
    Skipped,
    DragStarted,
    Dropped(DropOutcome),
}

pub struct TaskBoard {
    scope: Option<Scope>,
    remote: Option<RemoteHandle>,
    columns: Vec<ColumnSpec>,
    live: SubscriptionManager<Task>,
    sink: MutationSink,
    policy: Rc<dyn EditPolicy>,
    drag: DragSession,
}

impl TaskBoard {
    /// Opens the live query right away when scope and remote are known
    pub fn new(
        scope: Option<Scope>,
        remote: Option<RemoteHandle>,
        columns: Vec<ColumnSpec>,
        collection: Rc<dyn LiveCollection>,
        sink: MutationSink,
    ) -> Self {
        let mut board = Self {
            scope,
            remote,
            columns,
            live: SubscriptionManager::new(collection),
            sink,
            policy: Rc::new(BranchEditPolicy),
            drag: DragSession::new(),
        };
        board.refresh_query();
        board
    }

    pub fn with_policy(mut self, policy: Rc<dyn EditPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn scope(&self) -> Option<&Scope> {
        self.scope.as_ref()
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn live(&self) -> LiveState<Task> {
        self.live.state()
    }

    pub fn watch(&self) -> watch::Receiver<LiveState<Task>> {
        self.live.watch()
    }

    /// Current board, projected from the latest snapshot
    pub fn board(&self) -> Board<Task> {
        project_board(&self.live.state().records, &self.columns)
    }

    pub fn drag(&self) -> &DragSession {
        &self.drag
    }

    pub fn in_flight(&self) -> usize {
        self.sink.in_flight()
    }

    pub fn can_create(&self) -> bool {
        self.scope
            .as_ref()
            .is_some_and(|scope| self.policy.can_create(scope))
    }

    pub fn can_edit(&self, task: &Task) -> bool {
        self.scope
            .as_ref()
            .is_some_and(|scope| self.policy.can_edit(scope, task.branch()))
    }

    pub fn dispatch(&mut self, intent: TaskIntent) -> LiveResult<Dispatch> {
        match intent {
            TaskIntent::Create { column_id, draft } => self.create(&column_id, draft),
            TaskIntent::Update { task_id, patch } => self.update(&task_id, patch),
            TaskIntent::Delete { task_id } => {
                self.editable(&task_id)?;
                self.sink.delete(Task::COLLECTION, &task_id);
                Ok(Dispatch::Issued)
            }
            TaskIntent::AddLabel { task_id, label } => {
                let label = normalize_label(&label)?;
                let task = self.editable(&task_id)?;
                if task.has_label(&label) {
                    return Ok(Dispatch::Skipped);
                }
                let mut labels = task.labels;
                labels.push(label);
                self.update(&task_id, TaskPatch::labels(labels))
            }
            TaskIntent::RemoveLabel { task_id, label } => {
                let task = self.editable(&task_id)?;
                if !task.has_label(&label) {
                    return Ok(Dispatch::Skipped);
                }
                let labels = task.labels.into_iter().filter(|l| *l != label).collect();
                self.update(&task_id, TaskPatch::labels(labels))
            }
            TaskIntent::BeginDrag { task_id } => {
                if self.drag.begin(&task_id, &self.board()) {
                    Ok(Dispatch::DragStarted)
                } else {
                    Ok(Dispatch::Skipped)
                }
            }
            TaskIntent::CancelDrag => {
                self.drag.cancel();
                Ok(Dispatch::Skipped)
            }
            TaskIntent::Drop { destination } => self.drop_on(destination.as_deref()),
        }
    }

    /// Switch to another scope, e.g. after a new login
    pub fn rescope(&mut self, scope: Option<Scope>) {
        self.drag.cancel();
        self.scope = scope;
        self.refresh_query();
    }

    pub fn detach(&mut self) {
        self.drag.cancel();
        self.live.detach();
    }

    fn refresh_query(&mut self) {
        let query = build_query::<Task>(self.remote.as_ref(), self.scope.as_ref());
        self.live.set_query(query);
    }

    fn create(&mut self, column_id: &str, mut draft: TaskDraft) -> LiveResult<Dispatch> {
        let branch = match &self.scope {
            Some(scope) if self.policy.can_create(scope) => scope.branch().cloned(),
            _ => None,
        }
        .ok_or_else(|| LiveViewError::NotPermitted("creating tasks needs a branch session".to_string()))?;
        let column = self
            .columns
            .iter()
            .find(|c| c.id == column_id)
            .ok_or_else(|| LiveViewError::Validation(format!("unknown column {:?}", column_id)))?;
        draft.title = validate_title(&draft.title)?;
        let fields = draft.to_fields(&TaskStatus::from_title(&column.title), &branch)?;
        self.sink.create(Task::COLLECTION, fields);
        Ok(Dispatch::Issued)
    }

    fn update(&mut self, task_id: &str, mut patch: TaskPatch) -> LiveResult<Dispatch> {
        self.editable(task_id)?;
        if patch.is_empty() {
            return Ok(Dispatch::Skipped);
        }
        if let Some(title) = &patch.title {
            patch.title = Some(validate_title(title)?);
        }
        self.sink.update(Task::COLLECTION, task_id, patch.to_fields()?);
        Ok(Dispatch::Issued)
    }

    fn drop_on(&mut self, destination: Option<&str>) -> LiveResult<Dispatch> {
        let board = self.board();
        let Some(scope) = self.scope.clone() else {
            self.drag.cancel();
            return Ok(Dispatch::Dropped(DropOutcome::Cancelled));
        };
        let outcome = self.drag.drop_on(destination, &board, &scope, self.policy.as_ref());
        match &outcome {
            DropOutcome::Reassign { task_id, status } => {
                log::debug!("[DRAG] {} -> {}", task_id, status.title());
                let fields = TaskPatch::status(status.clone()).to_fields()?;
                self.sink.update(Task::COLLECTION, task_id, fields);
            }
            DropOutcome::Denied { task_id } => {
                log::info!("[DRAG] Move of {} refused for scope {}", task_id, scope.label());
            }
            DropOutcome::SameColumn | DropOutcome::Cancelled => {}
        }
        Ok(Dispatch::Dropped(outcome))
    }

    /// The task, if it is on the board and this session may change it
    fn editable(&self, task_id: &str) -> LiveResult<Task> {
        let task = self
            .live
            .state()
            .records
            .into_iter()
            .find(|t| t.id == task_id)
            .ok_or_else(|| LiveViewError::Validation(format!("task {} is not on the board", task_id)))?;
        if !self.can_edit(&task) {
            return Err(LiveViewError::NotPermitted(format!(
                "task {} belongs to branch {}",
                task_id, task.upc
            )));
        }
        Ok(task)
    }
}
