//! Drag Reassignment
//!
//! Moving a card to another column is a status change. The session only
//! decides what write (if any) a drop should produce; the board itself is
//! not touched and catches up with the next snapshot.

use crate::domain::{EditPolicy, Record, Scope, Task, TaskStatus};
use crate::projection::Board;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { task_id: String, origin_column: String },
}

/// What a drop resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Dropped back onto its own column
    SameColumn,
    /// No usable target, or the card vanished mid-drag
    Cancelled,
    /// The edit guard refused the move
    Denied { task_id: String },
    /// Write `status` to the task
    Reassign { task_id: String, status: TaskStatus },
}

#[derive(Debug, Clone, Default)]
pub struct DragSession {
    state: DragState,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Pick up `task_id`. Fails when the card is not on the board.
    pub fn begin(&mut self, task_id: &str, board: &Board<Task>) -> bool {
        let Some(origin) = board.column_of(task_id) else {
            log::debug!("[DRAG] {} is not on the board", task_id);
            return false;
        };
        self.state = DragState::Dragging {
            task_id: task_id.to_string(),
            origin_column: origin.id.clone(),
        };
        true
    }

    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// Finish the gesture over `destination` (a column id, or nothing).
    /// Always returns to `Idle`.
    pub fn drop_on(
        &mut self,
        destination: Option<&str>,
        board: &Board<Task>,
        scope: &Scope,
        policy: &dyn EditPolicy,
    ) -> DropOutcome {
        let DragState::Dragging { task_id, .. } = std::mem::take(&mut self.state) else {
            return DropOutcome::Cancelled;
        };
        let Some(destination) = destination.and_then(|id| board.column(id)) else {
            return DropOutcome::Cancelled;
        };
        // Compare with where the latest snapshot puts the card, not where it was picked up
        let (Some(task), Some(current)) = (board.record(&task_id), board.column_of(&task_id)) else {
            log::debug!("[DRAG] {} disappeared while dragging", task_id);
            return DropOutcome::Cancelled;
        };
        if destination.id == current.id {
            return DropOutcome::SameColumn;
        }
        if !policy.can_edit(scope, task.branch()) {
            return DropOutcome::Denied { task_id };
        }
        DropOutcome::Reassign {
            task_id,
            status: TaskStatus::from_title(&destination.title),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BranchEditPolicy, BranchId};
    use crate::projection::{project_board, ColumnSpec};

    fn board(tasks: &[Task]) -> Board<Task> {
        let specs = vec![
            ColumnSpec::new("column-1", TaskStatus::TODO_TITLE),
            ColumnSpec::new("column-2", TaskStatus::IN_PROGRESS_TITLE),
            ColumnSpec::new("column-3", TaskStatus::DONE_TITLE),
        ];
        project_board(tasks, &specs)
    }

    fn task(id: &str, branch: &str) -> Task {
        Task::new(id, "Rekap", TaskStatus::ToDo, BranchId::new(branch))
    }

    fn branch_scope() -> Scope {
        Scope::Branch(BranchId::new("12001"))
    }

    #[test]
    fn test_drop_on_other_column_reassigns() {
        let board = board(&[task("t1", "12001")]);
        let mut drag = DragSession::new();
        assert!(drag.begin("t1", &board));

        let outcome = drag.drop_on(Some("column-3"), &board, &branch_scope(), &BranchEditPolicy);
        assert_eq!(
            outcome,
            DropOutcome::Reassign {
                task_id: "t1".to_string(),
                status: TaskStatus::Done,
            }
        );
        assert_eq!(drag.state(), &DragState::Idle);
    }

    #[test]
    fn test_same_column_is_a_no_op() {
        let board = board(&[task("t1", "12001")]);
        let mut drag = DragSession::new();
        drag.begin("t1", &board);
        assert_eq!(
            drag.drop_on(Some("column-1"), &board, &branch_scope(), &BranchEditPolicy),
            DropOutcome::SameColumn
        );
    }

    #[test]
    fn test_no_target_cancels() {
        let board = board(&[task("t1", "12001")]);
        let mut drag = DragSession::new();
        drag.begin("t1", &board);
        assert_eq!(
            drag.drop_on(None, &board, &branch_scope(), &BranchEditPolicy),
            DropOutcome::Cancelled
        );

        drag.begin("t1", &board);
        assert_eq!(
            drag.drop_on(Some("column-9"), &board, &branch_scope(), &BranchEditPolicy),
            DropOutcome::Cancelled
        );
    }

    #[test]
    fn test_card_moved_by_snapshot_mid_drag_is_a_no_op() {
        let before = board(&[task("t1", "12001")]);
        let mut done = task("t1", "12001");
        done.status = TaskStatus::Done;
        let after = board(&[done]);

        let mut drag = DragSession::new();
        drag.begin("t1", &before);
        assert_eq!(
            drag.drop_on(Some("column-3"), &after, &branch_scope(), &BranchEditPolicy),
            DropOutcome::SameColumn
        );

        drag.begin("t1", &before);
        assert_eq!(
            drag.drop_on(Some("column-1"), &after, &branch_scope(), &BranchEditPolicy),
            DropOutcome::Reassign {
                task_id: "t1".to_string(),
                status: TaskStatus::ToDo,
            }
        );
    }

    #[test]
    fn test_foreign_card_is_denied() {
        let board = board(&[task("t1", "12002")]);
        let mut drag = DragSession::new();
        drag.begin("t1", &board);
        assert_eq!(
            drag.drop_on(Some("column-2"), &board, &branch_scope(), &BranchEditPolicy),
            DropOutcome::Denied {
                task_id: "t1".to_string()
            }
        );
    }

    #[test]
    fn test_vanished_card_cancels() {
        let before = board(&[task("t1", "12001")]);
        let after = board(&[]);
        let mut drag = DragSession::new();
        drag.begin("t1", &before);
        assert_eq!(
            drag.drop_on(Some("column-3"), &after, &branch_scope(), &BranchEditPolicy),
            DropOutcome::Cancelled
        );
    }

    #[test]
    fn test_begin_and_cancel() {
        let board = board(&[task("t1", "12001")]);
        let mut drag = DragSession::new();
        assert!(!drag.begin("missing", &board));
        assert!(!drag.is_dragging());

        drag.begin("t1", &board);
        assert!(drag.is_dragging());
        drag.cancel();
        assert_eq!(drag.state(), &DragState::Idle);
        assert_eq!(
            drag.drop_on(Some("column-2"), &board, &Scope::All, &BranchEditPolicy),
            DropOutcome::Cancelled
        );
    }
}
