//! View Projectors
//!
//! Pure functions from a record snapshot to render-ready structures.

mod board;
mod list;

pub use board::{project_board, Board, BoardCard, Column, ColumnSpec};
pub use list::{project_history, project_history_in, HistoryFilter, TypeFilter};
