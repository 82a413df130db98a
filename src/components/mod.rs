//! UI Components
//!
//! Leptos components of the console screens.

mod delete_confirm_button;
mod error_banner;
mod history_log;
mod task_board;
mod task_details;

pub use delete_confirm_button::DeleteConfirmButton;
pub use error_banner::ErrorBanner;
pub use history_log::HistoryLogView;
pub use task_board::TaskBoardView;
pub use task_details::TaskDetails;
