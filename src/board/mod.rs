//! Task Board
//!
//! Helper tasks partitioned by status, with drag-initiated status changes
//! applied optimistically and rolled back when the backend refuses them.

mod controller;
mod optimistic;
mod task_board;

pub use controller::{BoardController, BoardState, LoadOutcome, MoveOutcome};
pub use optimistic::{Focus, Optimistic, StateCell};
pub use task_board::{TaskBoard, TransitionPolicy};
