//! Dialog tasks and the coordinator that brokers them
//!
//! - [`coordinator`] - single current dialog, blocking show/response
//! - [`task`] - the four dialog variants and their lifecycle
//! - [`sync`] - signal-once gate and single-assignment response slot
//! - [`queue`] - single-slot hand-off to the UI surface
//! - [`response`] - user answers and their wire shape

pub mod coordinator;
pub mod queue;
pub mod response;
pub mod sync;
pub mod task;

pub use coordinator::{DialogCoordinator, Launcher};
pub use queue::{TaskQueue, TaskSlot};
pub use response::{Button, DialogResponse};
pub use task::{
    Dialog, DialogTask, SelectionMode, TaskSnapshot, TaskState, Widget, DEFAULT_MAX,
    DEFAULT_SEEK_PROGRESS,
};
