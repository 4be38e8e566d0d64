//! Execution contexts for bound plugin calls.
//!
//! Every bound component is routed to exactly one of two contexts:
//! * [`MainContext`]: the shared, host-owned UI-affine context.
//! * [`SerialQueue`]: a private serial background context. One queue is
//!   owned by each binder and shared by all of its background bindings, so
//!   calls into those components are totally ordered.

mod class;
mod context;
mod error;
mod job;
mod main_queue;
mod serial;
mod spawn;

pub use class::Affinity;
pub use context::ExecContext;
pub use error::DispatchError;
pub use job::{Job, panic_message};
pub use main_queue::{MainContext, MainDispatch, MainPump, MainQueue};
pub use serial::SerialQueue;
pub use spawn::spawn_named_thread;
