use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::job::run_guarded;
use crate::{DispatchError, Job};

/// Host-provided scheduler for the shared main context.
///
/// Implementations must run jobs in the order they are dispatched.
pub trait MainDispatch: Send + Sync {
	/// Schedules `job` on the main context.
	fn dispatch(&self, job: Job) -> Result<(), DispatchError>;
}

/// Handle to the shared main (UI-affine) execution context.
#[derive(Clone)]
pub struct MainContext {
	dispatch: Arc<dyn MainDispatch>,
}

impl fmt::Debug for MainContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MainContext").finish_non_exhaustive()
	}
}

impl MainContext {
	/// Wraps a host scheduler.
	pub fn new(dispatch: impl MainDispatch + 'static) -> Self {
		Self {
			dispatch: Arc::new(dispatch),
		}
	}

	/// A main context that runs every job immediately on the dispatching thread.
	pub fn inline() -> Self {
		Self::new(Inline)
	}

	/// Schedules `job` on the main context.
	pub fn dispatch(&self, job: Job) -> Result<(), DispatchError> {
		self.dispatch.dispatch(job)
	}
}

struct Inline;

impl MainDispatch for Inline {
	fn dispatch(&self, job: Job) -> Result<(), DispatchError> {
		run_guarded("main-inline", job);
		Ok(())
	}
}

/// Main context backed by a FIFO that the host drains from its UI loop.
pub struct MainQueue;

impl MainQueue {
	/// Creates the dispatching half and the draining half.
	#[allow(clippy::new_ret_no_self)]
	pub fn new() -> (MainContext, MainPump) {
		let (tx, rx) = mpsc::unbounded_channel();
		(MainContext::new(QueueDispatch { tx }), MainPump { rx })
	}
}

struct QueueDispatch {
	tx: mpsc::UnboundedSender<Job>,
}

impl MainDispatch for QueueDispatch {
	fn dispatch(&self, job: Job) -> Result<(), DispatchError> {
		self.tx.send(job).map_err(|_| DispatchError::Closed("main".to_string()))
	}
}

/// Draining half of a [`MainQueue`], owned by the host's UI loop.
pub struct MainPump {
	rx: mpsc::UnboundedReceiver<Job>,
}

impl MainPump {
	/// Runs every job queued so far and returns how many ran.
	pub fn run_pending(&mut self) -> usize {
		let mut ran = 0;
		while let Ok(job) = self.rx.try_recv() {
			run_guarded("main", job);
			ran += 1;
		}
		ran
	}

	/// Runs jobs as they arrive until every dispatching handle is dropped.
	pub async fn run(mut self) {
		while let Some(job) = self.rx.recv().await {
			run_guarded("main", job);
		}
	}
}
