use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::job::run_guarded;
use crate::{Affinity, DispatchError, Job, spawn_named_thread};

static NEXT_QUEUE_ID: AtomicU64 = AtomicU64::new(1);

/// Serial background execution context.
///
/// Jobs run one at a time, in submission order, on a dedicated thread. The
/// thread is started on first dispatch and exits once every clone of the
/// queue has been dropped and the backlog is drained.
#[derive(Debug, Clone)]
pub struct SerialQueue {
	inner: Arc<SerialInner>,
}

#[derive(Debug)]
struct SerialInner {
	label: String,
	tx: Mutex<Option<mpsc::UnboundedSender<Job>>>,
}

impl Default for SerialQueue {
	fn default() -> Self {
		Self::new()
	}
}

impl SerialQueue {
	/// Creates a queue with a generated label.
	pub fn new() -> Self {
		let id = NEXT_QUEUE_ID.fetch_add(1, Ordering::Relaxed);
		Self::with_label(format!("tether-serial-{id}"))
	}

	/// Creates a queue whose worker thread carries `label` as its name.
	pub fn with_label(label: impl Into<String>) -> Self {
		Self {
			inner: Arc::new(SerialInner {
				label: label.into(),
				tx: Mutex::new(None),
			}),
		}
	}

	/// Returns the queue label.
	pub fn label(&self) -> &str {
		&self.inner.label
	}

	/// Returns true when both handles refer to the same queue.
	pub fn same_queue(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}

	/// Enqueues one job behind everything submitted before it.
	pub fn dispatch(&self, job: Job) -> Result<(), DispatchError> {
		let mut tx = self.inner.tx.lock();
		if tx.is_none() {
			*tx = Some(self.start()?);
		}
		let Some(sender) = tx.as_ref() else {
			return Err(DispatchError::Closed(self.inner.label.clone()));
		};
		sender.send(job).map_err(|_| DispatchError::Closed(self.inner.label.clone()))
	}

	fn start(&self) -> Result<mpsc::UnboundedSender<Job>, DispatchError> {
		let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
		let label = self.inner.label.clone();
		let thread_label = label.clone();
		spawn_named_thread(Affinity::Background, label.clone(), move || {
			tracing::debug!(queue = %thread_label, "serial queue started");
			while let Some(job) = rx.blocking_recv() {
				run_guarded(&thread_label, job);
			}
			tracing::debug!(queue = %thread_label, "serial queue stopped");
		})
		.map_err(|source| DispatchError::Spawn { label, source })?;
		Ok(tx)
	}
}
