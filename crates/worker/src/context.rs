use tokio::sync::oneshot;

use crate::{Affinity, DispatchError, Job, MainContext, SerialQueue};

/// The execution context a live binding's calls are routed to.
#[derive(Debug, Clone)]
pub enum ExecContext {
	/// Shared main context.
	Main(MainContext),
	/// A binder's private serial queue.
	Serial(SerialQueue),
}

impl ExecContext {
	/// Returns the affinity this context serves.
	pub fn affinity(&self) -> Affinity {
		match self {
			Self::Main(_) => Affinity::Main,
			Self::Serial(_) => Affinity::Background,
		}
	}

	/// Schedules one job.
	pub fn dispatch(&self, job: Job) -> Result<(), DispatchError> {
		tracing::trace!(affinity = self.affinity().as_str(), "exec.dispatch");
		match self {
			Self::Main(main) => main.dispatch(job),
			Self::Serial(queue) => queue.dispatch(job),
		}
	}

	/// Schedules `f` and returns a receiver for its result.
	///
	/// The receiver reports an error if the job panicked.
	pub fn submit<F, R>(&self, f: F) -> Result<oneshot::Receiver<R>, DispatchError>
	where
		F: FnOnce() -> R + Send + 'static,
		R: Send + 'static,
	{
		let (tx, rx) = oneshot::channel();
		self.dispatch(Box::new(move || {
			let _ = tx.send(f());
		}))?;
		Ok(rx)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn submit_returns_result_from_serial_queue() {
		let ctx = ExecContext::Serial(SerialQueue::new());
		assert_eq!(ctx.affinity(), Affinity::Background);
		let rx = ctx.submit(|| 6 * 7).unwrap();
		assert_eq!(rx.await, Ok(42));
	}

	#[tokio::test]
	async fn submit_reports_panicked_job() {
		let ctx = ExecContext::Serial(SerialQueue::new());
		let rx = ctx.submit(|| -> u8 { panic!("gone") }).unwrap();
		assert!(rx.await.is_err());
	}

	#[test]
	fn main_context_reports_main_affinity() {
		let ctx = ExecContext::Main(MainContext::inline());
		assert_eq!(ctx.affinity(), Affinity::Main);
		assert_eq!(Affinity::from_main_thread(true), Affinity::Main);
		assert_eq!(Affinity::from_main_thread(false), Affinity::Background);
	}
}
