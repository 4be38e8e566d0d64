use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Unit of work handed to an execution context.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Extracts the message carried by a panic payload, if it is a string.
pub fn panic_message(payload: &(dyn Any + Send)) -> Option<String> {
	if let Some(msg) = payload.downcast_ref::<&'static str>() {
		return Some((*msg).to_string());
	}
	payload.downcast_ref::<String>().cloned()
}

/// Runs one job, containing any panic so the hosting loop keeps going.
///
/// Returns `false` when the job panicked.
pub(crate) fn run_guarded(label: &str, job: Job) -> bool {
	match catch_unwind(AssertUnwindSafe(job)) {
		Ok(()) => true,
		Err(payload) => {
			let message = panic_message(payload.as_ref()).unwrap_or_else(|| "<non-string panic>".to_string());
			tracing::error!(context = %label, panic = %message, "job panicked");
			false
		}
	}
}
