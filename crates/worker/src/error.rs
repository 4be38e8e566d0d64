/// Failure to hand a job to an execution context.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
	/// The serial worker thread could not be started.
	#[error("failed to start serial worker '{label}': {source}")]
	Spawn {
		label: String,
		#[source]
		source: std::io::Error,
	},
	/// The context no longer accepts work.
	#[error("execution context '{0}' is closed")]
	Closed(String),
}
