use crate::Affinity;

/// Spawns a dedicated named OS thread tagged with an affinity for tracing.
pub fn spawn_named_thread<F, R>(affinity: Affinity, name: impl Into<String>, f: F) -> std::io::Result<std::thread::JoinHandle<R>>
where
	F: FnOnce() -> R + Send + 'static,
	R: Send + 'static,
{
	let name = name.into();
	tracing::trace!(affinity = affinity.as_str(), thread = %name, "worker.spawn_named_thread");
	std::thread::Builder::new().name(name).spawn(f)
}
