/// Execution affinity of a bound component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Affinity {
	/// Calls run on the shared main (UI-affine) context.
	Main,
	/// Calls run on the owning binder's serial background queue.
	Background,
}

impl Affinity {
	/// Maps a `main_thread` configuration flag to an affinity.
	pub const fn from_main_thread(main_thread: bool) -> Self {
		if main_thread { Self::Main } else { Self::Background }
	}

	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Main => "main",
			Self::Background => "background",
		}
	}
}
