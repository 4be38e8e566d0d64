use std::path::PathBuf;

/// Failure to resolve an identifier to a component type.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
	#[error("component '{identifier}' not found")]
	NotFound { identifier: String },
	#[error("alias '{alias}' points at unknown identifier '{target}'")]
	DanglingAlias { alias: String, target: String },
	/// Aliases resolve through one level only; a chain fails closed.
	#[error("alias '{alias}' points at another alias '{target}'")]
	AliasChain { alias: String, target: String },
	#[error("unknown discovery source '{source_id}' for component '{identifier}'")]
	UnknownSource { identifier: String, source_id: String },
	#[error("no primary module to load component '{identifier}' from")]
	NoPrimarySource { identifier: String },
	#[error(transparent)]
	Activation(#[from] ActivationError),
	#[error("component type '{name}' not found in '{source_id}'")]
	TypeNotFound { name: String, source_id: String },
}

/// Failure to activate a discovery source.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ActivationError {
	#[error("module '{source_id}' has no linked code")]
	NotLinked { source_id: String },
	#[error("activating module '{source_id}' failed: {message}")]
	Hook { source_id: String, message: String },
}

/// Failure of a construction strategy.
#[derive(Debug, thiserror::Error)]
pub enum ConstructError {
	#[error("argument is not a valid {expected}: {source}")]
	Argument {
		expected: &'static str,
		#[source]
		source: serde_json::Error,
	},
	#[error("{0}")]
	Failed(String),
	#[error("component type '{name}' has no usable construction strategy")]
	NoStrategy { name: String },
}

/// Failure of a script-initiated method call on a plugin instance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvokeError {
	#[error("unknown method '{0}'")]
	UnknownMethod(String),
	#[error("invalid arguments: {0}")]
	InvalidArguments(String),
	#[error("{0}")]
	Failed(String),
}

/// Failure to read a discovery source manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
	#[error("failed to read {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("failed to parse {}: {source}", path.display())]
	Parse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},
}
