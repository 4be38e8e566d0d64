use tether_inventory::{ConstructError, ResolveError};

/// Malformed binding configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
	#[error("binding for namespace '{namespace}' names no component")]
	Empty { namespace: String },
	#[error("binding for namespace '{namespace}' has no 'plugin' field")]
	MissingPlugin { namespace: String },
	#[error("binding for namespace '{namespace}' must be a string or a table, found {found}")]
	Shape { namespace: String, found: &'static str },
}

impl ConfigError {
	pub fn namespace(&self) -> &str {
		match self {
			Self::Empty { namespace } | Self::MissingPlugin { namespace } | Self::Shape { namespace, .. } => namespace,
		}
	}
}

/// The content surface refused an attachment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttachError {
	#[error("content surface is gone")]
	SurfaceClosed,
	#[error("content surface rejected namespace '{namespace}': {reason}")]
	Rejected { namespace: String, reason: String },
}

/// Why one namespace could not be bound.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
	#[error("no binding for namespace '{namespace}'")]
	NoBinding { namespace: String },
	#[error("component '{identifier}' not found")]
	ComponentNotFound {
		identifier: String,
		#[source]
		source: ResolveError,
	},
	#[error("failed to create instance of component '{identifier}'")]
	Instantiate {
		identifier: String,
		#[source]
		source: ConstructError,
	},
	#[error("failed to attach namespace '{namespace}'")]
	Attach {
		namespace: String,
		#[source]
		source: AttachError,
	},
}
