//! The content surface seam and the live handles it hands back.

use serde::Serialize;
use tether_inventory::{Argument, Instance, InvokeError};
use tether_worker::{Affinity, DispatchError, ExecContext};
use tokio::sync::oneshot;

use crate::error::AttachError;

/// Receiver for the result of a dispatched method call.
pub type CallReceiver = oneshot::Receiver<Result<Argument, InvokeError>>;

/// Web content that can expose native instances to script code.
pub trait Surface: Send + Sync {
	/// Exposes `attachment.instance` to script code under `attachment.namespace`.
	///
	/// Script calls into the instance must be routed through
	/// `attachment.channel` so they run on its execution context.
	fn attach(&self, attachment: Attachment) -> Result<ScriptObject, AttachError>;
}

/// Everything a surface needs to expose one instance.
pub struct Attachment {
	pub namespace: String,
	pub channel: Channel,
	pub instance: Instance,
}

/// Named transport bound to one execution context.
#[derive(Debug, Clone)]
pub struct Channel {
	name: String,
	context: ExecContext,
}

impl Channel {
	pub fn new(name: impl Into<String>, context: ExecContext) -> Self {
		Self {
			name: name.into(),
			context,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn context(&self) -> &ExecContext {
		&self.context
	}

	/// Runs `instance.invoke(method, args)` on this channel's context.
	pub fn call(&self, instance: &Instance, method: &str, args: Vec<Argument>) -> Result<CallReceiver, DispatchError> {
		let instance = Instance::clone(instance);
		let method = method.to_string();
		self.context.submit(move || instance.invoke(&method, &args))
	}
}

/// Script-facing representation of a bound instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptObject {
	pub namespace: String,
	pub channel: String,
}

impl ScriptObject {
	pub fn new(namespace: impl Into<String>, channel: impl Into<String>) -> Self {
		Self {
			namespace: namespace.into(),
			channel: channel.into(),
		}
	}

	/// The value handed to script code.
	pub fn to_value(&self) -> Argument {
		serde_json::json!({ "namespace": self.namespace, "channel": self.channel })
	}
}

/// An instance attached to a surface.
///
/// The binder does not keep live bindings; dropping one does not detach
/// the instance from the surface.
pub struct LiveBinding {
	namespace: String,
	channel: Channel,
	instance: Instance,
	script: ScriptObject,
}

impl std::fmt::Debug for LiveBinding {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LiveBinding")
			.field("namespace", &self.namespace)
			.field("channel", &self.channel)
			.field("script", &self.script)
			.finish_non_exhaustive()
	}
}

impl LiveBinding {
	pub(crate) fn new(namespace: String, channel: Channel, instance: Instance, script: ScriptObject) -> Self {
		Self {
			namespace,
			channel,
			instance,
			script,
		}
	}

	pub fn namespace(&self) -> &str {
		&self.namespace
	}

	pub fn channel(&self) -> &Channel {
		&self.channel
	}

	pub fn instance(&self) -> &Instance {
		&self.instance
	}

	pub fn script_object(&self) -> &ScriptObject {
		&self.script
	}

	pub fn affinity(&self) -> Affinity {
		self.channel.context().affinity()
	}

	/// Calls a method on the bound instance through its channel.
	pub fn call(&self, method: &str, args: Vec<Argument>) -> Result<CallReceiver, DispatchError> {
		self.channel.call(&self.instance, method, args)
	}
}
