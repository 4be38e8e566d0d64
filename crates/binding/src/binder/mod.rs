use std::error::Error as _;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tether_inventory::{Argument, Inventory, InvokeError, Plugin, SharedInventory};
use tether_worker::{Affinity, ExecContext, MainContext, SerialQueue};
use tokio::sync::oneshot;

use crate::construct::instantiate;
use crate::descriptor::Descriptor;
use crate::error::{BindError, ConfigError};
use crate::surface::{Attachment, Channel, LiveBinding, ScriptObject, Surface};
use crate::table::BindingTable;


/// Promise-like object settled by a script-initiated bind request.
pub trait Completion {
	fn resolve(self, object: ScriptObject);
	fn reject(self);
}

impl Completion for oneshot::Sender<Option<ScriptObject>> {
	fn resolve(self, object: ScriptObject) {
		let _ = self.send(Some(object));
	}

	fn reject(self) {
		let _ = self.send(None);
	}
}

/// Resolves namespaces to live bindings.
///
/// Owns the binding table and one serial queue shared by every binding that
/// does not ask for the main context. Live bindings are returned to the
/// caller and not retained.
pub struct Binder {
	table: RwLock<BindingTable>,
	inventory: SharedInventory,
	main: MainContext,
	serial: SerialQueue,
}

impl std::fmt::Debug for Binder {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Binder")
			.field("table", &*self.table.read())
			.field("main", &self.main)
			.field("serial", &self.serial)
			.finish_non_exhaustive()
	}
}

impl Binder {
	/// Creates a binder with an empty table.
	pub fn new(inventory: SharedInventory, main: MainContext) -> Self {
		Self {
			table: RwLock::new(BindingTable::new()),
			inventory,
			main,
			serial: SerialQueue::new(),
		}
	}

	/// Replaces the binding table.
	pub fn with_table(self, table: BindingTable) -> Self {
		*self.table.write() = table;
		self
	}

	pub fn table(&self) -> RwLockReadGuard<'_, BindingTable> {
		self.table.read()
	}

	/// Write access for adding, overriding or removing single bindings.
	pub fn table_mut(&self) -> RwLockWriteGuard<'_, BindingTable> {
		self.table.write()
	}

	/// Parses `spec` and stores it for `namespace`.
	pub fn add_binding(&self, spec: &Argument, namespace: &str) -> Result<Option<Descriptor>, ConfigError> {
		self.table.write().add_binding(spec, namespace)
	}

	pub fn inventory(&self) -> &SharedInventory {
		&self.inventory
	}

	/// The serial queue background bindings run on.
	pub fn serial_queue(&self) -> &SerialQueue {
		&self.serial
	}

	/// Binds `namespace`, logging and discarding any failure.
	pub fn bind(&self, surface: &dyn Surface, namespace: &str) -> Option<LiveBinding> {
		self.bind_with(surface, namespace, None)
	}

	/// [`Self::bind`] with an argument that overrides the descriptor's.
	pub fn bind_with(&self, surface: &dyn Surface, namespace: &str, argument: Option<&Argument>) -> Option<LiveBinding> {
		match self.try_bind_with(surface, namespace, argument) {
			Ok(live) => Some(live),
			Err(error) => {
				let cause = error.source().map(ToString::to_string).unwrap_or_default();
				tracing::error!(namespace = %namespace, error = %error, cause = %cause, "bind failed");
				None
			}
		}
	}

	pub fn try_bind(&self, surface: &dyn Surface, namespace: &str) -> Result<LiveBinding, BindError> {
		self.try_bind_with(surface, namespace, None)
	}

	/// Resolves, constructs and attaches one namespace.
	pub fn try_bind_with(&self, surface: &dyn Surface, namespace: &str, argument: Option<&Argument>) -> Result<LiveBinding, BindError> {
		let descriptor = self.table.read().get(namespace).cloned().ok_or_else(|| BindError::NoBinding {
			namespace: namespace.to_string(),
		})?;

		let ty = Inventory::try_resolve_shared(&self.inventory, &descriptor.component).map_err(|source| BindError::ComponentNotFound {
				identifier: descriptor.component.clone(),
				source,
			})?;

		let argument = argument.or(descriptor.argument.as_ref());
		let instance = instantiate(&ty, argument).map_err(|source| BindError::Instantiate {
			identifier: descriptor.component.clone(),
			source,
		})?;

		let context = match Affinity::from_main_thread(descriptor.main_thread || ty.prefers_main_thread()) {
			Affinity::Main => ExecContext::Main(self.main.clone()),
			Affinity::Background => ExecContext::Serial(self.serial.clone()),
		};
		let channel_name = descriptor
			.channel_name
			.clone()
			.or_else(|| ty.channel_name().map(str::to_string))
			.unwrap_or_else(|| namespace.to_string());
		let channel = Channel::new(channel_name, context);

		let script = surface
			.attach(Attachment {
				namespace: namespace.to_string(),
				channel: channel.clone(),
				instance: Arc::clone(&instance),
			})
			.map_err(|source| BindError::Attach {
				namespace: namespace.to_string(),
				source,
			})?;

		tracing::debug!(
			namespace = %namespace,
			component = %descriptor.component,
			channel = %channel.name(),
			affinity = ?channel.context().affinity(),
			"bound component"
		);
		Ok(LiveBinding::new(namespace.to_string(), channel, instance, script))
	}

	/// Binds every non-lazy namespace once, returning the bindings that succeeded.
	pub fn prebind(&self, surface: &dyn Surface) -> Vec<LiveBinding> {
		let namespaces = self.table.read().eager_namespaces();
		tracing::debug!(count = namespaces.len(), "prebinding namespaces");
		namespaces.iter().filter_map(|namespace| self.bind(surface, namespace)).collect()
	}

	/// Handles a bind request coming from script code.
	///
	/// `namespace` must be a string. A `null` argument means no override.
	/// The completion resolves with the script object on success and is
	/// rejected otherwise.
	pub fn request_bind<C: Completion>(&self, surface: &dyn Surface, namespace: &Argument, argument: Option<Argument>, completion: C) {
		let Some(namespace) = namespace.as_str() else {
			tracing::error!(namespace = %namespace, "bind request without a namespace name");
			completion.reject();
			return;
		};
		let argument = argument.filter(|a| !a.is_null());
		match self.bind_with(surface, namespace, argument.as_ref()) {
			Some(live) => completion.resolve(live.script_object().clone()),
			None => completion.reject(),
		}
	}
}

/// Plugin exposing [`Binder::request_bind`] to script code as `bind(namespace, argument?)`.
pub struct ScriptBinder {
	binder: Arc<Binder>,
	surface: Arc<dyn Surface>,
}

impl ScriptBinder {
	pub fn new(binder: Arc<Binder>, surface: Arc<dyn Surface>) -> Self {
		Self { binder, surface }
	}
}

impl Plugin for ScriptBinder {
	fn invoke(&self, method: &str, args: &[Argument]) -> Result<Argument, InvokeError> {
		if method != "bind" {
			return Err(InvokeError::UnknownMethod(method.to_string()));
		}
		let Some(namespace) = args.first() else {
			return Err(InvokeError::InvalidArguments("bind expects a namespace".to_string()));
		};
		let (tx, mut rx) = oneshot::channel::<Option<ScriptObject>>();
		self.binder.request_bind(self.surface.as_ref(), namespace, args.get(1).cloned(), tx);
		match rx.try_recv() {
			Ok(Some(object)) => Ok(object.to_value()),
			_ => Err(InvokeError::Failed(format!("binding {namespace} failed"))),
		}
	}
}
