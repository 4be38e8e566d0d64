//! Component types and their construction strategies.
//!
//! A [`ComponentType`] declares up front how instances are made, via
//! [`Construction`]. The binder walks the strategies in a fixed order:
//! singleton, factory, constructible initializers, and finally the type's
//! own static instance.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;

use crate::error::{ConstructError, InvokeError};

/// Opaque constructor argument taken from binding configuration.
pub type Argument = serde_json::Value;

/// A native object reachable from script code.
pub trait Plugin: Send + Sync + 'static {
	/// Invokes a script-visible method.
	fn invoke(&self, method: &str, args: &[Argument]) -> Result<Argument, InvokeError>;
}

/// Shared handle to a plugin instance.
pub type Instance = Arc<dyn Plugin>;

type Ctor = Arc<dyn Fn() -> Result<Instance, ConstructError> + Send + Sync>;
type ArgCtor = Arc<dyn Fn(&Argument) -> Result<Instance, ConstructError> + Send + Sync>;

/// Decodes a constructor argument into a concrete type.
pub fn decode_argument<T: DeserializeOwned>(argument: &Argument) -> Result<T, ConstructError> {
	serde_json::from_value(argument.clone()).map_err(|source| ConstructError::Argument {
		expected: std::any::type_name::<T>(),
		source,
	})
}

/// Lazily created instance shared by every binding of a singleton type.
pub struct Singleton {
	init: Ctor,
	shared: Mutex<Option<Instance>>,
}

impl Singleton {
	/// Returns the shared instance, creating it on first use.
	///
	/// Concurrent first calls run the initializer once. A failed creation is
	/// not cached.
	pub fn instance(&self) -> Result<Instance, ConstructError> {
		let mut shared = self.shared.lock();
		if let Some(instance) = shared.as_ref() {
			return Ok(Arc::clone(instance));
		}
		let created = (self.init)()?;
		*shared = Some(Arc::clone(&created));
		Ok(created)
	}
}

/// How instances of a component type are obtained.
#[derive(Clone)]
pub enum Construction {
	/// One shared instance; constructor arguments are ignored.
	Singleton(Arc<Singleton>),
	/// Factory functions.
	Factory {
		create: Ctor,
		create_with_argument: Option<ArgCtor>,
	},
	/// Initializers; either may be absent.
	Constructible {
		with_argument: Option<ArgCtor>,
		default: Option<Ctor>,
	},
	/// No construction; the type's static instance is used.
	Plain,
}

impl Construction {
	fn kind(&self) -> &'static str {
		match self {
			Self::Singleton(_) => "singleton",
			Self::Factory { .. } => "factory",
			Self::Constructible { .. } => "constructible",
			Self::Plain => "plain",
		}
	}
}

/// A loadable component type.
#[derive(Clone)]
pub struct ComponentType {
	name: Arc<str>,
	origin: Option<Arc<str>>,
	construction: Construction,
	statics: Option<Instance>,
	channel_name: Option<Arc<str>>,
	main_thread: bool,
}

impl fmt::Debug for ComponentType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ComponentType")
			.field("name", &self.name)
			.field("origin", &self.origin)
			.field("construction", &self.construction.kind())
			.field("channel_name", &self.channel_name)
			.field("main_thread", &self.main_thread)
			.finish_non_exhaustive()
	}
}

impl ComponentType {
	/// Creates a type with an explicit construction strategy.
	///
	/// `name` is the type's qualified name; its identifier uses the part after
	/// the last namespace separator.
	pub fn new(name: impl Into<Arc<str>>, construction: Construction) -> Self {
		Self {
			name: name.into(),
			origin: None,
			construction,
			statics: None,
			channel_name: None,
			main_thread: false,
		}
	}

	/// A singleton type whose shared instance comes from `init`.
	pub fn singleton<F>(name: impl Into<Arc<str>>, init: F) -> Self
	where
		F: Fn() -> Result<Instance, ConstructError> + Send + Sync + 'static,
	{
		Self::new(
			name,
			Construction::Singleton(Arc::new(Singleton {
				init: Arc::new(init),
				shared: Mutex::new(None),
			})),
		)
	}

	/// A factory type.
	pub fn factory<F>(name: impl Into<Arc<str>>, create: F) -> Self
	where
		F: Fn() -> Result<Instance, ConstructError> + Send + Sync + 'static,
	{
		Self::new(
			name,
			Construction::Factory {
				create: Arc::new(create),
				create_with_argument: None,
			},
		)
	}

	/// A constructible type with no initializers yet.
	pub fn constructible(name: impl Into<Arc<str>>) -> Self {
		Self::new(
			name,
			Construction::Constructible {
				with_argument: None,
				default: None,
			},
		)
	}

	/// A type used as its own instance.
	pub fn plain(name: impl Into<Arc<str>>, statics: Instance) -> Self {
		Self::new(name, Construction::Plain).with_statics(statics)
	}

	/// Adds the argument-taking factory to a factory type.
	pub fn with_argument_factory<F>(mut self, f: F) -> Self
	where
		F: Fn(&Argument) -> Result<Instance, ConstructError> + Send + Sync + 'static,
	{
		match &mut self.construction {
			Construction::Factory { create_with_argument, .. } => *create_with_argument = Some(Arc::new(f)),
			other => tracing::warn!(component = %self.name, kind = other.kind(), "argument factory ignored on non-factory type"),
		}
		self
	}

	/// Adds the no-argument initializer to a constructible type.
	pub fn with_init<F>(mut self, f: F) -> Self
	where
		F: Fn() -> Result<Instance, ConstructError> + Send + Sync + 'static,
	{
		match &mut self.construction {
			Construction::Constructible { default, .. } => *default = Some(Arc::new(f)),
			other => tracing::warn!(component = %self.name, kind = other.kind(), "initializer ignored on non-constructible type"),
		}
		self
	}

	/// Adds the argument-taking initializer to a constructible type.
	///
	/// The initializer receives `Argument::Null` when the binding has no argument.
	pub fn with_argument_init<F>(mut self, f: F) -> Self
	where
		F: Fn(&Argument) -> Result<Instance, ConstructError> + Send + Sync + 'static,
	{
		match &mut self.construction {
			Construction::Constructible { with_argument, .. } => *with_argument = Some(Arc::new(f)),
			other => tracing::warn!(component = %self.name, kind = other.kind(), "initializer ignored on non-constructible type"),
		}
		self
	}

	/// Adds an argument-taking initializer that decodes its argument as `T`.
	pub fn with_typed_init<T, F>(self, f: F) -> Self
	where
		T: DeserializeOwned,
		F: Fn(T) -> Result<Instance, ConstructError> + Send + Sync + 'static,
	{
		self.with_argument_init(move |argument| f(decode_argument(argument)?))
	}

	/// Sets the instance used when no construction strategy applies.
	pub fn with_statics(mut self, statics: Instance) -> Self {
		self.statics = Some(statics);
		self
	}

	/// Records the discovery source the type belongs to.
	pub fn with_origin(mut self, origin: impl Into<Arc<str>>) -> Self {
		self.origin = Some(origin.into());
		self
	}

	/// Sets the channel name used when a binding does not name one.
	pub fn with_channel_name(mut self, channel_name: impl Into<Arc<str>>) -> Self {
		self.channel_name = Some(channel_name.into());
		self
	}

	/// Requests that every binding of this type runs on the main context.
	pub fn with_main_thread(mut self, main_thread: bool) -> Self {
		self.main_thread = main_thread;
		self
	}

	/// Qualified type name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Identifier of the owning discovery source, if any.
	pub fn origin(&self) -> Option<&str> {
		self.origin.as_deref()
	}

	pub fn construction(&self) -> &Construction {
		&self.construction
	}

	pub fn statics(&self) -> Option<&Instance> {
		self.statics.as_ref()
	}

	pub fn channel_name(&self) -> Option<&str> {
		self.channel_name.as_deref()
	}

	pub fn prefers_main_thread(&self) -> bool {
		self.main_thread
	}

	/// Returns true when both handles describe the same registered type.
	pub fn same_type(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.name, &other.name)
	}
}
