//! Binding specifications and the descriptors they parse into.
//!
//! A binding is written either as a bare component identifier, optionally
//! suffixed with `?` (bind lazily) and/or `!` (run on the main context):
//!
//! ```toml
//! echo = "Echo@plugin.example.com?"
//! ```
//!
//! or as a table:
//!
//! ```toml
//! clock = { plugin = "Clock", argument = { tz = "UTC" }, channel_name = "time", main_thread = true, lazy_binding = false }
//! ```

use serde_json::Map;
use tether_inventory::Argument;

use crate::error::ConfigError;

const LAZY_SUFFIX: char = '?';
const MAIN_THREAD_SUFFIX: char = '!';

/// Per-namespace binding configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
	/// Identifier of the component to bind.
	pub component: String,
	/// Constructor argument.
	pub argument: Option<Argument>,
	/// Channel name; defaults to the type's preference, then the namespace.
	pub channel_name: Option<String>,
	pub main_thread: bool,
	/// Skipped by prebinding; bound only on request.
	pub lazy: bool,
}

impl Descriptor {
	pub fn new(component: impl Into<String>) -> Self {
		Self {
			component: component.into(),
			argument: None,
			channel_name: None,
			main_thread: false,
			lazy: false,
		}
	}

	pub fn with_argument(mut self, argument: Argument) -> Self {
		self.argument = Some(argument);
		self
	}

	pub fn with_channel_name(mut self, channel_name: impl Into<String>) -> Self {
		self.channel_name = Some(channel_name.into());
		self
	}

	pub fn with_main_thread(mut self, main_thread: bool) -> Self {
		self.main_thread = main_thread;
		self
	}

	pub fn with_lazy(mut self, lazy: bool) -> Self {
		self.lazy = lazy;
		self
	}

	/// Parses a raw configuration value for `namespace`.
	pub fn parse(namespace: &str, value: &Argument) -> Result<Self, ConfigError> {
		BindingSpec::parse(namespace, value)?.into_descriptor(namespace)
	}
}

/// A binding specification as written in configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingSpec {
	/// Bare identifier with optional `?`/`!` suffixes.
	Simple(String),
	/// Explicit fields.
	Full {
		plugin: Option<String>,
		argument: Option<Argument>,
		channel_name: Option<String>,
		main_thread: bool,
		lazy_binding: bool,
	},
}

impl BindingSpec {
	/// Classifies a raw configuration value.
	pub fn parse(namespace: &str, value: &Argument) -> Result<Self, ConfigError> {
		match value {
			Argument::String(spec) if !spec.is_empty() => Ok(Self::Simple(spec.clone())),
			Argument::String(_) => Err(ConfigError::Empty {
				namespace: namespace.to_string(),
			}),
			Argument::Object(fields) => Ok(Self::from_fields(fields)),
			other => Err(ConfigError::Shape {
				namespace: namespace.to_string(),
				found: value_kind(other),
			}),
		}
	}

	fn from_fields(fields: &Map<String, Argument>) -> Self {
		let flag = |key: &str| fields.get(key).and_then(Argument::as_bool).unwrap_or(false);
		Self::Full {
			plugin: fields.get("plugin").and_then(Argument::as_str).map(str::to_string),
			argument: fields.get("argument").cloned(),
			channel_name: fields.get("channel_name").and_then(Argument::as_str).map(str::to_string),
			main_thread: flag("main_thread"),
			lazy_binding: flag("lazy_binding"),
		}
	}

	/// Converts the specification into a descriptor.
	pub fn into_descriptor(self, namespace: &str) -> Result<Descriptor, ConfigError> {
		match self {
			Self::Simple(spec) => {
				let (component, lazy, main_thread) = strip_suffixes(&spec);
				if component.is_empty() {
					return Err(ConfigError::Empty {
						namespace: namespace.to_string(),
					});
				}
				Ok(Descriptor::new(component).with_lazy(lazy).with_main_thread(main_thread))
			}
			Self::Full {
				plugin,
				argument,
				channel_name,
				main_thread,
				lazy_binding,
			} => {
				let component = plugin.filter(|p| !p.is_empty()).ok_or_else(|| ConfigError::MissingPlugin {
					namespace: namespace.to_string(),
				})?;
				Ok(Descriptor {
					component,
					argument,
					channel_name,
					main_thread,
					lazy: lazy_binding,
				})
			}
		}
	}
}

/// Strips trailing `?` and `!` markers in either order.
fn strip_suffixes(spec: &str) -> (&str, bool, bool) {
	let mut component = spec;
	let mut lazy = false;
	let mut main_thread = false;
	loop {
		if !lazy {
			if let Some(rest) = component.strip_suffix(LAZY_SUFFIX) {
				component = rest;
				lazy = true;
				continue;
			}
		}
		if !main_thread {
			if let Some(rest) = component.strip_suffix(MAIN_THREAD_SUFFIX) {
				component = rest;
				main_thread = true;
				continue;
			}
		}
		return (component, lazy, main_thread);
	}
}

fn value_kind(value: &Argument) -> &'static str {
	match value {
		Argument::Null => "null",
		Argument::Bool(_) => "a boolean",
		Argument::Number(_) => "a number",
		Argument::String(_) => "a string",
		Argument::Array(_) => "an array",
		Argument::Object(_) => "a table",
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	fn parse(value: Argument) -> Result<Descriptor, ConfigError> {
		Descriptor::parse("ns", &value)
	}

	#[test]
	fn simple_spec_suffixes() {
		assert_eq!(parse(json!("Foo?!")).unwrap(), Descriptor::new("Foo").with_lazy(true).with_main_thread(true));
		assert_eq!(parse(json!("Foo!?")).unwrap(), Descriptor::new("Foo").with_lazy(true).with_main_thread(true));
		assert_eq!(parse(json!("Foo!")).unwrap(), Descriptor::new("Foo").with_main_thread(true));
		assert_eq!(parse(json!("Foo?")).unwrap(), Descriptor::new("Foo").with_lazy(true));
		assert_eq!(parse(json!("Foo@plugin.example.com")).unwrap(), Descriptor::new("Foo@plugin.example.com"));
	}

	#[test]
	fn each_suffix_is_stripped_once() {
		assert_eq!(parse(json!("Foo??")).unwrap(), Descriptor::new("Foo?").with_lazy(true));
	}

	#[test]
	fn empty_identifiers_are_rejected() {
		assert_eq!(parse(json!("")), Err(ConfigError::Empty { namespace: "ns".into() }));
		assert_eq!(parse(json!("?!")), Err(ConfigError::Empty { namespace: "ns".into() }));
	}

	#[test]
	fn full_spec_fields() {
		let descriptor = parse(json!({
			"plugin": "Clock",
			"argument": { "tz": "UTC" },
			"channel_name": "time",
			"main_thread": true,
			"lazy_binding": true,
		}))
		.unwrap();
		assert_eq!(
			descriptor,
			Descriptor::new("Clock")
				.with_argument(json!({ "tz": "UTC" }))
				.with_channel_name("time")
				.with_main_thread(true)
				.with_lazy(true)
		);
	}

	#[test]
	fn full_spec_defaults_and_tolerates_wrong_flag_types() {
		let descriptor = parse(json!({ "plugin": "Clock", "main_thread": "yes" })).unwrap();
		assert_eq!(descriptor, Descriptor::new("Clock"));
	}

	#[test]
	fn full_spec_without_plugin_is_an_error() {
		assert_eq!(parse(json!({ "argument": 1 })), Err(ConfigError::MissingPlugin { namespace: "ns".into() }));
		assert_eq!(parse(json!({ "plugin": 7 })), Err(ConfigError::MissingPlugin { namespace: "ns".into() }));
	}

	#[test]
	fn other_shapes_are_errors() {
		let err = parse(json!(42)).unwrap_err();
		assert_eq!(
			err,
			ConfigError::Shape {
				namespace: "ns".into(),
				found: "a number"
			}
		);
		assert_eq!(err.namespace(), "ns");
		assert!(matches!(parse(json!(["Foo"])), Err(ConfigError::Shape { found: "an array", .. })));
	}
}
