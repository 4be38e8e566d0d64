use rustc_hash::FxHashMap;
use tether_inventory::Argument;

use crate::descriptor::Descriptor;
use crate::error::ConfigError;

/// Namespace to descriptor mapping.
///
/// Each namespace holds one descriptor; writing a namespace again replaces it.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
	bindings: FxHashMap<String, Descriptor>,
}

impl BindingTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a table from a configuration mapping.
	///
	/// Malformed entries are logged, left out of the table and returned.
	pub fn from_config<I, K>(config: I) -> (Self, Vec<ConfigError>)
	where
		I: IntoIterator<Item = (K, Argument)>,
		K: AsRef<str>,
	{
		let mut table = Self::new();
		let errors = config
			.into_iter()
			.filter_map(|(namespace, spec)| table.add_binding(&spec, namespace.as_ref()).err())
			.collect();
		(table, errors)
	}

	/// Parses `spec` and stores it for `namespace`, returning the replaced descriptor.
	///
	/// A malformed spec is logged and leaves the table unchanged.
	pub fn add_binding(&mut self, spec: &Argument, namespace: &str) -> Result<Option<Descriptor>, ConfigError> {
		match Descriptor::parse(namespace, spec) {
			Ok(descriptor) => {
				tracing::trace!(namespace = %namespace, component = %descriptor.component, lazy = descriptor.lazy, "binding.add");
				Ok(self.insert(namespace, descriptor))
			}
			Err(error) => {
				tracing::error!(namespace = %namespace, error = %error, "invalid binding spec");
				Err(error)
			}
		}
	}

	pub fn insert(&mut self, namespace: impl Into<String>, descriptor: Descriptor) -> Option<Descriptor> {
		self.bindings.insert(namespace.into(), descriptor)
	}

	pub fn remove(&mut self, namespace: &str) -> Option<Descriptor> {
		self.bindings.remove(namespace)
	}

	pub fn get(&self, namespace: &str) -> Option<&Descriptor> {
		self.bindings.get(namespace)
	}

	pub fn get_mut(&mut self, namespace: &str) -> Option<&mut Descriptor> {
		self.bindings.get_mut(namespace)
	}

	/// Replaces the descriptor of `namespace`, or removes it when `descriptor` is `None`.
	pub fn set(&mut self, namespace: &str, descriptor: Option<Descriptor>) -> Option<Descriptor> {
		match descriptor {
			Some(descriptor) => self.insert(namespace, descriptor),
			None => self.remove(namespace),
		}
	}

	pub fn contains(&self, namespace: &str) -> bool {
		self.bindings.contains_key(namespace)
	}

	pub fn len(&self) -> usize {
		self.bindings.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bindings.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Descriptor)> {
		self.bindings.iter().map(|(ns, d)| (ns.as_str(), d))
	}

	/// Namespaces bound at load time, in unspecified order.
	pub fn eager_namespaces(&self) -> Vec<String> {
		self.bindings.iter().filter(|(_, d)| !d.lazy).map(|(ns, _)| ns.clone()).collect()
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	#[test]
	fn last_write_wins() {
		let mut table = BindingTable::new();
		assert_eq!(table.add_binding(&json!("Foo"), "ns"), Ok(None));
		assert_eq!(table.add_binding(&json!("Bar!"), "ns"), Ok(Some(Descriptor::new("Foo"))));
		assert_eq!(table.get("ns"), Some(&Descriptor::new("Bar").with_main_thread(true)));
		assert_eq!(table.len(), 1);
	}

	#[test]
	fn malformed_spec_leaves_table_untouched() {
		let mut table = BindingTable::new();
		table.add_binding(&json!("Foo"), "ns").unwrap();
		assert!(table.add_binding(&json!({ "argument": 1 }), "ns").is_err());
		assert!(table.add_binding(&json!(3), "other").is_err());
		assert_eq!(table.get("ns"), Some(&Descriptor::new("Foo")));
		assert!(!table.contains("other"));
	}

	#[test]
	fn from_config_collects_errors() {
		let (table, errors) = BindingTable::from_config([
			("echo", json!("Echo")),
			("clock", json!({ "plugin": "Clock", "lazy_binding": true })),
			("broken", json!(false)),
			("empty", json!("")),
		]);
		assert_eq!(table.len(), 2);
		let mut failed: Vec<_> = errors.iter().map(ConfigError::namespace).collect();
		failed.sort_unstable();
		assert_eq!(failed, vec!["broken", "empty"]);
		assert_eq!(table.eager_namespaces(), vec!["echo".to_string()]);
	}

	#[test]
	fn indexed_access_overrides_one_binding() {
		let mut table = BindingTable::new();
		table.add_binding(&json!("Foo?"), "ns").unwrap();
		if let Some(descriptor) = table.get_mut("ns") {
			descriptor.lazy = false;
		}
		assert_eq!(table.eager_namespaces(), vec!["ns".to_string()]);
		assert_eq!(table.set("ns", None), Some(Descriptor::new("Foo")));
		assert!(table.is_empty());
		assert_eq!(table.set("ns", Some(Descriptor::new("Baz"))), None);
		assert_eq!(table.iter().count(), 1);
	}
}
