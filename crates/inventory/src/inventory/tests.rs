use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use pretty_assertions::assert_eq;

use super::*;
use crate::component::{Argument, Instance, Plugin};
use crate::error::{ActivationError, InvokeError};
use crate::source::{Declaration, Module};

struct Nop;

impl Plugin for Nop {
	fn invoke(&self, method: &str, _args: &[Argument]) -> Result<Argument, InvokeError> {
		Err(InvokeError::UnknownMethod(method.to_string()))
	}
}

fn plain(name: &str) -> ComponentType {
	ComponentType::plain(name, Arc::new(Nop) as Instance)
}

/// Source that counts lookups and can be switched between failing and working.
struct CountingSource {
	identifier: &'static str,
	declarations: Vec<Declaration>,
	types: Vec<ComponentType>,
	lookups: AtomicUsize,
	activations: AtomicUsize,
	active: AtomicBool,
	broken: AtomicBool,
}

impl CountingSource {
	fn new(identifier: &'static str, declared: &[(&str, Option<&str>)], types: Vec<ComponentType>) -> Arc<Self> {
		Arc::new(Self {
			identifier,
			declarations: declared
				.iter()
				.map(|(name, alias)| Declaration {
					name: name.to_string(),
					alias: alias.map(str::to_string),
				})
				.collect(),
			types,
			lookups: AtomicUsize::new(0),
			activations: AtomicUsize::new(0),
			active: AtomicBool::new(false),
			broken: AtomicBool::new(false),
		})
	}
}

impl DiscoverySource for CountingSource {
	fn identifier(&self) -> &str {
		self.identifier
	}

	fn module_name(&self) -> &str {
		"counting"
	}

	fn declarations(&self) -> Vec<Declaration> {
		self.declarations.clone()
	}

	fn is_active(&self) -> bool {
		self.active.load(Ordering::SeqCst)
	}

	fn activate(&self) -> Result<(), ActivationError> {
		self.activations.fetch_add(1, Ordering::SeqCst);
		if self.broken.load(Ordering::SeqCst) {
			return Err(ActivationError::Hook {
				source_id: self.identifier.to_string(),
				message: "broken".into(),
			});
		}
		self.active.store(true, Ordering::SeqCst);
		Ok(())
	}

	fn lookup(&self, name: &str) -> Option<ComponentType> {
		self.lookups.fetch_add(1, Ordering::SeqCst);
		self.types.iter().find(|ty| ty.name() == name).cloned()
	}
}

#[test]
fn register_returns_previous_provider() {
	let mut inventory = Inventory::new();
	assert!(inventory.register(plain("Foo"), "Foo").is_none());
	assert!(inventory.resolve("Foo").is_some_and(|ty| ty.name() == "Foo"));

	let previous = inventory.register(plain("Bar"), "Foo");
	assert!(matches!(previous, Some(Provider::Resolved(ref ty)) if ty.name() == "Foo"));
	assert_eq!(inventory.resolve("Foo").map(|ty| ty.name().to_string()), Some("Bar".to_string()));
}

#[test]
fn unregister_removes_entry() {
	let mut inventory = Inventory::new();
	inventory.register(plain("Foo"), "Foo");
	assert!(matches!(inventory.unregister("Foo"), Some(Provider::Resolved(_))));
	assert!(inventory.resolve("Foo").is_none());
	assert!(inventory.unregister("Foo").is_none());
}

#[test]
fn set_registers_and_unregisters() {
	let mut inventory = Inventory::new();
	inventory.set("Foo", Some(plain("Foo")));
	assert!(inventory.contains("Foo"));
	inventory.set("Foo", None);
	assert!(!inventory.contains("Foo"));
}

#[test]
fn scan_catalogs_without_loading() {
	let source = CountingSource::new("com.example.plugin", &[("Echo", None), ("Clock", Some("Time"))], vec![plain("Echo")]);
	let mut inventory = Inventory::new();
	assert_eq!(inventory.scan(source.clone()), 2);

	assert_eq!(inventory.identifiers(), vec!["Clock@plugin.example.com", "Echo@plugin.example.com", "Time@plugin.example.com"]);
	assert!(matches!(inventory.provider("Echo@plugin.example.com"), Some(Provider::Unresolved)));
	assert!(matches!(
		inventory.provider("Time@plugin.example.com"),
		Some(Provider::Alias(target)) if target == "Clock@plugin.example.com"
	));
	assert_eq!(source.lookups.load(Ordering::SeqCst), 0);
	assert_eq!(source.activations.load(Ordering::SeqCst), 0);
}

#[test]
fn resolve_loads_once_then_caches() {
	let source = CountingSource::new("com.example.plugin", &[("Echo", None)], vec![plain("Echo")]);
	let mut inventory = Inventory::new();
	inventory.scan(source.clone());

	let first = inventory.resolve("Echo@plugin.example.com").unwrap();
	assert_eq!(source.lookups.load(Ordering::SeqCst), 1);
	assert_eq!(first.origin(), Some("com.example.plugin"));

	for _ in 0..3 {
		let again = inventory.resolve("Echo@plugin.example.com").unwrap();
		assert!(again.same_type(&first));
	}
	assert_eq!(source.lookups.load(Ordering::SeqCst), 1);
	assert_eq!(source.activations.load(Ordering::SeqCst), 1);
	assert!(matches!(inventory.provider("Echo@plugin.example.com"), Some(Provider::Resolved(_))));
}

#[test]
fn failed_load_is_retried() {
	let source = CountingSource::new("com.example.plugin", &[("Echo", None)], vec![plain("Echo")]);
	source.broken.store(true, Ordering::SeqCst);
	let mut inventory = Inventory::new();
	inventory.scan(source.clone());

	assert!(inventory.resolve("Echo@plugin.example.com").is_none());
	assert!(inventory.resolve("Echo@plugin.example.com").is_none());
	assert_eq!(source.activations.load(Ordering::SeqCst), 2);
	assert!(matches!(inventory.provider("Echo@plugin.example.com"), Some(Provider::Unresolved)));

	source.broken.store(false, Ordering::SeqCst);
	assert!(inventory.resolve("Echo@plugin.example.com").is_some());
}

#[test]
fn missing_type_is_retried_each_time() {
	let source = CountingSource::new("com.example.plugin", &[("Ghost", None)], Vec::new());
	let mut inventory = Inventory::new();
	inventory.scan(source.clone());

	let err = inventory.try_resolve("Ghost@plugin.example.com").unwrap_err();
	assert!(matches!(err, ResolveError::TypeNotFound { ref name, .. } if name == "counting::Ghost"));
	assert!(inventory.resolve("Ghost@plugin.example.com").is_none());
	// bare name then qualified name, twice
	assert_eq!(source.lookups.load(Ordering::SeqCst), 4);
}

#[test]
fn qualified_name_fallback() {
	let source = CountingSource::new("com.example.plugin", &[("Deep", None)], vec![plain("counting::Deep")]);
	let mut inventory = Inventory::new();
	inventory.scan(source);
	let ty = inventory.resolve("Deep@plugin.example.com").unwrap();
	assert_eq!(ty.name(), "counting::Deep");
}

#[test]
fn alias_resolves_like_target() {
	let source = CountingSource::new("com.example.plugin", &[("Clock", Some("Time"))], vec![plain("Clock")]);
	let mut inventory = Inventory::new();
	inventory.scan(source.clone());

	let via_alias = inventory.resolve("Time@plugin.example.com").unwrap();
	let direct = inventory.resolve("Clock@plugin.example.com").unwrap();
	assert!(via_alias.same_type(&direct));
	assert_eq!(source.lookups.load(Ordering::SeqCst), 1);
	assert!(matches!(inventory.provider("Time@plugin.example.com"), Some(Provider::Alias(_))));
}

#[test]
fn alias_chains_fail_closed() {
	let mut inventory = Inventory::new();
	inventory.providers.insert("A".into(), Provider::Alias("B".into()));
	inventory.providers.insert("B".into(), Provider::Alias("A".into()));
	assert!(matches!(inventory.try_resolve("A"), Err(ResolveError::AliasChain { .. })));
	assert!(inventory.resolve("B").is_none());

	inventory.providers.insert("C".into(), Provider::Alias("Nowhere".into()));
	assert!(matches!(inventory.try_resolve("C"), Err(ResolveError::DanglingAlias { .. })));
}

#[test]
fn unknown_origin_is_not_cached() {
	let mut inventory = Inventory::new();
	inventory.providers.insert("Echo@plugin.other.org".into(), Provider::Unresolved);
	let err = inventory.try_resolve("Echo@plugin.other.org").unwrap_err();
	assert!(matches!(err, ResolveError::UnknownSource { ref source_id, .. } if source_id == "org.other.plugin"));
	assert!(matches!(inventory.provider("Echo@plugin.other.org"), Some(Provider::Unresolved)));
}

#[test]
fn unsuffixed_identifiers_need_a_primary_module() {
	let mut inventory = Inventory::new();
	inventory.providers.insert("Echo".into(), Provider::Unresolved);
	assert!(matches!(inventory.try_resolve("Echo"), Err(ResolveError::NoPrimarySource { .. })));
	assert!(matches!(inventory.try_resolve("Nothing"), Err(ResolveError::NotFound { .. })));
}

#[test]
fn primary_module_types_have_no_suffix() {
	let primary = Module::new("com.example.app", "app").declare("Echo", None).with(plain("Echo"));
	let mut inventory = Inventory::with_primary(Arc::new(primary));
	assert_eq!(inventory.primary(), Some("com.example.app"));
	assert_eq!(inventory.identifiers(), vec!["Echo"]);
	assert!(inventory.resolve("Echo").is_some());

	let foreign = plain("plugin::Foo").with_origin("com.example.plugin");
	assert_eq!(inventory.identifier_for(&foreign), "Foo@plugin.example.com");
	let local = plain("app::Foo").with_origin("com.example.app");
	assert_eq!(inventory.identifier_for(&local), "Foo");
	assert!(inventory.register_type(foreign).is_none());
	assert!(inventory.contains("Foo@plugin.example.com"));
}

#[test]
fn shared_resolve_unlocks_during_activation() {
	let shared = Inventory::new().into_shared();
	let hook_inventory = Arc::clone(&shared);
	let mut module = Module::new("com.example.plugin", "plugin").declare("Echo", None);
	module.provide(plain("Echo")).on_activate(move || {
		hook_inventory.lock().register(plain("Extra"), "Extra@plugin.example.com");
		Ok(())
	});
	shared.lock().scan(Arc::new(module));

	let (tx, rx) = std::sync::mpsc::channel();
	let resolver = Arc::clone(&shared);
	std::thread::spawn(move || {
		let name = Inventory::resolve_shared(&resolver, "Echo@plugin.example.com").map(|ty| ty.name().to_string());
		let _ = tx.send(name);
	});
	let name = rx
		.recv_timeout(std::time::Duration::from_secs(5))
		.expect("resolve blocked while the source activated");
	assert_eq!(name.as_deref(), Some("Echo"));

	let inventory = shared.lock();
	assert!(matches!(inventory.provider("Echo@plugin.example.com"), Some(Provider::Resolved(_))));
	assert!(matches!(inventory.provider("Extra@plugin.example.com"), Some(Provider::Resolved(_))));
}

#[test]
fn registration_during_load_wins_over_loaded_type() {
	let shared = Inventory::new().into_shared();
	let hook_inventory = Arc::clone(&shared);
	let mut module = Module::new("com.example.plugin", "plugin").declare("Echo", None);
	module.provide(plain("Echo")).on_activate(move || {
		hook_inventory.lock().register(plain("Replacement"), "Echo@plugin.example.com");
		Ok(())
	});
	shared.lock().scan(Arc::new(module));

	let ty = Inventory::try_resolve_shared(&shared, "Echo@plugin.example.com").unwrap();
	assert_eq!(ty.name(), "Replacement");
	assert_eq!(shared.lock().resolve("Echo@plugin.example.com").unwrap().name(), "Replacement");
}
