use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::component::ComponentType;
use crate::error::ResolveError;
use crate::identifier;
use crate::source::DiscoverySource;

#[cfg(test)]
mod tests;

/// What an identifier maps to.
#[derive(Clone)]
pub enum Provider {
	/// Loaded and cached.
	Resolved(ComponentType),
	/// Resolves through another identifier.
	Alias(String),
	/// Declared by a discovery source but not loaded yet.
	Unresolved,
}

impl fmt::Debug for Provider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Resolved(ty) => f.debug_tuple("Resolved").field(&ty.name()).finish(),
			Self::Alias(target) => f.debug_tuple("Alias").field(target).finish(),
			Self::Unresolved => f.write_str("Unresolved"),
		}
	}
}

impl Provider {
	/// Returns the cached type, if any.
	pub fn resolved(&self) -> Option<&ComponentType> {
		match self {
			Self::Resolved(ty) => Some(ty),
			_ => None,
		}
	}
}

/// Inventory shared between the host and its binders.
pub type SharedInventory = Arc<Mutex<Inventory>>;

/// Registry of component identifiers.
///
/// Mutation, including the cache fill done by [`Self::resolve`], requires
/// `&mut self`; share it across threads through [`SharedInventory`].
#[derive(Default)]
pub struct Inventory {
	providers: FxHashMap<String, Provider>,
	sources: FxHashMap<String, Arc<dyn DiscoverySource>>,
	primary: Option<String>,
}

impl fmt::Debug for Inventory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Inventory")
			.field("providers", &self.providers)
			.field("sources", &self.sources.keys().collect::<Vec<_>>())
			.field("primary", &self.primary)
			.finish()
	}
}

impl Inventory {
	/// Creates an empty inventory without a primary module.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates an inventory whose unsuffixed identifiers load from `primary`.
	///
	/// The primary module's declarations are scanned immediately.
	pub fn with_primary(primary: Arc<dyn DiscoverySource>) -> Self {
		let mut inventory = Self {
			primary: Some(primary.identifier().to_string()),
			..Self::default()
		};
		inventory.scan(primary);
		inventory
	}

	/// Wraps the inventory for sharing with binders.
	pub fn into_shared(self) -> SharedInventory {
		Arc::new(Mutex::new(self))
	}

	/// Identifier of the primary module, if any.
	pub fn primary(&self) -> Option<&str> {
		self.primary.as_deref()
	}

	fn origin_suffix<'a>(&self, origin: Option<&'a str>) -> Option<&'a str> {
		origin.filter(|o| self.primary.as_deref() != Some(*o))
	}

	/// Computes the identifier a type registers under by default.
	pub fn identifier_for(&self, ty: &ComponentType) -> String {
		identifier::identifier_for(ty.name(), self.origin_suffix(ty.origin()))
	}

	/// Catalogs the components a source declares without loading any of them.
	///
	/// Returns the number of declarations seen.
	pub fn scan(&mut self, source: Arc<dyn DiscoverySource>) -> usize {
		let source_id = source.identifier().to_string();
		let origin = self.origin_suffix(Some(source_id.as_str()));
		let declarations = source.declarations();
		for decl in &declarations {
			let id = identifier::identifier_for(&decl.name, origin);
			tracing::trace!(identifier = %id, source = %source_id, "inventory.declare");
			self.providers.insert(id.clone(), Provider::Unresolved);
			if let Some(alias) = decl.alias.as_deref().filter(|a| !a.is_empty()) {
				let alias_id = identifier::identifier_for(alias, origin);
				tracing::trace!(alias = %alias_id, target = %id, "inventory.alias");
				self.providers.insert(alias_id, Provider::Alias(id));
			}
		}
		tracing::debug!(source = %source_id, components = declarations.len(), "scanned discovery source");
		self.sources.insert(source_id, source);
		declarations.len()
	}

	/// Registers a type under its computed identifier.
	pub fn register_type(&mut self, ty: ComponentType) -> Option<Provider> {
		let id = self.identifier_for(&ty);
		self.register(ty, id)
	}

	/// Installs a resolved type, returning the provider it replaced.
	pub fn register(&mut self, ty: ComponentType, identifier: impl Into<String>) -> Option<Provider> {
		let identifier = identifier.into();
		tracing::debug!(identifier = %identifier, component = ty.name(), "registered component");
		self.providers.insert(identifier, Provider::Resolved(ty))
	}

	/// Removes an identifier entirely.
	pub fn unregister(&mut self, identifier: &str) -> Option<Provider> {
		self.providers.remove(identifier)
	}

	/// Registers `ty` under `identifier`, or unregisters it when `ty` is `None`.
	pub fn set(&mut self, identifier: &str, ty: Option<ComponentType>) -> Option<Provider> {
		match ty {
			Some(ty) => self.register(ty, identifier),
			None => self.unregister(identifier),
		}
	}

	/// Returns the provider stored for an identifier without resolving it.
	pub fn provider(&self, identifier: &str) -> Option<&Provider> {
		self.providers.get(identifier)
	}

	pub fn contains(&self, identifier: &str) -> bool {
		self.providers.contains_key(identifier)
	}

	pub fn len(&self) -> usize {
		self.providers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.providers.is_empty()
	}

	/// Known identifiers, sorted.
	pub fn identifiers(&self) -> Vec<&str> {
		let mut ids: Vec<_> = self.providers.keys().map(String::as_str).collect();
		ids.sort_unstable();
		ids
	}

	/// Resolves an identifier, logging and discarding any failure.
	pub fn resolve(&mut self, identifier: &str) -> Option<ComponentType> {
		match self.try_resolve(identifier) {
			Ok(ty) => Some(ty),
			Err(error) => {
				tracing::error!(identifier = %identifier, error = %error, "component resolution failed");
				None
			}
		}
	}

	/// Resolves an identifier to its component type.
	///
	/// Follows at most one alias. Declared components are loaded from their
	/// source and cached; failures are not cached.
	pub fn try_resolve(&mut self, identifier: &str) -> Result<ComponentType, ResolveError> {
		match self.lookup(identifier)? {
			Lookup::Ready(ty) => Ok(ty),
			Lookup::Load { identifier, source } => {
				let ty = load(source.as_ref(), &identifier)?;
				Ok(self.fill(&identifier, ty))
			}
		}
	}

	/// Resolves through a shared inventory, logging and discarding any failure.
	pub fn resolve_shared(inventory: &SharedInventory, identifier: &str) -> Option<ComponentType> {
		match Self::try_resolve_shared(inventory, identifier) {
			Ok(ty) => Some(ty),
			Err(error) => {
				tracing::error!(identifier = %identifier, error = %error, "component resolution failed");
				None
			}
		}
	}

	/// [`Self::try_resolve`] for a shared inventory.
	///
	/// The lock is released while the owning source activates and loads the
	/// type, so activation hooks may use the inventory themselves.
	pub fn try_resolve_shared(inventory: &SharedInventory, identifier: &str) -> Result<ComponentType, ResolveError> {
		let lookup = inventory.lock().lookup(identifier)?;
		match lookup {
			Lookup::Ready(ty) => Ok(ty),
			Lookup::Load { identifier, source } => {
				let ty = load(source.as_ref(), &identifier)?;
				Ok(inventory.lock().fill(&identifier, ty))
			}
		}
	}

	fn lookup(&self, identifier: &str) -> Result<Lookup, ResolveError> {
		let target = match self.providers.get(identifier) {
			None => {
				return Err(ResolveError::NotFound {
					identifier: identifier.to_string(),
				});
			}
			Some(Provider::Resolved(ty)) => return Ok(Lookup::Ready(ty.clone())),
			Some(Provider::Unresolved) => return self.pending(identifier),
			Some(Provider::Alias(target)) => target,
		};

		match self.providers.get(target) {
			Some(Provider::Resolved(ty)) => Ok(Lookup::Ready(ty.clone())),
			Some(Provider::Unresolved) => self.pending(target),
			Some(Provider::Alias(_)) => Err(ResolveError::AliasChain {
				alias: identifier.to_string(),
				target: target.clone(),
			}),
			None => Err(ResolveError::DanglingAlias {
				alias: identifier.to_string(),
				target: target.clone(),
			}),
		}
	}

	fn pending(&self, identifier: &str) -> Result<Lookup, ResolveError> {
		Ok(Lookup::Load {
			identifier: identifier.to_string(),
			source: self.source_for(identifier)?,
		})
	}

	/// Caches a loaded type unless the entry changed while it was loading.
	fn fill(&mut self, identifier: &str, ty: ComponentType) -> ComponentType {
		match self.providers.get(identifier) {
			Some(Provider::Unresolved) => {
				tracing::debug!(identifier = %identifier, component = ty.name(), "loaded component");
				self.providers.insert(identifier.to_string(), Provider::Resolved(ty.clone()));
				ty
			}
			Some(Provider::Resolved(registered)) => registered.clone(),
			_ => {
				tracing::debug!(identifier = %identifier, "entry changed during load; not cached");
				ty
			}
		}
	}

	fn source_for(&self, identifier: &str) -> Result<Arc<dyn DiscoverySource>, ResolveError> {
		match identifier::source_of(identifier) {
			Some(source_id) => self
				.sources
				.get(&source_id)
				.cloned()
				.ok_or_else(|| ResolveError::UnknownSource {
					identifier: identifier.to_string(),
					source_id,
				}),
			None => self
				.primary
				.as_ref()
				.and_then(|primary| self.sources.get(primary))
				.cloned()
				.ok_or_else(|| ResolveError::NoPrimarySource {
					identifier: identifier.to_string(),
				}),
		}
	}
}

/// Result of the locked part of a resolve.
enum Lookup {
	Ready(ComponentType),
	Load {
		identifier: String,
		source: Arc<dyn DiscoverySource>,
	},
}

/// Activates `source` and looks up the type declared as `identifier`.
///
/// Tries the bare name first, then the name qualified by the source's module.
fn load(source: &dyn DiscoverySource, identifier: &str) -> Result<ComponentType, ResolveError> {
	if !source.is_active() {
		source.activate()?;
	}

	let (name, _) = identifier::split_origin(identifier);
	let ty = match source.lookup(name) {
		Some(ty) => ty,
		None => {
			let qualified = format!("{}::{name}", source.module_name());
			source.lookup(&qualified).ok_or_else(|| ResolveError::TypeNotFound {
				name: qualified,
				source_id: source.identifier().to_string(),
			})?
		}
	};
	Ok(if ty.origin().is_none() { ty.with_origin(source.identifier()) } else { ty })
}
