use std::path::Path;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tether_inventory::{ManifestError, Module, SourceManifest};

type Linker = Arc<dyn Fn(&mut Module) + Send + Sync>;

/// Component code linked into the host, keyed by source identifier.
///
/// Plugin bundles on disk only declare components; their code comes from
/// the linker registered under the bundle's identifier.
#[derive(Clone, Default)]
pub struct ModuleCatalog {
	linkers: FxHashMap<String, Linker>,
}

impl std::fmt::Debug for ModuleCatalog {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ModuleCatalog").field("linked", &self.linkers.keys().collect::<Vec<_>>()).finish()
	}
}

impl ModuleCatalog {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers the code for the source `identifier`.
	pub fn link<F>(&mut self, identifier: impl Into<String>, linker: F) -> &mut Self
	where
		F: Fn(&mut Module) + Send + Sync + 'static,
	{
		self.linkers.insert(identifier.into(), Arc::new(linker));
		self
	}

	/// Builder form of [`Self::link`].
	pub fn with<F>(mut self, identifier: impl Into<String>, linker: F) -> Self
	where
		F: Fn(&mut Module) + Send + Sync + 'static,
	{
		self.link(identifier, linker);
		self
	}

	pub fn contains(&self, identifier: &str) -> bool {
		self.linkers.contains_key(identifier)
	}

	/// Builds the module for a manifest, linking its code when available.
	pub fn module_for(&self, manifest: &SourceManifest) -> Module {
		let mut module = Module::from_manifest(manifest);
		match self.linkers.get(&manifest.identifier) {
			Some(linker) => {
				linker(&mut module);
				module.link();
			}
			None => tracing::warn!(source = %manifest.identifier, "no linked code for module; its components will not load"),
		}
		module
	}

	/// Opens the plugin bundle at `dir`.
	pub fn open(&self, dir: &Path) -> Result<Module, ManifestError> {
		let manifest = SourceManifest::load(dir)?;
		tracing::debug!(path = %dir.display(), source = %manifest.identifier, "opened plugin bundle");
		Ok(self.module_for(&manifest))
	}
}
