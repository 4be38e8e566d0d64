use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use tether_binding::{Binder, BindingTable, ConfigError, LiveBinding, ScriptBinder, Surface};
use tether_inventory::{Inventory, SharedInventory};
use tether_worker::MainContext;

use crate::catalog::ModuleCatalog;
use crate::error::AppError;
use crate::manifest::AppManifest;

/// Extension of plugin bundle directories found under `plugin_dir`.
const PLUGIN_EXTENSION: &str = "plugin";

struct BindingState {
	binder: Option<Arc<Binder>>,
	errors: Vec<ConfigError>,
}

/// An application bundle.
///
/// The inventory and binder are built on first use.
pub struct WebApp {
	root: PathBuf,
	manifest: AppManifest,
	catalog: ModuleCatalog,
	main: MainContext,
	inventory: OnceLock<SharedInventory>,
	binding: OnceLock<BindingState>,
}

impl std::fmt::Debug for WebApp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("WebApp")
			.field("root", &self.root)
			.field("identifier", &self.manifest.identifier)
			.field("catalog", &self.catalog)
			.finish_non_exhaustive()
	}
}

impl WebApp {
	/// Opens the bundle at `root`.
	///
	/// `catalog` supplies the code of the app's own module and of its plugins;
	/// `main` is the host's UI-affine context.
	pub fn open(root: impl Into<PathBuf>, catalog: ModuleCatalog, main: MainContext) -> Result<Self, AppError> {
		let root = root.into();
		let manifest = AppManifest::load(&root)?;
		Ok(Self::from_manifest(root, manifest, catalog, main))
	}

	pub fn from_manifest(root: impl Into<PathBuf>, manifest: AppManifest, catalog: ModuleCatalog, main: MainContext) -> Self {
		Self {
			root: root.into(),
			manifest,
			catalog,
			main,
			inventory: OnceLock::new(),
			binding: OnceLock::new(),
		}
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	pub fn manifest(&self) -> &AppManifest {
		&self.manifest
	}

	/// Bundle-relative path of the page to load.
	pub fn main_html(&self) -> &str {
		&self.manifest.main_html
	}

	/// The component inventory: the app's own module plus every plugin bundle.
	pub fn inventory(&self) -> &SharedInventory {
		self.inventory.get_or_init(|| self.build_inventory().into_shared())
	}

	fn build_inventory(&self) -> Inventory {
		let primary = self.catalog.module_for(&self.manifest.primary_source());
		let mut inventory = Inventory::with_primary(Arc::new(primary));

		if let Some(plugin) = &self.manifest.plugin {
			self.scan_bundle(&mut inventory, &self.root.join(plugin));
		}
		if let Some(dir) = &self.manifest.plugin_dir {
			for bundle in self.plugin_bundles(&self.root.join(dir)) {
				self.scan_bundle(&mut inventory, &bundle);
			}
		}

		tracing::debug!(app = %self.manifest.identifier, components = inventory.len(), "inventory ready");
		inventory
	}

	fn scan_bundle(&self, inventory: &mut Inventory, path: &Path) {
		match self.catalog.open(path) {
			Ok(module) => {
				inventory.scan(Arc::new(module));
			}
			Err(error) => tracing::error!(path = %path.display(), error = %error, "open plugin failed"),
		}
	}

	fn plugin_bundles(&self, dir: &Path) -> Vec<PathBuf> {
		let entries = match std::fs::read_dir(dir) {
			Ok(entries) => entries,
			Err(error) => {
				tracing::error!(path = %dir.display(), error = %error, "read plugin directory failed");
				return Vec::new();
			}
		};
		let mut bundles: Vec<PathBuf> = entries
			.filter_map(Result::ok)
			.map(|entry| entry.path())
			.filter(|path| path.is_dir() && path.extension().is_some_and(|ext| ext == PLUGIN_EXTENSION))
			.collect();
		bundles.sort();
		bundles
	}

	fn binding_state(&self) -> &BindingState {
		self.binding.get_or_init(|| {
			let Some(config) = &self.manifest.bindings else {
				return BindingState {
					binder: None,
					errors: Vec::new(),
				};
			};
			let (table, errors) = BindingTable::from_config(config.iter().map(|(ns, spec)| (ns.as_str(), spec.clone())));
			if !errors.is_empty() {
				tracing::warn!(count = errors.len(), "dropped malformed bindings");
			}
			let binder = Binder::new(Arc::clone(self.inventory()), self.main.clone()).with_table(table);
			BindingState {
				binder: Some(Arc::new(binder)),
				errors,
			}
		})
	}

	/// The binder, present when the manifest declares `[bindings]`.
	pub fn binder(&self) -> Option<&Arc<Binder>> {
		self.binding_state().binder.as_ref()
	}

	/// Bindings dropped while building the binder.
	pub fn config_errors(&self) -> &[ConfigError] {
		&self.binding_state().errors
	}

	/// Binds every non-lazy namespace to `surface`.
	pub fn prebind(&self, surface: &dyn Surface) -> Vec<LiveBinding> {
		self.binder().map(|binder| binder.prebind(surface)).unwrap_or_default()
	}

	/// Script-facing plugin that lets page code bind lazy namespaces.
	pub fn script_binder(&self, surface: Arc<dyn Surface>) -> Option<ScriptBinder> {
		self.binder().map(|binder| ScriptBinder::new(Arc::clone(binder), surface))
	}
}
