//! Discovery sources: modules that declare components for deferred loading.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::component::ComponentType;
use crate::error::{ActivationError, ManifestError};

/// One declared component of a discovery source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
	/// Declared type name.
	pub name: String,
	/// Optional second name the component is also reachable under.
	pub alias: Option<String>,
}

/// A module that declares component types and can load them on demand.
pub trait DiscoverySource: Send + Sync {
	/// Reverse-DNS identifier of the source, e.g. `com.example.plugin`.
	fn identifier(&self) -> &str;

	/// Module name used to build qualified type names.
	fn module_name(&self) -> &str;

	/// Components the source declares. Must not load any component code.
	fn declarations(&self) -> Vec<Declaration>;

	fn is_active(&self) -> bool;

	/// Makes the source's types available to [`Self::lookup`].
	fn activate(&self) -> Result<(), ActivationError>;

	/// Looks up a type by bare or qualified name.
	fn lookup(&self, name: &str) -> Option<ComponentType>;
}

/// Declarative description of a discovery source (`plugin.toml`).
///
/// ```toml
/// identifier = "com.example.plugin"
/// module = "example_plugin"
///
/// [components]
/// Echo = ""
/// Clock = "Time"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceManifest {
	pub identifier: String,
	/// Defaults to the last component of `identifier`.
	#[serde(default)]
	pub module: Option<String>,
	/// Component name to alias; an empty alias means none.
	#[serde(default)]
	pub components: IndexMap<String, String>,
}

impl SourceManifest {
	/// Conventional manifest file name inside a plugin directory.
	pub const FILE_NAME: &'static str = "plugin.toml";

	/// Parses a manifest from TOML text.
	pub fn from_toml(text: &str, path: &Path) -> Result<Self, ManifestError> {
		toml::from_str(text).map_err(|source| ManifestError::Parse {
			path: path.to_path_buf(),
			source,
		})
	}

	/// Reads `plugin.toml` from a plugin directory.
	pub fn load(dir: &Path) -> Result<Self, ManifestError> {
		let path = dir.join(Self::FILE_NAME);
		let text = std::fs::read_to_string(&path).map_err(|source| ManifestError::Io { path: path.clone(), source })?;
		Self::from_toml(&text, &path)
	}

	pub fn module_name(&self) -> &str {
		self.module
			.as_deref()
			.unwrap_or_else(|| self.identifier.rsplit('.').next().unwrap_or(&self.identifier))
	}

	pub fn declarations(&self) -> Vec<Declaration> {
		self.components
			.iter()
			.map(|(name, alias)| Declaration {
				name: name.clone(),
				alias: Some(alias.clone()).filter(|a| !a.is_empty()),
			})
			.collect()
	}
}

type ActivationHook = Arc<dyn Fn() -> Result<(), String> + Send + Sync>;

/// In-process discovery source whose component types are linked into the host.
///
/// A module built from a manifest alone knows its declarations but has no
/// code until it is linked; activating it fails until then.
pub struct Module {
	identifier: String,
	module_name: String,
	declarations: Vec<Declaration>,
	types: FxHashMap<String, ComponentType>,
	hook: Option<ActivationHook>,
	linked: bool,
	active: AtomicBool,
}

impl std::fmt::Debug for Module {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Module")
			.field("identifier", &self.identifier)
			.field("module_name", &self.module_name)
			.field("declarations", &self.declarations)
			.field("linked", &self.linked)
			.field("active", &self.active.load(Ordering::Acquire))
			.finish_non_exhaustive()
	}
}

impl Module {
	/// Creates a linked module with no declarations.
	pub fn new(identifier: impl Into<String>, module_name: impl Into<String>) -> Self {
		Self {
			identifier: identifier.into(),
			module_name: module_name.into(),
			declarations: Vec::new(),
			types: FxHashMap::default(),
			hook: None,
			linked: true,
			active: AtomicBool::new(false),
		}
	}

	/// Creates an unlinked module carrying a manifest's declarations.
	pub fn from_manifest(manifest: &SourceManifest) -> Self {
		let mut module = Self::new(manifest.identifier.clone(), manifest.module_name());
		module.declarations = manifest.declarations();
		module.linked = false;
		module
	}

	/// Declares a component, optionally under a second name.
	pub fn declare(mut self, name: impl Into<String>, alias: Option<&str>) -> Self {
		self.declarations.push(Declaration {
			name: name.into(),
			alias: alias.filter(|a| !a.is_empty()).map(str::to_string),
		});
		self
	}

	/// Links a component type into the module, keyed by its qualified name.
	pub fn provide(&mut self, ty: ComponentType) -> &mut Self {
		let ty = if ty.origin().is_none() { ty.with_origin(self.identifier.as_str()) } else { ty };
		self.types.insert(ty.name().to_string(), ty);
		self.linked = true;
		self
	}

	/// Builder form of [`Self::provide`].
	pub fn with(mut self, ty: ComponentType) -> Self {
		self.provide(ty);
		self
	}

	/// Sets a hook run once on first activation.
	pub fn on_activate<F>(&mut self, hook: F) -> &mut Self
	where
		F: Fn() -> Result<(), String> + Send + Sync + 'static,
	{
		self.hook = Some(Arc::new(hook));
		self.linked = true;
		self
	}

	/// Marks the module as linked even though it provides no types.
	pub fn link(&mut self) -> &mut Self {
		self.linked = true;
		self
	}

	pub fn is_linked(&self) -> bool {
		self.linked
	}
}

impl DiscoverySource for Module {
	fn identifier(&self) -> &str {
		&self.identifier
	}

	fn module_name(&self) -> &str {
		&self.module_name
	}

	fn declarations(&self) -> Vec<Declaration> {
		self.declarations.clone()
	}

	fn is_active(&self) -> bool {
		self.active.load(Ordering::Acquire)
	}

	fn activate(&self) -> Result<(), ActivationError> {
		if self.is_active() {
			return Ok(());
		}
		if !self.linked {
			return Err(ActivationError::NotLinked {
				source_id: self.identifier.clone(),
			});
		}
		if let Some(hook) = &self.hook {
			hook().map_err(|message| ActivationError::Hook {
				source_id: self.identifier.clone(),
				message,
			})?;
		}
		self.active.store(true, Ordering::Release);
		tracing::debug!(source = %self.identifier, "module activated");
		Ok(())
	}

	fn lookup(&self, name: &str) -> Option<ComponentType> {
		self.types.get(name).cloned()
	}
}
