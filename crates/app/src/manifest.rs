use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use tether_inventory::{Argument, ManifestError, SourceManifest};

use crate::error::AppError;

/// Contents of a bundle's `app.toml`.
///
/// ```toml
/// identifier = "com.example.app"
/// main_html = "index.html"
/// plugin = "Plugins/Example.plugin"
///
/// [components]
/// Greeter = ""
///
/// [bindings]
/// greeter = "Greeter"
/// echo = { plugin = "Echo@plugin.example.com", argument = "hi" }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct AppManifest {
	/// Reverse-DNS identifier of the app's own module.
	pub identifier: String,
	#[serde(default)]
	pub main_html: String,
	/// Bundle-relative path of a plugin directory.
	#[serde(default)]
	pub plugin: Option<PathBuf>,
	/// Bundle-relative directory whose `*.plugin` subdirectories are scanned.
	#[serde(default)]
	pub plugin_dir: Option<PathBuf>,
	/// Components declared by the app's own module.
	#[serde(default)]
	pub components: IndexMap<String, String>,
	/// Namespace to binding spec. Without this table the app has no binder.
	#[serde(default)]
	pub bindings: Option<IndexMap<String, Argument>>,
}

impl AppManifest {
	pub const FILE_NAME: &'static str = "app.toml";

	pub fn from_toml(text: &str, path: &Path) -> Result<Self, AppError> {
		let manifest: Self = toml::from_str(text).map_err(|source| ManifestError::Parse {
			path: path.to_path_buf(),
			source,
		})?;
		if manifest.identifier.is_empty() {
			return Err(AppError::EmptyIdentifier);
		}
		Ok(manifest)
	}

	/// Reads `app.toml` from a bundle directory.
	pub fn load(root: &Path) -> Result<Self, AppError> {
		let path = root.join(Self::FILE_NAME);
		let text = std::fs::read_to_string(&path).map_err(|source| ManifestError::Io { path: path.clone(), source })?;
		Self::from_toml(&text, &path)
	}

	/// Declarations of the app's own module.
	pub fn primary_source(&self) -> SourceManifest {
		SourceManifest {
			identifier: self.identifier.clone(),
			module: None,
			components: self.components.clone(),
		}
	}
}
