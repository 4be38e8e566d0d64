//! Application bundle for the plugin binding layer.
//!
//! A bundle is a directory holding `app.toml`. [`WebApp`] reads it, builds
//! the component inventory from the app's own module and its plugin
//! bundles, and sets up a [`Binder`](tether_binding::Binder) from the
//! declared bindings.

mod app;
mod catalog;
mod error;
mod manifest;

pub use app::WebApp;
pub use catalog::ModuleCatalog;
pub use error::AppError;
pub use manifest::AppManifest;
