//! Component inventory for the plugin binding layer.
//!
//! The [`Inventory`] maps component identifiers to [`Provider`]s. Entries
//! come from two places:
//! * [`Inventory::scan`] catalogs the components a [`DiscoverySource`]
//!   declares without loading them.
//! * [`Inventory::register`] installs an already available [`ComponentType`].
//!
//! Declared components are loaded on first [`Inventory::resolve`] and cached.

pub mod component;
pub mod error;
pub mod identifier;
mod inventory;
pub mod source;

pub use component::{Argument, ComponentType, Construction, Instance, Plugin, Singleton, decode_argument};
pub use error::{ActivationError, ConstructError, InvokeError, ManifestError, ResolveError};
pub use inventory::{Inventory, Provider, SharedInventory};
pub use source::{Declaration, DiscoverySource, Module, SourceManifest};
