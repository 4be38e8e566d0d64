//! Binding layer between the component inventory and a content surface.
//!
//! A [`BindingTable`] maps script-visible namespaces to [`Descriptor`]s. The
//! [`Binder`] turns one namespace into a [`LiveBinding`]: it resolves the
//! descriptor's component through the inventory, constructs an instance and
//! attaches it to a [`Surface`] on the proper execution context.

mod binder;
mod construct;
pub mod descriptor;
pub mod error;
pub mod surface;
mod table;

pub use binder::{Binder, Completion, ScriptBinder};
pub use construct::instantiate;
pub use descriptor::{BindingSpec, Descriptor};
pub use error::{AttachError, BindError, ConfigError};
pub use surface::{Attachment, Channel, LiveBinding, ScriptObject, Surface};
pub use table::BindingTable;
