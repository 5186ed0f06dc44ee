//! # Secure values, fields and watchers
//!
//! Veil keeps the text of a secure input out of the scripting layer that
//! normally drives the UI. The authoritative value lives in a native-side
//! registry and is addressed by an opaque identifier. There are three pieces:
//!
//! - `SecureValueRegistry`: identifier → value, plus the identifier ↔ field
//!   binding.
//! - `SecureField`: what a widget must offer. It refuses foreign watchers
//!   and host writes, and accepts writes that carry a `RegistryGrant`.
//! - `GuardedChangeObserver`: the one watcher a secure field accepts. It
//!   pushes genuine edits into the registry.
//!
//! ## Registering a field
//!
//! ```rust,ignore
//! use veil_core::*;
//!
//! let registry = SecureValueRegistry::new();
//! let field = std::rc::Rc::new(MyField::new(registry.clone()));
//!
//! registry.register("pin", field.clone())?;
//! assert_eq!(registry.text("pin").as_deref(), Some(""));
//!
//! // Trusted native code writes through the registry, never through the field.
//! registry.set_text("pin", "1234");
//! assert_eq!(field.current_text(), "1234");
//! ```
//!
//! ## Threading
//!
//! Everything here is UI-thread state held in `Rc`/`RefCell`, so none of the
//! handles are `Send`. The three maps share a single `RefCell`; no registry
//! borrow is held while a field is called back.

pub mod error;
pub mod field;
pub mod observer;
pub mod options;
pub mod registry;
pub mod watcher;

pub use error::*;
pub use field::*;
pub use observer::*;
pub use options::*;
pub use registry::*;
pub use watcher::*;
