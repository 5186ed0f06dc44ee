use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::{
    FieldId, GuardedChangeObserver, Padding, RegistryGrant, RegistryOptions, Result,
    SecureField, SecureInputError,
};

/// Authoritative store for secure text values.
///
/// A cloneable handle; every clone refers to the same maps. Construct one per
/// process (or per test) and hand it to each field at creation time.
#[derive(Clone)]
pub struct SecureValueRegistry(Rc<Inner>);

/// Non-owning handle held by observers, so fields do not keep the registry alive.
#[derive(Clone)]
pub(crate) struct WeakRegistry(Weak<Inner>);

struct Inner {
    maps: RefCell<Maps>,
    options: RegistryOptions,
}

#[derive(Default)]
struct Maps {
    /// identifier → value
    values: HashMap<String, String>,
    /// identifier → bound field
    fields: HashMap<String, Binding>,
    /// field → identifier
    identifiers: HashMap<FieldId, String>,
}

struct Binding {
    id: FieldId,
    field: Weak<dyn SecureField>,
}

impl Default for SecureValueRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SecureValueRegistry {
    pub fn new() -> Self {
        Self::with_options(RegistryOptions::default())
    }

    pub fn with_options(options: RegistryOptions) -> Self {
        Self(Rc::new(Inner {
            maps: RefCell::new(Maps::default()),
            options,
        }))
    }

    pub fn options(&self) -> RegistryOptions {
        self.0.options
    }

    pub(crate) fn downgrade(&self) -> WeakRegistry {
        WeakRegistry(Rc::downgrade(&self.0))
    }

    /// Binds `field` to `identifier` and installs the guarded observer on it.
    ///
    /// The value is seeded from the field's displayed text only when the
    /// identifier has no value yet. Rebinding is last-writer-wins: a field that
    /// loses its identifier, or an identifier that moves to another field,
    /// leaves no stale half of the binding behind.
    ///
    /// A field that refuses this registry's observer (because it belongs to
    /// another registry) fails with `AccessDenied` and leaves every map untouched.
    pub fn register(&self, identifier: &str, field: Rc<dyn SecureField>) -> Result<()> {
        if identifier.is_empty() {
            return Err(SecureInputError::InvalidArgument("identifier"));
        }
        let field_id = field.id();

        field.add_text_watcher(Box::new(GuardedChangeObserver::new(
            self.downgrade(),
            field_id,
        )))?;
        field.lock_external_writes();
        let seed = field.current_text();

        {
            let mut maps = self.0.maps.borrow_mut();
            if !maps.values.contains_key(identifier) {
                maps.values.insert(identifier.to_owned(), seed);
            }

            if let Some(old_identifier) = maps
                .identifiers
                .insert(field_id, identifier.to_owned())
                && old_identifier != identifier
            {
                log::debug!(
                    "field {:?} moved from identifier {:?} to {:?}",
                    field_id,
                    old_identifier,
                    identifier
                );
                maps.fields.remove(&old_identifier);
            }

            let binding = Binding {
                id: field_id,
                field: Rc::downgrade(&field),
            };
            if let Some(old) = maps.fields.insert(identifier.to_owned(), binding)
                && old.id != field_id
            {
                log::debug!(
                    "identifier {:?} rebound from field {:?} to {:?}",
                    identifier,
                    old.id,
                    field_id
                );
                maps.identifiers.remove(&old.id);
            }
        }
        Ok(())
    }

    /// Current value for `identifier`, if registered.
    pub fn text(&self, identifier: &str) -> Option<String> {
        self.0.maps.borrow().values.get(identifier).cloned()
    }

    /// Writes the value and, when a field is bound, pushes it to the field
    /// through the privileged path.
    pub fn set_text(&self, identifier: &str, value: impl Into<String>) {
        let value = value.into();
        let field = {
            let mut maps = self.0.maps.borrow_mut();
            maps.values.insert(identifier.to_owned(), value.clone());
            maps.fields
                .get(identifier)
                .and_then(|binding| binding.field.upgrade())
        };

        log::debug!(
            "set_text {:?} with {}",
            identifier,
            self.describe(&value)
        );
        if let Some(field) = field {
            field.apply_registry_text(&RegistryGrant::new(), &value);
            log::debug!(
                "pushed {} to field {:?}",
                self.describe(&value),
                field.id()
            );
        }
    }

    /// Drops every trace of the identifier bound to `field`, value included.
    pub fn unregister(&self, field: &dyn SecureField) {
        let field_id = field.id();
        let mut maps = self.0.maps.borrow_mut();
        let Some(identifier) = maps.identifiers.remove(&field_id) else {
            log::debug!("unknown secure field {:?} detached", field_id);
            return;
        };
        maps.fields.remove(&identifier);
        maps.values.remove(&identifier);
    }

    /// Host layout/update pass: apply padding, then re-assert the registry
    /// value on the field so a reconciliation cannot overwrite it.
    pub fn reconcile_on_extra_update(&self, field: &dyn SecureField, padding: Padding) {
        field.set_padding(padding);

        let field_id = field.id();
        let bound = {
            let maps = self.0.maps.borrow();
            maps.identifiers.get(&field_id).map(|identifier| {
                let text = maps.values.get(identifier).cloned().unwrap_or_default();
                (identifier.clone(), text)
            })
        };
        let Some((identifier, text)) = bound else {
            log::debug!("extra update for unregistered field {:?}", field_id);
            return;
        };

        field.apply_registry_text(&RegistryGrant::new(), &text);
        log::debug!(
            "re-applied {} to field {:?} after extra update",
            self.describe(&text),
            field_id
        );
        self.0.maps.borrow_mut().values.insert(identifier, text);
    }

    /// Observer path: full text of a genuine edit on `field`.
    pub(crate) fn record_edit(&self, field: FieldId, text: String) {
        let mut maps = self.0.maps.borrow_mut();
        let Some(identifier) = maps.identifiers.get(&field).cloned() else {
            log::debug!("edit on unbound field {:?} dropped", field);
            return;
        };
        maps.values.insert(identifier, text);
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.0.maps.borrow().values.contains_key(identifier)
    }

    /// The live field bound to `identifier`.
    pub fn bound_field(&self, identifier: &str) -> Option<Rc<dyn SecureField>> {
        self.0
            .maps
            .borrow()
            .fields
            .get(identifier)
            .and_then(|binding| binding.field.upgrade())
    }

    pub fn identifier_of(&self, field: FieldId) -> Option<String> {
        self.0.maps.borrow().identifiers.get(&field).cloned()
    }

    /// Number of identifiers holding a value.
    pub fn len(&self) -> usize {
        self.0.maps.borrow().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn describe(&self, value: &str) -> String {
        if self.0.options.log_values {
            format!("{value:?}")
        } else {
            format!("<{} bytes>", value.len())
        }
    }
}

impl WeakRegistry {
    pub(crate) fn upgrade(&self) -> Option<SecureValueRegistry> {
        self.0.upgrade().map(SecureValueRegistry)
    }

    pub(crate) fn points_to(&self, registry: &SecureValueRegistry) -> bool {
        std::ptr::eq(self.0.as_ptr(), Rc::as_ptr(&registry.0))
    }
}

// Values never appear in Debug output.
impl fmt::Debug for SecureValueRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let maps = self.0.maps.borrow();
        f.debug_struct("SecureValueRegistry")
            .field("values", &maps.values.len())
            .field("bindings", &maps.fields.len())
            .finish()
    }
}
