use std::sync::atomic::{AtomicU64, Ordering};

use crate::{Result, TextWatcher};

/// Process-unique identity of a secure field instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub u64);

static NEXT_FIELD_ID: AtomicU64 = AtomicU64::new(1);

impl FieldId {
    pub fn next() -> Self {
        FieldId(NEXT_FIELD_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Padding box pushed by the host layout pass, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Padding {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Padding {
    pub fn all(v: f32) -> Self {
        Self {
            left: v,
            top: v,
            right: v,
            bottom: v,
        }
    }
}

/// Proof that a text write originates from the registry.
///
/// Only this crate can construct one, so a field that requires a grant for
/// its privileged setter cannot be written through any other path.
pub struct RegistryGrant {
    _sealed: (),
}

impl RegistryGrant {
    pub(crate) fn new() -> Self {
        Self { _sealed: () }
    }
}

/// Capability set of a secure text widget.
///
/// Any concrete widget offering these operations can be bound to a
/// [`SecureValueRegistry`](crate::SecureValueRegistry).
pub trait SecureField {
    fn id(&self) -> FieldId;

    /// Text currently displayed by the widget.
    fn current_text(&self) -> String;

    /// Attach a change watcher.
    ///
    /// Implementations must fail with
    /// [`SecureInputError::AccessDenied`](crate::SecureInputError::AccessDenied)
    /// unless the watcher is a [`GuardedChangeObserver`](crate::GuardedChangeObserver)
    /// installed by the registry that owns the field (see
    /// [`GuardedChangeObserver::belongs_to`](crate::GuardedChangeObserver::belongs_to)),
    /// and must keep at most one guarded observer at a time.
    fn add_text_watcher(&self, watcher: Box<dyn TextWatcher>) -> Result<()>;

    /// Privileged setter. The only way the displayed text may change other than
    /// through user edits.
    fn apply_registry_text(&self, grant: &RegistryGrant, text: &str);

    /// Write coming from the host framework's own reconciliation pass. Ignored.
    fn set_text_from_host(&self, _text: &str) {
        log::trace!("host text update ignored by secure field {:?}", self.id());
    }

    /// Engage a separate "reject external writes" flag, for widgets that track one.
    fn lock_external_writes(&self) {}

    fn set_padding(&self, padding: Padding);
}
