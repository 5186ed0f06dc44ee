use crate::registry::WeakRegistry;
use crate::{FieldId, SecureValueRegistry, TextWatcher};

/// The only watcher a secure field accepts.
///
/// It decides *whether* to act by comparing the replaced slice with the
/// inserted one, but when it acts it always writes the whole current text.
/// Pure selection churn never reaches the registry, and the registry never
/// holds a patched fragment.
pub struct GuardedChangeObserver {
    registry: WeakRegistry,
    field: FieldId,
    previous: Option<String>,
}

impl GuardedChangeObserver {
    pub(crate) fn new(registry: WeakRegistry, field: FieldId) -> Self {
        Self {
            registry,
            field,
            previous: None,
        }
    }

    pub fn field(&self) -> FieldId {
        self.field
    }

    /// True when this observer was installed by `registry` (identity, not equality).
    pub fn belongs_to(&self, registry: &SecureValueRegistry) -> bool {
        self.registry.points_to(registry)
    }
}

impl TextWatcher for GuardedChangeObserver {
    fn before_text_changed(&mut self, text: &str, _start: usize, _count: usize, _after: usize) {
        // The buffer is mutated before on_text_changed runs.
        self.previous = Some(text.to_owned());
    }

    fn on_text_changed(&mut self, text: &str, start: usize, before: usize, count: usize) {
        if !is_genuine_edit(self.previous.as_deref(), text, start, before, count) {
            log::trace!("field {:?}: change filtered", self.field);
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.record_edit(self.field, text.to_owned());
        }
    }

    fn after_text_changed(&mut self, _text: &str) {}
}

/// Decides whether a change notification carries a real content change.
///
/// A notification whose slices cannot be taken (no snapshot, out of range, or
/// off a char boundary) counts as genuine.
pub fn is_genuine_edit(
    previous: Option<&str>,
    current: &str,
    start: usize,
    before: usize,
    count: usize,
) -> bool {
    // Re-laying out the text (e.g. toggling multiline) can notify with nothing changed.
    if count == 0 && before == 0 {
        return false;
    }
    if count != before {
        return true;
    }
    let Some(previous) = previous else {
        return true;
    };
    let new_slice = current.get(start..start + count);
    let old_slice = previous.get(start..start + before);
    match (new_slice, old_slice) {
        (Some(new), Some(old)) => new != old,
        _ => true,
    }
}
