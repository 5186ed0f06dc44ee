use std::any::Any;

/// Text change notifications, delivered in the order
/// `before_text_changed` → `on_text_changed` → `after_text_changed`
/// for every mutation of a text buffer.
///
/// Offsets and lengths are in bytes of the UTF-8 text.
pub trait TextWatcher: Any {
    /// `count` bytes starting at `start` are about to be replaced by `after` bytes.
    /// `text` is the content before the change.
    fn before_text_changed(&mut self, text: &str, start: usize, count: usize, after: usize);

    /// `before` bytes starting at `start` were replaced by `count` bytes.
    /// `text` is the content after the change.
    fn on_text_changed(&mut self, text: &str, start: usize, before: usize, count: usize);

    fn after_text_changed(&mut self, _text: &str) {}
}

/// `watcher` as a `T`, if that is exactly its concrete type.
pub fn watcher_as<T: TextWatcher>(watcher: &dyn TextWatcher) -> Option<&T> {
    let any: &dyn Any = watcher;
    any.downcast_ref::<T>()
}
