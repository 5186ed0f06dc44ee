use std::cell::{Cell, RefCell};
use std::ops::Range;

use veil_core::{
    FieldId, GuardedChangeObserver, Padding, RegistryGrant, Result, SecureField, SecureInputError,
    SecureValueRegistry, TextWatcher, watcher_as,
};

use crate::input_type::{ImeAction, ImeOptions, InputType};
use crate::textfield::TextFieldState;

/// Text entry widget whose content only the registry can set and only the
/// registry's observer can watch.
///
/// Focus is controlled by the trusted command channel: focus requests that do
/// not come through [`request_focus_trusted`](Self::request_focus_trusted) are
/// refused.
pub struct SecureTextField {
    id: FieldId,
    registry: SecureValueRegistry,
    state: RefCell<TextFieldState>,

    focused: Cell<bool>,
    trusted_focus: Cell<bool>,
    editable: Cell<bool>,

    input_type: Cell<InputType>,
    staged_input_type: Cell<InputType>,
    blur_on_submit: Cell<Option<bool>>,
    return_key_type: Cell<Option<ImeAction>>,
    return_key_label: RefCell<Option<String>>,
    disable_fullscreen: Cell<bool>,

    padding: Cell<Padding>,
    text_size_px: Cell<f32>,
}

impl SecureTextField {
    pub fn new(registry: SecureValueRegistry) -> Self {
        Self {
            id: FieldId::next(),
            registry,
            state: RefCell::new(TextFieldState::new()),
            focused: Cell::new(false),
            trusted_focus: Cell::new(false),
            editable: Cell::new(true),
            input_type: Cell::new(InputType::default()),
            staged_input_type: Cell::new(InputType::default()),
            blur_on_submit: Cell::new(None),
            return_key_type: Cell::new(None),
            return_key_label: RefCell::new(None),
            disable_fullscreen: Cell::new(false),
            padding: Cell::new(Padding::default()),
            text_size_px: Cell::new(0.0),
        }
    }

    pub fn registry(&self) -> &SecureValueRegistry {
        &self.registry
    }

    // Editing. Each returns false when the field is not editable.

    pub fn insert_text(&self, text: &str) -> bool {
        self.edit(|st| st.insert_text(text))
    }

    pub fn delete_backward(&self) -> bool {
        self.edit(|st| st.delete_backward())
    }

    pub fn delete_forward(&self) -> bool {
        self.edit(|st| st.delete_forward())
    }

    pub fn delete_surrounding(&self, before_bytes: usize, after_bytes: usize) -> bool {
        self.edit(|st| st.delete_surrounding(before_bytes, after_bytes))
    }

    pub fn set_composition(&self, text: String, cursor: Option<(usize, usize)>) -> bool {
        self.edit(|st| st.set_composition(text, cursor))
    }

    pub fn commit_composition(&self, text: String) -> bool {
        self.edit(|st| st.commit_composition(text))
    }

    pub fn cancel_composition(&self) -> bool {
        self.edit(|st| st.cancel_composition())
    }

    fn edit(&self, f: impl FnOnce(&mut TextFieldState)) -> bool {
        if !self.editable.get() {
            return false;
        }
        f(&mut self.state.borrow_mut());
        true
    }

    pub fn move_cursor(&self, delta: isize, extend_selection: bool) {
        self.state.borrow_mut().move_cursor(delta, extend_selection);
    }

    pub fn set_selection(&self, selection: Range<usize>) {
        self.state.borrow_mut().set_selection(selection);
    }

    pub fn selection(&self) -> Range<usize> {
        self.state.borrow().selection.clone()
    }

    // Focus

    /// Focus request from anywhere but the trusted command channel.
    /// Succeeds only if the field already has focus.
    pub fn request_focus(&self) -> bool {
        if self.focused.get() {
            return true;
        }
        if !self.trusted_focus.get() {
            return false;
        }
        self.focused.set(true);
        true
    }

    pub fn request_focus_trusted(&self) -> bool {
        self.trusted_focus.set(true);
        let focused = self.request_focus();
        self.trusted_focus.set(false);
        focused
    }

    /// Drops focus. Composed text stays in the buffer as committed text.
    pub fn clear_focus(&self) {
        self.state.borrow_mut().composition = None;
        self.focused.set(false);
    }

    pub fn is_focused(&self) -> bool {
        self.focused.get()
    }

    /// Return key / editor action. Returns true when the event is consumed;
    /// false means the host should insert a newline.
    pub fn on_editor_action(&self) -> bool {
        let blur = self.blur_on_submit();
        if blur {
            self.clear_focus();
        }
        blur || !self.is_multiline()
    }

    // Host-driven configuration

    pub fn set_editable(&self, editable: bool) {
        self.editable.set(editable);
    }

    pub fn is_editable(&self) -> bool {
        self.editable.get()
    }

    pub fn set_blur_on_submit(&self, blur_on_submit: Option<bool>) {
        self.blur_on_submit.set(blur_on_submit);
    }

    /// Defaults to blurring single-line fields only.
    pub fn blur_on_submit(&self) -> bool {
        self.blur_on_submit
            .get()
            .unwrap_or_else(|| !self.is_multiline())
    }

    pub fn is_multiline(&self) -> bool {
        self.input_type.get().is_multiline()
    }

    pub fn is_secure_text(&self) -> bool {
        self.input_type.get().is_password()
    }

    pub fn input_type(&self) -> InputType {
        self.input_type.get()
    }

    pub fn set_input_type(&self, input_type: InputType) {
        self.input_type.set(input_type);
        self.staged_input_type.set(input_type);
    }

    pub fn staged_input_type(&self) -> InputType {
        self.staged_input_type.get()
    }

    pub fn set_staged_input_type(&self, input_type: InputType) {
        self.staged_input_type.set(input_type);
    }

    /// Applies the staged input type, keeping the selection.
    pub fn commit_staged_input_type(&self) {
        let staged = self.staged_input_type.get();
        if self.input_type.get() != staged {
            let selection = self.selection();
            self.set_input_type(staged);
            self.set_selection(selection);
        }
    }

    pub fn set_return_key_type(&self, return_key_type: Option<ImeAction>) {
        self.return_key_type.set(return_key_type);
    }

    pub fn return_key_type(&self) -> Option<ImeAction> {
        self.return_key_type.get()
    }

    pub fn set_return_key_label(&self, label: Option<String>) {
        *self.return_key_label.borrow_mut() = label;
    }

    pub fn return_key_label(&self) -> Option<String> {
        self.return_key_label.borrow().clone()
    }

    pub fn set_disable_fullscreen_ui(&self, disable: bool) {
        self.disable_fullscreen.set(disable);
    }

    pub fn ime_options(&self) -> ImeOptions {
        ImeOptions {
            action: self.return_key_type.get().unwrap_or_default(),
            no_fullscreen: self.disable_fullscreen.get(),
        }
    }

    pub fn set_text_size_px(&self, px: f32) {
        self.text_size_px.set(px);
    }

    pub fn text_size_px(&self) -> f32 {
        self.text_size_px.get()
    }

    pub fn padding(&self) -> Padding {
        self.padding.get()
    }

    /// Detach from the window: the registry forgets this field first, then
    /// normal teardown runs.
    pub fn on_detach(&self) {
        self.registry.unregister(self);
        self.clear_focus();
    }
}

impl SecureField for SecureTextField {
    fn id(&self) -> FieldId {
        self.id
    }

    fn current_text(&self) -> String {
        self.state.borrow().text().to_owned()
    }

    fn add_text_watcher(&self, watcher: Box<dyn TextWatcher>) -> Result<()> {
        let Some(observer) = watcher_as::<GuardedChangeObserver>(watcher.as_ref()) else {
            log::warn!("rejected foreign text watcher on secure field {:?}", self.id);
            return Err(SecureInputError::AccessDenied(format!(
                "secure field {:?} only accepts the registry observer",
                self.id
            )));
        };
        if !observer.belongs_to(&self.registry) {
            log::warn!(
                "rejected observer from another registry on secure field {:?}",
                self.id
            );
            return Err(SecureInputError::AccessDenied(format!(
                "secure field {:?} belongs to another registry",
                self.id
            )));
        }
        let mut state = self.state.borrow_mut();
        // At most one guarded observer; re-registration replaces it.
        state.clear_watchers();
        state.add_watcher(watcher);
        Ok(())
    }

    fn apply_registry_text(&self, _grant: &RegistryGrant, text: &str) {
        self.state.borrow_mut().set_text(text);
    }

    fn set_padding(&self, padding: Padding) {
        self.padding.set(padding);
    }
}

impl std::fmt::Debug for SecureTextField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureTextField")
            .field("id", &self.id)
            .field("state", &self.state.borrow())
            .field("focused", &self.focused.get())
            .field("input_type", &self.input_type.get())
            .finish()
    }
}
