//! Host-facing view manager.
//!
//! The host UI framework creates secure fields through
//! [`SecureTextInputManager`], sets their properties by name and sends them
//! numbered commands. Text never travels across this boundary: the only
//! text-bearing input, [`TextUpdate`], has its text discarded.

use std::rc::Rc;

use serde_json::Value;
use veil_core::{Padding, Result, SecureField, SecureInputError, SecureValueRegistry};

use crate::input_type::{ImeAction, InputType, KEYBOARD_TYPE_FLAGS, keyboard_type_flags};
use crate::secure_field::SecureTextField;

/// Property value as delivered by the host bridge.
pub type PropValue = Value;

#[derive(Clone, Copy, Debug)]
pub struct ManagerOptions {
    /// Text size given to new fields, rounded up to whole pixels.
    pub default_text_size_px: f32,
    pub return_key_type: ImeAction,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            default_text_size_px: 14.0,
            return_key_type: ImeAction::Done,
        }
    }
}

/// Layout/update payload the host pushes after a reconciliation pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextUpdate {
    pub padding: Padding,
    /// Whatever the host believes the text is. Never applied.
    pub text: String,
}

pub struct SecureTextInputManager {
    registry: SecureValueRegistry,
    options: ManagerOptions,
}

impl SecureTextInputManager {
    pub const NAME: &'static str = "RCTSecureTextInput";

    pub const FOCUS_TEXT_INPUT: u32 = 1;
    pub const BLUR_TEXT_INPUT: u32 = 2;

    pub fn new(registry: SecureValueRegistry) -> Self {
        Self::with_options(registry, ManagerOptions::default())
    }

    pub fn with_options(registry: SecureValueRegistry, options: ManagerOptions) -> Self {
        Self { registry, options }
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    pub fn registry(&self) -> &SecureValueRegistry {
        &self.registry
    }

    pub fn options(&self) -> ManagerOptions {
        self.options
    }

    /// A new single-line field bound to this manager's registry.
    pub fn create_view(&self) -> Rc<SecureTextField> {
        let field = Rc::new(SecureTextField::new(self.registry.clone()));
        field.set_input_type(
            InputType::default().updated(InputType::TEXT_FLAG_MULTI_LINE, InputType::empty()),
        );
        field.set_return_key_type(Some(self.options.return_key_type));
        field.set_text_size_px(self.options.default_text_size_px.ceil());
        field
    }

    /// Host is done with the view.
    pub fn drop_view(&self, field: &SecureTextField) {
        field.on_detach();
    }

    pub fn set_property(
        &self,
        field: &Rc<SecureTextField>,
        name: &str,
        value: PropValue,
    ) -> Result<()> {
        match name {
            "registrationID" => {
                let Some(identifier) = value.as_str() else {
                    return Err(SecureInputError::InvalidArgument("registrationID"));
                };
                let bound: Rc<dyn SecureField> = field.clone();
                self.registry.register(identifier, bound)?;
            }
            "blurOnSubmit" => {
                let blur = match value {
                    Value::Null => None,
                    Value::Bool(b) => Some(b),
                    _ => return Err(SecureInputError::InvalidArgument("blurOnSubmit")),
                };
                field.set_blur_on_submit(blur);
            }
            "multiline" => {
                let staged = if bool_prop(&value, "multiline", false)? {
                    field
                        .staged_input_type()
                        .updated(InputType::empty(), InputType::TEXT_FLAG_MULTI_LINE)
                } else {
                    field
                        .staged_input_type()
                        .updated(InputType::TEXT_FLAG_MULTI_LINE, InputType::empty())
                };
                field.set_staged_input_type(staged);
            }
            "secureTextEntry" => {
                let staged = if bool_prop(&value, "secureTextEntry", false)? {
                    field
                        .staged_input_type()
                        .updated(InputType::empty(), InputType::TEXT_VARIATION_PASSWORD)
                } else {
                    field.staged_input_type().updated(
                        InputType::NUMBER_VARIATION_PASSWORD | InputType::TEXT_VARIATION_PASSWORD,
                        InputType::empty(),
                    )
                };
                field.set_staged_input_type(staged.with_password_class_fixed());
            }
            "keyboardType" => {
                let flags = keyboard_type_flags(str_prop(&value, "keyboardType")?);
                let staged = field
                    .staged_input_type()
                    .updated(KEYBOARD_TYPE_FLAGS, flags);
                field.set_staged_input_type(staged.with_password_class_fixed());
            }
            "returnKeyType" => {
                let action = match str_prop(&value, "returnKeyType")? {
                    None => None,
                    Some(name) => {
                        let action = ImeAction::from_name(name);
                        if action.is_none() {
                            log::warn!("unknown returnKeyType {name:?}, using default");
                        }
                        action
                    }
                };
                field.set_return_key_type(action);
            }
            "returnKeyLabel" => {
                let label = str_prop(&value, "returnKeyLabel")?.map(str::to_owned);
                field.set_return_key_label(label);
            }
            "disableFullscreenUI" => {
                field.set_disable_fullscreen_ui(bool_prop(&value, "disableFullscreenUI", false)?);
            }
            "editable" => {
                field.set_editable(bool_prop(&value, "editable", true)?);
            }
            "onKeyPress" => {
                log::warn!("refused onKeyPress on secure field {:?}", field.id());
                return Err(SecureInputError::AccessDenied(
                    "key events are not observable on a secure text input".into(),
                ));
            }
            other => {
                log::warn!("{} ignores unknown property {other:?}", Self::NAME);
            }
        }
        Ok(())
    }

    pub fn commands(&self) -> [(&'static str, u32); 2] {
        [
            ("focusTextInput", Self::FOCUS_TEXT_INPUT),
            ("blurTextInput", Self::BLUR_TEXT_INPUT),
        ]
    }

    pub fn receive_command(&self, field: &SecureTextField, command_id: u32) {
        match command_id {
            Self::FOCUS_TEXT_INPUT => {
                field.request_focus_trusted();
            }
            Self::BLUR_TEXT_INPUT => field.clear_focus(),
            other => log::warn!("{} ignores unknown command {other}", Self::NAME),
        }
    }

    pub fn update_extra_data(&self, field: &SecureTextField, update: TextUpdate) {
        self.registry
            .reconcile_on_extra_update(field, update.padding);
    }

    pub fn on_after_update_transaction(&self, field: &SecureTextField) {
        field.commit_staged_input_type();
    }
}

fn bool_prop(value: &Value, name: &'static str, default: bool) -> Result<bool> {
    match value {
        Value::Null => Ok(default),
        Value::Bool(b) => Ok(*b),
        _ => Err(SecureInputError::InvalidArgument(name)),
    }
}

fn str_prop<'a>(value: &'a Value, name: &'static str) -> Result<Option<&'a str>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        _ => Err(SecureInputError::InvalidArgument(name)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::input_type::KEYBOARD_NUMBER_PAD;

    fn manager() -> SecureTextInputManager {
        SecureTextInputManager::new(SecureValueRegistry::new())
    }

    #[test]
    fn test_create_view_defaults() {
        let m = manager();
        let f = m.create_view();
        assert!(!f.is_multiline());
        assert_eq!(f.return_key_type(), Some(ImeAction::Done));
        assert_eq!(f.text_size_px(), 14.0);
        assert!(f.blur_on_submit());
    }

    #[test]
    fn test_text_size_rounds_up() {
        let m = SecureTextInputManager::with_options(
            SecureValueRegistry::new(),
            ManagerOptions {
                default_text_size_px: 14.2,
                ..Default::default()
            },
        );
        assert_eq!(m.create_view().text_size_px(), 15.0);
    }

    #[test]
    fn test_registration_id_must_be_string() {
        let m = manager();
        let f = m.create_view();
        assert_eq!(
            m.set_property(&f, "registrationID", json!(7)),
            Err(SecureInputError::InvalidArgument("registrationID"))
        );
        assert_eq!(
            m.set_property(&f, "registrationID", json!("")),
            Err(SecureInputError::InvalidArgument("identifier"))
        );
        m.set_property(&f, "registrationID", json!("pin")).unwrap();
        assert_eq!(m.registry().identifier_of(f.id()).as_deref(), Some("pin"));
    }

    #[test]
    fn test_on_key_press_denied() {
        let m = manager();
        let f = m.create_view();
        let err = m.set_property(&f, "onKeyPress", json!(true)).unwrap_err();
        assert!(matches!(err, SecureInputError::AccessDenied(_)));
    }

    #[test]
    fn test_unknown_property_ignored() {
        let m = manager();
        let f = m.create_view();
        assert!(m.set_property(&f, "placeholder", json!("x")).is_ok());
    }

    #[test]
    fn test_input_type_props_stage_until_commit() {
        let m = manager();
        let f = m.create_view();
        m.set_property(&f, "multiline", json!(true)).unwrap();
        assert!(!f.is_multiline());
        m.on_after_update_transaction(&f);
        assert!(f.is_multiline());
        assert!(!f.blur_on_submit());
    }

    #[test]
    fn test_numeric_secure_entry_uses_number_password() {
        let m = manager();
        let f = m.create_view();
        m.set_property(&f, "keyboardType", json!("number-pad")).unwrap();
        m.set_property(&f, "secureTextEntry", json!(true)).unwrap();
        m.on_after_update_transaction(&f);

        let t = f.input_type();
        assert!(t.contains(KEYBOARD_NUMBER_PAD));
        assert!(t.contains(InputType::NUMBER_VARIATION_PASSWORD));
        assert!(!t.contains(InputType::TEXT_VARIATION_PASSWORD));

        m.set_property(&f, "secureTextEntry", json!(false)).unwrap();
        m.on_after_update_transaction(&f);
        assert!(!f.is_secure_text());
    }

    #[test]
    fn test_return_key_props() {
        let m = manager();
        let f = m.create_view();
        m.set_property(&f, "returnKeyType", json!("send")).unwrap();
        m.set_property(&f, "returnKeyLabel", json!("Pay")).unwrap();
        m.set_property(&f, "disableFullscreenUI", json!(true)).unwrap();
        let ime = f.ime_options();
        assert_eq!(ime.action, ImeAction::Send);
        assert!(ime.no_fullscreen);
        assert_eq!(f.return_key_label().as_deref(), Some("Pay"));

        m.set_property(&f, "returnKeyType", Value::Null).unwrap();
        assert_eq!(f.ime_options().action, ImeAction::Done);
    }

    #[test]
    fn test_commands() {
        let m = manager();
        let f = m.create_view();
        assert_eq!(
            m.commands(),
            [("focusTextInput", 1), ("blurTextInput", 2)]
        );
        m.receive_command(&f, SecureTextInputManager::FOCUS_TEXT_INPUT);
        assert!(f.is_focused());
        m.receive_command(&f, 99);
        assert!(f.is_focused());
        m.receive_command(&f, SecureTextInputManager::BLUR_TEXT_INPUT);
        assert!(!f.is_focused());
    }
}
