//! Secure text field widget and the host view manager that drives it.
//!
//! `SecureTextField` implements `veil_core::SecureField` on top of a plain
//! editable buffer (`TextFieldState`). The host framework never touches a
//! field directly; it goes through `SecureTextInputManager`, which routes
//! properties and commands and discards any text the host tries to push.

pub mod input_type;
pub mod manager;
pub mod secure_field;
pub mod textfield;

pub use input_type::{ImeAction, ImeOptions, InputType, keyboard_type_flags};
pub use manager::{ManagerOptions, PropValue, SecureTextInputManager, TextUpdate};
pub use secure_field::SecureTextField;
pub use textfield::TextFieldState;
