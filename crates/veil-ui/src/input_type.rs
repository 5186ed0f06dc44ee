//! Keyboard/input-type flags and IME actions.
//!
//! Values match the platform input-type bits so they can be handed to the
//! soft keyboard unchanged.

use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct InputType: u32 {
        const CLASS_TEXT = 0x0000_0001;
        const CLASS_NUMBER = 0x0000_0002;
        const CLASS_PHONE = 0x0000_0003;
        const NUMBER_VARIATION_PASSWORD = 0x0000_0010;
        const TEXT_VARIATION_EMAIL_ADDRESS = 0x0000_0020;
        const TEXT_VARIATION_PASSWORD = 0x0000_0080;
        const TEXT_VARIATION_VISIBLE_PASSWORD = 0x0000_0090;
        const NUMBER_FLAG_SIGNED = 0x0000_1000;
        const NUMBER_FLAG_DECIMAL = 0x0000_2000;
        const TEXT_FLAG_MULTI_LINE = 0x0002_0000;
    }
}

pub const KEYBOARD_NUMBER_PAD: InputType = InputType::CLASS_NUMBER;
pub const KEYBOARD_DECIMAL_PAD: InputType =
    KEYBOARD_NUMBER_PAD.union(InputType::NUMBER_FLAG_DECIMAL);
pub const KEYBOARD_NUMBERED: InputType = KEYBOARD_DECIMAL_PAD.union(InputType::NUMBER_FLAG_SIGNED);
pub const PASSWORD_VISIBILITY_FLAG: InputType = InputType::TEXT_VARIATION_VISIBLE_PASSWORD
    .difference(InputType::TEXT_VARIATION_PASSWORD);
/// Every bit a `keyboardType` value may set or clear.
pub const KEYBOARD_TYPE_FLAGS: InputType = KEYBOARD_NUMBERED
    .union(InputType::TEXT_VARIATION_EMAIL_ADDRESS)
    .union(InputType::CLASS_TEXT)
    .union(InputType::CLASS_PHONE)
    .union(PASSWORD_VISIBILITY_FLAG);

impl Default for InputType {
    fn default() -> Self {
        InputType::CLASS_TEXT
    }
}

impl InputType {
    pub fn is_multiline(self) -> bool {
        self.intersects(InputType::TEXT_FLAG_MULTI_LINE)
    }

    pub fn is_password(self) -> bool {
        self.intersects(
            InputType::NUMBER_VARIATION_PASSWORD.union(InputType::TEXT_VARIATION_PASSWORD),
        )
    }

    /// `(self & !unset) | set`
    pub fn updated(self, unset: InputType, set: InputType) -> InputType {
        self.difference(unset).union(set)
    }

    /// Numeric keyboards need the numeric password variation instead of the text one.
    pub fn with_password_class_fixed(self) -> InputType {
        if self.intersects(KEYBOARD_NUMBERED)
            && self.intersects(InputType::TEXT_VARIATION_PASSWORD)
        {
            self.updated(
                InputType::TEXT_VARIATION_PASSWORD,
                InputType::NUMBER_VARIATION_PASSWORD,
            )
        } else {
            self
        }
    }
}

/// Flags for a `keyboardType` name. Unknown or missing names mean plain text.
pub fn keyboard_type_flags(keyboard_type: Option<&str>) -> InputType {
    let Some(name) = keyboard_type else {
        return InputType::CLASS_TEXT;
    };
    let is = |s: &str| name.eq_ignore_ascii_case(s);
    if is("numeric") {
        KEYBOARD_NUMBERED
    } else if is("number-pad") {
        KEYBOARD_NUMBER_PAD
    } else if is("decimal-pad") {
        KEYBOARD_DECIMAL_PAD
    } else if is("email-address") {
        InputType::TEXT_VARIATION_EMAIL_ADDRESS | InputType::CLASS_TEXT
    } else if is("phone-pad") {
        InputType::CLASS_PHONE
    } else if is("visible-password") {
        // Overrides secureTextEntry=false; otherwise the bits would read as a URI field.
        InputType::TEXT_VARIATION_VISIBLE_PASSWORD
    } else {
        InputType::CLASS_TEXT
    }
}

/// Action shown on the keyboard's return key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ImeAction {
    Go,
    Next,
    None,
    Previous,
    Search,
    Send,
    #[default]
    Done,
}

impl ImeAction {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "go" => ImeAction::Go,
            "next" => ImeAction::Next,
            "none" => ImeAction::None,
            "previous" => ImeAction::Previous,
            "search" => ImeAction::Search,
            "send" => ImeAction::Send,
            "done" => ImeAction::Done,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ImeOptions {
    pub action: ImeAction,
    pub no_fullscreen: bool,
}
