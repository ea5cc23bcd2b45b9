// Input flag bits, key codes and their symbolic names

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Modifier and transition bits carried by every input record
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InputFlags: u32 {
        const BUTTON_UP = 0x0001;
        const BUTTON_DOWN = 0x0002;
        const BUTTON_SHIFT = 0x0004;
        const BUTTON_CTRL = 0x0008;
        const BUTTON_ALT = 0x0010;
        const BUTTON_CAPS = 0x0020;
        const MOUSE_MOVE = 0x0040;
        const MOUSE_WHEEL = 0x0080;
        const BUTTON_NUM_LOCK = 0x0100;
        /// Several inputs may satisfy one action
        const INPUT_SEQ_ORED = 0x0200;
    }
}

impl InputFlags {
    /// Down and up transition bits
    pub const TRANSITIONS: Self = Self::BUTTON_DOWN.union(Self::BUTTON_UP);

    /// Modifiers that must agree for a key template to match
    pub const CONTROL: Self = Self::BUTTON_SHIFT.union(Self::BUTTON_CTRL);
}

/// Renders as `|`-joined flag names, most significant bit first
impl fmt::Display for InputFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, flag) in FLAG_NAMES.iter().rev() {
            if self.contains(*flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Symbolic flag names accepted in binding configuration
pub const FLAG_NAMES: &[(&str, InputFlags)] = &[
    ("ButtonUp", InputFlags::BUTTON_UP),
    ("ButtonDown", InputFlags::BUTTON_DOWN),
    ("ButtonShift", InputFlags::BUTTON_SHIFT),
    ("ButtonCtrl", InputFlags::BUTTON_CTRL),
    ("ButtonAlt", InputFlags::BUTTON_ALT),
    ("ButtonCaps", InputFlags::BUTTON_CAPS),
    ("MouseMove", InputFlags::MOUSE_MOVE),
    ("MouseWheel", InputFlags::MOUSE_WHEEL),
    ("ButtonNumLock", InputFlags::BUTTON_NUM_LOCK),
    ("InputSeqOred", InputFlags::INPUT_SEQ_ORED),
];

// Key codes
pub const KEY_BACK: u8 = 8;
pub const KEY_TAB: u8 = 9;
pub const KEY_RETURN: u8 = 13;
pub const KEY_ESC: u8 = 27;
pub const KEY_PAGE_UP: u8 = 33;
pub const KEY_PAGE_DOWN: u8 = 34;
pub const KEY_END: u8 = 35;
pub const KEY_HOME: u8 = 36;
pub const KEY_ARROW_LEFT: u8 = 37;
pub const KEY_ARROW_UP: u8 = 38;
pub const KEY_ARROW_RIGHT: u8 = 39;
pub const KEY_ARROW_DOWN: u8 = 40;
pub const KEY_DELETE: u8 = 46;

// Mouse button indices
pub const MOUSE_LEFT: u8 = 1;
pub const MOUSE_RIGHT: u8 = 2;
pub const MOUSE_MIDDLE: u8 = 3;
pub const MOUSE_4: u8 = 4;
pub const MOUSE_5: u8 = 5;
pub const MOUSE_6: u8 = 6;

/// Number of addressable mouse buttons
pub const MAX_MOUSE_BUTTONS: u8 = 32;

/// What a symbolic key name resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyName {
    /// Keyboard key code
    Key(u8),
    /// Mouse button index
    Mouse(u8),
}

/// Symbolic key names accepted in binding configuration
pub const KEY_NAMES: &[(&str, KeyName)] = &[
    ("Back", KeyName::Key(KEY_BACK)),
    ("Tab", KeyName::Key(KEY_TAB)),
    ("Return", KeyName::Key(KEY_RETURN)),
    ("ESC", KeyName::Key(KEY_ESC)),
    ("ArrowUp", KeyName::Key(KEY_ARROW_UP)),
    ("ArrowDown", KeyName::Key(KEY_ARROW_DOWN)),
    ("ArrowRight", KeyName::Key(KEY_ARROW_RIGHT)),
    ("ArrowLeft", KeyName::Key(KEY_ARROW_LEFT)),
    ("PageUp", KeyName::Key(KEY_PAGE_UP)),
    ("PageDown", KeyName::Key(KEY_PAGE_DOWN)),
    ("End", KeyName::Key(KEY_END)),
    ("Home", KeyName::Key(KEY_HOME)),
    ("Delete", KeyName::Key(KEY_DELETE)),
    ("MouseLeft", KeyName::Mouse(MOUSE_LEFT)),
    ("MouseRight", KeyName::Mouse(MOUSE_RIGHT)),
    ("MouseMiddle", KeyName::Mouse(MOUSE_MIDDLE)),
    ("Mouse4", KeyName::Mouse(MOUSE_4)),
    ("Mouse5", KeyName::Mouse(MOUSE_5)),
    ("MouseWheel", KeyName::Mouse(MOUSE_6)),
    ("F1", KeyName::Key(112)),
    ("F2", KeyName::Key(113)),
    ("F3", KeyName::Key(114)),
    ("F4", KeyName::Key(115)),
    ("F5", KeyName::Key(116)),
    ("F6", KeyName::Key(117)),
    ("F7", KeyName::Key(118)),
    ("F8", KeyName::Key(119)),
    ("F9", KeyName::Key(120)),
    ("F10", KeyName::Key(121)),
    ("F11", KeyName::Key(122)),
    ("F12", KeyName::Key(123)),
    ("CapsLock", KeyName::Key(20)),
    ("Shift", KeyName::Key(160)),
];

/// Resolve a single case-insensitive flag name such as `ButtonDown`
///
/// Uses the binding file names, not the constant names that
/// `InputFlags::from_name` knows about.
pub fn flag_from_name(name: &str) -> Option<InputFlags> {
    FLAG_NAMES
        .iter()
        .find(|(flag_name, _)| flag_name.eq_ignore_ascii_case(name))
        .map(|(_, flag)| *flag)
}

/// Resolve a case-insensitive symbolic key name
pub fn key_from_name(name: &str) -> Option<KeyName> {
    KEY_NAMES
        .iter()
        .find(|(key_name, _)| key_name.eq_ignore_ascii_case(name))
        .map(|(_, key)| *key)
}

/// Symbolic name of a keyboard key code, if it has one
pub fn key_name(code: u8) -> Option<&'static str> {
    KEY_NAMES
        .iter()
        .find(|(_, key)| *key == KeyName::Key(code))
        .map(|(name, _)| *name)
}

/// Symbolic name of a mouse button index, if it has one
pub fn mouse_button_name(button: u8) -> Option<&'static str> {
    KEY_NAMES
        .iter()
        .find(|(_, key)| *key == KeyName::Mouse(button))
        .map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_values() {
        assert_eq!(InputFlags::BUTTON_UP.bits(), 0x0001);
        assert_eq!(InputFlags::BUTTON_DOWN.bits(), 0x0002);
        assert_eq!(InputFlags::INPUT_SEQ_ORED.bits(), 0x0200);
        assert_eq!(InputFlags::TRANSITIONS.bits(), 0x0003);
        assert_eq!(InputFlags::CONTROL.bits(), 0x000C);
    }

    #[test]
    fn test_flag_from_name_ignores_case() {
        assert_eq!(flag_from_name("ButtonDown"), Some(InputFlags::BUTTON_DOWN));
        assert_eq!(flag_from_name("buttonshift"), Some(InputFlags::BUTTON_SHIFT));
        assert_eq!(flag_from_name("Jump"), None);
    }

    #[test]
    fn test_flag_names_differ_from_constant_names() {
        assert_eq!(flag_from_name("BUTTON_DOWN"), None);
        assert_eq!(InputFlags::from_name("BUTTON_DOWN"), Some(InputFlags::BUTTON_DOWN));
        assert_eq!(InputFlags::from_name("ButtonDown"), None);
    }

    #[test]
    fn test_flags_display() {
        let flags = InputFlags::BUTTON_DOWN | InputFlags::BUTTON_SHIFT;
        assert_eq!(flags.to_string(), "ButtonShift|ButtonDown");
        assert_eq!(InputFlags::empty().to_string(), "");
    }

    #[test]
    fn test_key_from_name() {
        assert_eq!(key_from_name("esc"), Some(KeyName::Key(KEY_ESC)));
        assert_eq!(key_from_name("MouseRight"), Some(KeyName::Mouse(MOUSE_RIGHT)));
        assert_eq!(key_from_name("F12"), Some(KeyName::Key(123)));
        assert_eq!(key_from_name("Hyper"), None);
    }

    #[test]
    fn test_reverse_names() {
        assert_eq!(key_name(KEY_RETURN), Some("Return"));
        assert_eq!(key_name(b'a'), None);
        assert_eq!(mouse_button_name(MOUSE_LEFT), Some("MouseLeft"));
        assert_eq!(mouse_button_name(MOUSE_6), Some("MouseWheel"));
    }

    #[test]
    fn test_no_duplicate_names() {
        let mut seen = std::collections::HashSet::new();
        for (name, _) in KEY_NAMES {
            assert!(
                seen.insert(name.to_ascii_lowercase()),
                "Duplicate key name {name}"
            );
        }
    }
}
