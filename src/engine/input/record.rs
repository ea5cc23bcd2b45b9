// Captured input records and the template matching predicate

use super::flags::{self, InputFlags, MAX_MOUSE_BUTTONS};
use crate::core::time::Microseconds;
use glam::IVec2;
use std::fmt;

/// Absolute mouse position
pub type Location = IVec2;

/// Template position meaning "position is not significant for matching"
pub const ANY_LOCATION: Location = IVec2::new(-1, -1);

/// Set of pressed mouse buttons, indexed by button number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MouseButtons(u32);

impl MouseButtons {
    /// No buttons pressed
    pub fn none() -> Self {
        Self(0)
    }

    /// Set with a single button pressed
    pub fn single(button: u8) -> Self {
        Self::none().with(button)
    }

    /// Return a copy with `button` pressed
    pub fn with(mut self, button: u8) -> Self {
        self.set(button, true);
        self
    }

    /// Press or release `button`; indices past the last button are ignored
    pub fn set(&mut self, button: u8, pressed: bool) {
        if button >= MAX_MOUSE_BUTTONS {
            return;
        }
        if pressed {
            self.0 |= 1 << button;
        } else {
            self.0 &= !(1 << button);
        }
    }

    /// Check if `button` is pressed
    pub fn contains(&self, button: u8) -> bool {
        button < MAX_MOUSE_BUTTONS && self.0 & (1 << button) != 0
    }

    /// Check if no button is pressed
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Raw bit pattern
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Iterate over pressed button indices in ascending order
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..MAX_MOUSE_BUTTONS).filter(|button| self.contains(*button))
    }
}

/// Numeric record type discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RecordType {
    Key = 2,
    Mouse = 3,
}

/// Keyboard payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    /// Raw key code (ASCII for printable keys)
    pub value: u8,

    /// Latched physical state, only meaningful on binding templates
    pub is_down: bool,
}

/// Mouse payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mouse {
    /// Absolute position, `ANY_LOCATION` on position-insensitive templates
    pub position: Location,

    /// Pressed buttons
    pub buttons: MouseButtons,

    /// Wheel movement
    pub wheel_delta: i32,
}

/// Shape-specific part of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Key(Key),
    Mouse(Mouse),
}

/// One captured input event, or a binding template
///
/// Templates are matched against incoming records with [`Record::matches`],
/// the template always being the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    /// Modifier and transition bits
    pub flags: InputFlags,

    /// Capture time, same domain as the logic clock
    pub timestamp: Microseconds,

    /// Key or mouse payload
    pub kind: RecordKind,
}

impl Record {
    /// Create a key record
    pub fn key(timestamp: Microseconds, flags: InputFlags, value: u8) -> Self {
        Self {
            flags,
            timestamp,
            kind: RecordKind::Key(Key {
                value,
                is_down: false,
            }),
        }
    }

    /// Create a mouse record
    pub fn mouse(
        timestamp: Microseconds,
        flags: InputFlags,
        buttons: MouseButtons,
        wheel_delta: i32,
        position: Location,
    ) -> Self {
        Self {
            flags,
            timestamp,
            kind: RecordKind::Mouse(Mouse {
                position,
                buttons,
                wheel_delta,
            }),
        }
    }

    /// Numeric type discriminator
    pub fn record_type(&self) -> RecordType {
        match self.kind {
            RecordKind::Key(_) => RecordType::Key,
            RecordKind::Mouse(_) => RecordType::Mouse,
        }
    }

    /// Returns true if every bit set in `target` is also set in `source`
    ///
    /// `0b0011` as source accepts `0b0001`, the reverse does not.
    pub fn compare_all_bits(source: InputFlags, target: InputFlags) -> bool {
        source.contains(target)
    }

    /// Flag comparison shared by all record shapes
    ///
    /// A target without flags is accepted unconditionally. Otherwise
    /// `and_compare` asks for the target's flags to be a subset of ours,
    /// and exact equality is required when it is false.
    pub fn flags_match(&self, target: &Record, and_compare: bool) -> bool {
        if target.flags.is_empty() {
            return true;
        }

        if and_compare {
            Self::compare_all_bits(self.flags, target.flags)
        } else {
            self.flags == target.flags
        }
    }

    /// Returns true if this template is satisfied by the incoming `target`
    ///
    /// Key templates latch their down state here: a template carrying both
    /// transition bits flips `is_down` on when a press arrives and reports
    /// the next release as a match even if the release carries different
    /// modifiers.
    pub fn matches(&mut self, target: &Record, and_compare: bool) -> bool {
        if !self.flags_match(target, and_compare) {
            return false;
        }

        let template_flags = self.flags;
        match (&mut self.kind, &target.kind) {
            (RecordKind::Key(key), RecordKind::Key(incoming)) => {
                if key.value != incoming.value {
                    return false;
                }

                let latches = Self::compare_all_bits(template_flags, InputFlags::TRANSITIONS);
                let released = target.flags.contains(InputFlags::BUTTON_UP);
                let pressed = target.flags.contains(InputFlags::BUTTON_DOWN);

                if key.is_down && released && latches {
                    key.is_down = false;
                    return true;
                }

                let control = InputFlags::CONTROL;
                if template_flags & control != target.flags & control {
                    return false;
                }

                if !key.is_down && pressed && latches {
                    key.is_down = true;
                }
                true
            }
            (RecordKind::Mouse(mouse), RecordKind::Mouse(incoming)) => {
                let position_ok =
                    mouse.position == incoming.position || mouse.position == ANY_LOCATION;
                position_ok && mouse.buttons == incoming.buttons
            }
            // Shapes never match each other
            _ => false,
        }
    }

    /// Pointer coordinates reported to callbacks, (0, 0) for keys
    pub fn pointer(&self) -> (i32, i32) {
        match &self.kind {
            RecordKind::Key(_) => (0, 0),
            RecordKind::Mouse(mouse) => (mouse.position.x, mouse.position.y),
        }
    }

    /// Latched down state of a key template, false for mouse records
    pub fn is_down(&self) -> bool {
        matches!(&self.kind, RecordKind::Key(key) if key.is_down)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RecordKind::Key(key) => match flags::key_name(key.value) {
                Some(name) => write!(f, "Key: {name}, ")?,
                None => write!(f, "Key: {}, ", key.value as char)?,
            },
            RecordKind::Mouse(mouse) => {
                let buttons: Vec<&str> = mouse
                    .buttons
                    .iter()
                    .filter_map(flags::mouse_button_name)
                    .collect();
                write!(
                    f,
                    "Buttons: {}, Mouse: x:{}, y:{}, wheel: {}, ",
                    buttons.join("|"),
                    mouse.position.x,
                    mouse.position.y,
                    mouse.wheel_delta
                )?;
            }
        }
        write!(f, "Flags: {}, Time: {}", self.flags, self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input::flags::{MOUSE_LEFT, MOUSE_RIGHT};

    fn down() -> InputFlags {
        InputFlags::BUTTON_DOWN
    }

    fn mouse_template(flags: InputFlags, buttons: MouseButtons) -> Record {
        Record::mouse(0, flags, buttons, 0, ANY_LOCATION)
    }

    #[test]
    fn test_record_type() {
        assert_eq!(Record::key(0, down(), b'A').record_type(), RecordType::Key);
        assert_eq!(RecordType::Key as u8, 2);
        assert_eq!(RecordType::Mouse as u8, 3);
    }

    #[test]
    fn test_compare_all_bits() {
        let source = InputFlags::BUTTON_UP | InputFlags::BUTTON_DOWN;
        assert!(Record::compare_all_bits(source, InputFlags::BUTTON_UP));
        assert!(!Record::compare_all_bits(InputFlags::BUTTON_UP, source));
    }

    #[test]
    fn test_subset_flag_matching() {
        let buttons = MouseButtons::single(MOUSE_LEFT);
        let mut template = mouse_template(
            InputFlags::BUTTON_DOWN | InputFlags::BUTTON_SHIFT | InputFlags::BUTTON_CTRL,
            buttons,
        );
        let incoming = Record::mouse(
            10,
            InputFlags::BUTTON_DOWN | InputFlags::BUTTON_SHIFT,
            buttons,
            0,
            Location::new(4, 4),
        );

        assert!(template.matches(&incoming, true));
        assert!(!template.matches(&incoming, false));
    }

    #[test]
    fn test_superset_incoming_is_rejected() {
        let buttons = MouseButtons::single(MOUSE_LEFT);
        let mut template =
            mouse_template(InputFlags::BUTTON_DOWN | InputFlags::BUTTON_SHIFT, buttons);
        let incoming = Record::mouse(
            10,
            InputFlags::BUTTON_DOWN | InputFlags::BUTTON_SHIFT | InputFlags::BUTTON_CTRL,
            buttons,
            0,
            ANY_LOCATION,
        );

        assert!(!template.matches(&incoming, true));
        assert!(!template.matches(&incoming, false));
    }

    #[test]
    fn test_exact_flags_with_and_compare_off() {
        let mut template = Record::key(0, down(), b'A');
        assert!(template.matches(&Record::key(5, down(), b'A'), false));
    }

    #[test]
    fn test_flagless_incoming_matches_any_template() {
        let mut template = Record::key(0, down() | InputFlags::BUTTON_ALT, b'Q');
        let incoming = Record::key(3, InputFlags::empty(), b'Q');
        assert!(template.matches(&incoming, true));
        assert!(template.matches(&incoming, false));
    }

    #[test]
    fn test_key_value_must_match() {
        let mut template = Record::key(0, down(), b'1');
        assert!(template.matches(&Record::key(1, down(), b'1'), true));
        assert!(!template.matches(&Record::key(1, down(), b'2'), true));
    }

    #[test]
    fn test_key_control_modifiers_must_agree() {
        let mut template = Record::key(0, down() | InputFlags::BUTTON_SHIFT, b'S');
        let shifted = Record::key(1, down() | InputFlags::BUTTON_SHIFT, b'S');
        assert!(template.matches(&shifted, true));
        // Down alone is a subset but shift does not agree
        assert!(!template.matches(&Record::key(2, down(), b'S'), true));
    }

    #[test]
    fn test_key_latch_round_trip() {
        let mut template = Record::key(0, InputFlags::TRANSITIONS, b'A');
        assert!(!template.is_down());

        assert!(template.matches(&Record::key(1, InputFlags::BUTTON_DOWN, b'A'), true));
        assert!(template.is_down());

        assert!(template.matches(&Record::key(2, InputFlags::BUTTON_UP, b'A'), true));
        assert!(!template.is_down());
    }

    #[test]
    fn test_key_release_ignores_modifiers_while_latched() {
        let mut template =
            Record::key(0, InputFlags::TRANSITIONS | InputFlags::BUTTON_SHIFT, b'A');
        let press = Record::key(1, InputFlags::BUTTON_DOWN | InputFlags::BUTTON_SHIFT, b'A');
        assert!(template.matches(&press, true));
        assert!(template.is_down());

        // Shift was let go before the key, release still owed
        let release = Record::key(2, InputFlags::BUTTON_UP, b'A');
        assert!(template.matches(&release, true));
        assert!(!template.is_down());

        // Nothing left to release, modifiers disagree again
        assert!(!template.matches(&release, true));
    }

    #[test]
    fn test_down_only_template_never_latches() {
        let mut template = Record::key(0, down(), b'A');
        assert!(template.matches(&Record::key(1, down(), b'A'), true));
        assert!(!template.is_down());
        assert!(!template.matches(&Record::key(2, InputFlags::BUTTON_UP, b'A'), true));
    }

    #[test]
    fn test_mouse_buttons_exact_match() {
        let left = MouseButtons::single(MOUSE_LEFT);
        let both = left.with(MOUSE_RIGHT);

        let mut left_template = mouse_template(down(), left);
        let mut chord_template = mouse_template(down(), both);

        let left_click = Record::mouse(1, down(), left, 0, ANY_LOCATION);
        let chord_click = Record::mouse(1, down(), both, 0, ANY_LOCATION);
        let placed_click = Record::mouse(1, down(), left, 0, Location::new(7, 9));

        assert!(!chord_template.matches(&left_click, true));
        assert!(!left_template.matches(&chord_click, true));
        assert!(left_template.matches(&placed_click, true));
    }

    #[test]
    fn test_mouse_position_sensitive_template() {
        let left = MouseButtons::single(MOUSE_LEFT);
        let mut template = Record::mouse(0, down(), left, 0, Location::new(10, 20));

        let on_target = Record::mouse(1, down(), left, 0, Location::new(10, 20));
        let off_target = Record::mouse(1, down(), left, 0, Location::new(11, 20));

        assert!(template.matches(&on_target, true));
        assert!(!template.matches(&off_target, true));
    }

    #[test]
    fn test_shapes_never_match() {
        let mut key_template = Record::key(0, down(), MOUSE_LEFT);
        let click = Record::mouse(1, down(), MouseButtons::single(MOUSE_LEFT), 0, ANY_LOCATION);
        assert!(!key_template.matches(&click, true));

        let mut mouse_template = mouse_template(down(), MouseButtons::single(MOUSE_LEFT));
        assert!(!mouse_template.matches(&Record::key(1, down(), MOUSE_LEFT), true));
    }

    #[test]
    fn test_mouse_buttons_set() {
        let mut buttons = MouseButtons::none();
        assert!(buttons.is_empty());

        buttons.set(MOUSE_RIGHT, true);
        buttons.set(40, true);
        assert!(buttons.contains(MOUSE_RIGHT));
        assert_eq!(buttons.bits(), 1 << MOUSE_RIGHT);

        buttons.set(MOUSE_RIGHT, false);
        assert!(buttons.is_empty());
    }

    #[test]
    fn test_pointer() {
        let click = Record::mouse(
            1,
            down(),
            MouseButtons::single(MOUSE_LEFT),
            0,
            Location::new(3, 4),
        );
        assert_eq!(click.pointer(), (3, 4));
        assert_eq!(Record::key(1, down(), b'A').pointer(), (0, 0));
    }

    #[test]
    fn test_display() {
        let key = Record::key(42, down() | InputFlags::BUTTON_SHIFT, b'A');
        assert_eq!(key.to_string(), "Key: A, Flags: ButtonShift|ButtonDown, Time: 42");

        let esc = Record::key(1, down(), flags::KEY_ESC);
        assert!(esc.to_string().starts_with("Key: ESC,"));

        let click = Record::mouse(
            7,
            down(),
            MouseButtons::single(MOUSE_LEFT).with(MOUSE_RIGHT),
            -1,
            Location::new(5, 6),
        );
        assert_eq!(
            click.to_string(),
            "Buttons: MouseLeft|MouseRight, Mouse: x:5, y:6, wheel: -1, Flags: ButtonDown, Time: 7"
        );
    }
}
