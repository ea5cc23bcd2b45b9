// Binding configuration and key translation

use super::action::{ActionBinding, ActionTable, Trigger};
use super::flags::{self, InputFlags, KeyName, FLAG_NAMES, KEY_NAMES};
use super::record::{MouseButtons, Record, ANY_LOCATION};
use super::BindingError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Write;

/// Key or button named in a binding, as authored
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BindingValue {
    /// Raw key code
    Code(i64),
    /// Symbolic name (`ESC`, `MouseLeft`) or a single printable character
    Name(String),
}

impl From<&str> for BindingValue {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<i64> for BindingValue {
    fn from(code: i64) -> Self {
        Self::Code(code)
    }
}

/// Additional record of a multi-record binding
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SequenceStep {
    #[serde(default)]
    pub flags: String,
    pub value: Option<BindingValue>,
}

/// One pre-parsed binding entry
///
/// Field names follow the key-binding files, e.g.
/// `{"Action": "Quit App", "ContextName": "", "DisplayName": "ESC",
/// "Flags": "ButtonDown", "Value": "ESC"}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BindingEntry {
    /// Unique action name
    #[serde(default)]
    pub action: String,

    /// Context the binding is scoped to, empty for global
    #[serde(default)]
    pub context_name: String,

    /// Human readable key description
    #[serde(default)]
    pub display_name: String,

    /// `|`-separated flag names
    #[serde(default)]
    pub flags: String,

    /// Key code or name
    pub value: Option<BindingValue>,

    /// Further records that must follow (or, with `InputSeqOred`, may replace) the first
    #[serde(default)]
    pub sequence: Vec<SequenceStep>,
}

impl BindingEntry {
    /// Entry for a single-record binding
    pub fn new(
        action: impl Into<String>,
        context_name: impl Into<String>,
        display_name: impl Into<String>,
        flags: impl Into<String>,
        value: impl Into<BindingValue>,
    ) -> Self {
        Self {
            action: action.into(),
            context_name: context_name.into(),
            display_name: display_name.into(),
            flags: flags.into(),
            value: Some(value.into()),
            sequence: Vec::new(),
        }
    }

    /// Append a sequence step
    pub fn then(mut self, flags: impl Into<String>, value: impl Into<BindingValue>) -> Self {
        self.sequence.push(SequenceStep {
            flags: flags.into(),
            value: Some(value.into()),
        });
        self
    }
}

/// Parse a `|`-separated list of flag names; an empty list means no flags
pub fn parse_flags(action: &str, text: &str) -> Result<InputFlags, BindingError> {
    text.split('|')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .try_fold(InputFlags::empty(), |parsed, token| {
            flags::flag_from_name(token)
                .map(|flag| parsed | flag)
                .ok_or_else(|| BindingError::UnknownFlag {
                    action: action.to_string(),
                    flag: token.to_string(),
                })
        })
}

/// Resolve a binding value to a key code or a mouse button
pub fn parse_value(action: &str, value: &BindingValue) -> Result<KeyName, BindingError> {
    match value {
        BindingValue::Code(code) => u8::try_from(*code)
            .map(KeyName::Key)
            .map_err(|_| BindingError::KeyOutOfRange {
                action: action.to_string(),
                code: *code,
            }),
        BindingValue::Name(name) => {
            if let Some(key) = flags::key_from_name(name) {
                return Ok(key);
            }

            // Any other printable ASCII character stands for itself
            match name.as_bytes() {
                [byte] if (32..=127).contains(byte) => Ok(KeyName::Key(*byte)),
                _ => Err(BindingError::UnknownKey {
                    action: action.to_string(),
                    key: name.clone(),
                }),
            }
        }
    }
}

/// Build the template record for one flags/value pair
fn template_record(
    action: &str,
    flags_text: &str,
    value: Option<&BindingValue>,
) -> Result<Record, BindingError> {
    let flags = parse_flags(action, flags_text)?;
    let value = value.ok_or_else(|| BindingError::MissingValue(action.to_string()))?;

    Ok(match parse_value(action, value)? {
        KeyName::Key(code) => Record::key(0, flags, code),
        KeyName::Mouse(button) => {
            Record::mouse(0, flags, MouseButtons::single(button), 0, ANY_LOCATION)
        }
    })
}

/// Build one binding from its configuration entry
pub fn build_binding(entry: &BindingEntry) -> Result<ActionBinding, BindingError> {
    if entry.action.trim().is_empty() {
        return Err(BindingError::MissingAction);
    }
    let action = entry.action.as_str();

    let first = template_record(action, &entry.flags, entry.value.as_ref())?;
    let rest = entry
        .sequence
        .iter()
        .map(|step| template_record(action, &step.flags, step.value.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ActionBinding::new(
        action,
        Trigger::sequence(first, rest),
        entry.context_name.as_str(),
        entry.display_name.as_str(),
    ))
}

/// Build an action table, skipping entries that fail to parse
///
/// Returns the table together with one error per rejected entry.
pub fn build_table(entries: &[BindingEntry]) -> (ActionTable, Vec<BindingError>) {
    let mut table = ActionTable::new();
    let mut rejected = Vec::new();

    for entry in entries {
        match build_binding(entry) {
            Ok(binding) => {
                let description = binding.trigger().template().to_string();
                if table.insert(binding) {
                    log::info!("Register '{}' action: {}", entry.action, description);
                } else {
                    log::error!("Action '{}' is already registered, skipping", entry.action);
                    rejected.push(BindingError::DuplicateAction(entry.action.clone()));
                }
            }
            Err(err) => {
                log::error!("Skipping binding entry: {}", err);
                rejected.push(err);
            }
        }
    }

    (table, rejected)
}

/// Translation of OS key codes into engine key codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    map: HashMap<i32, i32>,
}

impl KeyMap {
    /// Create an empty key map (every code passes through)
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Add or replace a translation; `-1` keeps the OS value
    pub fn insert(&mut self, os_code: i32, engine_code: i32) {
        self.map.insert(os_code, engine_code);
    }

    /// Translate an OS key code
    pub fn map_key(&self, value: i32) -> i32 {
        match self.map.get(&value) {
            Some(&mapped) if mapped != -1 => mapped,
            _ => value,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for KeyMap {
    /// OEM punctuation keys mapped to their ASCII characters
    fn default() -> Self {
        let mut key_map = Self::empty();
        for (os_code, engine_code) in [
            (192, 96),
            (187, 61),
            (219, 91),
            (220, 92),
            (221, 93),
            (186, 59),
            (222, 39),
            (188, 44),
            (190, 46),
            (191, 47),
        ] {
            key_map.insert(os_code, engine_code);
        }
        key_map
    }
}

/// Reference text listing the names usable when authoring bindings
pub fn action_constants() -> String {
    let mut text = String::new();

    text.push_str("; These values are used in key binding files to author actions.\n");
    text.push_str("; User friendly names for keys. ");
    text.push_str("Use ASCII values as int or char for the rest (\"A\" or 65).\n");
    text.push_str("[KeysMap]\n");
    for (name, _) in KEY_NAMES {
        let _ = writeln!(text, "{name}");
    }

    text.push_str("\n; User friendly names for key flags. ");
    text.push_str("Combine them with |, (ButtonDown|ButtonShift).\n");
    text.push_str("[FlagsMap]\n");
    for (name, _) in FLAG_NAMES {
        let _ = writeln!(text, "{name}");
    }

    text.push_str("[Example]\n");
    text.push_str("\"Quit App\":\n");
    text.push_str("{\n");
    text.push_str("    \"Action\": \"Quit App\",\n");
    text.push_str("    \"ContextName\": \"\",\n");
    text.push_str("    \"DisplayName\": \"ESC\",\n");
    text.push_str("    \"Flags\": \"ButtonDown\",\n");
    text.push_str("    \"Value\": \"ESC\"\n");
    text.push_str("}\n");

    text
}
