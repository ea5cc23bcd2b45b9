// Input arbitration system
//
// Turns raw key and mouse records, produced on any thread, into named actions
// fired on the logic thread.
//
// ## Architecture
//
// - `flags`: Input flag bits, key codes and their symbolic names
// - `record`: Key and mouse records and the template matching rules
// - `buffer`: Timestamp ordered queue shared by producers and the tick
// - `context`: Stack of named contexts scoping bindings
// - `action`: Triggers, action bindings and the action table
// - `config`: Binding entries, key translation and table construction
// - `manager`: Input device coordinating everything
//
// ## Usage Example
//
// ```rust
// use input_arbiter::engine::input::{BindingEntry, InputDevice, InputFlags};
//
// let mut device = InputDevice::new(&[
//     BindingEntry::new("Quit App", "", "ESC", "ButtonDown", "ESC"),
// ]);
// device.register_simple_action_callback("Quit App", || println!("bye"));
//
// // On any thread
// let sender = device.sender();
// sender.key_record(InputFlags::BUTTON_DOWN, 27);
//
// // Once per logic step
// device.tick(&clock, &policy, &mut channel);
// ```

pub mod action;
pub mod buffer;
pub mod config;
pub mod context;
pub mod flags;
pub mod manager;
pub mod record;

// Re-export commonly used types
pub use action::{ActionBinding, ActionEvent, ActionTable, SequenceMode, Trigger};
pub use buffer::{PendingQueue, Queued};
pub use config::{action_constants, BindingEntry, BindingValue, KeyMap, SequenceStep};
pub use context::{ContextScope, ContextStack, GLOBAL_CONTEXT};
pub use flags::InputFlags;
pub use manager::{InputDevice, InputSender};
pub use record::{Location, MouseButtons, Record, RecordKind, ANY_LOCATION};

/// Binding configuration errors
///
/// Each one rejects a single entry; the rest of the table still loads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    #[error("Binding entry has no action name")]
    MissingAction,

    #[error("Action '{0}' has no key value")]
    MissingValue(String),

    #[error("Action '{action}' uses unknown flag '{flag}'")]
    UnknownFlag { action: String, flag: String },

    #[error("Action '{action}' uses unknown key '{key}'")]
    UnknownKey { action: String, key: String },

    #[error("Action '{action}' key code {code} is out of range")]
    KeyOutOfRange { action: String, code: i64 },

    #[error("Action '{0}' is already registered")]
    DuplicateAction(String),
}
