// Action bindings, their triggers and the action table

use super::context::ContextStack;
use super::flags::InputFlags;
use super::record::Record;
use crate::core::time::Microseconds;
use std::collections::BTreeMap;
use std::fmt;

/// Default time allowed to complete a multi-record sequence (1 second)
pub const SEQUENCE_TIMEOUT: Microseconds = 1_000_000;

/// Arguments passed to action callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionEvent<'a> {
    /// Name of the fired action
    pub action: &'a str,

    /// Timestamp of the record that fired it, or the trigger time
    pub timestamp: Microseconds,

    /// Pointer x, 0 for keyboard records
    pub mouse_x: i32,

    /// Pointer y, 0 for keyboard records
    pub mouse_y: i32,

    /// Flags of the firing record
    pub flags: InputFlags,
}

/// Callback invoked when an action fires
///
/// Callbacks are `Send` so a device can be built on one thread and handed to
/// the logic thread.
pub type ActionCallback = Box<dyn FnMut(&ActionEvent<'_>) + Send>;

/// How the records of a multi-record trigger combine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceMode {
    /// Every step must match, in order, within the timeout
    Ordered,
    /// Any single step firing is enough
    Any,
}

#[derive(Debug, Clone)]
struct Step {
    template: Record,
    hit: bool,
}

/// Template side of a binding: one record, or a sequence of records
#[derive(Debug, Clone)]
pub struct Trigger {
    steps: Vec<Step>,
    mode: SequenceMode,
    timeout: Microseconds,
    started_at: Microseconds,
}

impl Trigger {
    /// Trigger matching a single template record
    pub fn single(template: Record) -> Self {
        Self::sequence(template, [])
    }

    /// Trigger made of `first` followed by `rest`
    ///
    /// The sequence is an "any of" set when `first` carries `INPUT_SEQ_ORED`.
    pub fn sequence(first: Record, rest: impl IntoIterator<Item = Record>) -> Self {
        let mode = if first.flags.contains(InputFlags::INPUT_SEQ_ORED) {
            SequenceMode::Any
        } else {
            SequenceMode::Ordered
        };

        let steps = std::iter::once(first)
            .chain(rest)
            .map(|template| Step {
                template,
                hit: false,
            })
            .collect();

        Self {
            steps,
            mode,
            timeout: SEQUENCE_TIMEOUT,
            started_at: 0,
        }
    }

    /// Override the time allowed to complete an ordered sequence
    pub fn with_timeout(mut self, timeout: Microseconds) -> Self {
        self.timeout = timeout;
        self
    }

    /// First template record
    pub fn template(&self) -> &Record {
        &self.steps[0].template
    }

    /// All template records in order
    pub fn templates(&self) -> impl Iterator<Item = &Record> {
        self.steps.iter().map(|step| &step.template)
    }

    /// Number of template records
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false, a trigger has at least one template
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Check if more than one record is involved
    pub fn is_sequence(&self) -> bool {
        self.steps.len() > 1
    }

    /// Combination mode of the steps
    pub fn mode(&self) -> SequenceMode {
        self.mode
    }

    /// Number of ordered steps already hit
    pub fn progress(&self) -> usize {
        self.steps.iter().take_while(|step| step.hit).count()
    }

    /// Forget partial sequence progress
    pub fn reset(&mut self) {
        for step in &mut self.steps {
            step.hit = false;
        }
    }

    /// Feed an incoming record, returns true when the trigger fires
    pub fn matches(&mut self, record: &Record) -> bool {
        if !self.is_sequence() {
            return self.steps[0].template.matches(record, true);
        }

        match self.mode {
            SequenceMode::Any => self
                .steps
                .iter_mut()
                .any(|step| step.template.matches(record, true)),
            SequenceMode::Ordered => self.advance(record),
        }
    }

    fn advance(&mut self, record: &Record) -> bool {
        if self.progress() == 0 {
            self.started_at = record.timestamp;
        } else if record.timestamp >= self.started_at + self.timeout {
            // Too slow, this record may start a fresh attempt
            self.reset();
            self.started_at = record.timestamp;
        }

        let index = self.progress();
        let step = &mut self.steps[index];
        if !step.template.matches(record, true) {
            return false;
        }

        step.hit = true;
        if index + 1 == self.steps.len() {
            self.reset();
            return true;
        }
        false
    }
}

/// A named action: trigger, context requirement and registered callbacks
pub struct ActionBinding {
    name: String,
    trigger: Trigger,
    context_name: String,
    display_text: String,
    last_fired: Option<Microseconds>,
    last_matched: Option<Record>,
    callbacks: Vec<ActionCallback>,
}

impl ActionBinding {
    /// Create a binding without callbacks
    pub fn new(
        name: impl Into<String>,
        trigger: Trigger,
        context_name: impl Into<String>,
        display_text: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            trigger,
            context_name: context_name.into(),
            display_text: display_text.into(),
            last_fired: None,
            last_matched: None,
            callbacks: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    /// Required context, empty for global bindings
    pub fn context_name(&self) -> &str {
        &self.context_name
    }

    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    /// Timestamp of the last record that fired this binding
    pub fn last_fired(&self) -> Option<Microseconds> {
        self.last_fired
    }

    /// Copy of the last record that fired this binding
    pub fn last_matched(&self) -> Option<&Record> {
        self.last_matched.as_ref()
    }

    /// Number of registered callbacks
    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    /// Append a callback, callbacks run in registration order
    pub fn register(&mut self, callback: impl FnMut(&ActionEvent<'_>) + Send + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    pub(crate) fn take_callbacks(&mut self) -> Vec<ActionCallback> {
        std::mem::take(&mut self.callbacks)
    }

    /// Match `record`; on a hit update the fired state and run the callbacks
    pub(crate) fn try_fire(&mut self, record: &Record) -> bool {
        if !self.trigger.matches(record) {
            return false;
        }

        self.last_fired = Some(record.timestamp);
        self.last_matched = Some(*record);

        let (mouse_x, mouse_y) = record.pointer();
        self.invoke(record.timestamp, mouse_x, mouse_y, record.flags);
        true
    }

    /// Run every callback with the given arguments
    pub(crate) fn invoke(
        &mut self,
        timestamp: Microseconds,
        mouse_x: i32,
        mouse_y: i32,
        flags: InputFlags,
    ) {
        let event = ActionEvent {
            action: &self.name,
            timestamp,
            mouse_x,
            mouse_y,
            flags,
        };
        for callback in &mut self.callbacks {
            callback(&event);
        }
    }
}

impl fmt::Debug for ActionBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionBinding")
            .field("name", &self.name)
            .field("trigger", &self.trigger)
            .field("context_name", &self.context_name)
            .field("display_text", &self.display_text)
            .field("last_fired", &self.last_fired)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

/// Action bindings keyed by unique name, iterated in name order
#[derive(Debug, Default)]
pub struct ActionTable {
    bindings: BTreeMap<String, ActionBinding>,
}

impl ActionTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding; returns false and keeps the existing one on a name clash
    pub fn insert(&mut self, binding: ActionBinding) -> bool {
        if self.bindings.contains_key(binding.name()) {
            return false;
        }
        self.bindings.insert(binding.name.clone(), binding);
        true
    }

    pub fn get(&self, name: &str) -> Option<&ActionBinding> {
        self.bindings.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ActionBinding> {
        self.bindings.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterate over bindings in name order
    pub fn iter(&self) -> impl Iterator<Item = &ActionBinding> {
        self.bindings.values()
    }

    /// Binding names in name order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// Offer `record` to every binding admitted by `contexts`
    ///
    /// Returns the number of bindings that fired.
    pub fn dispatch(&mut self, record: &Record, contexts: &ContextStack) -> u32 {
        let mut fired = 0;
        for binding in self.bindings.values_mut() {
            if !contexts.admits(binding.context_name()) {
                continue;
            }
            if binding.try_fire(record) {
                log::debug!("Action '{}' fired by {}", binding.name(), record);
                fired += 1;
            }
        }
        fired
    }

    /// Move callbacks of bindings that also exist in `self` over from `previous`
    pub(crate) fn adopt_callbacks(&mut self, previous: &mut ActionTable) {
        for (name, binding) in self.bindings.iter_mut() {
            if let Some(old) = previous.bindings.get_mut(name) {
                binding.callbacks = old.take_callbacks();
            }
        }
    }
}
