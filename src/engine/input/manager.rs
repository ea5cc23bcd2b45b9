// Input device - Owns the action table and arbitrates queued input

use super::action::{ActionBinding, ActionEvent, ActionTable};
use super::buffer::{PendingQueue, Queued};
use super::config::{self, BindingEntry, KeyMap};
use super::context::{ContextOwner, ContextScope, ContextStack};
use super::flags::InputFlags;
use super::record::{Location, MouseButtons, Record};
use super::BindingError;
use crate::core::time::{self, Microseconds};
use crate::engine::clock::LogicClock;
use crate::engine::metrics::{Channel, PerformancePolicy};
use std::sync::Arc;
use std::time::Instant;

/// Records taken out of the queue and offered to the action table
pub const COUNTER_PROCESSED: &str = "Input.Processed";

/// Bindings fired by processed records
pub const COUNTER_MATCHED: &str = "Input.Matched";

/// Records put back for the next tick after a soft limit was hit
pub const COUNTER_DEFERRED: &str = "Input.Deferred";

/// Records discarded after a soft limit was hit
pub const COUNTER_DROPPED: &str = "Input.Dropped";

/// Span label covering one input tick
pub const SPAN_TICK: &str = "Input.Tick";

/// Cloneable handle used by producer threads to queue input records
#[derive(Debug, Clone, Default)]
pub struct InputSender {
    queue: Arc<PendingQueue>,
}

impl InputSender {
    /// Queue a key record stamped with the current real time
    pub fn key_record(&self, flags: InputFlags, value: u8) {
        self.key_record_at(flags, value, time::real_time());
    }

    /// Queue a key record with an explicit timestamp
    pub fn key_record_at(&self, flags: InputFlags, value: u8, timestamp: Microseconds) {
        self.send(Record::key(timestamp, flags, value));
    }

    /// Queue a mouse record stamped with the current real time
    pub fn mouse_record(
        &self,
        flags: InputFlags,
        buttons: MouseButtons,
        wheel_delta: i32,
        position: Location,
    ) {
        self.mouse_record_at(flags, buttons, wheel_delta, position, time::real_time());
    }

    /// Queue a mouse record with an explicit timestamp
    pub fn mouse_record_at(
        &self,
        flags: InputFlags,
        buttons: MouseButtons,
        wheel_delta: i32,
        position: Location,
        timestamp: Microseconds,
    ) {
        self.send(Record::mouse(timestamp, flags, buttons, wheel_delta, position));
    }

    /// Number of records waiting for a tick
    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    fn send(&self, record: Record) {
        log::debug!("{}", record);
        self.queue.push(record);
    }
}

/// Input device owned by the logic thread
///
/// Producers on any thread queue records through an [`InputSender`]. Once per
/// logic step the owner calls [`tick`](Self::tick), which hands every ready
/// record to the bindings admitted by the context stack.
#[derive(Debug)]
pub struct InputDevice {
    /// Bindings by action name
    actions: ActionTable,

    /// Active contexts, top is current
    contexts: ContextStack,

    /// Producer side of the pending queue
    sender: InputSender,

    /// OS to engine key translation
    key_map: KeyMap,
}

impl InputDevice {
    /// Create a device from pre-parsed binding entries
    ///
    /// Rejected entries are logged and skipped.
    pub fn new(entries: &[BindingEntry]) -> Self {
        let mut device = Self {
            actions: ActionTable::new(),
            contexts: ContextStack::new(),
            sender: InputSender::default(),
            key_map: KeyMap::default(),
        };
        device.reload(entries);
        device
    }

    /// Rebuild the action table from `entries`
    ///
    /// Callbacks registered on actions that survive the reload are kept.
    /// Returns the entries that were rejected.
    pub fn reload(&mut self, entries: &[BindingEntry]) -> Vec<BindingError> {
        let (mut actions, rejected) = config::build_table(entries);
        actions.adopt_callbacks(&mut self.actions);
        self.actions = actions;

        log::info!(
            "Loaded {} input actions, {} entries rejected",
            self.actions.len(),
            rejected.len()
        );
        rejected
    }

    /// Replace the OS key translation table
    pub fn set_key_map(&mut self, key_map: KeyMap) {
        self.key_map = key_map;
    }

    /// Handle for producer threads
    pub fn sender(&self) -> InputSender {
        self.sender.clone()
    }

    /// Queue a key record stamped with the current real time
    pub fn key_record(&self, flags: InputFlags, value: u8) {
        self.sender.key_record(flags, value);
    }

    /// Queue a key record with an explicit timestamp
    pub fn key_record_at(&self, flags: InputFlags, value: u8, timestamp: Microseconds) {
        self.sender.key_record_at(flags, value, timestamp);
    }

    /// Queue a mouse record stamped with the current real time
    pub fn mouse_record(
        &self,
        flags: InputFlags,
        buttons: MouseButtons,
        wheel_delta: i32,
        position: Location,
    ) {
        self.sender.mouse_record(flags, buttons, wheel_delta, position);
    }

    /// Queue a mouse record with an explicit timestamp
    pub fn mouse_record_at(
        &self,
        flags: InputFlags,
        buttons: MouseButtons,
        wheel_delta: i32,
        position: Location,
        timestamp: Microseconds,
    ) {
        self.sender
            .mouse_record_at(flags, buttons, wheel_delta, position, timestamp);
    }

    /// Process every record stamped at or before the clock's logic time
    ///
    /// Returns the number of records processed, matched or not.
    pub fn tick(
        &mut self,
        clock: &impl LogicClock,
        policy: &PerformancePolicy,
        channel: &mut Channel,
    ) -> u32 {
        let _span = channel.span(SPAN_TICK);
        let now = clock.logic_time();
        let limit = policy.max_records.map_or(usize::MAX, |max| max as usize);
        let mut ready = self.sender.queue.drain_queued(now, limit).into_iter();

        let started = Instant::now();
        let mut processed = 0;
        let mut matched = 0;

        for queued in ready.by_ref() {
            matched += self.actions.dispatch(queued.record(), &self.contexts);
            processed += 1;

            if policy.is_exhausted(processed, started.elapsed()) {
                break;
            }
        }

        let leftover: Vec<Queued> = ready.collect();
        if !leftover.is_empty() {
            let count = leftover.len() as u64;
            if policy.policy.defers() {
                self.sender.queue.requeue(leftover);
                channel.add(COUNTER_DEFERRED, count);
            } else {
                log::warn!("Dropping {} input records over the frame budget", count);
                channel.add(COUNTER_DROPPED, count);
            }
        }

        channel.add(COUNTER_PROCESSED, u64::from(processed));
        channel.add(COUNTER_MATCHED, u64::from(matched));
        processed
    }

    /// Make `name` the active context
    pub fn push_context(&mut self, name: impl Into<String>) {
        let name = name.into();
        log::info!("Push input context '{}'", name);
        self.contexts.push(name);
    }

    /// Remove the active context, returns an empty string if there was none
    pub fn pop_context(&mut self) -> String {
        let name = self.contexts.pop();
        log::info!("Pop input context '{}'", name);
        name
    }

    /// Active context, empty when only global bindings are eligible
    pub fn active_context(&self) -> &str {
        self.contexts.active()
    }

    /// Push `name` until the returned guard is dropped
    pub fn scoped_context(&mut self, name: impl Into<String>) -> ContextScope<'_, Self> {
        ContextScope::new(self, name)
    }

    pub fn contexts(&self) -> &ContextStack {
        &self.contexts
    }

    /// Attach a callback to a named action
    ///
    /// Unknown names are logged and ignored.
    pub fn register_action_callback(
        &mut self,
        name: &str,
        callback: impl FnMut(&ActionEvent<'_>) + Send + 'static,
    ) {
        match self.actions.get_mut(name) {
            Some(binding) => binding.register(callback),
            None => log::error!("Cannot register callback, unknown action '{}'", name),
        }
    }

    /// Attach a callback that takes no arguments to a named action
    pub fn register_simple_action_callback(
        &mut self,
        name: &str,
        mut callback: impl FnMut() + Send + 'static,
    ) {
        self.register_action_callback(name, move |_| callback());
    }

    /// Check if an action with this name is bound
    pub fn is_action(&self, name: &str) -> bool {
        self.actions.contains(name)
    }

    /// Display text of an action, empty if unknown
    pub fn action_to_string(&self, name: &str) -> &str {
        self.actions
            .get(name)
            .map_or("", ActionBinding::display_text)
    }

    /// Fire an action's callbacks now, ignoring queue and context
    pub fn trigger_action(&mut self, name: &str, mouse_x: i32, mouse_y: i32) {
        self.trigger_action_at(name, mouse_x, mouse_y, time::real_time());
    }

    /// Fire an action's callbacks with an explicit timestamp
    ///
    /// Callbacks receive the flags of the binding's template. Unknown names
    /// are ignored.
    pub fn trigger_action_at(
        &mut self,
        name: &str,
        mouse_x: i32,
        mouse_y: i32,
        timestamp: Microseconds,
    ) {
        let Some(binding) = self.actions.get_mut(name) else {
            log::debug!("Ignoring trigger of unknown action '{}'", name);
            return;
        };

        let flags = binding.trigger().template().flags;
        binding.invoke(timestamp, mouse_x, mouse_y, flags);
    }

    /// Translate an OS key code to an engine key code
    pub fn map_key(&self, value: i32) -> i32 {
        self.key_map.map_key(value)
    }

    pub fn binding(&self, name: &str) -> Option<&ActionBinding> {
        self.actions.get(name)
    }

    pub fn actions(&self) -> &ActionTable {
        &self.actions
    }

    /// Number of records waiting for a tick
    pub fn pending_len(&self) -> usize {
        self.sender.pending_len()
    }
}

impl ContextOwner for InputDevice {
    fn enter_context(&mut self, name: String) {
        self.push_context(name);
    }

    fn leave_context(&mut self) -> String {
        self.pop_context()
    }
}
