// Per-frame performance limits and observability channels

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// What happens to ready work left over once a soft limit is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Policy {
    /// Same as `Defer`
    #[default]
    Default,
    /// Leftover work is kept for the next frame
    Defer,
    /// Leftover work is discarded
    Drop,
}

impl Policy {
    /// Check if leftover work should be kept for the next frame
    pub fn defers(&self) -> bool {
        matches!(self, Self::Default | Self::Defer)
    }
}

/// Soft limits bounding the cost of one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PerformancePolicy {
    /// Wall-clock budget for one frame, unbounded when `None`
    pub budget: Option<Duration>,

    /// Maximum items processed in one frame, unbounded when `None`
    pub max_records: Option<u32>,

    /// Treatment of leftover work
    pub policy: Policy,
}

impl PerformancePolicy {
    /// Policy without any limits
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Limit the number of items processed per frame
    pub fn with_max_records(mut self, max_records: u32) -> Self {
        self.max_records = Some(max_records);
        self
    }

    /// Limit the wall-clock time spent per frame
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Set the treatment of leftover work
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// Check if either soft limit has been reached
    pub fn is_exhausted(&self, processed: u32, elapsed: Duration) -> bool {
        let over_count = self.max_records.is_some_and(|max| processed >= max);
        let over_budget = self.budget.is_some_and(|budget| elapsed >= budget);
        over_count || over_budget
    }
}

/// Named metrics channel collecting counters for one subsystem
#[derive(Debug, Clone, Default)]
pub struct Channel {
    name: String,
    counters: BTreeMap<&'static str, u64>,
}

impl Channel {
    /// Create a new, empty channel
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            counters: BTreeMap::new(),
        }
    }

    /// Channel name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add `amount` to a named counter
    pub fn add(&mut self, counter: &'static str, amount: u64) {
        *self.counters.entry(counter).or_insert(0) += amount;
    }

    /// Current value of a named counter, 0 if never touched
    pub fn counter(&self, counter: &str) -> u64 {
        self.counters.get(counter).copied().unwrap_or(0)
    }

    /// Iterate over all counters in name order
    pub fn counters(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        self.counters.iter().map(|(name, value)| (*name, *value))
    }

    /// Reset all counters
    pub fn clear(&mut self) {
        self.counters.clear();
    }

    /// Start a timing span reported when dropped
    pub fn span(&self, label: &'static str) -> Span {
        Span {
            channel: self.name.clone(),
            label,
            started: Instant::now(),
        }
    }
}

/// Timing span, logs its duration at trace level on drop
#[derive(Debug)]
pub struct Span {
    channel: String,
    label: &'static str,
    started: Instant,
}

impl Span {
    /// Time since the span started
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for Span {
    fn drop(&mut self) {
        log::trace!(
            "[{}] {} took {:?}",
            self.channel,
            self.label,
            self.started.elapsed()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_unbounded() {
        let policy = PerformancePolicy::default();
        assert!(!policy.is_exhausted(u32::MAX, Duration::from_secs(3600)));
        assert!(policy.policy.defers());
    }

    #[test]
    fn test_max_records_limit() {
        let policy = PerformancePolicy::unbounded().with_max_records(3);
        assert!(!policy.is_exhausted(2, Duration::ZERO));
        assert!(policy.is_exhausted(3, Duration::ZERO));
    }

    #[test]
    fn test_budget_limit() {
        let policy = PerformancePolicy::unbounded().with_budget(Duration::from_millis(2));
        assert!(!policy.is_exhausted(1, Duration::from_millis(1)));
        assert!(policy.is_exhausted(1, Duration::from_millis(2)));
    }

    #[test]
    fn test_drop_policy() {
        let policy = PerformancePolicy::unbounded().with_policy(Policy::Drop);
        assert!(!policy.policy.defers());
        assert!(Policy::Defer.defers());
    }

    #[test]
    fn test_channel_counters() {
        let mut channel = Channel::new("InputTest");
        assert_eq!(channel.name(), "InputTest");
        assert_eq!(channel.counter("Input.Processed"), 0);

        channel.add("Input.Processed", 2);
        channel.add("Input.Processed", 3);
        channel.add("Input.Dropped", 1);

        assert_eq!(channel.counter("Input.Processed"), 5);
        let names: Vec<_> = channel.counters().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Input.Dropped", "Input.Processed"]);

        channel.clear();
        assert_eq!(channel.counter("Input.Processed"), 0);
    }

    #[test]
    fn test_span_elapsed() {
        let channel = Channel::new("SpanTest");
        let span = channel.span("Work");
        std::thread::sleep(Duration::from_millis(1));
        assert!(span.elapsed() >= Duration::from_millis(1));
    }
}
