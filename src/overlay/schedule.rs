//! Re-sync scheduling
//!
//! Every layout trigger (scroll, resize, DOM mutation, store change, ...)
//! funnels into one pending animation-frame-aligned sync. Triggers arriving
//! while a frame is pending are merged into it, not queued.
//!
//! Readiness of the embedded viewer is awaited with a bounded exponential
//! backoff, cut short by an explicit readiness signal.

use std::time::Duration;

/// Why a sync was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SyncTrigger {
    Mount,
    Scroll,
    Resize,
    Mutation,
    Readiness,
    StoreChanged,
    ManualRetry,
}

/// Answer to a sync request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRequest {
    /// The host must schedule an animation frame
    Schedule,
    /// A frame is already pending; the trigger was merged into it
    Merged,
}

/// Set of triggers folded into one frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerSet(Vec<SyncTrigger>);

impl TriggerSet {
    fn insert(&mut self, trigger: SyncTrigger) {
        if !self.0.contains(&trigger) {
            self.0.push(trigger);
        }
    }

    pub fn contains(&self, trigger: SyncTrigger) -> bool {
        self.0.contains(&trigger)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = SyncTrigger> + '_ {
        self.0.iter().copied()
    }
}

/// Coalesces sync triggers into at most one pending frame
#[derive(Debug, Default)]
pub struct SyncScheduler {
    pending: Option<TriggerSet>,
}

impl SyncScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, trigger: SyncTrigger) -> FrameRequest {
        match &mut self.pending {
            Some(set) => {
                set.insert(trigger);
                FrameRequest::Merged
            }
            None => {
                let mut set = TriggerSet::default();
                set.insert(trigger);
                self.pending = Some(set);
                FrameRequest::Schedule
            }
        }
    }

    /// Called from the animation frame; hands over the merged triggers
    pub fn take_frame(&mut self) -> Option<TriggerSet> {
        self.pending.take()
    }
}

/// Bounded exponential backoff while waiting for the first page geometry
#[derive(Debug, Clone)]
pub struct ReadinessBackoff {
    initial: Duration,
    cap: Duration,
    max_attempts: u32,
    attempts: u32,
    ready: bool,
}

impl ReadinessBackoff {
    pub fn new(initial: Duration, cap: Duration, max_attempts: u32) -> Self {
        Self {
            initial,
            cap,
            max_attempts,
            attempts: 0,
            ready: false,
        }
    }

    /// Delay before the next readiness probe, or `None` when ready or out of attempts
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.ready || self.attempts >= self.max_attempts {
            return None;
        }
        let factor = 2u32.saturating_pow(self.attempts);
        let delay = self.initial.saturating_mul(factor).min(self.cap);
        self.attempts += 1;
        Some(delay)
    }

    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// All probes spent without ever seeing a page
    pub fn is_exhausted(&self) -> bool {
        !self.ready && self.attempts >= self.max_attempts
    }

    /// Start over (manual retry, new document)
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.ready = false;
    }
}

impl Default for ReadinessBackoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(100), Duration::from_secs(5), 8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triggers_coalesce_into_one_frame() {
        let mut scheduler = SyncScheduler::new();

        assert_eq!(scheduler.request(SyncTrigger::Scroll), FrameRequest::Schedule);
        assert_eq!(scheduler.request(SyncTrigger::Scroll), FrameRequest::Merged);
        assert_eq!(scheduler.request(SyncTrigger::Mutation), FrameRequest::Merged);
        assert_eq!(scheduler.request(SyncTrigger::Resize), FrameRequest::Merged);

        let frame = scheduler.take_frame().unwrap();
        assert_eq!(frame.len(), 3);
        assert!(frame.contains(SyncTrigger::Mutation));
        assert!(scheduler.take_frame().is_none());

        assert_eq!(scheduler.request(SyncTrigger::StoreChanged), FrameRequest::Schedule);
    }

    #[test]
    fn test_backoff_doubles_up_to_cap() {
        let mut backoff = ReadinessBackoff::default();
        let delays: Vec<u64> = std::iter::from_fn(|| backoff.next_delay())
            .map(|d| d.as_millis() as u64)
            .collect();

        assert_eq!(delays, vec![100, 200, 400, 800, 1600, 3200, 5000, 5000]);
        assert!(backoff.is_exhausted());
    }

    #[test]
    fn test_readiness_stops_backoff() {
        let mut backoff = ReadinessBackoff::default();
        backoff.next_delay();
        backoff.mark_ready();

        assert!(backoff.next_delay().is_none());
        assert!(!backoff.is_exhausted());

        backoff.reset();
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(100)));
    }
}
