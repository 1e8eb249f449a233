//! Rate limiting for continuous navigation input.
//!
//! A trackpad fling produces dozens of wheel events and a held arrow key
//! autorepeats; each burst should move the feed by one paper. Every input
//! channel gets its own trailing debouncer: an event records its direction
//! and pushes the deadline out, and once the channel has been quiet for the
//! delay the latest direction is released exactly once.
//!
//! Time is passed in by the caller so the event loop can use
//! `tokio::time::Instant` and tests can step it by hand.

use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(50);

/// Source of a navigation event. Each channel is debounced independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputChannel {
    Wheel,
    Keyboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

impl Direction {
    /// Maps a scroll delta to a direction; positive scrolls down.
    pub fn from_wheel_delta(delta: i32) -> Option<Self> {
        match delta.signum() {
            1 => Some(Direction::Next),
            -1 => Some(Direction::Previous),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Debouncer {
    pending: Option<(Direction, Instant)>,
}

impl Debouncer {
    fn push(&mut self, direction: Direction, deadline: Instant) {
        self.pending = Some((direction, deadline));
    }

    fn take_ready(&mut self, now: Instant) -> Option<Direction> {
        match self.pending {
            Some((direction, deadline)) if deadline <= now => {
                self.pending = None;
                Some(direction)
            }
            _ => None,
        }
    }

    fn deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, deadline)| deadline)
    }
}

/// Per-channel trailing debounce in front of the navigator.
#[derive(Debug)]
pub struct InputArbiter {
    delay: Duration,
    wheel: Debouncer,
    keyboard: Debouncer,
}

impl Default for InputArbiter {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl InputArbiter {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            wheel: Debouncer::default(),
            keyboard: Debouncer::default(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    fn channel_mut(&mut self, channel: InputChannel) -> &mut Debouncer {
        match channel {
            InputChannel::Wheel => &mut self.wheel,
            InputChannel::Keyboard => &mut self.keyboard,
        }
    }

    /// Records an event, replacing any pending direction on that channel and
    /// restarting its quiet period.
    pub fn push(&mut self, channel: InputChannel, direction: Direction, now: Instant) {
        let deadline = now + self.delay;
        self.channel_mut(channel).push(direction, deadline);
    }

    /// Releases the directions whose quiet period has elapsed, at most one
    /// per channel, wheel first.
    pub fn take_ready(&mut self, now: Instant) -> Vec<Direction> {
        [self.wheel.take_ready(now), self.keyboard.take_ready(now)]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Earliest instant at which [`take_ready`](Self::take_ready) will
    /// release something, if anything is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.wheel.deadline(), self.keyboard.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.next_deadline().is_none()
    }

    /// Drops everything pending.
    pub fn clear(&mut self) {
        self.wheel = Debouncer::default();
        self.keyboard = Debouncer::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_wheel_delta_mapping() {
        assert_eq!(Direction::from_wheel_delta(3), Some(Direction::Next));
        assert_eq!(Direction::from_wheel_delta(-1), Some(Direction::Previous));
        assert_eq!(Direction::from_wheel_delta(0), None);
    }

    #[test]
    fn test_nothing_pending_initially() {
        let mut arbiter = InputArbiter::default();
        assert!(arbiter.is_idle());
        assert!(arbiter.take_ready(Instant::now()).is_empty());
    }

    #[test]
    fn test_burst_collapses_to_one_intent() {
        let start = Instant::now();
        let mut arbiter = InputArbiter::new(ms(50));

        // 20 wheel events, 5 ms apart, all inside the window
        for i in 0..20 {
            let now = start + ms(i * 5);
            arbiter.push(InputChannel::Wheel, Direction::Next, now);
            assert!(arbiter.take_ready(now).is_empty());
        }

        let last = start + ms(95);
        assert_eq!(arbiter.next_deadline(), Some(last + ms(50)));
        assert!(arbiter.take_ready(last + ms(49)).is_empty());
        assert_eq!(arbiter.take_ready(last + ms(50)), vec![Direction::Next]);
        assert!(arbiter.take_ready(last + ms(500)).is_empty());
    }

    #[test]
    fn test_latest_direction_wins() {
        let start = Instant::now();
        let mut arbiter = InputArbiter::new(ms(50));
        arbiter.push(InputChannel::Wheel, Direction::Next, start);
        arbiter.push(InputChannel::Wheel, Direction::Next, start + ms(10));
        arbiter.push(InputChannel::Wheel, Direction::Previous, start + ms(20));

        assert_eq!(arbiter.take_ready(start + ms(70)), vec![Direction::Previous]);
    }

    #[test]
    fn test_channels_are_independent() {
        let start = Instant::now();
        let mut arbiter = InputArbiter::new(ms(50));
        arbiter.push(InputChannel::Wheel, Direction::Next, start);
        arbiter.push(InputChannel::Keyboard, Direction::Previous, start + ms(30));

        assert_eq!(arbiter.next_deadline(), Some(start + ms(50)));
        assert_eq!(arbiter.take_ready(start + ms(50)), vec![Direction::Next]);
        assert_eq!(arbiter.next_deadline(), Some(start + ms(80)));
        assert_eq!(arbiter.take_ready(start + ms(80)), vec![Direction::Previous]);
        assert!(arbiter.is_idle());
    }

    #[test]
    fn test_separate_bursts_each_release() {
        let start = Instant::now();
        let mut arbiter = InputArbiter::new(ms(50));

        arbiter.push(InputChannel::Keyboard, Direction::Next, start);
        assert_eq!(arbiter.take_ready(start + ms(60)), vec![Direction::Next]);

        arbiter.push(InputChannel::Keyboard, Direction::Next, start + ms(100));
        assert_eq!(arbiter.take_ready(start + ms(160)), vec![Direction::Next]);
    }

    #[test]
    fn test_clear_drops_pending() {
        let start = Instant::now();
        let mut arbiter = InputArbiter::new(ms(50));
        arbiter.push(InputChannel::Wheel, Direction::Next, start);
        arbiter.clear();
        assert!(arbiter.take_ready(start + ms(100)).is_empty());
    }
}
