use std::time::{Duration, Instant};

/// Rate at which the delay and sound timers count down.
pub const TIMER_HZ: u32 = 60;

/// Delay and sound timers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
}

impl Timers {
    pub const fn new(delay: u8, sound: u8) -> Timers {
        Timers { delay, sound }
    }

    /// One 60 Hz tick. Both timers stop at zero.
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    /// Apply `ticks` ticks at once.
    pub fn tick_n(&mut self, ticks: u32) {
        let ticks = ticks.min(u8::MAX as u32) as u8;
        self.delay = self.delay.saturating_sub(ticks);
        self.sound = self.sound.saturating_sub(ticks);
    }

    pub fn sound_active(&self) -> bool {
        self.sound > 0
    }
}

/// Fixed-rate gate that tracks wall-clock time and reports how many timer
/// ticks are due, independent of how often it is polled.
#[derive(Clone, Copy, Debug)]
pub struct TimerGate {
    period: Duration,
    next: Instant,
}

impl TimerGate {
    pub fn new(start: Instant) -> TimerGate {
        TimerGate::with_rate(start, TIMER_HZ)
    }

    pub fn with_rate(start: Instant, hz: u32) -> TimerGate {
        let period = Duration::from_secs(1) / hz.max(1);
        TimerGate {
            period,
            next: start + period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Number of ticks that came due up to `now`; advances the gate past them.
    pub fn due_ticks(&mut self, now: Instant) -> u32 {
        let mut ticks = 0;
        while now >= self.next {
            self.next += self.period;
            ticks += 1;
        }
        ticks
    }
}
