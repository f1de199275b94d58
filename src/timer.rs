use std::time::Duration;

use web_time::Instant;

/// Fires once per `period`. If the caller falls more than a full period behind
/// (window dragged, machine asleep) the schedule restarts from `now` instead of
/// firing a burst to catch up.
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    period: Duration,
    next: Instant,
}

impl Interval {
    pub fn new(period: Duration, start: Instant) -> Self {
        Self {
            period,
            next: start + period,
        }
    }

    /// Starts already due, so the first poll fires immediately.
    pub fn immediate(period: Duration, start: Instant) -> Self {
        Self { period, next: start }
    }

    pub fn deadline(&self) -> Instant {
        self.next
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }

        self.next += self.period;
        if self.next <= now {
            self.next = now + self.period;
        }
        true
    }
}

/// Caps the update loop at a fixed frame rate. Redraws the OS asks for
/// (expose, resize) repaint the last frame without advancing the game.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    interval: Interval,
    tick_due: bool,
}

impl FrameClock {
    pub fn new(period: Duration, start: Instant) -> Self {
        Self {
            interval: Interval::immediate(period, start),
            tick_due: false,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.interval.deadline()
    }

    /// Returns true when a new frame should be requested.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.interval.poll(now) {
            self.tick_due = true;
        }
        self.tick_due
    }

    /// Consumes the pending tick. Called once per redraw.
    pub fn take_tick(&mut self) -> bool {
        std::mem::take(&mut self.tick_due)
    }
}

/// The recurring spawn signal delivered into each tick's event queue.
pub type SpawnTimer = Interval;

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_millis(400);

    #[test]
    fn does_not_fire_before_period() {
        let start = Instant::now();
        let mut timer = SpawnTimer::new(PERIOD, start);
        assert!(!timer.poll(start));
        assert!(!timer.poll(start + Duration::from_millis(399)));
    }

    #[test]
    fn fires_once_per_period() {
        let start = Instant::now();
        let mut timer = SpawnTimer::new(PERIOD, start);

        assert!(timer.poll(start + PERIOD));
        assert!(!timer.poll(start + PERIOD));
        assert!(!timer.poll(start + Duration::from_millis(799)));
        assert!(timer.poll(start + Duration::from_millis(810)));
        // Small lateness does not shift the schedule
        assert_eq!(timer.deadline(), start + PERIOD * 3);
    }

    #[test]
    fn resyncs_after_stall() {
        let start = Instant::now();
        let mut timer = SpawnTimer::new(PERIOD, start);
        let late = start + Duration::from_secs(5);

        assert!(timer.poll(late));
        assert!(!timer.poll(late));
        assert_eq!(timer.deadline(), late + PERIOD);
    }

    #[test]
    fn immediate_fires_on_first_poll() {
        let start = Instant::now();
        let mut timer = Interval::immediate(PERIOD, start);
        assert!(timer.poll(start));
        assert!(!timer.poll(start));
        assert_eq!(timer.deadline(), start + PERIOD);
    }

    #[test]
    fn frame_clock_ticks_once_per_frame() {
        let start = Instant::now();
        let frame = Duration::from_secs(1) / 60;
        let mut clock = FrameClock::new(frame, start);

        assert!(clock.poll(start));
        assert!(clock.take_tick());

        // Extra redraws inside the same frame repaint but do not tick
        assert!(!clock.take_tick());
        assert!(!clock.poll(start + frame / 2));
        assert!(!clock.take_tick());

        assert!(clock.poll(start + frame));
        assert!(clock.take_tick());
    }

    #[test]
    fn frame_clock_without_redraw_keeps_one_pending_tick() {
        let start = Instant::now();
        let frame = Duration::from_secs(1) / 60;
        let mut clock = FrameClock::new(frame, start);

        assert!(clock.poll(start));
        // Redraw has not arrived yet; later frames do not stack up
        assert!(clock.poll(start + frame));
        assert!(clock.poll(start + frame * 2));
        assert!(clock.take_tick());
        assert!(!clock.take_tick());
    }
}
