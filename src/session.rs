//! One play-through: live targets, counters, and the Running -> Ended transition.
//!
//! Nothing in here knows about windows or the GPU. The shell feeds in the
//! elapsed time and the events collected since the last tick.

use std::time::Duration;

use cgmath::Vector2;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::target::Target;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    /// The spawn timer fired
    Spawn,
    /// Primary button pressed at the given window position
    Click { x: f32, y: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    Ended,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Stats {
    pub elapsed: Duration,
    pub hits: u32,
    /// Every click, whether or not it hit something
    pub clicks: u32,
    /// Targets that shrank away without being clicked
    pub misses: u32,
}

impl Stats {
    /// Hits per second, 0 before any time has passed.
    pub fn speed(&self) -> f32 {
        let secs = self.elapsed.as_secs_f32();
        if secs > 0.0 {
            self.hits as f32 / secs
        } else {
            0.0
        }
    }

    /// Percentage of clicks that hit a target, 0 if nothing was clicked.
    pub fn accuracy(&self) -> f32 {
        if self.clicks > 0 {
            self.hits as f32 / self.clicks as f32 * 100.0
        } else {
            0.0
        }
    }

    pub fn lives_remaining(&self, lives: u32) -> u32 {
        lives.saturating_sub(self.misses)
    }
}

/// What happened during a single tick
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub spawned: u32,
    pub clicks: u32,
    pub hits: u32,
    pub misses: u32,
    /// Set only on the tick that ended the session
    pub ended: bool,
}

/// The region targets may spawn in, in window pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayArea {
    pub width: f32,
    pub height: f32,
    pub padding: f32,
    pub top_bar_height: f32,
}

impl PlayArea {
    pub fn new(width: f32, height: f32, padding: f32, top_bar_height: f32) -> Self {
        Self {
            width,
            height,
            padding,
            top_bar_height,
        }
    }

    pub fn x_range(&self) -> (i32, i32) {
        span(self.padding, self.width - self.padding)
    }

    pub fn y_range(&self) -> (i32, i32) {
        span(
            self.padding + self.top_bar_height,
            self.height - self.padding,
        )
    }

    /// Uniform integer position inside the padded area, below the status bar.
    pub fn random_position(&self, rng: &mut impl Rng) -> Vector2<f32> {
        let (min_x, max_x) = self.x_range();
        let (min_y, max_y) = self.y_range();

        Vector2::new(
            rng.gen_range(min_x..=max_x) as f32,
            rng.gen_range(min_y..=max_y) as f32,
        )
    }
}

// A window smaller than the padding would give an empty range, which `gen_range` panics on
fn span(low: f32, high: f32) -> (i32, i32) {
    let low = low.round() as i32;
    let high = high.round() as i32;
    (low, high.max(low))
}

pub struct Session {
    targets: Vec<Target>,
    stats: Stats,
    phase: Phase,
    lives: u32,
    area: PlayArea,
    rng: StdRng,
}

impl Session {
    pub fn new(area: PlayArea, lives: u32) -> Self {
        Self::with_rng(area, lives, StdRng::from_entropy())
    }

    pub fn with_seed(area: PlayArea, lives: u32, seed: u64) -> Self {
        Self::with_rng(area, lives, StdRng::seed_from_u64(seed))
    }

    fn with_rng(area: PlayArea, lives: u32, rng: StdRng) -> Self {
        Self {
            targets: Vec::new(),
            stats: Stats::default(),
            phase: Phase::Running,
            lives,
            area,
            rng,
        }
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn lives_remaining(&self) -> u32 {
        self.stats.lives_remaining(self.lives)
    }

    /// Only affects targets spawned after the call.
    pub fn set_play_area(&mut self, area: PlayArea) {
        self.area = area;
    }

    pub fn spawn_at(&mut self, x: f32, y: f32) {
        if self.is_running() {
            self.targets.push(Target::new(x, y));
        }
    }

    /// Runs one step of the game.
    ///
    /// Events are applied first (spawns join the live set and get their first
    /// update this tick), then every target is advanced. Targets that shrink to
    /// nothing are misses. Each click then removes the earliest-spawned live
    /// target under it, if any. Once an Ended session is reached all further
    /// calls are no-ops and the stats stay frozen.
    pub fn tick<I>(&mut self, elapsed: Duration, events: I) -> TickReport
    where
        I: IntoIterator<Item = SessionEvent>,
    {
        let mut report = TickReport::default();
        if !self.is_running() {
            return report;
        }

        self.stats.elapsed = elapsed;

        let mut clicks = Vec::new();
        for event in events {
            match event {
                SessionEvent::Spawn => {
                    let position = self.area.random_position(&mut self.rng);
                    log::debug!("spawn target at ({}, {})", position.x, position.y);
                    self.targets.push(Target::new(position.x, position.y));
                    report.spawned += 1;
                }
                SessionEvent::Click { x, y } => clicks.push(Vector2::new(x, y)),
            }
        }

        let mut misses = 0;
        self.targets.retain_mut(|target| {
            target.update();
            if target.is_expired() {
                misses += 1;
                false
            } else {
                true
            }
        });

        let mut hits = 0;
        for click in &clicks {
            if let Some(index) = self
                .targets
                .iter()
                .position(|target| target.hit_test(click.x, click.y))
            {
                let target = self.targets.remove(index);
                log::debug!(
                    "hit target at ({}, {}) with size {:.1}",
                    target.position().x,
                    target.position().y,
                    target.size()
                );
                hits += 1;
            }
        }

        report.clicks = clicks.len() as u32;
        report.hits = hits;
        report.misses = misses;

        self.stats.clicks += report.clicks;
        self.stats.hits += hits;
        self.stats.misses += misses;

        if misses > 0 {
            log::debug!("missed {} target(s), {} lives left", misses, self.lives_remaining());
        }

        if self.stats.misses >= self.lives {
            self.phase = Phase::Ended;
            report.ended = true;
        }

        report
    }
}
