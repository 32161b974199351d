//! Fixed-rate frame pacing on the monotonic clock.
//!
//! A tick that runs past its budget is not compensated: the overrun is
//! counted and logged and the next frame is scheduled one budget from now.

use log::{debug, warn};
use std::time::{Duration, Instant};

/// Frame pacing state
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    budget: Duration,
    next_deadline: Instant,
    frames: u64,
    overruns: u64,
    worst_overrun: Duration,
}

/// Outcome of waiting for the next frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePace {
    /// Slept until the deadline
    OnTime { slept: Duration },
    /// Deadline already passed by this much
    Overrun(Duration),
}

impl FrameScheduler {
    /// Pace at `fps` frames per second, first deadline one budget from `now`
    #[must_use]
    pub fn new(fps: u32, now: Instant) -> Self {
        let budget = Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));
        Self::with_budget(budget, now)
    }

    #[must_use]
    pub fn with_budget(budget: Duration, now: Instant) -> Self {
        Self {
            budget,
            next_deadline: now + budget,
            frames: 0,
            overruns: 0,
            worst_overrun: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn budget(&self) -> Duration {
        self.budget
    }

    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Number of frames that ran past their deadline
    #[must_use]
    pub const fn overruns(&self) -> u64 {
        self.overruns
    }

    #[must_use]
    pub const fn worst_overrun(&self) -> Duration {
        self.worst_overrun
    }

    /// Account for the end of a frame at `now` and return how long to sleep
    ///
    /// Split from [`wait_next`](Self::wait_next) so pacing can be driven
    /// with synthetic time.
    pub fn finish_frame(&mut self, now: Instant) -> FramePace {
        self.frames += 1;

        if now > self.next_deadline {
            let late = now - self.next_deadline;
            self.overruns += 1;
            self.worst_overrun = self.worst_overrun.max(late);
            warn!(
                "Frame {} overran its {:.1}ms budget by {:.2}ms ({} overruns)",
                self.frames,
                self.budget.as_secs_f64() * 1000.0,
                late.as_secs_f64() * 1000.0,
                self.overruns
            );
            self.next_deadline = now + self.budget;
            return FramePace::Overrun(late);
        }

        let slept = self.next_deadline - now;
        self.next_deadline += self.budget;
        FramePace::OnTime { slept }
    }

    /// Sleep until the next frame is due
    pub fn wait_next(&mut self) -> FramePace {
        let pace = self.finish_frame(Instant::now());
        if let FramePace::OnTime { slept } = pace {
            std::thread::sleep(slept);
        }
        if self.frames % 600 == 0 {
            debug!("{} frames, {} overruns", self.frames, self.overruns);
        }
        pace
    }
}
