//! Fixed timestep scheduler
//!
//! Converts irregular host callbacks (`requestAnimationFrame`, a native
//! frame loop, a test clock) into whole ticks of `tick_interval`
//! milliseconds. Leftover time carries into the next call, and a single call
//! never runs more than `max_ticks_per_advance` ticks: after a long stall
//! (backgrounded tab) the surplus is dropped instead of replayed.

use std::ops::ControlFlow;

use crate::consts::MAX_TICKS_PER_ADVANCE;

#[derive(Debug, Clone)]
pub struct Scheduler {
    /// Fixed step in milliseconds
    tick_interval: f64,
    max_ticks_per_advance: u32,
    /// Host timestamp the accumulator is measured from; None until the first advance
    last_tick_time: Option<f64>,
    /// Elapsed time not yet turned into ticks
    accumulator: f64,
    stopped: bool,
}

impl Scheduler {
    pub fn new(tick_interval: f64, max_ticks_per_advance: u32) -> Self {
        Self {
            tick_interval,
            max_ticks_per_advance: max_ticks_per_advance.max(1),
            last_tick_time: None,
            accumulator: 0.0,
            stopped: false,
        }
    }

    /// Scheduler ticking `hz` times per second
    pub fn with_rate(hz: u32, max_ticks_per_advance: u32) -> Self {
        Self::new(1000.0 / f64::from(hz.max(1)), max_ticks_per_advance)
    }

    pub fn tick_interval(&self) -> f64 {
        self.tick_interval
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    pub fn last_tick_time(&self) -> Option<f64> {
        self.last_tick_time
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// No further ticks, ever
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Forget timing history; the next advance only records its timestamp
    pub fn reset(&mut self) {
        self.last_tick_time = None;
        self.accumulator = 0.0;
    }

    /// Run as many whole ticks as the time since the last call allows.
    ///
    /// `tick` receives the fixed interval and returns `Break` once the
    /// session is finished, which stops the scheduler for good. Returns the
    /// number of ticks run.
    pub fn advance<F>(&mut self, now: f64, mut tick: F) -> u32
    where
        F: FnMut(f64) -> ControlFlow<()>,
    {
        if self.stopped {
            return 0;
        }
        let Some(last) = self.last_tick_time else {
            self.last_tick_time = Some(now);
            return 0;
        };

        // `last` already sits `accumulator` behind the previous `now`, so the
        // full gap is the unconsumed time. A clock that runs backwards
        // contributes nothing.
        self.accumulator = (now - last).max(0.0);

        let mut ticks = 0;
        while self.accumulator >= self.tick_interval && ticks < self.max_ticks_per_advance {
            self.accumulator -= self.tick_interval;
            ticks += 1;
            if tick(self.tick_interval).is_break() {
                self.stopped = true;
                break;
            }
        }

        if self.accumulator >= self.tick_interval {
            let dropped = (self.accumulator / self.tick_interval).floor();
            log::trace!("Dropping {} catch-up ticks", dropped);
            self.accumulator -= dropped * self.tick_interval;
        }

        self.last_tick_time = Some(now - self.accumulator);
        ticks
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::with_rate(crate::consts::TICK_HZ, MAX_TICKS_PER_ADVANCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn count_ticks(scheduler: &mut Scheduler, now: f64) -> u32 {
        let mut seen = 0;
        let ran = scheduler.advance(now, |_| {
            seen += 1;
            ControlFlow::Continue(())
        });
        assert_eq!(ran, seen);
        ran
    }

    #[test]
    fn test_first_advance_only_records_time() {
        let mut scheduler = Scheduler::new(16.0, 5);
        assert_eq!(count_ticks(&mut scheduler, 5000.0), 0);
        assert_eq!(scheduler.last_tick_time(), Some(5000.0));
    }

    #[test]
    fn test_leftover_carries_forward() {
        let mut scheduler = Scheduler::new(16.0, 5);
        count_ticks(&mut scheduler, 0.0);
        assert_eq!(count_ticks(&mut scheduler, 10.0), 0);
        assert_eq!(scheduler.accumulator(), 10.0);
        assert_eq!(count_ticks(&mut scheduler, 20.0), 1);
        assert_eq!(scheduler.accumulator(), 4.0);
        assert_eq!(scheduler.last_tick_time(), Some(16.0));
        assert_eq!(count_ticks(&mut scheduler, 64.0), 3);
        assert_eq!(scheduler.accumulator(), 0.0);
    }

    #[test]
    fn test_large_gap_is_capped() {
        let mut scheduler = Scheduler::new(16.0, 5);
        count_ticks(&mut scheduler, 0.0);
        assert_eq!(count_ticks(&mut scheduler, 1000.0), 5);
        // 1000 = 62 * 16 + 8: the surplus whole ticks are gone, the 8ms stays
        assert_eq!(scheduler.accumulator(), 8.0);
        assert!(scheduler.accumulator() < scheduler.tick_interval());
        // Nothing queued for the next frame
        assert_eq!(count_ticks(&mut scheduler, 1001.0), 0);
    }

    #[test]
    fn test_break_stops_for_good() {
        let mut scheduler = Scheduler::new(10.0, 5);
        scheduler.advance(0.0, |_| ControlFlow::Continue(()));
        let mut calls = 0;
        let ran = scheduler.advance(50.0, |_| {
            calls += 1;
            if calls == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(ran, 2);
        assert!(scheduler.is_stopped());
        assert_eq!(count_ticks(&mut scheduler, 500.0), 0);
    }

    #[test]
    fn test_backwards_clock_is_zero_delta() {
        let mut scheduler = Scheduler::new(16.0, 5);
        count_ticks(&mut scheduler, 100.0);
        assert_eq!(count_ticks(&mut scheduler, 50.0), 0);
        assert_eq!(scheduler.last_tick_time(), Some(50.0));
        assert_eq!(count_ticks(&mut scheduler, 66.0), 1);
    }

    #[test]
    fn test_with_rate() {
        let scheduler = Scheduler::with_rate(50, 5);
        assert_eq!(scheduler.tick_interval(), 20.0);
    }

    #[test]
    fn test_reset_rebases() {
        let mut scheduler = Scheduler::new(16.0, 5);
        count_ticks(&mut scheduler, 0.0);
        count_ticks(&mut scheduler, 8.0);
        scheduler.reset();
        assert_eq!(count_ticks(&mut scheduler, 10_000.0), 0);
        assert_eq!(scheduler.accumulator(), 0.0);
    }

    proptest! {
        #[test]
        fn prop_whole_ticks_accumulate_exactly(steps in prop::collection::vec(0u32..40, 1..50)) {
            // Deltas are whole milliseconds and T = 16ms; each call stays
            // under the cap. Pad at the end so the total is k * T.
            let mut scheduler = Scheduler::new(16.0, 5);
            count_ticks(&mut scheduler, 0.0);

            let mut now = 0u32;
            let mut total_ticks = 0;
            for step in steps {
                now += step;
                total_ticks += count_ticks(&mut scheduler, f64::from(now));
            }
            now += (16 - now % 16) % 16;
            total_ticks += count_ticks(&mut scheduler, f64::from(now));

            prop_assert_eq!(total_ticks, now / 16);
            prop_assert_eq!(scheduler.accumulator(), 0.0);
        }
    }
}
