use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::event;

use crate::event::TuiEvent;

/// Event loop state management.
///
/// Ticks and renders are both paced by the frame interval. A tick reports the time
/// actually measured since the previous tick, so a slow frame yields a longer step
/// instead of a lost one.
#[derive(Debug)]
pub(super) struct EventLoop {
    frame_interval: Duration,
    last_tick: Instant,
    last_render: Option<Instant>,
}

impl EventLoop {
    pub(super) const DEFAULT_FRAME_RATE: f64 = 60.0;

    pub(super) fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(now: Instant) -> Self {
        Self {
            frame_interval: Duration::from_secs_f64(1.0 / Self::DEFAULT_FRAME_RATE),
            last_tick: now,
            last_render: None,
        }
    }

    pub(super) fn set_frame_interval(&mut self, interval: Duration) {
        self.frame_interval = interval;
    }

    pub(super) fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Returns the next event.
    ///
    /// Blocks until a tick or render is due or a crossterm event occurs.
    pub(super) fn next(&mut self) -> io::Result<TuiEvent> {
        loop {
            let now = Instant::now();
            if let Some(event) = self.due_event(now) {
                return Ok(event);
            }
            if event::poll(self.timeout(now))? {
                return Ok(TuiEvent::Crossterm(event::read()?));
            }
        }
    }

    /// Returns the tick or render that is due at `now`, ticks first.
    fn due_event(&mut self, now: Instant) -> Option<TuiEvent> {
        let since_tick = now.saturating_duration_since(self.last_tick);
        if since_tick >= self.frame_interval {
            self.last_tick = now;
            return Some(TuiEvent::Tick(since_tick));
        }

        // The first frame is drawn immediately.
        let render_due = self
            .last_render
            .is_none_or(|last| now.saturating_duration_since(last) >= self.frame_interval);
        if render_due {
            self.last_render = Some(now);
            return Some(TuiEvent::Render);
        }
        None
    }

    fn timeout(&self, now: Instant) -> Duration {
        let next_tick_at = self.last_tick + self.frame_interval;
        let next_render_at = self
            .last_render
            .map_or(now, |last| last + self.frame_interval);
        next_tick_at
            .min(next_render_at)
            .saturating_duration_since(now)
    }
}
