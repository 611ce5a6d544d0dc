use std::{io, time::Duration};

use crate::{App, event::TuiEvent, event_loop::EventLoop};

/// TUI application runtime.
///
/// Manages the event loop and executes applications that implement the `App` trait.
#[derive(Debug)]
pub struct Runtime {
    events: EventLoop,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    /// Creates a new Runtime running at 60 frames per second.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: EventLoop::new(),
        }
    }

    /// Sets the frame rate (Hz, frames per second) for both updates and rendering.
    ///
    /// # Panics
    ///
    /// Panics if `rate` is not a positive finite number.
    pub fn set_frame_rate(&mut self, rate: f64) {
        assert!(rate.is_finite() && rate > 0.0, "invalid frame rate {rate}");
        self.events
            .set_frame_interval(Duration::from_secs_f64(1.0 / rate));
    }

    /// Returns the time between two frames.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        self.events.frame_interval()
    }

    /// Runs the application.
    ///
    /// 1. Calls `app.init()` for initialization
    /// 2. Runs the event loop until `app.should_exit()` returns true
    ///    - `Event::Tick`: calls `app.update()` with the measured elapsed time
    ///    - `Event::Render`: calls `app.draw()`
    ///    - `Event::Crossterm`: calls `app.handle_event()`
    pub fn run<A>(mut self, app: &mut A) -> io::Result<()>
    where
        A: App,
    {
        app.init(&mut self);

        ratatui::run(|terminal| {
            while !app.should_exit() {
                match self.events.next()? {
                    TuiEvent::Tick(elapsed) => {
                        app.update(&mut self, elapsed);
                    }
                    TuiEvent::Render => {
                        terminal.draw(|f| app.draw(f))?;
                    }
                    TuiEvent::Crossterm(event) => {
                        app.handle_event(&mut self, event);
                    }
                }
            }
            Ok(())
        })
    }
}
