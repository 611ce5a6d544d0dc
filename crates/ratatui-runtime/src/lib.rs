//! A small frame-driven runtime for ratatui applications.
//!
//! The runtime owns the terminal and drives an [`App`] with three kinds of events:
//! ticks carrying the time measured since the previous tick, renders at a fixed frame
//! rate, and raw terminal events.

pub use self::{app::App, runtime::Runtime};

mod app;
mod event;
mod event_loop;
mod runtime;
