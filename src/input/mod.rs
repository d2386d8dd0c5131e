//! Input normalization for the simulation module.
//!
//! The routers here are plain state machines over small event structs; the
//! browser glue converts DOM events into these and applies the
//! [`EventResponse`] back onto the DOM event.

pub mod host;
pub mod keyboard;
pub mod keymap;
pub mod pointer;

pub use host::{CallQueue, HostBridge, HostFlags, SimCall, Simulation};
pub use keyboard::KeyboardRouter;
pub use keymap::{KeyCode, tag_int};
pub use pointer::PointerRouter;

/// The parts of a `KeyboardEvent` the router looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyEvent {
    /// The produced value, e.g. `"a"`, `"A"`, `"Shift"`, `"Enter"`.
    pub key: String,
    /// The physical position, e.g. `"KeyA"`, `"ArrowLeft"`.
    pub code: String,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>, code: impl Into<String>) -> Self {
        KeyEvent {
            key: key.into(),
            code: code.into(),
            ctrl: false,
            meta: false,
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    pub fn is_shift(&self) -> bool {
        self.key == "Shift"
    }
}

/// What the browser glue should do with the original DOM event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventResponse {
    pub prevent_default: bool,
}

impl EventResponse {
    pub const PASS: EventResponse = EventResponse {
        prevent_default: false,
    };
    pub const CONSUME: EventResponse = EventResponse {
        prevent_default: true,
    };
}
