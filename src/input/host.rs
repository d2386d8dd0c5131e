//! Seams to the simulation module and the shared flags it polls.

use serde::Serialize;

/// Lifecycle entry points exported by the simulation module.
///
/// Key codes arrive already tagged (see [`super::keymap::tag_int`]).
pub trait Simulation {
    fn on_key_down(&mut self, tagged_key: i32);
    fn on_key_up(&mut self, tagged_key: i32);
    fn on_shift_down(&mut self);
    fn on_shift_up(&mut self);
}

/// Shared state the simulation reads once per frame.
pub trait HostBridge {
    fn set_mouse_position(&mut self, x: i32, y: i32);
    fn set_mouse_down(&mut self, down: bool);
    fn mark_just_pressed(&mut self);
    fn mark_just_released(&mut self);
    /// Accumulates until the simulation consumes it.
    fn add_scroll_lines(&mut self, lines: i32);
    fn request_copy(&mut self);
    fn request_select_all(&mut self);
    fn deliver_paste(&mut self, text: &str);
}

/// In-memory host flags, for native hosts and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostFlags {
    pub mouse_x: i32,
    pub mouse_y: i32,
    pub mouse_down: bool,
    pub mouse_just_pressed: bool,
    pub mouse_just_released: bool,
    pub scroll_delta_y: i32,
    pub clipboard_copy_requested: bool,
    pub select_all_requested: bool,
    pub clipboard_text: Option<String>,
    pub clipboard_paste_requested: bool,
}

impl HostFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_scroll_lines(&mut self) -> i32 {
        std::mem::take(&mut self.scroll_delta_y)
    }

    pub fn take_just_pressed(&mut self) -> bool {
        std::mem::take(&mut self.mouse_just_pressed)
    }

    pub fn take_just_released(&mut self) -> bool {
        std::mem::take(&mut self.mouse_just_released)
    }

    pub fn take_copy_request(&mut self) -> bool {
        std::mem::take(&mut self.clipboard_copy_requested)
    }

    pub fn take_select_all_request(&mut self) -> bool {
        std::mem::take(&mut self.select_all_requested)
    }

    /// Pasted text, once per paste.
    pub fn take_paste(&mut self) -> Option<String> {
        if std::mem::take(&mut self.clipboard_paste_requested) {
            self.clipboard_text.clone()
        } else {
            None
        }
    }

    pub fn snapshot(&self) -> HostFlags {
        self.clone()
    }
}

impl HostBridge for HostFlags {
    fn set_mouse_position(&mut self, x: i32, y: i32) {
        self.mouse_x = x;
        self.mouse_y = y;
    }

    fn set_mouse_down(&mut self, down: bool) {
        self.mouse_down = down;
    }

    fn mark_just_pressed(&mut self) {
        self.mouse_just_pressed = true;
    }

    fn mark_just_released(&mut self) {
        self.mouse_just_released = true;
    }

    fn add_scroll_lines(&mut self, lines: i32) {
        self.scroll_delta_y = self.scroll_delta_y.saturating_add(lines);
    }

    fn request_copy(&mut self) {
        self.clipboard_copy_requested = true;
    }

    fn request_select_all(&mut self) {
        self.select_all_requested = true;
    }

    fn deliver_paste(&mut self, text: &str) {
        self.clipboard_text = Some(text.to_string());
        self.clipboard_paste_requested = true;
    }
}

/// A simulation call captured for later delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimCall {
    KeyDown(i32),
    KeyUp(i32),
    ShiftDown,
    ShiftUp,
}

/// Captures simulation calls so they can be replayed once the caller has
/// released its own state (the simulation may call back into the client).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CallQueue {
    pub calls: Vec<SimCall>,
}

impl CallQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replay(self, sim: &mut dyn Simulation) {
        for call in self.calls {
            match call {
                SimCall::KeyDown(key) => sim.on_key_down(key),
                SimCall::KeyUp(key) => sim.on_key_up(key),
                SimCall::ShiftDown => sim.on_shift_down(),
                SimCall::ShiftUp => sim.on_shift_up(),
            }
        }
    }
}

impl Simulation for CallQueue {
    fn on_key_down(&mut self, tagged_key: i32) {
        self.calls.push(SimCall::KeyDown(tagged_key));
    }

    fn on_key_up(&mut self, tagged_key: i32) {
        self.calls.push(SimCall::KeyUp(tagged_key));
    }

    fn on_shift_down(&mut self) {
        self.calls.push(SimCall::ShiftDown);
    }

    fn on_shift_up(&mut self) {
        self.calls.push(SimCall::ShiftUp);
    }
}
