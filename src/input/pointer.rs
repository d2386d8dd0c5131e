//! Mouse and wheel routing onto the host flags.

use super::EventResponse;
use super::host::HostBridge;

/// Converts canvas pointer events into host flag updates.
#[derive(Debug, Clone, Copy)]
pub struct PointerRouter {
    pixels_per_line: f64,
}

impl Default for PointerRouter {
    fn default() -> Self {
        Self::new(40.0)
    }
}

impl PointerRouter {
    pub fn new(pixels_per_line: f64) -> Self {
        PointerRouter { pixels_per_line }
    }

    pub fn mouse_down(&mut self, client_x: f64, client_y: f64, host: &mut dyn HostBridge) {
        let (x, y) = pixel(client_x, client_y);
        host.set_mouse_position(x, y);
        host.set_mouse_down(true);
        host.mark_just_pressed();
    }

    pub fn mouse_up(&mut self, host: &mut dyn HostBridge) {
        host.set_mouse_down(false);
        host.mark_just_released();
    }

    pub fn mouse_move(&mut self, client_x: f64, client_y: f64, host: &mut dyn HostBridge) {
        let (x, y) = pixel(client_x, client_y);
        host.set_mouse_position(x, y);
    }

    /// Wheel deltas become whole lines; positive scrolls down. The page must
    /// not scroll under the canvas, so the event is always consumed.
    pub fn wheel(&mut self, delta_y: f64, host: &mut dyn HostBridge) -> EventResponse {
        let lines = wheel_lines(delta_y, self.pixels_per_line);
        if lines != 0 {
            host.add_scroll_lines(lines);
        }
        EventResponse::CONSUME
    }
}

fn pixel(client_x: f64, client_y: f64) -> (i32, i32) {
    (client_x.floor() as i32, client_y.floor() as i32)
}

/// `sign(dy) * ceil(|dy| / pixels_per_line)`; any movement is at least a line.
pub fn wheel_lines(delta_y: f64, pixels_per_line: f64) -> i32 {
    if delta_y == 0.0 || !delta_y.is_finite() || pixels_per_line <= 0.0 {
        return 0;
    }
    let lines = (delta_y.abs() / pixels_per_line).ceil();
    (delta_y.signum() * lines) as i32
}
