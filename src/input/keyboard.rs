//! Keyboard routing: shortcuts, shift tracking and key forwarding.

use log::trace;

use crate::sfx::{SoundSink, SoundType};

use super::host::{HostBridge, Simulation};
use super::keymap;
use super::{EventResponse, KeyEvent};

/// Routes key and paste events. The only state is whether shift is held.
#[derive(Debug, Clone, Copy)]
pub struct KeyboardRouter {
    shift_held: bool,
    key_click_sound: bool,
}

impl Default for KeyboardRouter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl KeyboardRouter {
    pub fn new(key_click_sound: bool) -> Self {
        KeyboardRouter {
            shift_held: false,
            key_click_sound,
        }
    }

    pub fn is_shift_held(&self) -> bool {
        self.shift_held
    }

    /// Handle `keydown`. `sim` is `None` until the simulation has loaded.
    pub fn key_down(
        &mut self,
        event: &KeyEvent,
        sim: Option<&mut dyn Simulation>,
        host: &mut dyn HostBridge,
        sounds: &mut dyn SoundSink,
    ) -> EventResponse {
        if event.is_shift() {
            self.shift_held = true;
            if let Some(sim) = sim {
                sim.on_shift_down();
            }
            return EventResponse::PASS;
        }

        if event.command() {
            match event.key.as_str() {
                "c" => {
                    host.request_copy();
                    return EventResponse::CONSUME;
                }
                // The browser follows up with a paste event.
                "v" => return EventResponse::PASS,
                "a" => {
                    host.request_select_all();
                    return EventResponse::CONSUME;
                }
                _ => {}
            }
        }

        match (keymap::lookup(&event.code, &event.key), sim) {
            (Some(key), Some(sim)) => {
                trace!("key down {} -> {}", event.code, key.0);
                if self.key_click_sound {
                    sounds.play(SoundType::KeyType);
                }
                sim.on_key_down(key.tagged());
                EventResponse::CONSUME
            }
            _ => EventResponse::PASS,
        }
    }

    /// Handle `keyup`. Never prevents the default.
    pub fn key_up(&mut self, event: &KeyEvent, sim: Option<&mut dyn Simulation>) -> EventResponse {
        if event.is_shift() {
            self.shift_held = false;
            if let Some(sim) = sim {
                sim.on_shift_up();
            }
            return EventResponse::PASS;
        }

        if let (Some(key), Some(sim)) = (keymap::lookup(&event.code, &event.key), sim) {
            sim.on_key_up(key.tagged());
        }
        EventResponse::PASS
    }

    /// Handle `paste`. Empty or missing text is ignored; the browser's own
    /// paste is always suppressed.
    pub fn paste(&mut self, text: Option<&str>, host: &mut dyn HostBridge) -> EventResponse {
        if let Some(text) = text.filter(|t| !t.is_empty()) {
            host.deliver_paste(text);
        }
        EventResponse::CONSUME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::host::{CallQueue, HostFlags, SimCall};

    struct Rig {
        router: KeyboardRouter,
        sim: CallQueue,
        host: HostFlags,
        sounds: Vec<SoundType>,
    }

    impl Rig {
        fn new() -> Self {
            Rig {
                router: KeyboardRouter::default(),
                sim: CallQueue::new(),
                host: HostFlags::new(),
                sounds: Vec::new(),
            }
        }

        fn down(&mut self, event: KeyEvent) -> EventResponse {
            self.router
                .key_down(&event, Some(&mut self.sim), &mut self.host, &mut self.sounds)
        }

        fn down_unloaded(&mut self, event: KeyEvent) -> EventResponse {
            self.router
                .key_down(&event, None, &mut self.host, &mut self.sounds)
        }

        fn up(&mut self, event: KeyEvent) -> EventResponse {
            self.router.key_up(&event, Some(&mut self.sim))
        }
    }

    #[test]
    fn mapped_key_is_forwarded_tagged_with_a_clack() {
        let mut rig = Rig::new();
        let resp = rig.down(KeyEvent::new("ArrowUp", "ArrowUp"));
        assert_eq!(resp, EventResponse::CONSUME);
        assert_eq!(rig.sim.calls, vec![SimCall::KeyDown(5)]);
        assert_eq!(rig.sounds, vec![SoundType::KeyType]);
    }

    #[test]
    fn key_up_forwards_without_sound_or_prevent() {
        let mut rig = Rig::new();
        let resp = rig.up(KeyEvent::new("q", "KeyQ"));
        assert_eq!(resp, EventResponse::PASS);
        assert_eq!(rig.sim.calls, vec![SimCall::KeyUp(tag_of(116))]);
        assert!(rig.sounds.is_empty());
    }

    fn tag_of(code: i32) -> i32 {
        keymap::tag_int(code)
    }

    #[test]
    fn shift_toggles_state_and_notifies() {
        let mut rig = Rig::new();
        assert_eq!(rig.down(KeyEvent::new("Shift", "ShiftLeft")), EventResponse::PASS);
        assert!(rig.router.is_shift_held());
        rig.up(KeyEvent::new("Shift", "ShiftLeft"));
        assert!(!rig.router.is_shift_held());
        assert_eq!(rig.sim.calls, vec![SimCall::ShiftDown, SimCall::ShiftUp]);
        assert!(rig.sounds.is_empty());
    }

    #[test]
    fn shift_is_tracked_before_simulation_loads() {
        let mut rig = Rig::new();
        rig.down_unloaded(KeyEvent::new("Shift", "ShiftRight"));
        assert!(rig.router.is_shift_held());
        rig.router.key_up(&KeyEvent::new("Shift", "ShiftRight"), None);
        assert!(!rig.router.is_shift_held());
    }

    #[test]
    fn ctrl_c_requests_copy() {
        let mut rig = Rig::new();
        let resp = rig.down(KeyEvent::new("c", "KeyC").with_ctrl());
        assert_eq!(resp, EventResponse::CONSUME);
        assert!(rig.host.clipboard_copy_requested);
        assert!(rig.sim.calls.is_empty());
        assert!(rig.sounds.is_empty());
    }

    #[test]
    fn cmd_a_requests_select_all() {
        let mut rig = Rig::new();
        let resp = rig.down(KeyEvent::new("a", "KeyA").with_meta());
        assert_eq!(resp, EventResponse::CONSUME);
        assert!(rig.host.select_all_requested);
        assert!(rig.sim.calls.is_empty());
    }

    #[test]
    fn ctrl_v_is_left_to_the_browser() {
        let mut rig = Rig::new();
        let resp = rig.down(KeyEvent::new("v", "KeyV").with_ctrl());
        assert_eq!(resp, EventResponse::PASS);
        assert!(rig.sim.calls.is_empty());
        assert_eq!(rig.host, HostFlags::new());
    }

    #[test]
    fn other_ctrl_chords_fall_through_to_mapping() {
        let mut rig = Rig::new();
        rig.down(KeyEvent::new("x", "KeyX").with_ctrl());
        // Uppercase C (shift held) is not the copy shortcut.
        rig.down(KeyEvent::new("C", "KeyC").with_ctrl());
        assert_eq!(
            rig.sim.calls,
            vec![SimCall::KeyDown(tag_of(123)), SimCall::KeyDown(tag_of(102))]
        );
        assert!(!rig.host.clipboard_copy_requested);
    }

    #[test]
    fn unmapped_keys_pass_through() {
        let mut rig = Rig::new();
        assert_eq!(rig.down(KeyEvent::new("F5", "F5")), EventResponse::PASS);
        assert!(rig.sim.calls.is_empty());
        assert!(rig.sounds.is_empty());
    }

    #[test]
    fn mapped_keys_wait_for_the_simulation() {
        let mut rig = Rig::new();
        assert_eq!(rig.down_unloaded(KeyEvent::new("a", "KeyA")), EventResponse::PASS);
        assert!(rig.sounds.is_empty());
    }

    #[test]
    fn click_sound_can_be_disabled() {
        let mut rig = Rig::new();
        rig.router = KeyboardRouter::new(false);
        rig.down(KeyEvent::new("7", "Digit7"));
        assert_eq!(rig.sim.calls, vec![SimCall::KeyDown(tag_of(207))]);
        assert!(rig.sounds.is_empty());
    }

    #[test]
    fn paste_delivers_non_empty_text() {
        let mut rig = Rig::new();
        assert_eq!(rig.router.paste(Some(""), &mut rig.host), EventResponse::CONSUME);
        assert!(!rig.host.clipboard_paste_requested);
        assert_eq!(rig.router.paste(None, &mut rig.host), EventResponse::CONSUME);
        assert!(!rig.host.clipboard_paste_requested);
        rig.router.paste(Some("north"), &mut rig.host);
        assert_eq!(rig.host.take_paste().as_deref(), Some("north"));
    }
}
