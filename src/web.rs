//! Browser glue: DOM listeners, window host flags and Web Audio output.
//!
//! Router state lives in `Cell`s and the audio in a `RefCell` that is never
//! held across a call into the simulation, so the simulation may call back
//! into the client (for example to play a sound) from inside a key handler.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::{Array, Function, Reflect};
use log::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, AudioContext, AudioContextState, ClipboardEvent, Event, EventTarget,
    HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent, Window,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::input::{
    CallQueue, EventResponse, HostBridge, KeyEvent, KeyboardRouter, PointerRouter, Simulation,
};
use crate::logging;
use crate::sfx::{SoundBank, SoundSink, SoundType};

type Listener = Closure<dyn FnMut(Event)>;

fn js_error(e: ClientError) -> JsValue {
    JsValue::from_str(&format!("{e}"))
}

fn audio_error(e: JsValue) -> ClientError {
    ClientError::Audio(format!("{e:?}"))
}

fn browser_window() -> Result<Window> {
    web_sys::window().ok_or_else(|| ClientError::Dom("no global window".into()))
}

/// The simulation module as seen from JS: an object with `_on_*` exports.
struct JsSimulation {
    module: JsValue,
}

impl JsSimulation {
    /// Ask the page for the module; `null`/`undefined` means not loaded yet.
    fn current(get_module: &Function) -> Option<Self> {
        match get_module.call0(&JsValue::NULL) {
            Ok(module) if !module.is_null() && !module.is_undefined() => {
                Some(JsSimulation { module })
            }
            Ok(_) => None,
            Err(e) => {
                warn!("getWasmModule threw: {e:?}");
                None
            }
        }
    }

    fn call(&self, export: &str, arg: Option<i32>) {
        let Some(func) = Reflect::get(&self.module, &JsValue::from_str(export))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
        else {
            debug!("simulation has no {export} export");
            return;
        };
        let result = match arg {
            Some(v) => func.call1(&self.module, &JsValue::from(v)),
            None => func.call0(&self.module),
        };
        if let Err(e) = result {
            warn!("{export} threw: {e:?}");
        }
    }
}

impl Simulation for JsSimulation {
    fn on_key_down(&mut self, tagged_key: i32) {
        self.call("_on_key_down", Some(tagged_key));
    }

    fn on_key_up(&mut self, tagged_key: i32) {
        self.call("_on_key_up", Some(tagged_key));
    }

    fn on_shift_down(&mut self) {
        self.call("_on_shift_down", None);
    }

    fn on_shift_up(&mut self) {
        self.call("_on_shift_up", None);
    }
}

/// Host flags published as window globals, where the simulation reads them.
struct WindowHost {
    window: Window,
}

impl WindowHost {
    fn set(&self, name: &str, value: &JsValue) {
        if Reflect::set(&self.window, &JsValue::from_str(name), value).is_err() {
            warn!("could not publish window.{name}");
        }
    }

    fn set_flag(&self, name: &str, on: bool) {
        self.set(name, &JsValue::from(i32::from(on)));
    }
}

impl HostBridge for WindowHost {
    fn set_mouse_position(&mut self, x: i32, y: i32) {
        self.set("mouseX", &JsValue::from(x));
        self.set("mouseY", &JsValue::from(y));
    }

    fn set_mouse_down(&mut self, down: bool) {
        self.set_flag("mouseDown", down);
    }

    fn mark_just_pressed(&mut self) {
        self.set_flag("mouseJustPressed", true);
    }

    fn mark_just_released(&mut self) {
        self.set_flag("mouseJustReleased", true);
    }

    fn add_scroll_lines(&mut self, lines: i32) {
        // The simulation zeroes this when it consumes it.
        let pending = Reflect::get(&self.window, &JsValue::from_str("scrollDeltaY"))
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        self.set("scrollDeltaY", &JsValue::from(pending + lines as f64));
    }

    fn request_copy(&mut self) {
        self.set_flag("clipboardCopyRequested", true);
    }

    fn request_select_all(&mut self) {
        self.set_flag("selectAllRequested", true);
    }

    fn deliver_paste(&mut self, text: &str) {
        self.set("clipboardText", &JsValue::from_str(text));
        self.set_flag("clipboardPasteRequested", true);
    }
}

/// Construct the prefixed context older Safari exposes on `scope`.
fn webkit_context(scope: &JsValue) -> Result<AudioContext> {
    let ctor = Reflect::get(scope, &JsValue::from_str("webkitAudioContext"))
        .ok()
        .and_then(|c| c.dyn_into::<Function>().ok())
        .ok_or_else(|| ClientError::Audio("no AudioContext or webkitAudioContext".into()))?;
    Reflect::construct(&ctor, &Array::new())
        .map(|ctx| ctx.unchecked_into::<AudioContext>())
        .map_err(audio_error)
}

/// The single, lazily created audio context and the renderer feeding it.
struct WebAudio {
    ctx: Option<AudioContext>,
    bank: SoundBank,
    unavailable: bool,
}

impl WebAudio {
    fn init(&mut self) {
        if self.ctx.is_some() || self.unavailable {
            return;
        }
        let created = AudioContext::new().or_else(|e| {
            debug!("AudioContext failed ({e:?}), trying webkitAudioContext");
            browser_window().and_then(|window| webkit_context(&window))
        });
        match created {
            Ok(ctx) => {
                let entropy = (js_sys::Math::random() * u64::MAX as f64) as u64;
                self.bank.unlock(ctx.sample_rate() as u32, Some(entropy));
                self.ctx = Some(ctx);
            }
            Err(e) => {
                warn!("Web Audio unavailable, sounds disabled: {e:?}");
                self.unavailable = true;
            }
        }
    }

    fn play_sound(&mut self, sound: SoundType) -> Result<()> {
        self.init();
        let Some(ctx) = self.ctx.as_ref() else {
            return Ok(());
        };
        if ctx.state() == AudioContextState::Suspended {
            // Playback starts once the browser honours the resume.
            let _ = ctx.resume().map_err(audio_error)?;
        }
        let Some(rendered) = self.bank.render(sound) else {
            return Ok(());
        };
        if rendered.samples.is_empty() {
            return Ok(());
        }

        let buffer = ctx
            .create_buffer(1, rendered.samples.len() as u32, rendered.sample_rate as f32)
            .map_err(audio_error)?;
        buffer
            .copy_to_channel(&rendered.samples, 0)
            .map_err(audio_error)?;
        let source = ctx.create_buffer_source().map_err(audio_error)?;
        source.set_buffer(Some(&buffer));
        source
            .connect_with_audio_node(&ctx.destination())
            .map_err(audio_error)?;
        source.start().map_err(audio_error)?;
        Ok(())
    }
}

impl SoundSink for WebAudio {
    fn play(&mut self, sound: SoundType) {
        if let Err(e) = self.play_sound(sound) {
            warn!("{sound:?}: {e}");
        }
    }
}

struct Shared {
    keyboard: Cell<KeyboardRouter>,
    pointer: Cell<PointerRouter>,
    audio: RefCell<WebAudio>,
    window: Window,
}

impl Shared {
    fn host(&self) -> WindowHost {
        WindowHost {
            window: self.window.clone(),
        }
    }

    fn play_all(&self, sounds: Vec<SoundType>) {
        if sounds.is_empty() {
            return;
        }
        match self.audio.try_borrow_mut() {
            Ok(mut audio) => sounds.into_iter().for_each(|s| audio.play(s)),
            Err(_) => debug!("audio busy, dropping {sounds:?}"),
        }
    }

    fn key_down(&self, event: &KeyboardEvent, get_module: &Function) -> EventResponse {
        let sim = JsSimulation::current(get_module);
        let mut calls = CallQueue::new();
        let mut sounds = Vec::new();
        let mut router = self.keyboard.get();
        let resp = router.key_down(
            &key_event(event),
            sim.is_some().then_some(&mut calls as &mut dyn Simulation),
            &mut self.host(),
            &mut sounds,
        );
        self.keyboard.set(router);
        self.play_all(sounds);
        if let Some(mut sim) = sim {
            calls.replay(&mut sim);
        }
        resp
    }

    fn key_up(&self, event: &KeyboardEvent, get_module: &Function) -> EventResponse {
        let sim = JsSimulation::current(get_module);
        let mut calls = CallQueue::new();
        let mut router = self.keyboard.get();
        let resp = router.key_up(
            &key_event(event),
            sim.is_some().then_some(&mut calls as &mut dyn Simulation),
        );
        self.keyboard.set(router);
        if let Some(mut sim) = sim {
            calls.replay(&mut sim);
        }
        resp
    }
}

fn key_event(event: &KeyboardEvent) -> KeyEvent {
    KeyEvent {
        key: event.key(),
        code: event.code(),
        ctrl: event.ctrl_key(),
        meta: event.meta_key(),
    }
}

fn apply(event: &Event, resp: EventResponse) {
    if resp.prevent_default {
        event.prevent_default();
    }
}

/// A registered DOM listener, removed again when the client is dropped.
struct Registration {
    target: EventTarget,
    kind: &'static str,
    listener: Listener,
}

/// Browser entry point: wires input listeners and plays sound effects.
#[wasm_bindgen]
pub struct WebClient {
    shared: Rc<Shared>,
    registrations: Vec<Registration>,
}

#[wasm_bindgen]
impl WebClient {
    /// `config` is an optional object; see `ClientConfig` for the fields.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> std::result::Result<WebClient, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            ClientConfig::default()
        } else {
            serde_wasm_bindgen::from_value::<ClientConfig>(config)
                .map_err(|e| js_error(ClientError::InvalidConfig(e.to_string())))?
        };
        config.validate().map_err(js_error)?;
        logging::init(config.level_filter().map_err(js_error)?);

        let window = browser_window().map_err(js_error)?;
        let shared = Rc::new(Shared {
            keyboard: Cell::new(KeyboardRouter::new(config.input.key_click_sound)),
            pointer: Cell::new(PointerRouter::new(config.input.wheel_pixels_per_line)),
            audio: RefCell::new(WebAudio {
                ctx: None,
                bank: SoundBank::new(config.audio.clone()),
                unavailable: false,
            }),
            window: window.clone(),
        });

        let mut client = WebClient {
            shared,
            registrations: Vec::new(),
        };
        client.install_audio_unlock(&window)?;
        Ok(client)
    }

    /// Listen for keys and paste on the document. `get_module` returns the
    /// simulation module or `null` while it is still loading.
    #[wasm_bindgen(js_name = attachKeyboard)]
    pub fn attach_keyboard(&mut self, get_module: Function) -> std::result::Result<(), JsValue> {
        let document = self
            .shared
            .window
            .document()
            .ok_or_else(|| js_error(ClientError::Dom("no document".into())))?;
        let target: EventTarget = document.into();

        let shared = Rc::clone(&self.shared);
        let module = get_module.clone();
        self.listen(&target, "keydown", None, move |event: Event| {
            if let Some(ke) = event.dyn_ref::<KeyboardEvent>() {
                apply(&event, shared.key_down(ke, &module));
            }
        })?;

        let shared = Rc::clone(&self.shared);
        let module = get_module;
        self.listen(&target, "keyup", None, move |event: Event| {
            if let Some(ke) = event.dyn_ref::<KeyboardEvent>() {
                apply(&event, shared.key_up(ke, &module));
            }
        })?;

        let shared = Rc::clone(&self.shared);
        self.listen(&target, "paste", None, move |event: Event| {
            let text = event
                .dyn_ref::<ClipboardEvent>()
                .and_then(ClipboardEvent::clipboard_data)
                .and_then(|data| data.get_data("text").ok());
            let mut router = shared.keyboard.get();
            let resp = router.paste(text.as_deref(), &mut shared.host());
            shared.keyboard.set(router);
            apply(&event, resp);
        })?;

        Ok(())
    }

    /// Listen for mouse buttons, motion and the wheel on the canvas.
    #[wasm_bindgen(js_name = attachMouse)]
    pub fn attach_mouse(&mut self, canvas: HtmlCanvasElement) -> std::result::Result<(), JsValue> {
        let target: EventTarget = canvas.into();

        let shared = Rc::clone(&self.shared);
        self.listen(&target, "mousedown", None, move |event: Event| {
            if let Some(me) = event.dyn_ref::<MouseEvent>() {
                let mut router = shared.pointer.get();
                router.mouse_down(me.client_x() as f64, me.client_y() as f64, &mut shared.host());
            }
        })?;

        let shared = Rc::clone(&self.shared);
        self.listen(&target, "mouseup", None, move |_event: Event| {
            let mut router = shared.pointer.get();
            router.mouse_up(&mut shared.host());
        })?;

        let shared = Rc::clone(&self.shared);
        self.listen(&target, "mousemove", None, move |event: Event| {
            if let Some(me) = event.dyn_ref::<MouseEvent>() {
                let mut router = shared.pointer.get();
                router.mouse_move(me.client_x() as f64, me.client_y() as f64, &mut shared.host());
            }
        })?;

        // Must be non-passive or preventDefault is ignored and the page scrolls.
        let options = AddEventListenerOptions::new();
        options.set_passive(false);
        let shared = Rc::clone(&self.shared);
        self.listen(&target, "wheel", Some(&options), move |event: Event| {
            if let Some(we) = event.dyn_ref::<WheelEvent>() {
                let mut router = shared.pointer.get();
                apply(&event, router.wheel(we.delta_y(), &mut shared.host()));
            }
        })?;

        Ok(())
    }

    /// Play a sound effect by simulation id. Unknown ids are ignored.
    pub fn play(&self, id: u32) {
        let sound = match SoundType::try_from(id) {
            Ok(sound) => sound,
            Err(e) => {
                debug!("{e}");
                return;
            }
        };
        self.shared.play_all(vec![sound]);
    }

    #[wasm_bindgen(js_name = isShiftHeld)]
    pub fn is_shift_held(&self) -> bool {
        self.shared.keyboard.get().is_shift_held()
    }

    #[wasm_bindgen(js_name = setMasterVolume)]
    pub fn set_master_volume(&self, volume: f64) {
        if let Ok(mut audio) = self.shared.audio.try_borrow_mut() {
            audio.bank.set_master_volume(volume);
        }
    }

    #[wasm_bindgen(getter, js_name = masterVolume)]
    pub fn master_volume(&self) -> f64 {
        self.shared
            .audio
            .try_borrow()
            .map(|audio| audio.bank.master_volume())
            .unwrap_or(0.0)
    }
}

impl WebClient {
    /// Browsers only allow an audio context after a user gesture, so create
    /// it on the first click or key press.
    fn install_audio_unlock(&mut self, window: &Window) -> std::result::Result<(), JsValue> {
        let target: EventTarget = window.clone().into();
        let options = AddEventListenerOptions::new();
        options.set_once(true);
        for kind in ["click", "keydown"] {
            let shared = Rc::clone(&self.shared);
            self.listen(&target, kind, Some(&options), move |_event: Event| {
                if let Ok(mut audio) = shared.audio.try_borrow_mut() {
                    audio.init();
                }
            })?;
        }
        Ok(())
    }

    fn listen(
        &mut self,
        target: &EventTarget,
        kind: &'static str,
        options: Option<&AddEventListenerOptions>,
        handler: impl FnMut(Event) + 'static,
    ) -> std::result::Result<(), JsValue> {
        let listener: Listener = Closure::new(handler);
        let callback = listener.as_ref().unchecked_ref();
        match options {
            Some(options) => target
                .add_event_listener_with_callback_and_add_event_listener_options(
                    kind, callback, options,
                )?,
            None => target.add_event_listener_with_callback(kind, callback)?,
        }
        self.registrations.push(Registration {
            target: target.clone(),
            kind,
            listener,
        });
        Ok(())
    }
}

impl Drop for WebClient {
    fn drop(&mut self) {
        for reg in self.registrations.drain(..) {
            let _ = reg
                .target
                .remove_event_listener_with_callback(reg.kind, reg.listener.as_ref().unchecked_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use js_sys::{JSON, Object};
    use wasm_bindgen_test::*;
    use web_sys::{KeyboardEventInit, WheelEventInit};

    wasm_bindgen_test_configure!(run_in_browser);

    fn window() -> Window {
        web_sys::window().unwrap()
    }

    fn global(name: &str) -> JsValue {
        Reflect::get(&window(), &JsValue::from_str(name)).unwrap()
    }

    fn set_global(name: &str, value: &JsValue) {
        Reflect::set(&window(), &JsValue::from_str(name), value).unwrap();
    }

    fn config(json: &str) -> JsValue {
        JSON::parse(json).unwrap()
    }

    /// A module object whose `_on_key_down` records its argument as `last`.
    fn recording_module() -> Object {
        let module = Object::new();
        let export = Function::new_with_args("k", "this.last = k;");
        Reflect::set(&module, &JsValue::from_str("_on_key_down"), &export).unwrap();
        module
    }

    fn key(kind: &str, key: &str, code: &str) -> KeyboardEvent {
        let init = KeyboardEventInit::new();
        init.set_key(key);
        init.set_code(code);
        init.set_cancelable(true);
        KeyboardEvent::new_with_keyboard_event_init_dict(kind, &init).unwrap()
    }

    fn wheel(delta_y: f64) -> WheelEvent {
        let init = WheelEventInit::new();
        init.set_delta_y(delta_y);
        init.set_cancelable(true);
        WheelEvent::new_with_event_init_dict("wheel", &init).unwrap()
    }

    fn canvas() -> HtmlCanvasElement {
        window()
            .document()
            .unwrap()
            .create_element("canvas")
            .unwrap()
            .dyn_into()
            .unwrap()
    }

    #[wasm_bindgen_test]
    fn scroll_lines_add_to_the_pending_window_value() {
        let mut host = WindowHost { window: window() };
        set_global("scrollDeltaY", &JsValue::from(3));
        host.add_scroll_lines(2);
        host.add_scroll_lines(-1);
        assert_eq!(global("scrollDeltaY").as_f64(), Some(4.0));

        set_global("scrollDeltaY", &JsValue::UNDEFINED);
        host.add_scroll_lines(-2);
        assert_eq!(global("scrollDeltaY").as_f64(), Some(-2.0));
    }

    #[wasm_bindgen_test]
    fn host_flags_are_published_as_window_globals() {
        let mut host = WindowHost { window: window() };
        host.set_mouse_position(12, 34);
        host.set_mouse_down(true);
        host.request_select_all();
        host.deliver_paste("gold");
        assert_eq!(global("mouseX").as_f64(), Some(12.0));
        assert_eq!(global("mouseY").as_f64(), Some(34.0));
        assert_eq!(global("mouseDown").as_f64(), Some(1.0));
        assert_eq!(global("selectAllRequested").as_f64(), Some(1.0));
        assert_eq!(global("clipboardText").as_string().as_deref(), Some("gold"));
        assert_eq!(global("clipboardPasteRequested").as_f64(), Some(1.0));
    }

    #[wasm_bindgen_test]
    fn unloaded_module_yields_no_simulation() {
        assert!(JsSimulation::current(&Function::new_no_args("return null;")).is_none());
        assert!(JsSimulation::current(&Function::new_no_args("return undefined;")).is_none());
        assert!(JsSimulation::current(&Function::new_no_args("throw new Error('loading');")).is_none());
        assert!(JsSimulation::current(&Function::new_no_args("return {};")).is_some());
    }

    #[wasm_bindgen_test]
    fn simulation_exports_are_called_on_the_module() {
        let module = recording_module();
        let mut sim = JsSimulation {
            module: module.clone().into(),
        };
        sim.on_key_down(201);
        // No `_on_shift_down` export: skipped without throwing.
        sim.on_shift_down();
        let last = Reflect::get(&module, &JsValue::from_str("last")).unwrap();
        assert_eq!(last.as_f64(), Some(201.0));
    }

    #[wasm_bindgen_test]
    fn prefixed_audio_context_is_constructed_from_scope() {
        let scope = Object::new();
        let ctor = Function::new_no_args("this.prefixed = true;");
        Reflect::set(&scope, &JsValue::from_str("webkitAudioContext"), &ctor).unwrap();
        let ctx = webkit_context(&scope).unwrap();
        let prefixed = Reflect::get(&ctx, &JsValue::from_str("prefixed")).unwrap();
        assert_eq!(prefixed.as_bool(), Some(true));

        let err = webkit_context(&Object::new()).err().unwrap();
        assert!(matches!(err, ClientError::Audio(_)));
    }

    #[wasm_bindgen_test]
    fn client_config_defaults_and_overrides() {
        let client = WebClient::new(JsValue::UNDEFINED).unwrap();
        assert_eq!(client.master_volume(), 0.3);
        assert!(!client.is_shift_held());

        let client = WebClient::new(config(r#"{"audio":{"masterVolume":0.5}}"#)).unwrap();
        assert_eq!(client.master_volume(), 0.5);
    }

    #[wasm_bindgen_test]
    fn bad_client_config_is_rejected() {
        for bad in [
            r#"{"audio":{"masterVolume":"loud"}}"#,
            r#"{"audio":{"masterVolume":-1}}"#,
            r#"{"input":{"wheelPixelsPerLine":0}}"#,
            r#"{"logLevel":"chatty"}"#,
        ] {
            let Err(err) = WebClient::new(config(bad)) else {
                panic!("{bad} should be rejected");
            };
            let message = err.as_string().unwrap_or_default();
            assert!(message.starts_with("invalid config"), "{bad}: {message}");
        }
    }

    #[wasm_bindgen_test]
    fn shift_state_follows_dispatched_keys() {
        let mut client = WebClient::new(JsValue::UNDEFINED).unwrap();
        client
            .attach_keyboard(Function::new_no_args("return null;"))
            .unwrap();
        let document = window().document().unwrap();

        document
            .dispatch_event(&key("keydown", "Shift", "ShiftLeft"))
            .unwrap();
        assert!(client.is_shift_held());
        document
            .dispatch_event(&key("keyup", "Shift", "ShiftLeft"))
            .unwrap();
        assert!(!client.is_shift_held());
    }

    #[wasm_bindgen_test]
    fn mapped_key_reaches_the_loaded_module() {
        let module = recording_module();
        set_global("testSimModule", &module);
        let mut client = WebClient::new(config(r#"{"input":{"keyClickSound":false}}"#)).unwrap();
        client
            .attach_keyboard(Function::new_no_args("return window.testSimModule;"))
            .unwrap();

        let event = key("keydown", "ArrowUp", "ArrowUp");
        window().document().unwrap().dispatch_event(&event).unwrap();
        assert!(event.default_prevented());
        let last = Reflect::get(&module, &JsValue::from_str("last")).unwrap();
        assert_eq!(last.as_f64(), Some(5.0));
    }

    #[wasm_bindgen_test]
    fn wheel_listener_is_non_passive_and_removed_on_drop() {
        set_global("scrollDeltaY", &JsValue::from(0));
        let canvas = canvas();
        let mut client = WebClient::new(JsValue::UNDEFINED).unwrap();
        client.attach_mouse(canvas.clone()).unwrap();

        let event = wheel(80.0);
        canvas.dispatch_event(&event).unwrap();
        assert!(event.default_prevented(), "passive listeners cannot cancel");
        assert_eq!(global("scrollDeltaY").as_f64(), Some(2.0));

        drop(client);
        let event = wheel(80.0);
        canvas.dispatch_event(&event).unwrap();
        assert!(!event.default_prevented());
        assert_eq!(global("scrollDeltaY").as_f64(), Some(2.0));
    }
}
