pub mod config;
pub mod dsp;
pub mod error;
pub mod input;
pub mod logging;
pub mod sfx;
#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::config::AudioConfig;
use crate::error::ClientError;
use crate::sfx::{RenderedSound, SoundBank};
use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the shell version string.
#[wasm_bindgen]
pub fn shell_version() -> String {
    VERSION.to_string()
}

/// Render one effect offline with a fixed seed, outside any audio context.
pub fn render_sound(id: u32, sample_rate: u32, seed: u64) -> Result<RenderedSound, ClientError> {
    if sample_rate == 0 {
        return Err(ClientError::InvalidConfig("sample rate must be non-zero".into()));
    }
    let mut bank = SoundBank::new(AudioConfig {
        seed: Some(seed),
        ..AudioConfig::default()
    });
    bank.unlock(sample_rate, None);
    bank.render_id(id)?
        .ok_or_else(|| ClientError::Audio("sound bank produced no output".into()))
}

/// WASM-exposed: render an effect to mono f32 samples, for an AudioWorklet
/// or a custom player.
#[wasm_bindgen]
pub fn render_sound_samples(id: u32, sample_rate: u32, seed: u64) -> Result<Vec<f32>, JsValue> {
    render_sound(id, sample_rate, seed)
        .map(|r| r.samples)
        .map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: render an effect to a WAV byte array for auditioning.
#[wasm_bindgen]
pub fn render_sound_wav(id: u32, sample_rate: u32, seed: u64) -> Result<Vec<u8>, JsValue> {
    let rendered = render_sound(id, sample_rate, seed).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    Ok(dsp::wav::encode_wav_mono(&rendered.samples, rendered.sample_rate))
}
