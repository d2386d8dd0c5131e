//! SoundBank — lazily unlocked renderer that owns the noise generator.

use log::{debug, info};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::config::AudioConfig;
use crate::error::Result;

use super::recipes::patch_for;
use super::{SoundSink, SoundType};

/// Fallback seed when the host supplies neither a configured nor a random one.
const DEFAULT_SEED: u64 = 0x00d1_ce5e_ed00;

/// A finished effect, ready to copy into an `AudioBuffer`.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSound {
    pub sound: SoundType,
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

impl RenderedSound {
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Audio state created on the first user gesture.
#[derive(Debug)]
struct AudioState {
    sample_rate: u32,
    rng: Pcg32,
}

#[derive(Debug)]
pub struct SoundBank {
    config: AudioConfig,
    state: Option<AudioState>,
    /// Effects rendered through the `SoundSink` seam, waiting to be played.
    queue: Vec<RenderedSound>,
}

impl SoundBank {
    pub fn new(config: AudioConfig) -> Self {
        SoundBank {
            config,
            state: None,
            queue: Vec::new(),
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.state.is_some()
    }

    pub fn sample_rate(&self) -> Option<u32> {
        self.state.as_ref().map(|s| s.sample_rate)
    }

    pub fn master_volume(&self) -> f64 {
        self.config.master_volume
    }

    pub fn set_master_volume(&mut self, volume: f64) {
        self.config.master_volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    /// Create the audio state at the output's sample rate. Later calls are
    /// no-ops, matching a context that is only ever created once.
    ///
    /// `entropy` seeds the noise generator when the config has no fixed seed.
    pub fn unlock(&mut self, sample_rate: u32, entropy: Option<u64>) {
        if self.state.is_some() {
            return;
        }
        let seed = self.config.seed.or(entropy).unwrap_or(DEFAULT_SEED);
        self.state = Some(AudioState {
            sample_rate,
            rng: Pcg32::seed_from_u64(seed),
        });
        info!("audio initialized at {sample_rate} Hz");
    }

    /// Render `sound`, or `None` while locked or disabled.
    pub fn render(&mut self, sound: SoundType) -> Option<RenderedSound> {
        if !self.config.enabled {
            debug!("audio disabled, dropping {sound:?}");
            return None;
        }
        let Some(state) = self.state.as_mut() else {
            debug!("audio locked, dropping {sound:?}");
            return None;
        };
        let sr = state.sample_rate as f64;
        let patch = patch_for(sound, &mut state.rng, sr);
        Some(RenderedSound {
            sound,
            sample_rate: state.sample_rate,
            samples: patch.render(sr, self.config.master_volume),
        })
    }

    /// Render by simulation id.
    pub fn render_id(&mut self, id: u32) -> Result<Option<RenderedSound>> {
        let sound = SoundType::try_from(id)?;
        Ok(self.render(sound))
    }

    /// Drain effects requested through [`SoundSink::play`].
    pub fn take_queued(&mut self) -> Vec<RenderedSound> {
        std::mem::take(&mut self.queue)
    }
}

impl SoundSink for SoundBank {
    fn play(&mut self, sound: SoundType) {
        if let Some(rendered) = self.render(sound) {
            self.queue.push(rendered);
        }
    }
}
