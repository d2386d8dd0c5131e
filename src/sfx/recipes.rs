//! The fixed recipe table: one patch builder per sound type.
//!
//! Times are seconds from the trigger. Recipes only differ in their
//! parameters; the noise ones draw fresh noise on every call.

use rand::Rng;

use crate::dsp::automation::ParamTimeline;
use crate::dsp::filter::FilterType;
use crate::dsp::noise::NoiseBuffer;
use crate::dsp::oscillator::Waveform;

use super::patch::{FilterStage, Layer, Patch};
use super::SoundType;

/// B5 then E6, the classic coin interval.
pub const COIN_NOTES: [f64; 2] = [987.77, 1318.51];
pub const COIN_NOTE_LEN: f64 = 0.08;

pub const SWIPE_BASE_LEN: f64 = 0.18;
pub const SWIPE_JITTER: f64 = 0.05;

/// Build the patch for `sound`.
pub fn patch_for<R: Rng>(sound: SoundType, rng: &mut R, sample_rate: f64) -> Patch {
    match sound {
        SoundType::Gold => coin_pickup(),
        SoundType::Move => footstep(rng, sample_rate),
        SoundType::Attack => swipe(rng, sample_rate),
        SoundType::HitReceived => thud(),
        SoundType::Die => descending(),
        // Start and stop reuse the click.
        SoundType::UiClick | SoundType::UiStart | SoundType::UiStop => {
            mouse_click(rng, sample_rate)
        }
        SoundType::KeyType => key_clack(rng, sample_rate),
    }
}

/// Quick two-note square arpeggio.
pub fn coin_pickup() -> Patch {
    let layers = COIN_NOTES
        .iter()
        .enumerate()
        .map(|(i, &freq)| {
            let gain = ParamTimeline::new(1.0)
                .set_value_at_time(0.0, 0.0)
                .linear_ramp_to(0.3, 0.01)
                .exponential_ramp_to(0.01, COIN_NOTE_LEN * 1.5);
            Layer::tone(Waveform::Square, ParamTimeline::constant(freq), gain)
                .starting_at(i as f64 * COIN_NOTE_LEN)
                .stopping_at(COIN_NOTE_LEN * 2.0)
        })
        .collect();
    Patch::new(layers)
}

/// Crisp 30 ms burst of highpassed noise.
pub fn footstep<R: Rng>(rng: &mut R, sample_rate: f64) -> Patch {
    let noise = NoiseBuffer::decaying(rng, sample_rate, 0.03, 0.15);
    Patch::new(vec![
        Layer::noise(noise, ParamTimeline::constant(0.4))
            .filtered(FilterStage::fixed(FilterType::Highpass, 1500.0)),
    ])
}

/// Sword swoosh: a highpass sweep over noise with a slightly random length
/// and starting cutoff, so repeated attacks never sound identical.
pub fn swipe<R: Rng>(rng: &mut R, sample_rate: f64) -> Patch {
    let duration = SWIPE_BASE_LEN + rng.random_range(-SWIPE_JITTER..SWIPE_JITTER);
    let start_cutoff = 4000.0 + rng.random::<f64>() * 1000.0;

    let air = NoiseBuffer::white(rng, sample_rate, duration);
    let cutoff = ParamTimeline::new(start_cutoff)
        .set_value_at_time(start_cutoff, 0.0)
        .exponential_ramp_to(100.0, duration);
    let gain = ParamTimeline::new(1.0)
        .set_value_at_time(0.0, 0.0)
        .linear_ramp_to(0.8, 0.02)
        .set_target_at_time(0.0, 0.02, duration / 3.0);

    Patch::new(vec![
        Layer::noise(air, gain)
            .filtered(FilterStage {
                filter_type: FilterType::Highpass,
                frequency: cutoff,
                q: 1.0,
            })
            .stopping_at(duration + 0.2),
    ])
}

/// Blunt hit: a muffled triangle with a fast pitch drop.
pub fn thud() -> Patch {
    let pitch = ParamTimeline::new(150.0)
        .set_value_at_time(150.0, 0.0)
        .exponential_ramp_to(40.0, 0.15);
    let gain = ParamTimeline::new(1.0)
        .set_value_at_time(0.8, 0.0)
        .exponential_ramp_to(0.01, 0.15);
    Patch::new(vec![
        Layer::tone(Waveform::Triangle, pitch, gain)
            .filtered(FilterStage::fixed(FilterType::Lowpass, 300.0))
            .stopping_at(0.2),
    ])
}

/// One-second falling sawtooth for a death.
pub fn descending() -> Patch {
    let pitch = ParamTimeline::new(400.0)
        .set_value_at_time(400.0, 0.0)
        .linear_ramp_to(50.0, 1.0);
    let gain = ParamTimeline::new(1.0)
        .set_value_at_time(0.3, 0.0)
        .linear_ramp_to(0.0, 1.0);
    Patch::new(vec![
        Layer::tone(Waveform::Sawtooth, pitch, gain).stopping_at(1.0),
    ])
}

/// Very short, sharp highpassed noise burst.
pub fn mouse_click<R: Rng>(rng: &mut R, sample_rate: f64) -> Patch {
    let noise = NoiseBuffer::decaying(rng, sample_rate, 0.02, 0.08);
    Patch::new(vec![
        Layer::noise(noise, ParamTimeline::constant(1.5))
            .filtered(FilterStage::fixed(FilterType::Highpass, 800.0)),
    ])
}

/// Plastic keyboard switch: like the click, lower and duller.
pub fn key_clack<R: Rng>(rng: &mut R, sample_rate: f64) -> Patch {
    let noise = NoiseBuffer::decaying(rng, sample_rate, 0.025, 0.15);
    Patch::new(vec![
        Layer::noise(noise, ParamTimeline::constant(1.6))
            .filtered(FilterStage::fixed(FilterType::Lowpass, 600.0).with_q(0.5)),
    ])
}
