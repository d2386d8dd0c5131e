//! Patch — a set of layers describing one effect, and its renderer.

use crate::dsp::automation::ParamTimeline;
use crate::dsp::filter::{BiquadFilter, FilterType};
use crate::dsp::mixer::Mixer;
use crate::dsp::noise::NoiseBuffer;
use crate::dsp::oscillator::{Oscillator, Waveform};

/// What feeds a layer.
#[derive(Debug, Clone)]
pub enum Source {
    /// An oscillator whose pitch follows a timeline (seconds from layer start).
    Tone {
        waveform: Waveform,
        frequency: ParamTimeline,
    },
    /// A one-shot noise buffer; the layer ends with the buffer.
    Noise(NoiseBuffer),
}

/// A filter between the source and the layer gain.
#[derive(Debug, Clone)]
pub struct FilterStage {
    pub filter_type: FilterType,
    pub frequency: ParamTimeline,
    pub q: f64,
}

impl FilterStage {
    pub fn fixed(filter_type: FilterType, frequency: f64) -> Self {
        FilterStage {
            filter_type,
            frequency: ParamTimeline::constant(frequency),
            q: 1.0,
        }
    }

    pub fn with_q(mut self, q: f64) -> Self {
        self.q = q;
        self
    }
}

/// source -> filter -> gain, scheduled at `start` for the patch.
///
/// All timelines inside a layer are relative to the layer's own start.
#[derive(Debug, Clone)]
pub struct Layer {
    pub source: Source,
    pub filter: Option<FilterStage>,
    pub gain: ParamTimeline,
    pub start: f64,
    /// Stop time relative to the layer start. Noise layers also stop when
    /// their buffer runs out.
    pub stop: Option<f64>,
}

impl Layer {
    pub fn tone(waveform: Waveform, frequency: ParamTimeline, gain: ParamTimeline) -> Self {
        Layer {
            source: Source::Tone {
                waveform,
                frequency,
            },
            filter: None,
            gain,
            start: 0.0,
            stop: None,
        }
    }

    pub fn noise(buffer: NoiseBuffer, gain: ParamTimeline) -> Self {
        Layer {
            source: Source::Noise(buffer),
            filter: None,
            gain,
            start: 0.0,
            stop: None,
        }
    }

    pub fn filtered(mut self, filter: FilterStage) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn starting_at(mut self, start: f64) -> Self {
        self.start = start;
        self
    }

    pub fn stopping_at(mut self, stop: f64) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Number of samples this layer produces.
    pub fn len_samples(&self, sample_rate: f64) -> usize {
        let stop = self
            .stop
            .map(|s| (s.max(0.0) * sample_rate).round() as usize);
        match (&self.source, stop) {
            (Source::Noise(buf), Some(stop)) => buf.len().min(stop),
            (Source::Noise(buf), None) => buf.len(),
            (Source::Tone { .. }, Some(stop)) => stop,
            // An unstopped tone would ring forever; fall back to its envelope.
            (Source::Tone { .. }, None) => {
                (self.gain.last_event_time() * sample_rate).round() as usize
            }
        }
    }

    /// Render this layer into `mixer`, offset by its start time.
    pub fn render_into(&self, mixer: &mut Mixer, sample_rate: f64) {
        let len = self.len_samples(sample_rate);
        let offset = (self.start.max(0.0) * sample_rate).round() as usize;
        mixer.reserve_len(offset + len);

        let mut osc = match &self.source {
            Source::Tone { waveform, .. } => Some(Oscillator::new(*waveform, sample_rate)),
            Source::Noise(_) => None,
        };
        let mut filter = self.filter.as_ref().map(|stage| {
            let mut f = BiquadFilter::new(stage.filter_type, sample_rate);
            f.set_q(stage.q);
            f
        });

        for i in 0..len {
            let t = i as f64 / sample_rate;
            let raw = match &self.source {
                Source::Tone { frequency, .. } => osc.as_mut().map_or(0.0, |osc| {
                    osc.set_frequency(frequency.value_at(t));
                    osc.next_sample()
                }),
                Source::Noise(buf) => buf.get(i),
            };
            let shaped = match (filter.as_mut(), self.filter.as_ref()) {
                (Some(f), Some(stage)) => {
                    f.set_frequency(stage.frequency.value_at(t));
                    f.process(raw)
                }
                _ => raw,
            };
            mixer.add(offset + i, shaped * self.gain.value_at(t));
        }
    }
}

/// One complete effect.
#[derive(Debug, Clone, Default)]
pub struct Patch {
    pub layers: Vec<Layer>,
}

impl Patch {
    pub fn new(layers: Vec<Layer>) -> Self {
        Patch { layers }
    }

    /// Total length in seconds, including each layer's start offset.
    pub fn duration(&self, sample_rate: f64) -> f64 {
        self.layers
            .iter()
            .map(|l| l.start + l.len_samples(sample_rate) as f64 / sample_rate)
            .fold(0.0, f64::max)
    }

    /// Mix all layers at `master_gain` into `f32` samples.
    pub fn render(&self, sample_rate: f64, master_gain: f64) -> Vec<f32> {
        let mut mixer = Mixer::new(master_gain);
        for layer in &self.layers {
            layer.render_into(&mut mixer, sample_rate);
        }
        mixer.output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const SR: f64 = 8000.0;

    #[test]
    fn tone_layer_length_follows_stop() {
        let layer = Layer::tone(
            Waveform::Sine,
            ParamTimeline::constant(440.0),
            ParamTimeline::constant(1.0),
        )
        .stopping_at(0.2);
        assert_eq!(layer.len_samples(SR), 1600);
    }

    #[test]
    fn noise_layer_ends_with_its_buffer() {
        let mut rng = Pcg32::seed_from_u64(5);
        let buf = NoiseBuffer::white(&mut rng, SR, 0.05);
        let layer = Layer::noise(buf, ParamTimeline::constant(1.0)).stopping_at(1.0);
        assert_eq!(layer.len_samples(SR), 400);
    }

    #[test]
    fn start_offset_delays_the_layer() {
        let layer = Layer::tone(
            Waveform::Square,
            ParamTimeline::constant(1000.0),
            ParamTimeline::constant(1.0),
        )
        .starting_at(0.1)
        .stopping_at(0.1);
        let patch = Patch::new(vec![layer]);
        let out = patch.render(SR, 1.0);
        assert_eq!(out.len(), 1600);
        assert!(out[..800].iter().all(|&s| s == 0.0));
        assert!(out[800..].iter().any(|&s| s.abs() > 0.1));
        assert!((patch.duration(SR) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn gain_timeline_shapes_output() {
        let gain = ParamTimeline::new(1.0)
            .set_value_at_time(1.0, 0.0)
            .linear_ramp_to(0.0, 0.1);
        let layer = Layer::tone(Waveform::Square, ParamTimeline::constant(500.0), gain)
            .stopping_at(0.1);
        let out = Patch::new(vec![layer]).render(SR, 1.0);
        let head = out[..100].iter().map(|s| s.abs()).fold(0.0, f32::max);
        let tail = out[700..].iter().map(|s| s.abs()).fold(0.0, f32::max);
        assert!(head > tail * 4.0, "head {head} tail {tail}");
    }

    #[test]
    fn empty_patch_renders_nothing() {
        let patch = Patch::default();
        assert!(patch.render(SR, 1.0).is_empty());
        assert_eq!(patch.duration(SR), 0.0);
    }
}
