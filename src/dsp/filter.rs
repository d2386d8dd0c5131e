//! Second-order IIR filter shaping the noise and tone layers.

use std::f64::consts::PI;

/// Filter response shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    Lowpass,
    Highpass,
}

/// A biquad in Direct Form II Transposed.
///
/// Coefficients follow the Audio EQ Cookbook and are rebuilt lazily when the
/// cutoff or Q moves, which lets recipes sweep the cutoff every sample.
/// Q is the resonance peak in dB, as `BiquadFilterNode` reads it for these
/// two shapes: Q 0 gives unity gain at the cutoff.
#[derive(Debug, Clone)]
pub struct BiquadFilter {
    pub filter_type: FilterType,
    frequency: f64,
    q: f64,
    sample_rate: f64,

    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,

    z1: f64,
    z2: f64,

    dirty: bool,
}

impl BiquadFilter {
    pub fn new(filter_type: FilterType, sample_rate: f64) -> Self {
        BiquadFilter {
            filter_type,
            frequency: 350.0,
            q: 1.0,
            sample_rate,
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            z1: 0.0,
            z2: 0.0,
            dirty: true,
        }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn set_frequency(&mut self, frequency: f64) {
        if frequency != self.frequency {
            self.frequency = frequency;
            self.dirty = true;
        }
    }

    pub fn set_q(&mut self, q: f64) {
        if q != self.q {
            self.q = q;
            self.dirty = true;
        }
    }

    fn rebuild(&mut self) {
        let nyquist = self.sample_rate / 2.0;
        let cutoff = self.frequency.clamp(1.0, nyquist * 0.999);
        let w0 = 2.0 * PI * cutoff / self.sample_rate;
        let (sin_w0, cos_w0) = w0.sin_cos();
        let alpha = sin_w0 / (2.0 * 10f64.powf(self.q / 20.0));

        let (b0, b1, b2) = match self.filter_type {
            FilterType::Lowpass => {
                let b1 = 1.0 - cos_w0;
                (b1 / 2.0, b1, b1 / 2.0)
            }
            FilterType::Highpass => {
                let b1 = -(1.0 + cos_w0);
                (-b1 / 2.0, b1, -b1 / 2.0)
            }
        };
        let a0 = 1.0 + alpha;

        self.b0 = b0 / a0;
        self.b1 = b1 / a0;
        self.b2 = b2 / a0;
        self.a1 = (-2.0 * cos_w0) / a0;
        self.a2 = (1.0 - alpha) / a0;
        self.dirty = false;
    }

    /// Filter one sample.
    pub fn process(&mut self, input: f64) -> f64 {
        if self.dirty {
            self.rebuild();
        }

        let out = self.b0 * input + self.z1;
        self.z1 = self.b1 * input - self.a1 * out + self.z2;
        self.z2 = self.b2 * input - self.a2 * out;
        out
    }
}
