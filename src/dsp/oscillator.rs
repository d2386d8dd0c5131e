//! Band-limited tone oscillators for the tonal effect recipes.

use std::f64::consts::TAU;

/// Supported waveform shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// A phase-accumulating oscillator whose pitch may move every sample.
///
/// Square and sawtooth edges are smoothed with PolyBLEP so fast pitch sweeps
/// (the thud and death recipes) do not alias into audible whine.
#[derive(Debug, Clone)]
pub struct Oscillator {
    pub waveform: Waveform,
    frequency: f64,
    phase: f64,
    sample_rate: f64,
}

impl Oscillator {
    pub fn new(waveform: Waveform, sample_rate: f64) -> Self {
        Oscillator {
            waveform,
            frequency: 440.0,
            phase: 0.0,
            sample_rate,
        }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Retune the oscillator; phase is preserved so sweeps stay continuous.
    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency.max(0.0);
    }

    fn increment(&self) -> f64 {
        (self.frequency / self.sample_rate).min(0.5)
    }

    /// Produce one sample and advance the phase.
    pub fn next_sample(&mut self) -> f64 {
        let dt = self.increment();
        let p = self.phase;
        let out = match self.waveform {
            Waveform::Sine => (TAU * p).sin(),
            Waveform::Sawtooth => (2.0 * p - 1.0) - poly_blep(p, dt),
            Waveform::Square => {
                let edge = if p < 0.5 { 1.0 } else { -1.0 };
                edge + poly_blep(p, dt) - poly_blep((p + 0.5).fract(), dt)
            }
            // Quarter-cycle offset: starts at 0 and rises, like the sine.
            Waveform::Triangle => {
                let q = (p + 0.25).fract();
                if q < 0.5 {
                    4.0 * q - 1.0
                } else {
                    3.0 - 4.0 * q
                }
            }
        };

        self.phase = (p + dt).fract();
        out
    }
}

/// Polynomial band-limited step correction around a phase wrap.
fn poly_blep(t: f64, dt: f64) -> f64 {
    if dt <= 0.0 {
        return 0.0;
    }
    if t < dt {
        let x = t / dt;
        2.0 * x - x * x - 1.0
    } else if t > 1.0 - dt {
        let x = (t - 1.0) / dt;
        x * x + 2.0 * x + 1.0
    } else {
        0.0
    }
}
