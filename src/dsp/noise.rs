//! White-noise buffers for the percussive recipes.

use rand::Rng;

/// A mono block of white noise, rendered once per trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseBuffer {
    samples: Vec<f64>,
}

impl NoiseBuffer {
    /// `floor(sample_rate * seconds)` samples of uniform noise in `[-1, 1)`.
    pub fn white<R: Rng>(rng: &mut R, sample_rate: f64, seconds: f64) -> Self {
        let len = buffer_len(sample_rate, seconds);
        let samples = (0..len).map(|_| rng.random::<f64>() * 2.0 - 1.0).collect();
        NoiseBuffer { samples }
    }

    /// Noise with a baked-in exponential decay `exp(-i / (len * decay))`.
    ///
    /// `decay` is the time constant as a fraction of the buffer length; the
    /// click recipes use 0.08 to 0.15 for a sharp transient.
    pub fn decaying<R: Rng>(
        rng: &mut R,
        sample_rate: f64,
        seconds: f64,
        decay: f64,
    ) -> Self {
        let mut noise = Self::white(rng, sample_rate, seconds);
        let span = noise.samples.len() as f64 * decay;
        if span > 0.0 {
            for (i, s) in noise.samples.iter_mut().enumerate() {
                *s *= (-(i as f64) / span).exp();
            }
        }
        noise
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Sample at `index`, silence past the end (buffer sources do not loop).
    pub fn get(&self, index: usize) -> f64 {
        self.samples.get(index).copied().unwrap_or(0.0)
    }
}

pub(crate) fn buffer_len(sample_rate: f64, seconds: f64) -> usize {
    if seconds <= 0.0 || sample_rate <= 0.0 {
        return 0;
    }
    (sample_rate * seconds).floor() as usize
}
