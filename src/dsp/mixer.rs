//! Mixer — sums effect layers into one buffer behind the master volume.

/// Accumulates layers sample by sample, then applies the master gain.
#[derive(Debug, Clone)]
pub struct Mixer {
    pub master_gain: f64,
    buffer: Vec<f64>,
}

impl Mixer {
    pub fn new(master_gain: f64) -> Self {
        Mixer {
            master_gain,
            buffer: Vec::new(),
        }
    }

    /// Make sure the buffer holds at least `len` samples (zero-filled).
    pub fn reserve_len(&mut self, len: usize) {
        if self.buffer.len() < len {
            self.buffer.resize(len, 0.0);
        }
    }

    /// Add `sample` at `index`, growing the buffer if needed.
    pub fn add(&mut self, index: usize, sample: f64) {
        if index >= self.buffer.len() {
            self.buffer.resize(index + 1, 0.0);
        }
        self.buffer[index] += sample;
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Linear master gain, hard-limited to the `AudioBuffer` range.
    pub fn output(&self) -> Vec<f32> {
        self.buffer
            .iter()
            .map(|&s| (s * self.master_gain).clamp(-1.0, 1.0) as f32)
            .collect()
    }
}
