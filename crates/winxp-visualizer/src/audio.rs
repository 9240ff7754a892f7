use crate::backend::MediaBackend;

/// One frame of analyser output: unsigned byte magnitudes per frequency bin.
///
/// Reads are bounds-checked. An index past the end yields 0, so strategies
/// written for one bin count keep working with another.
#[derive(Clone, Copy, Debug)]
pub struct FrequencySnapshot<'a> {
    bins: &'a [u8],
}

impl<'a> FrequencySnapshot<'a> {
    pub fn new(bins: &'a [u8]) -> Self {
        Self { bins }
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn value(&self, index: usize) -> u8 {
        self.bins.get(index).copied().unwrap_or(0)
    }

    /// Magnitude at `index` normalized to 0.0-1.0.
    pub fn normalized(&self, index: usize) -> f32 {
        f32::from(self.value(index)) / 255.0
    }

    /// Magnitude at `index` modulo the bin count, 0.0 for an empty snapshot.
    pub fn normalized_wrapping(&self, index: usize) -> f32 {
        if self.bins.is_empty() {
            return 0.0;
        }
        self.normalized(index % self.bins.len())
    }

    /// Mean magnitude normalized to 0.0-1.0.
    pub fn mean_intensity(&self) -> f32 {
        if self.bins.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.bins.iter().map(|&x| u64::from(x)).sum();
        (sum as f64 / (self.bins.len() as f64 * 255.0)) as f32
    }

    pub fn as_slice(&self) -> &'a [u8] {
        self.bins
    }
}

/// Pulls a fixed-size magnitude array out of the live analyser once per frame.
pub struct FrequencySampler {
    buffer: Vec<u8>,
}

impl FrequencySampler {
    pub fn new(bin_count: usize) -> Self {
        Self {
            buffer: vec![0u8; bin_count],
        }
    }

    pub fn bin_count(&self) -> usize {
        self.buffer.len()
    }

    /// Fill the buffer from `backend`. Returns `None` while no analyser graph
    /// exists. The buffer follows the analyser if its bin count changes.
    pub fn sample<B: MediaBackend>(&mut self, backend: &mut B) -> Option<FrequencySnapshot<'_>> {
        if let Some(bins) = backend.frequency_bin_count() {
            if bins != self.buffer.len() {
                self.buffer.resize(bins, 0);
            }
        }
        if backend.sample_frequencies(&mut self.buffer) {
            Some(FrequencySnapshot::new(&self.buffer))
        } else {
            None
        }
    }
}
