//! Optional diagnostic sink for operator visualization
//!
//! The synchronization engine pushes throttled snapshots of the impulse
//! response and the multipath candidate indices to an injected sink.
//! Purely diagnostic: a missing or slow sink never affects correctness.

/// Consumer of timing-acquisition diagnostics
pub trait DisplaySink {
    /// Magnitude of the correlation impulse response, `t_u / 2` values
    fn push_magnitude_snapshot(&mut self, magnitudes: &[f32]);

    /// Candidate peak indices, strongest first
    fn push_candidate_indices(&mut self, indices: &[usize]);
}

/// Sink that retains only the most recent push of each kind
#[derive(Debug, Default)]
pub struct SnapshotBuffer {
    pub magnitudes: Vec<f32>,
    pub candidates: Vec<usize>,
}

impl SnapshotBuffer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DisplaySink for SnapshotBuffer {
    fn push_magnitude_snapshot(&mut self, magnitudes: &[f32]) {
        self.magnitudes.clear();
        self.magnitudes.extend_from_slice(magnitudes);
    }

    fn push_candidate_indices(&mut self, indices: &[usize]) {
        self.candidates.clear();
        self.candidates.extend_from_slice(indices);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_buffer_keeps_latest() {
        let mut sink = SnapshotBuffer::new();
        sink.push_magnitude_snapshot(&[1.0, 2.0]);
        sink.push_magnitude_snapshot(&[3.0]);
        sink.push_candidate_indices(&[424, 470]);

        assert_eq!(sink.magnitudes, vec![3.0]);
        assert_eq!(sink.candidates, vec![424, 470]);
    }
}
