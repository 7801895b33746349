//! Forward/inverse FFT over a fixed-length complex buffer
//!
//! Thin wrapper around rustfft that plans both directions once and applies
//! the 1/N normalization on the inverse, so that frequency-domain
//! multiplication followed by the inverse transform is a proper circular
//! correlation.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Reusable transform pair of a fixed size
pub struct SpectrumTransform {
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    size: usize,
}

impl SpectrumTransform {
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);
        SpectrumTransform {
            forward,
            inverse,
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// In-place forward transform, time domain to frequency domain
    pub fn forward(&self, buffer: &mut [Complex<f32>]) {
        self.forward.process(buffer);
    }

    /// In-place inverse transform with 1/N scaling
    pub fn inverse(&self, buffer: &mut [Complex<f32>]) {
        self.inverse.process(buffer);
        let fac = 1.0 / self.size as f32;
        for v in buffer.iter_mut() {
            *v *= fac;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_dc() {
        let transform = SpectrumTransform::new(8);
        let mut buf = vec![Complex::new(1.0f32, 0.0); 8];
        transform.forward(&mut buf);

        assert!((buf[0].re - 8.0).abs() < 1e-4);
        for v in &buf[1..] {
            assert!(v.norm() < 1e-4);
        }
    }

    #[test]
    fn test_forward_single_tone() {
        let n = 64;
        let transform = SpectrumTransform::new(n);
        let mut buf: Vec<Complex<f32>> = (0..n)
            .map(|t| {
                let phase = 2.0 * std::f32::consts::PI * 5.0 * t as f32 / n as f32;
                Complex::new(phase.cos(), phase.sin())
            })
            .collect();
        transform.forward(&mut buf);

        let peak_bin = (0..n).max_by(|&a, &b| buf[a].norm().total_cmp(&buf[b].norm())).unwrap();
        assert_eq!(peak_bin, 5);
    }

    #[test]
    fn test_round_trip_preserves_signal() {
        let n = 256;
        let transform = SpectrumTransform::new(n);
        let original: Vec<Complex<f32>> = (0..n)
            .map(|t| Complex::new((t as f32 * 0.1).sin(), (t as f32 * 0.07).cos()))
            .collect();
        let mut buf = original.clone();

        transform.forward(&mut buf);
        transform.inverse(&mut buf);

        for (a, b) in original.iter().zip(buf.iter()) {
            assert!((a - b).norm() < 1e-4);
        }
    }
}
