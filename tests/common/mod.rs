//! Shared helpers for the synchronization integration tests
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use rustfft::num_complex::Complex;
use rustydab::{DisplaySink, SpectrumTransform, SyncEngine};

/// Time-domain reference symbol of `engine`, cyclically delayed
pub fn delayed_reference(engine: &SyncEngine, delay: usize) -> Vec<Complex<f32>> {
    spectrum_to_time(engine, engine.phase_table().reference().to_vec(), delay)
}

/// Inverse-transform `spectrum` and cyclically delay the result
pub fn spectrum_to_time(
    engine: &SyncEngine,
    mut spectrum: Vec<Complex<f32>>,
    delay: usize,
) -> Vec<Complex<f32>> {
    let t_u = engine.params().t_u;
    assert_eq!(spectrum.len(), t_u);
    let transform = SpectrumTransform::new(t_u);
    transform.inverse(&mut spectrum);

    let mut out = vec![Complex::new(0.0f32, 0.0); t_u];
    for (i, &v) in spectrum.iter().enumerate() {
        out[(i + delay) % t_u] = v;
    }
    out
}

/// Reference spectrum rotated by `bin_shift` carrier bins
pub fn shifted_reference_spectrum(engine: &SyncEngine, bin_shift: i32) -> Vec<Complex<f32>> {
    let t_u = engine.params().t_u;
    let reference = engine.phase_table().reference();
    let mut spectrum = vec![Complex::new(0.0f32, 0.0); t_u];
    for (k, &v) in reference.iter().enumerate() {
        let shifted = (k as i32 + bin_shift).rem_euclid(t_u as i32) as usize;
        spectrum[shifted] = v;
    }
    spectrum
}

/// Everything a sink received, in push order
#[derive(Default)]
pub struct SinkLog {
    pub snapshots: Vec<Vec<f32>>,
    pub candidate_lists: Vec<Vec<usize>>,
}

/// Display sink shared between the engine and the test body
#[derive(Clone, Default)]
pub struct SharedSink(pub Rc<RefCell<SinkLog>>);

impl DisplaySink for SharedSink {
    fn push_magnitude_snapshot(&mut self, magnitudes: &[f32]) {
        self.0.borrow_mut().snapshots.push(magnitudes.to_vec());
    }

    fn push_candidate_indices(&mut self, indices: &[usize]) {
        self.0.borrow_mut().candidate_lists.push(indices.to_vec());
    }
}
