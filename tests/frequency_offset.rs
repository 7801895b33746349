//! Coarse and fine frequency-offset estimation tests
//!
//! Clean and impaired reference symbols with known integer bin shifts and
//! fractional phase ramps, plus a constructed input on which the two
//! coarse scoring statistics must disagree.

mod common;

use common::{delayed_reference, shifted_reference_spectrum, spectrum_to_time};
use rustfft::num_complex::Complex;
use rustydab::sync::{FINE_WINDOW, SEARCH_RANGE};
use rustydab::{CarrierOffset, DabMode, SyncEngine};

fn engine() -> SyncEngine {
    SyncEngine::new(DabMode::ModeI, 42, 3, None).unwrap()
}

#[test]
fn test_coarse_offset_zero_on_clean_reference() {
    let engine = engine();
    let window = delayed_reference(&engine, 0);
    let offset = engine.estimate_carrier_offset(&window).unwrap();
    assert_eq!(offset, CarrierOffset::Resolved(0));
}

#[test]
fn test_coarse_offset_recovers_injected_shift() {
    let engine = engine();
    for shift in [2i32, -3, 11, -20, 34] {
        let spectrum = shifted_reference_spectrum(&engine, shift);
        let window = spectrum_to_time(&engine, spectrum, 0);
        let offset = engine.estimate_carrier_offset(&window).unwrap();
        assert_eq!(offset, CarrierOffset::Resolved(shift), "shift {}", shift);
    }
}

/// Build an input whose adjacent-bin phase differences make the null-score
/// statistic prefer the leftmost shift while the shape-score statistic
/// prefers the rightmost one.
///
/// The engine's phase differences are freely constructible: each
/// adjacent-bin pair angle can be set independently by accumulating
/// phases along the search span. The diff sequence is laid out as
///   [ fingerprint nulls zeroed | plateau | fingerprint + epsilon ]
/// so the zeroed block wins the null score at the leftmost window and the
/// epsilon-lifted fingerprint copy wins the shape score at the rightmost.
fn adversarial_window(engine: &SyncEngine) -> Vec<Complex<f32>> {
    let t_u = engine.params().t_u;
    let table = engine.phase_table();
    let diff_length = table.diff_length();
    let shift_factor = table.shift_factor();
    let fingerprint = table.fingerprint();

    let plateau = 5.0f32;
    let epsilon = 0.01f32;
    let span = SEARCH_RANGE + diff_length;
    let last = SEARCH_RANGE - 1;

    let mut diffs = vec![plateau; span];
    for (j, &fp) in fingerprint.iter().enumerate() {
        // leftmost window: exact zeros on the reference's null transitions
        diffs[j] = if fp < 0.05 { 0.0 } else { plateau };
        // rightmost window: the fingerprint itself, nulls lifted off zero
        diffs[last + j] = if fp < 0.05 { fp + epsilon } else { fp };
    }

    // Accumulate bin phases so each adjacent pair reproduces its diff
    let mut spectrum = vec![Complex::new(1.0f32, 0.0); t_u];
    let start = 2 * t_u - SEARCH_RANGE / 2 - shift_factor;
    let mut theta = 0.0f32;
    for (m, &d) in diffs.iter().enumerate() {
        let bin = (start + m + 1) % t_u;
        theta -= d.sqrt();
        spectrum[bin] = Complex::new(theta.cos(), theta.sin());
    }

    spectrum_to_time(engine, spectrum, 0)
}

#[test]
fn test_coarse_offset_inconclusive_on_disagreement() {
    let engine = engine();
    let window = adversarial_window(&engine);
    let offset = engine.estimate_carrier_offset(&window).unwrap();
    assert_eq!(offset, CarrierOffset::Inconclusive);
}

#[test]
fn test_fine_offset_zero_on_clean_reference() {
    let engine = engine();
    let window = delayed_reference(&engine, 0);
    let fine = engine.estimate_fine_offset(&window).unwrap();
    assert!(fine.abs() < 1e-4, "fine offset {} on clean input", fine);
}

#[test]
fn test_fine_offset_tracks_linear_phase_ramp() {
    let engine = engine();
    let t_u = engine.params().t_u;
    let alpha = 0.01f32;

    let mut spectrum = engine.phase_table().reference().to_vec();
    for (k, v) in spectrum.iter_mut().enumerate() {
        let phase = alpha * k as f32;
        *v *= Complex::new(phase.cos(), phase.sin());
    }
    let window = spectrum_to_time(&engine, spectrum, 0);

    // Two of the hundred pairs straddle the unused DC bin and contribute
    // nothing, so the slope estimate is scaled by 98/100.
    let expected = -alpha * (FINE_WINDOW as f32 - 2.0) / FINE_WINDOW as f32;
    let fine = engine.estimate_fine_offset(&window).unwrap();
    assert!(
        (fine - expected).abs() < 5e-4,
        "fine offset {} expected {}",
        fine,
        expected
    );
}
