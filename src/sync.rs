//! DAB symbol synchronization engine
//!
//! Locates the first sample of the phase reference symbol inside a window
//! of baseband samples and estimates the transmitter/receiver frequency
//! misalignment.
//!
//! **Algorithm**:
//! 1. Timing: correlate the window against the reference symbol in the
//!    frequency domain, transform back, and pick the strongest impulse in
//!    a fixed window around the guard interval. Echo peaks down to
//!    `Max / 1.4` are collected when multipath search is enabled.
//! 2. Coarse offset: slide the spectrum over ±35 subcarrier bins and score
//!    the adjacent-bin phase differences against the reference
//!    fingerprint with two independent statistics; both must agree.
//! 3. Fine offset: average the phase slope of 100 adjacent-bin pairs
//!    around DC relative to the reference table.

use rustfft::num_complex::Complex;
use snafu::{ResultExt, Snafu};
use tracing::{debug, trace};

use crate::display::DisplaySink;
use crate::mode::{
    DabMode, ModeError, ModeParams, ECHO_SEARCH_BACK, ECHO_SEARCH_FRONT, PEAK_SEARCH_BACK,
    PEAK_SEARCH_WIDTH,
};
use crate::phase_table::PhaseTable;
use crate::transform::SpectrumTransform;

/// Width of the coarse offset search, subcarrier bins
pub const SEARCH_RANGE: usize = 2 * 35;

/// Number of adjacent-bin pairs averaged by the fine offset estimator
pub const FINE_WINDOW: usize = 100;

/// Samples cleared on each side of an accepted correlation peak
pub const PEAK_CLEARANCE: usize = 15;

/// Echo peaks weaker than the primary divided by this stop the search
const ECHO_CUTOFF: f32 = 1.4;

/// Fingerprint entries below this count as near-null transitions
const NULL_TRANSITION: f32 = 0.05;

/// Multipath search is disabled for thresholds at or below this value
const MULTIPATH_THRESHOLD: i16 = 5;

/// Errors raised by engine construction and argument validation
#[derive(Debug, Snafu)]
pub enum SyncError {
    #[snafu(display("mode parameters rejected: {source}"))]
    InvalidMode { source: ModeError },

    #[snafu(display("diff length {diff_length} exceeds half the carrier count ({carriers})"))]
    DiffLengthTooLarge { diff_length: usize, carriers: usize },

    #[snafu(display("sample window holds {len} samples, expected T_u = {t_u}"))]
    WindowLength { len: usize, t_u: usize },
}

/// Outcome of a timing-acquisition call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimingLock {
    /// Sample index of the strongest correlation peak
    Locked(usize),
    /// No confident lock; `confidence` is the peak-to-mean ratio that
    /// fell short of the threshold
    NotLocked { confidence: f32 },
}

/// Outcome of the coarse (integer-bin) offset estimation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarrierOffset {
    /// Frequency offset in whole subcarrier bins
    Resolved(i32),
    /// The two scoring statistics disagreed; no answer
    Inconclusive,
}

/// Symbol synchronization engine for one transmission mode
pub struct SyncEngine {
    params: ModeParams,
    phase_table: PhaseTable,
    transform: SpectrumTransform,
    depth: usize,
    sink: Option<Box<dyn DisplaySink>>,
    display_period: usize,
    display_counter: usize,
}

impl SyncEngine {
    /// Build an engine for `mode`.
    ///
    /// * `diff_length` - fingerprint window width (rounded up to even)
    /// * `depth` - maximum number of multipath echoes to collect
    /// * `sink` - optional diagnostic consumer
    ///
    /// Fails when the mode's window margins are invalid (Mode III) or the
    /// fingerprint window would leave the active carriers.
    pub fn new(
        mode: DabMode,
        diff_length: usize,
        depth: usize,
        sink: Option<Box<dyn DisplaySink>>,
    ) -> Result<Self, SyncError> {
        let params = ModeParams::for_mode(mode).context(InvalidModeSnafu)?;
        let rounded = (diff_length + 1) & !1;
        if rounded > params.carriers / 2 {
            return Err(SyncError::DiffLengthTooLarge {
                diff_length: rounded,
                carriers: params.carriers,
            });
        }
        let phase_table = PhaseTable::new(&params, diff_length);
        let transform = SpectrumTransform::new(params.t_u);
        let display_period = params.frames_per_second() / 4;

        Ok(SyncEngine {
            params,
            phase_table,
            transform,
            depth,
            sink,
            display_period,
            display_counter: 0,
        })
    }

    /// Mode parameters this engine was built for
    pub fn params(&self) -> &ModeParams {
        &self.params
    }

    /// Reference table shared by all operations
    pub fn phase_table(&self) -> &PhaseTable {
        &self.phase_table
    }

    /// Locate the start of the reference symbol within `window`.
    ///
    /// `window` must hold exactly `T_u` samples believed to start within
    /// one sample of the first non-null block. Thresholds at or below 5
    /// skip the multipath echo search.
    pub fn find_index(
        &mut self,
        window: &[Complex<f32>],
        threshold: i16,
    ) -> Result<TimingLock, SyncError> {
        self.check_window(window)?;
        let (lock, candidates, snapshot) = self.acquire(window, threshold);

        // Diagnostics only fire on the multipath path, throttled to a
        // quarter of the frame rate.
        if matches!(lock, TimingLock::Locked(_))
            && threshold > MULTIPATH_THRESHOLD
            && self.sink.is_some()
        {
            self.display_counter += 1;
            if self.display_counter > self.display_period {
                self.display_counter = 0;
                if let Some(sink) = self.sink.as_mut() {
                    sink.push_magnitude_snapshot(&snapshot);
                    sink.push_candidate_indices(&candidates);
                }
            }
        }
        Ok(lock)
    }

    /// Timing acquisition proper; returns the lock outcome, the candidate
    /// list (strongest first) and the impulse-response magnitudes.
    fn acquire(
        &self,
        window: &[Complex<f32>],
        threshold: i16,
    ) -> (TimingLock, Vec<usize>, Vec<f32>) {
        let t_g = self.params.t_g;
        let half = self.params.t_u / 2;

        let mut buffer = window.to_vec();
        self.transform.forward(&mut buffer);
        for (b, r) in buffer.iter_mut().zip(self.phase_table.reference()) {
            *b *= r.conj();
        }
        self.transform.inverse(&mut buffer);

        let mut impulse: Vec<f32> = buffer[..half].iter().map(|c| c.norm()).collect();
        let snapshot = impulse.clone();
        let mean = impulse.iter().sum::<f32>() / half as f32;

        let base = t_g - PEAK_SEARCH_BACK;
        let mut max_index = base;
        let mut max_value = -1.0f32;
        for (i, &v) in impulse[base..base + PEAK_SEARCH_WIDTH].iter().enumerate() {
            if v > max_value {
                max_value = v;
                max_index = base + i;
            }
        }

        let confidence = if mean > 0.0 { max_value / mean } else { 0.0 };
        if confidence < threshold as f32 {
            trace!(confidence, threshold, "no lock");
            return (TimingLock::NotLocked { confidence }, Vec::new(), snapshot);
        }
        debug!(max_index, confidence, "timing lock");

        let mut candidates = vec![max_index];
        if threshold <= MULTIPATH_THRESHOLD {
            return (TimingLock::Locked(max_index), candidates, snapshot);
        }

        // Echo search over the remaining first half; the neighborhood of
        // every accepted peak is cleared so it cannot be found twice.
        clear_peak(&mut impulse, max_index);
        let lo = t_g - ECHO_SEARCH_BACK;
        let hi = half - ECHO_SEARCH_FRONT;
        for _ in 0..self.depth {
            let mut echo_value = 0.0f32;
            let mut echo_index = lo;
            for (i, &v) in impulse[lo..hi].iter().enumerate() {
                if v > echo_value {
                    echo_value = v;
                    echo_index = lo + i;
                }
            }
            if echo_value < max_value / ECHO_CUTOFF {
                break;
            }
            candidates.push(echo_index);
            clear_peak(&mut impulse, echo_index);
        }

        (TimingLock::Locked(max_index), candidates, snapshot)
    }

    /// Estimate the integer subcarrier-bin frequency offset of a located
    /// reference symbol.
    pub fn estimate_carrier_offset(
        &self,
        window: &[Complex<f32>],
    ) -> Result<CarrierOffset, SyncError> {
        self.check_window(window)?;
        let t_u = self.params.t_u;
        let diff_length = self.phase_table.diff_length();
        let shift_factor = self.phase_table.shift_factor();
        let fingerprint = self.phase_table.fingerprint();

        let mut buffer = window.to_vec();
        self.transform.forward(&mut buffer);

        // Squared phase differences of adjacent bins over the search span
        let start = 2 * t_u - SEARCH_RANGE / 2 - shift_factor;
        let mut diffs = vec![0.0f32; SEARCH_RANGE + diff_length];
        for (m, d) in diffs.iter_mut().enumerate() {
            let x = (start + m) % t_u;
            let angle = (buffer[x] * buffer[(x + 1) % t_u].conj()).arg();
            *d = angle * angle;
        }

        let mut min_null = f32::MAX;
        let mut min_shape = f32::MAX;
        let mut shift_null = 0usize;
        let mut shift_shape = 0usize;
        for shift in 0..SEARCH_RANGE {
            let mut null_score = 0.0f32;
            let mut shape_score = 0.0f32;
            for (j, &fp) in fingerprint.iter().enumerate() {
                let d = diffs[shift + j];
                if fp < NULL_TRANSITION {
                    null_score += d;
                }
                shape_score += (d - fp).abs();
            }
            if null_score < min_null {
                min_null = null_score;
                shift_null = shift;
            }
            if shape_score < min_shape {
                min_shape = shape_score;
                shift_shape = shift;
            }
        }

        if shift_null == shift_shape {
            let offset = shift_null as i32 - (SEARCH_RANGE / 2) as i32;
            debug!(offset, "carrier offset resolved");
            Ok(CarrierOffset::Resolved(offset))
        } else {
            trace!(shift_null, shift_shape, "carrier offset scores disagree");
            Ok(CarrierOffset::Inconclusive)
        }
    }

    /// Estimate the fractional frequency offset of a located reference
    /// symbol as the mean phase slope over a centered window of
    /// adjacent-bin pairs. Each pair is measured against the reference as
    /// a single complex product, so pairs sitting near the ±pi cut cannot
    /// wrap the sum by 2*pi.
    pub fn estimate_fine_offset(&self, window: &[Complex<f32>]) -> Result<f32, SyncError> {
        self.check_window(window)?;
        let t_u = self.params.t_u;
        let reference = self.phase_table.reference();

        let mut buffer = window.to_vec();
        self.transform.forward(&mut buffer);

        let mut pd = 0.0f32;
        for i in 0..FINE_WINDOW {
            let k = (t_u - FINE_WINDOW / 2 + i) % t_u;
            let k1 = (k + 1) % t_u;
            let expected = reference[k] * reference[k1].conj();
            let measured = buffer[k] * buffer[k1].conj();
            pd += (measured * expected.conj()).arg();
        }
        Ok(pd / FINE_WINDOW as f32)
    }

    fn check_window(&self, window: &[Complex<f32>]) -> Result<(), SyncError> {
        if window.len() != self.params.t_u {
            return Err(SyncError::WindowLength {
                len: window.len(),
                t_u: self.params.t_u,
            });
        }
        Ok(())
    }
}

/// Zero the neighborhood of an accepted peak
fn clear_peak(impulse: &mut [f32], index: usize) {
    let lo = index.saturating_sub(PEAK_CLEARANCE);
    let hi = (index + PEAK_CLEARANCE).min(impulse.len());
    for v in impulse[lo..hi].iter_mut() {
        *v = 0.0;
    }
}
