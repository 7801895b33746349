//! Reference phase table for the DAB phase reference symbol
//!
//! Builds, once per mode, the frequency-domain form of the TFPR symbol of
//! ETSI EN 300 401: unit-magnitude points at the standard phase angles on
//! the active subcarriers, zero elsewhere. Also derives the
//! phase-difference fingerprint used by the coarse carrier-offset search:
//! the squared angles between adjacent reference bins in a window around
//! the Nyquist edge, marking which transitions the reference treats as
//! near-null.

use rustfft::num_complex::Complex;
use std::f32::consts::FRAC_PI_2;

use crate::mode::ModeParams;

/// One row of the standard's TFPR index table: carriers `kmin..=kmax`
/// draw phases from h-row `i` offset by `n`.
struct PhaseElement {
    kmin: i32,
    kmax: i32,
    i: usize,
    n: i32,
}

/// The 4x32 h table of the standard (each row a 16-entry pattern twice)
const H: [[i32; 32]; 4] = [
    [
        0, 2, 0, 0, 0, 0, 1, 1, 2, 0, 0, 0, 2, 2, 1, 1, 0, 2, 0, 0, 0, 0, 1, 1, 2, 0, 0, 0, 2, 2,
        1, 1,
    ],
    [
        0, 3, 2, 3, 0, 1, 3, 0, 2, 1, 2, 3, 2, 3, 3, 0, 0, 3, 2, 3, 0, 1, 3, 0, 2, 1, 2, 3, 2, 3,
        3, 0,
    ],
    [
        0, 0, 0, 2, 0, 2, 1, 3, 2, 2, 0, 2, 2, 0, 1, 3, 0, 0, 0, 2, 0, 2, 1, 3, 2, 2, 0, 2, 2, 0,
        1, 3,
    ],
    [
        0, 1, 2, 1, 0, 3, 3, 2, 2, 3, 2, 1, 2, 1, 3, 2, 0, 1, 2, 1, 0, 3, 3, 2, 2, 3, 2, 1, 2, 1,
        3, 2,
    ],
];

#[rustfmt::skip]
const ELEMENTS_MODE_I: &[PhaseElement] = &[
    PhaseElement { kmin: -768, kmax: -737, i: 0, n: 1 },
    PhaseElement { kmin: -736, kmax: -705, i: 1, n: 2 },
    PhaseElement { kmin: -704, kmax: -673, i: 2, n: 0 },
    PhaseElement { kmin: -672, kmax: -641, i: 3, n: 1 },
    PhaseElement { kmin: -640, kmax: -609, i: 0, n: 3 },
    PhaseElement { kmin: -608, kmax: -577, i: 1, n: 2 },
    PhaseElement { kmin: -576, kmax: -545, i: 2, n: 2 },
    PhaseElement { kmin: -544, kmax: -513, i: 3, n: 3 },
    PhaseElement { kmin: -512, kmax: -481, i: 0, n: 2 },
    PhaseElement { kmin: -480, kmax: -449, i: 1, n: 1 },
    PhaseElement { kmin: -448, kmax: -417, i: 2, n: 2 },
    PhaseElement { kmin: -416, kmax: -385, i: 3, n: 3 },
    PhaseElement { kmin: -384, kmax: -353, i: 0, n: 1 },
    PhaseElement { kmin: -352, kmax: -321, i: 1, n: 2 },
    PhaseElement { kmin: -320, kmax: -289, i: 2, n: 3 },
    PhaseElement { kmin: -288, kmax: -257, i: 3, n: 3 },
    PhaseElement { kmin: -256, kmax: -225, i: 0, n: 2 },
    PhaseElement { kmin: -224, kmax: -193, i: 1, n: 2 },
    PhaseElement { kmin: -192, kmax: -161, i: 2, n: 2 },
    PhaseElement { kmin: -160, kmax: -129, i: 3, n: 1 },
    PhaseElement { kmin: -128, kmax: -97,  i: 0, n: 1 },
    PhaseElement { kmin: -96,  kmax: -65,  i: 1, n: 3 },
    PhaseElement { kmin: -64,  kmax: -33,  i: 2, n: 1 },
    PhaseElement { kmin: -32,  kmax: -1,   i: 3, n: 2 },
    PhaseElement { kmin: 1,    kmax: 32,   i: 0, n: 3 },
    PhaseElement { kmin: 33,   kmax: 64,   i: 3, n: 1 },
    PhaseElement { kmin: 65,   kmax: 96,   i: 2, n: 1 },
    PhaseElement { kmin: 97,   kmax: 128,  i: 1, n: 1 },
    PhaseElement { kmin: 129,  kmax: 160,  i: 0, n: 2 },
    PhaseElement { kmin: 161,  kmax: 192,  i: 3, n: 2 },
    PhaseElement { kmin: 193,  kmax: 224,  i: 2, n: 1 },
    PhaseElement { kmin: 225,  kmax: 256,  i: 1, n: 0 },
    PhaseElement { kmin: 257,  kmax: 288,  i: 0, n: 2 },
    PhaseElement { kmin: 289,  kmax: 320,  i: 3, n: 2 },
    PhaseElement { kmin: 321,  kmax: 352,  i: 2, n: 3 },
    PhaseElement { kmin: 353,  kmax: 384,  i: 1, n: 3 },
    PhaseElement { kmin: 385,  kmax: 416,  i: 0, n: 0 },
    PhaseElement { kmin: 417,  kmax: 448,  i: 3, n: 2 },
    PhaseElement { kmin: 449,  kmax: 480,  i: 2, n: 1 },
    PhaseElement { kmin: 481,  kmax: 512,  i: 1, n: 3 },
    PhaseElement { kmin: 513,  kmax: 544,  i: 0, n: 3 },
    PhaseElement { kmin: 545,  kmax: 576,  i: 3, n: 3 },
    PhaseElement { kmin: 577,  kmax: 608,  i: 2, n: 3 },
    PhaseElement { kmin: 609,  kmax: 640,  i: 1, n: 0 },
    PhaseElement { kmin: 641,  kmax: 672,  i: 0, n: 3 },
    PhaseElement { kmin: 673,  kmax: 704,  i: 3, n: 0 },
    PhaseElement { kmin: 705,  kmax: 736,  i: 2, n: 1 },
    PhaseElement { kmin: 737,  kmax: 768,  i: 1, n: 1 },
];

#[rustfmt::skip]
const ELEMENTS_MODE_II: &[PhaseElement] = &[
    PhaseElement { kmin: -192, kmax: -161, i: 0, n: 2 },
    PhaseElement { kmin: -160, kmax: -129, i: 1, n: 3 },
    PhaseElement { kmin: -128, kmax: -97,  i: 2, n: 2 },
    PhaseElement { kmin: -96,  kmax: -65,  i: 3, n: 2 },
    PhaseElement { kmin: -64,  kmax: -33,  i: 0, n: 1 },
    PhaseElement { kmin: -32,  kmax: -1,   i: 1, n: 2 },
    PhaseElement { kmin: 1,    kmax: 32,   i: 2, n: 0 },
    PhaseElement { kmin: 33,   kmax: 64,   i: 1, n: 2 },
    PhaseElement { kmin: 65,   kmax: 96,   i: 0, n: 2 },
    PhaseElement { kmin: 97,   kmax: 128,  i: 3, n: 1 },
    PhaseElement { kmin: 129,  kmax: 160,  i: 2, n: 0 },
    PhaseElement { kmin: 161,  kmax: 192,  i: 1, n: 3 },
];

#[rustfmt::skip]
const ELEMENTS_MODE_III: &[PhaseElement] = &[
    PhaseElement { kmin: -96, kmax: -65, i: 0, n: 2 },
    PhaseElement { kmin: -64, kmax: -33, i: 1, n: 3 },
    PhaseElement { kmin: -32, kmax: -1,  i: 2, n: 0 },
    PhaseElement { kmin: 1,   kmax: 32,  i: 3, n: 2 },
    PhaseElement { kmin: 33,  kmax: 64,  i: 2, n: 2 },
    PhaseElement { kmin: 65,  kmax: 96,  i: 1, n: 2 },
];

#[rustfmt::skip]
const ELEMENTS_MODE_IV: &[PhaseElement] = &[
    PhaseElement { kmin: -384, kmax: -353, i: 0, n: 0 },
    PhaseElement { kmin: -352, kmax: -321, i: 1, n: 1 },
    PhaseElement { kmin: -320, kmax: -289, i: 2, n: 1 },
    PhaseElement { kmin: -288, kmax: -257, i: 3, n: 2 },
    PhaseElement { kmin: -256, kmax: -225, i: 0, n: 2 },
    PhaseElement { kmin: -224, kmax: -193, i: 1, n: 2 },
    PhaseElement { kmin: -192, kmax: -161, i: 2, n: 0 },
    PhaseElement { kmin: -160, kmax: -129, i: 3, n: 3 },
    PhaseElement { kmin: -128, kmax: -97,  i: 0, n: 3 },
    PhaseElement { kmin: -96,  kmax: -65,  i: 1, n: 1 },
    PhaseElement { kmin: -64,  kmax: -33,  i: 2, n: 3 },
    PhaseElement { kmin: -32,  kmax: -1,   i: 3, n: 2 },
    PhaseElement { kmin: 1,    kmax: 32,   i: 0, n: 0 },
    PhaseElement { kmin: 33,   kmax: 64,   i: 3, n: 1 },
    PhaseElement { kmin: 65,   kmax: 96,   i: 2, n: 0 },
    PhaseElement { kmin: 97,   kmax: 128,  i: 1, n: 2 },
    PhaseElement { kmin: 129,  kmax: 160,  i: 0, n: 0 },
    PhaseElement { kmin: 161,  kmax: 192,  i: 3, n: 1 },
    PhaseElement { kmin: 193,  kmax: 224,  i: 2, n: 2 },
    PhaseElement { kmin: 225,  kmax: 256,  i: 1, n: 2 },
    PhaseElement { kmin: 257,  kmax: 288,  i: 0, n: 2 },
    PhaseElement { kmin: 289,  kmax: 320,  i: 3, n: 1 },
    PhaseElement { kmin: 321,  kmax: 352,  i: 2, n: 3 },
    PhaseElement { kmin: 353,  kmax: 384,  i: 1, n: 0 },
];

fn elements_for(carriers: usize) -> &'static [PhaseElement] {
    match carriers {
        1536 => ELEMENTS_MODE_I,
        384 => ELEMENTS_MODE_II,
        192 => ELEMENTS_MODE_III,
        768 => ELEMENTS_MODE_IV,
        // for_mode() only produces the four carrier counts above
        _ => unreachable!("unknown carrier count {}", carriers),
    }
}

/// Standard-defined reference phase angle for carrier `k` (k != 0)
fn get_phi(carriers: usize, k: i32) -> f32 {
    let elements = elements_for(carriers);
    for e in elements {
        if e.kmin <= k && k <= e.kmax {
            let j = (k - e.kmin) as usize;
            return FRAC_PI_2 * (H[e.i][j] + e.n) as f32;
        }
    }
    0.0
}

/// Frequency-domain reference symbol plus its phase-difference fingerprint
pub struct PhaseTable {
    table: Vec<Complex<f32>>,
    fingerprint: Vec<f32>,
    diff_length: usize,
    shift_factor: usize,
}

impl PhaseTable {
    /// Build the reference table for the given mode parameters.
    ///
    /// `diff_length` is rounded up to even; the fingerprint window starts
    /// `diff_length / 4` bins below the Nyquist edge.
    pub fn new(params: &ModeParams, diff_length: usize) -> Self {
        let t_u = params.t_u;
        let diff_length = (diff_length + 1) & !1;
        let shift_factor = diff_length / 4;

        let mut table = vec![Complex::new(0.0f32, 0.0); t_u];
        for i in 1..=(params.carriers as i32 / 2) {
            let phi = get_phi(params.carriers, i);
            table[i as usize] = Complex::new(phi.cos(), phi.sin());
            let phi = get_phi(params.carriers, -i);
            table[t_u - i as usize] = Complex::new(phi.cos(), phi.sin());
        }

        let mut fingerprint = vec![0.0f32; diff_length];
        for (i, fp) in fingerprint.iter_mut().enumerate() {
            let a = table[(t_u - shift_factor + i) % t_u];
            let b = table[(t_u - shift_factor + i + 1) % t_u];
            let angle = (a * b.conj()).arg().abs();
            *fp = angle * angle;
        }

        PhaseTable {
            table,
            fingerprint,
            diff_length,
            shift_factor,
        }
    }

    /// Frequency-domain reference symbol, `t_u` bins
    pub fn reference(&self) -> &[Complex<f32>] {
        &self.table
    }

    /// Squared adjacent-bin phase differences near the Nyquist edge
    pub fn fingerprint(&self) -> &[f32] {
        &self.fingerprint
    }

    pub fn diff_length(&self) -> usize {
        self.diff_length
    }

    pub fn shift_factor(&self) -> usize {
        self.shift_factor
    }
}
