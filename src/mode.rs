//! DAB transmission mode parameters
//!
//! Static per-mode constants from ETSI EN 300 401, expressed in samples at
//! the 2.048 MHz baseband rate. The timing-acquisition window margins are
//! validated here, once, when the parameters are derived — never per call.

use snafu::Snafu;

/// Baseband sample rate in samples per second
pub const INPUT_RATE: usize = 2_048_000;

/// Rear margin of the correlation peak search window, samples before Tg
pub const PEAK_SEARCH_BACK: usize = 80;

/// Width of the correlation peak search window in samples
pub const PEAK_SEARCH_WIDTH: usize = 100;

/// Rear margin of the multipath echo search range, samples before Tg
pub const ECHO_SEARCH_BACK: usize = 100;

/// Front margin of the multipath echo search range, samples before Tu/2
pub const ECHO_SEARCH_FRONT: usize = 200;

/// DAB transmission mode identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DabMode {
    ModeI,
    ModeII,
    ModeIII,
    ModeIV,
}

/// Errors raised while deriving mode parameters
#[derive(Debug, Snafu, PartialEq)]
pub enum ModeError {
    /// The guard interval is too short for the fixed peak search window.
    #[snafu(display(
        "{mode:?}: guard interval {t_g} cannot host the peak search window (needs >= {PEAK_SEARCH_BACK})"
    ))]
    GuardTooShort { mode: DabMode, t_g: usize },

    /// The echo search range would be empty or inverted for this mode.
    #[snafu(display(
        "{mode:?}: echo search range [{lo}, {hi}) is empty for T_u {t_u}, T_g {t_g}"
    ))]
    EchoRangeEmpty {
        mode: DabMode,
        t_u: usize,
        t_g: usize,
        lo: isize,
        hi: isize,
    },
}

/// Immutable per-mode OFDM constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeParams {
    /// Useful symbol length in samples
    pub t_u: usize,
    /// Guard (cyclic prefix) length in samples
    pub t_g: usize,
    /// Number of active subcarriers
    pub carriers: usize,
    /// Transmission frame duration in samples
    pub t_f: usize,
}

impl ModeParams {
    /// Derive the parameters for `mode`, validating the search window
    /// margins used by timing acquisition.
    ///
    /// Mode III is rejected: its 63-sample guard interval is shorter than
    /// the 80-sample rear margin of the peak search window.
    pub fn for_mode(mode: DabMode) -> Result<Self, ModeError> {
        let params = match mode {
            DabMode::ModeI => ModeParams {
                t_u: 2048,
                t_g: 504,
                carriers: 1536,
                t_f: 196_608,
            },
            DabMode::ModeII => ModeParams {
                t_u: 512,
                t_g: 126,
                carriers: 384,
                t_f: 49_152,
            },
            DabMode::ModeIII => ModeParams {
                t_u: 256,
                t_g: 63,
                carriers: 192,
                t_f: 49_152,
            },
            DabMode::ModeIV => ModeParams {
                t_u: 1024,
                t_g: 252,
                carriers: 768,
                t_f: 98_304,
            },
        };
        params.validate(mode)?;
        Ok(params)
    }

    fn validate(&self, mode: DabMode) -> Result<(), ModeError> {
        if self.t_g < PEAK_SEARCH_BACK {
            return Err(ModeError::GuardTooShort {
                mode,
                t_g: self.t_g,
            });
        }
        let lo = self.t_g as isize - ECHO_SEARCH_BACK as isize;
        let hi = self.t_u as isize / 2 - ECHO_SEARCH_FRONT as isize;
        if lo < 0 || hi <= lo {
            return Err(ModeError::EchoRangeEmpty {
                mode,
                t_u: self.t_u,
                t_g: self.t_g,
                lo,
                hi,
            });
        }
        Ok(())
    }

    /// Transmission frames per second at the baseband rate
    pub fn frames_per_second(&self) -> usize {
        INPUT_RATE / self.t_f
    }
}
