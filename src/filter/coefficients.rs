//! Fixed-point filter coefficients
//!
//! Both coefficients are pre-scaled so the per-cycle update can replace
//! divisions with right shifts: `w0` by 2^20 (see [`W0_SCALE`]) and the
//! damping term by 2^10.

use std::f64::consts::PI;

use super::constants::{F0_MAX_DELTA, F0_MAX_SINGLE_CYCLE, Q_MIN, Q_SCALE, W0_SCALE};

/// Coefficients consumed by the state-variable filter update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Coefficients {
    /// Angular cutoff, `2*pi*f0*1.048576`
    pub w0: i32,
    /// `w0` limited to 16 kHz for the single-cycle update
    pub w0_ceil_1: i32,
    /// `w0` limited to 4 kHz for the multi-cycle update
    pub w0_ceil_dt: i32,
    /// Damping term `1024 / Q`
    pub q_1024_div: i32,
}

impl Coefficients {
    /// Derive the cutoff-dependent fields from a cutoff frequency in Hz
    pub fn set_w0(&mut self, f0: i32) {
        self.w0 = angular_cutoff(f64::from(f0));

        // Limit f0 to keep the updates stable.
        self.w0_ceil_1 = self.w0.min(angular_cutoff(F0_MAX_SINGLE_CYCLE));
        self.w0_ceil_dt = self.w0.min(angular_cutoff(F0_MAX_DELTA));
    }

    /// Derive the damping term from a 4-bit resonance
    pub fn set_q(&mut self, res: u8) {
        self.q_1024_div = damping(res);
    }
}

/// Angular cutoff `w0` for a frequency in Hz
///
/// Scaled by 1.048576 so that the 1 MHz time step can be applied with a
/// right shift by 20 (2^20 = 1048576).
#[inline]
pub fn angular_cutoff(f0: f64) -> i32 {
    (2.0 * PI * f0 * W0_SCALE) as i32
}

/// Damping term `1024 / Q` for a resonance value (masked to 4 bits)
///
/// Q is linear in resonance with an approximate range of [0.707, 1.707].
/// Higher resonance gives a smaller term and stronger feedback; the 0.707
/// floor keeps the divisor away from zero. The filter must be clocked more
/// often to stay stable as resonance rises.
#[inline]
pub fn damping(res: u8) -> i32 {
    let q = Q_MIN + f64::from(res & 0x0f) / 15.0;
    (Q_SCALE / q) as i32
}
