//! SID Filter Hardware Constants
//!
//! Measured cutoff curves and fixed-point scale factors shared by the
//! filter components.
//!
//! Maximum cutoff frequency is specified as
//! FCmax = 2.6e-5/C = 2.6e-5/2200e-12 = 11818.
//!
//! Measurements indicate a cutoff frequency range of approximately
//! 220Hz - 18kHz on a MOS6581 fitted with 470pF capacitors. The function
//! mapping FC to cutoff frequency has the shape of the tanh function, with a
//! discontinuity at FCHI = 0x80. In contrast, the MOS8580 almost perfectly
//! corresponds with the specification of a linear mapping from 30Hz to 12kHz.
//!
//! The mappings were measured by feeding the SID an external signal, since
//! the chip cannot generate waveforms above roughly 4kHz itself. The bandpass
//! output at full resonance picks out the cutoff frequency at a given FC.
//!
//! Cutoff characteristics vary between parts; these are two particular
//! Commodore 64s.

use super::curve::ControlPoint;

/// Number of distinct FC register codes (11 bits)
pub const FC_CODES: usize = 2048;

/// Highest FC register code
pub const FC_MAX: u16 = 0x7ff;

/// MOS 6581 cutoff curve
///
/// The repeated points at FC 1023 and FC 1024 encode the measured drop from
/// 6000 Hz to 4600 Hz when FCHI crosses 0x80.
pub static F0_POINTS_6581: [ControlPoint; 29] = [
    //                 FC      f        FCHI FCLO
    ControlPoint::new(0, 220),      // 0x00
    ControlPoint::new(128, 230),    // 0x10
    ControlPoint::new(256, 250),    // 0x20
    ControlPoint::new(384, 300),    // 0x30
    ControlPoint::new(512, 420),    // 0x40
    ControlPoint::new(640, 780),    // 0x50
    ControlPoint::new(768, 1600),   // 0x60
    ControlPoint::new(832, 2300),   // 0x68
    ControlPoint::new(896, 3200),   // 0x70
    ControlPoint::new(960, 4300),   // 0x78
    ControlPoint::new(992, 5000),   // 0x7c
    ControlPoint::new(1008, 5400),  // 0x7e
    ControlPoint::new(1016, 5700),  // 0x7f
    ControlPoint::new(1023, 6000),  // 0x7f 0x07
    ControlPoint::new(1023, 6000),  // 0x7f 0x07
    ControlPoint::new(1024, 4600),  // 0x80
    ControlPoint::new(1024, 4600),  // 0x80
    ControlPoint::new(1032, 4800),  // 0x81
    ControlPoint::new(1056, 5300),  // 0x84
    ControlPoint::new(1088, 6000),  // 0x88
    ControlPoint::new(1120, 6600),  // 0x8c
    ControlPoint::new(1152, 7200),  // 0x90
    ControlPoint::new(1280, 9500),  // 0xa0
    ControlPoint::new(1408, 12000), // 0xb0
    ControlPoint::new(1536, 14500), // 0xc0
    ControlPoint::new(1664, 16000), // 0xd0
    ControlPoint::new(1792, 17100), // 0xe0
    ControlPoint::new(1920, 17700), // 0xf0
    ControlPoint::new(2047, 18000), // 0xff 0x07
];

/// MOS 8580 cutoff curve
pub static F0_POINTS_8580: [ControlPoint; 17] = [
    //                 FC      f        FCHI FCLO
    ControlPoint::new(0, 0),        // 0x00
    ControlPoint::new(128, 800),    // 0x10
    ControlPoint::new(256, 1600),   // 0x20
    ControlPoint::new(384, 2500),   // 0x30
    ControlPoint::new(512, 3300),   // 0x40
    ControlPoint::new(640, 4100),   // 0x50
    ControlPoint::new(768, 4800),   // 0x60
    ControlPoint::new(896, 5600),   // 0x70
    ControlPoint::new(1024, 6500),  // 0x80
    ControlPoint::new(1152, 7500),  // 0x90
    ControlPoint::new(1280, 8400),  // 0xa0
    ControlPoint::new(1408, 9200),  // 0xb0
    ControlPoint::new(1536, 9800),  // 0xc0
    ControlPoint::new(1664, 10500), // 0xd0
    ControlPoint::new(1792, 11000), // 0xe0
    ControlPoint::new(1920, 11700), // 0xf0
    ControlPoint::new(2047, 12500), // 0xff 0x07
];

/// MOS 6581 voice DC offset
///
/// The DC offset of each voice is approximately -1/4 of the dynamic range of
/// one voice (C= Hacking Issue #20):
/// - "zero" mixer output at full volume is 5.43V
/// - one voice routed at full volume gives 5.29V at maximum output, 5.69V at
///   "zero" output and 6.34V at minimum output (the mixer is inverting)
/// - DC offset: -(5.69V - 5.43V) = -0.26V over a 1.05V range, i.e. -1/4
///
/// With the offset removed the voice swing is +0.40V / -0.65V. That
/// asymmetry is not modeled.
pub const VOICE_DC_6581: i32 = -4095 * 255 / 4;

/// MOS 8580 voice DC offset (none)
pub const VOICE_DC_8580: i32 = 0;

/// 2^20 / 10^6
///
/// Multiplying `w0` by this lets the filter update divide by 1 000 000 with a
/// right shift by 20.
pub const W0_SCALE: f64 = 1.048576;

/// Right shift undoing [`W0_SCALE`] together with the 1 MHz time step
pub const W0_SHIFT: u32 = 20;

/// Fixed-point scale of the damping term (`1024 / Q`)
pub const Q_SCALE: f64 = 1024.0;

/// Right shift undoing [`Q_SCALE`]
pub const Q_SHIFT: u32 = 10;

/// Q at resonance 0
pub const Q_MIN: f64 = 0.707;

/// Cutoff ceiling keeping the single-cycle update stable
pub const F0_MAX_SINGLE_CYCLE: f64 = 16_000.0;

/// Cutoff ceiling keeping the multi-cycle update stable
pub const F0_MAX_DELTA: f64 = 4_000.0;

/// Longest step the multi-cycle update takes at once
pub const DELTA_MAX_CYCLES: u32 = 8;
