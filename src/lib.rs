//! SID Filter Emulation for the MOS 6581 and MOS 8580
//!
//! Emulates the programmable multi-mode filter of the Commodore 64 SID chip.
//! The cutoff frequency of the real chips does not follow the datasheet: it
//! was measured on two particular parts, and those measurements (sparse
//! control points) are expanded into a dense per-register-code lookup table
//! whenever a chip model is selected.
//!
//! # Features
//! - Measured MOS 6581 and MOS 8580 cutoff curves, including the 6581's drop
//!   at FCHI = 0x80
//! - Clamped cubic interpolation service ([`spline`]) with jump support
//! - Register decoding for $D415-$D418 with readback
//! - Fixed-point coefficients bit-compatible with reSID
//! - Two-integrator-loop filter update (single cycle and multi cycle)
//! - JSON settings with optional custom cutoff curves
//!
//! # Crate feature flags
//! - `cli` (default): `sid-filter-curve` binary dumping a curve as CSV
//!
//! # Quick start
//! ```
//! use sid_filter::{ChipModel, Filter};
//!
//! let mut filter = Filter::new(ChipModel::Mos6581);
//! filter.write_register(0x15, 0x07); // FC low bits
//! filter.write_register(0x16, 0x7f); // FC high bits -> FC = 1023
//! filter.write_register(0x17, 0xf1); // Resonance 15, voice 1 filtered
//! filter.write_register(0x18, 0x1f); // Lowpass, volume 15
//!
//! assert_eq!(filter.cutoff_frequency(), 6000);
//! filter.clock(0x1000 << 7, 0, 0, 0);
//! let _sample = filter.output();
//! ```

#![warn(missing_docs)]

pub mod config; // Filter settings (JSON)
pub mod filter; // SID Filter Emulation (core)
pub mod spline; // Curve interpolation

/// Error types for SID filter operations
#[derive(thiserror::Error, Debug)]
pub enum SidFilterError {
    /// Malformed cutoff curve or interpolation input
    #[error("Invalid control points: {0}")]
    InvalidControlPoints(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// IO error from filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV output error
    #[cfg(feature = "cli")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for filter operations
pub type Result<T> = std::result::Result<T, SidFilterError>;

// Public API exports
pub use config::FilterSettings;
pub use filter::{
    ChipModel, Coefficients, ControlPoint, ControlPointTable, CutoffTable, Filter,
    FilterMode, FilterRegister, FilterRegisters, Routing, SharedCutoffTable,
};
