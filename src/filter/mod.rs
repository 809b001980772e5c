//! SID Filter Domain
//!
//! MOS 6581/8580 multi-mode filter: measured cutoff curves, their expansion
//! into per-code lookup tables, register decoding, coefficient derivation and
//! the state-variable filter update.
//!
//! Implementation:
//! - `chip` - register front end and filter update
//! - `coefficients` - fixed-point `w0` and `1024/Q` derivation
//! - `constants` - measured curves, voice DC and fixed-point scales
//! - `curve` - chip models and control-point curves
//! - `cutoff_table` - dense FC-to-frequency tables
//! - `registers` - $D415-$D418 decoding and readback

// Internal modules
pub mod chip;
pub mod coefficients;
pub mod constants;
pub mod curve;
pub mod cutoff_table;
pub mod registers;

// Re-export public API
pub use chip::Filter;
pub use coefficients::Coefficients;
pub use curve::{ChipModel, ControlPoint, ControlPointTable};
pub use cutoff_table::{CutoffTable, SharedCutoffTable};
pub use registers::{FilterMode, FilterRegister, FilterRegisters, Routing};
