//! SID Filter Register Definitions
//!
//! The filter is controlled by four write-only registers at $D415-$D418.
//! Decoding is pure bit manipulation; every input byte is valid.

use std::fmt;

use bitflags::bitflags;

/// Filter register address (offset within the SID register file)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterRegister {
    /// Cutoff frequency, bits 2-0 - $D415
    FcLo = 0x15,
    /// Cutoff frequency, bits 10-3 - $D416
    FcHi = 0x16,
    /// Resonance and voice routing - $D417
    ResFilt = 0x17,
    /// Filter mode, voice 3 off and master volume - $D418
    ModeVol = 0x18,
}

impl FilterRegister {
    /// Map a SID register address (0-31) onto a filter register
    pub fn from_addr(addr: u8) -> Option<Self> {
        match addr & 0x1f {
            0x15 => Some(FilterRegister::FcLo),
            0x16 => Some(FilterRegister::FcHi),
            0x17 => Some(FilterRegister::ResFilt),
            0x18 => Some(FilterRegister::ModeVol),
            _ => None,
        }
    }

    /// Get the register address value
    pub fn addr(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for FilterRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterRegister::FcLo => write!(f, "$D415 (FC Low)"),
            FilterRegister::FcHi => write!(f, "$D416 (FC High)"),
            FilterRegister::ResFilt => write!(f, "$D417 (Resonance/Filter)"),
            FilterRegister::ModeVol => write!(f, "$D418 (Mode/Volume)"),
        }
    }
}

bitflags! {
    /// Inputs routed through the filter (RES_FILT bits 3-0)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Routing: u8 {
        /// Voice 1 through filter
        const VOICE1 = 0x01;
        /// Voice 2 through filter
        const VOICE2 = 0x02;
        /// Voice 3 through filter
        const VOICE3 = 0x04;
        /// External input through filter
        const EXT_IN = 0x08;
    }
}

bitflags! {
    /// Filter outputs mixed into the final signal (MODE_VOL bits 6-4, shifted down)
    ///
    /// Any combination may be active at once; the selected outputs are summed
    /// without weighting.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FilterMode: u8 {
        /// Lowpass output
        const LOWPASS = 0x01;
        /// Bandpass output
        const BANDPASS = 0x02;
        /// Highpass output
        const HIGHPASS = 0x04;
    }
}

/// Decoded filter register state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterRegisters {
    /// 11-bit cutoff code
    pub fc: u16,
    /// 4-bit resonance
    pub res: u8,
    /// Inputs routed through the filter
    pub routing: Routing,
    /// Voice 3 disconnected from the unfiltered path
    pub voice3_off: bool,
    /// Selected filter outputs
    pub mode: FilterMode,
    /// 4-bit master volume
    pub vol: u8,
}

impl FilterRegisters {
    /// All fields zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace FC bits 2-0, keep bits 10-3
    pub fn write_fc_lo(&mut self, value: u8) {
        self.fc = (self.fc & 0x7f8) | (u16::from(value) & 0x007);
    }

    /// Replace FC bits 10-3, keep bits 2-0
    pub fn write_fc_hi(&mut self, value: u8) {
        self.fc = ((u16::from(value) << 3) & 0x7f8) | (self.fc & 0x007);
    }

    /// Decode resonance (bits 7-4) and routing (bits 3-0)
    pub fn write_res_filt(&mut self, value: u8) {
        self.res = (value >> 4) & 0x0f;
        self.routing = Routing::from_bits_truncate(value);
    }

    /// Decode voice 3 off (bit 7), mode (bits 6-4) and volume (bits 3-0)
    pub fn write_mode_vol(&mut self, value: u8) {
        self.voice3_off = value & 0x80 != 0;
        self.mode = FilterMode::from_bits_truncate(value >> 4);
        self.vol = value & 0x0f;
    }

    /// Set the full 11-bit cutoff code at once
    pub fn set_fc(&mut self, fc: u16) {
        self.fc = fc & 0x7ff;
    }

    /// Re-encode FC_LO
    pub fn fc_lo(&self) -> u8 {
        (self.fc & 0x007) as u8
    }

    /// Re-encode FC_HI
    pub fn fc_hi(&self) -> u8 {
        (self.fc >> 3) as u8
    }

    /// Re-encode RES_FILT
    pub fn res_filt(&self) -> u8 {
        (self.res << 4) | self.routing.bits()
    }

    /// Re-encode MODE_VOL
    pub fn mode_vol(&self) -> u8 {
        let voice3_off = if self.voice3_off { 0x80 } else { 0 };
        voice3_off | (self.mode.bits() << 4) | self.vol
    }
}
