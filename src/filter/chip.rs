//! SID filter - register front end, coefficient derivation and the
//! two-integrator-loop update
//!
//! The SID filter is a two-integrator-loop biquadratic filter. Vhp is the
//! output of the summer, Vbp the output of the first integrator and Vlp the
//! output of the second integrator:
//!
//! ```text
//! Vhp = Vbp/Q - Vlp - Vi
//! dVbp = -w0*Vhp*dt
//! dVlp = -w0*Vbp*dt
//! ```
//!
//! An extra inverter in the bandpass feedback lets the summer run single
//! ended, so the outputs are inverted and their level is independent of Q,
//! which matches measurements of real chips.

use std::sync::Arc;

use super::coefficients::Coefficients;
use super::constants::{DELTA_MAX_CYCLES, Q_SHIFT, W0_SHIFT};
use super::curve::{ChipModel, ControlPoint, ControlPointTable};
use super::cutoff_table::{CutoffTable, SharedCutoffTable};
use super::registers::{FilterMode, FilterRegister, FilterRegisters, Routing};
use crate::config::FilterSettings;
use crate::Result;

/// SID filter
///
/// Holds the decoded register state, the cutoff table of the selected chip
/// model, the coefficients derived from both, and the integrator state of
/// the filter update.
#[derive(Debug)]
pub struct Filter {
    enabled: bool,
    model: ChipModel,
    voice_dc: i32,

    curve: ControlPointTable,
    f0: Arc<CutoffTable>,
    published: SharedCutoffTable,

    regs: FilterRegisters,
    coeffs: Coefficients,

    // Integrator state
    vhp: i32,
    vbp: i32,
    vlp: i32,
    vnf: i32,
}

impl Filter {
    /// Create an enabled filter for `model` with all registers cleared
    pub fn new(model: ChipModel) -> Self {
        let curve = model.control_points();
        let f0 = Arc::new(CutoffTable::from_points(&curve));
        let mut filter = Self {
            enabled: true,
            model,
            voice_dc: model.voice_dc(),
            curve,
            published: SharedCutoffTable::new(Arc::clone(&f0)),
            f0,
            regs: FilterRegisters::new(),
            coeffs: Coefficients::default(),
            vhp: 0,
            vbp: 0,
            vlp: 0,
            vnf: 0,
        };
        filter.reset();
        filter
    }

    /// Create a filter from settings
    ///
    /// # Errors
    /// Returns [`crate::SidFilterError::InvalidControlPoints`] if the settings
    /// carry a malformed cutoff curve.
    pub fn from_settings(settings: &FilterSettings) -> Result<Self> {
        let mut filter = Self::new(settings.chip_model);
        filter.enable_filter(settings.enabled);
        if let Some(points) = &settings.cutoff_curve {
            filter.set_cutoff_curve(ControlPointTable::new(points.clone())?);
        }
        Ok(filter)
    }

    /// Enable or bypass the filter
    ///
    /// A bypassed filter routes every input around the integrators. Not part
    /// of the chip; useful for testing and to save CPU.
    pub fn enable_filter(&mut self, enable: bool) {
        self.enabled = enable;
    }

    /// Whether the filter is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Select the chip model
    ///
    /// Installs the model's measured curve and voice DC offset, rebuilds the
    /// cutoff table and re-derives both coefficients. Register contents are
    /// kept. A custom curve set with [`Filter::set_cutoff_curve`] is replaced
    /// by the built-in one.
    pub fn set_chip_model(&mut self, model: ChipModel) {
        log::debug!("filter chip model {} -> {}", self.model, model);
        self.model = model;
        self.voice_dc = model.voice_dc();
        self.install_curve(model.control_points());
    }

    /// Replace the cutoff curve with a caller-supplied one
    ///
    /// The chip model and voice DC offset are unchanged.
    pub fn set_cutoff_curve(&mut self, curve: ControlPointTable) {
        log::debug!(
            "installing custom cutoff curve ({} points) on {}",
            curve.len(),
            self.model
        );
        self.install_curve(curve);
    }

    /// Validate `points` and install them as the cutoff curve
    ///
    /// # Errors
    /// On a malformed curve the previous curve stays live and
    /// [`crate::SidFilterError::InvalidControlPoints`] is returned.
    pub fn try_set_cutoff_points(&mut self, points: Vec<ControlPoint>) -> Result<()> {
        match ControlPointTable::new(points) {
            Ok(curve) => {
                self.set_cutoff_curve(curve);
                Ok(())
            }
            Err(err) => {
                log::warn!("rejected cutoff curve: {err}");
                Err(err)
            }
        }
    }

    fn install_curve(&mut self, curve: ControlPointTable) {
        // Build off to the side, then swap in one step.
        let f0 = Arc::new(CutoffTable::from_points(&curve));
        self.curve = curve;
        self.f0 = Arc::clone(&f0);
        self.published.publish(f0);

        self.set_w0();
        self.set_q();
    }

    /// Clear all registers and the integrator state
    ///
    /// Chip model, curve and enable flag are kept.
    pub fn reset(&mut self) {
        self.regs = FilterRegisters::new();

        self.vhp = 0;
        self.vbp = 0;
        self.vlp = 0;
        self.vnf = 0;

        self.set_w0();
        self.set_q();
    }

    // ------------------------------------------------------------------
    // Register interface
    // ------------------------------------------------------------------

    /// Write FC_LO ($D415)
    pub fn write_fc_lo(&mut self, value: u8) {
        log::trace!("filter FC_LO <- {value:02X}");
        self.regs.write_fc_lo(value);
        self.set_w0();
    }

    /// Write FC_HI ($D416)
    pub fn write_fc_hi(&mut self, value: u8) {
        log::trace!("filter FC_HI <- {value:02X}");
        self.regs.write_fc_hi(value);
        self.set_w0();
    }

    /// Write RES_FILT ($D417)
    pub fn write_res_filt(&mut self, value: u8) {
        log::trace!("filter RES_FILT <- {value:02X}");
        self.regs.write_res_filt(value);
        self.set_q();
    }

    /// Write MODE_VOL ($D418)
    pub fn write_mode_vol(&mut self, value: u8) {
        log::trace!("filter MODE_VOL <- {value:02X}");
        self.regs.write_mode_vol(value);
    }

    /// Set the full 11-bit cutoff code (FC_HI and FC_LO in one step)
    pub fn set_fc(&mut self, fc: u16) {
        log::trace!("filter FC <- {:03X}", fc & 0x7ff);
        self.regs.set_fc(fc);
        self.set_w0();
    }

    /// Write a SID register; addresses outside $D415-$D418 are ignored
    pub fn write_register(&mut self, addr: u8, value: u8) {
        match FilterRegister::from_addr(addr) {
            Some(FilterRegister::FcLo) => self.write_fc_lo(value),
            Some(FilterRegister::FcHi) => self.write_fc_hi(value),
            Some(FilterRegister::ResFilt) => self.write_res_filt(value),
            Some(FilterRegister::ModeVol) => self.write_mode_vol(value),
            None => {}
        }
    }

    /// Current value of a filter register, re-encoded from the decoded state
    ///
    /// The registers are write-only on hardware; this is for state dumps.
    /// Returns 0 for addresses outside $D415-$D418.
    pub fn read_register(&self, addr: u8) -> u8 {
        match FilterRegister::from_addr(addr) {
            Some(FilterRegister::FcLo) => self.regs.fc_lo(),
            Some(FilterRegister::FcHi) => self.regs.fc_hi(),
            Some(FilterRegister::ResFilt) => self.regs.res_filt(),
            Some(FilterRegister::ModeVol) => self.regs.mode_vol(),
            None => 0,
        }
    }

    fn set_w0(&mut self) {
        self.coeffs.set_w0(self.f0.frequency(self.regs.fc));
    }

    fn set_q(&mut self) {
        self.coeffs.set_q(self.regs.res);
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Selected chip model
    pub fn chip_model(&self) -> ChipModel {
        self.model
    }

    /// Voice DC offset of the selected chip model
    pub fn voice_dc(&self) -> i32 {
        self.voice_dc
    }

    /// Decoded register state
    pub fn registers(&self) -> &FilterRegisters {
        &self.regs
    }

    /// Derived coefficients
    pub fn coefficients(&self) -> Coefficients {
        self.coeffs
    }

    /// Angular cutoff `w0` (scaled by 2^20 / 10^6)
    pub fn w0(&self) -> i32 {
        self.coeffs.w0
    }

    /// Damping term `1024 / Q`
    pub fn q_1024_div(&self) -> i32 {
        self.coeffs.q_1024_div
    }

    /// Cutoff frequency in Hz at the current FC code
    pub fn cutoff_frequency(&self) -> i32 {
        self.f0.frequency(self.regs.fc)
    }

    /// Control points behind the live cutoff table
    pub fn fc_default(&self) -> &[ControlPoint] {
        self.curve.points()
    }

    /// Curve behind the live cutoff table
    pub fn cutoff_curve(&self) -> &ControlPointTable {
        &self.curve
    }

    /// Live cutoff table
    pub fn cutoff_table(&self) -> &CutoffTable {
        &self.f0
    }

    /// Handle for reading the live cutoff table from another thread
    pub fn shared_cutoff_table(&self) -> SharedCutoffTable {
        self.published.clone()
    }

    /// Highpass, bandpass and lowpass outputs
    pub fn outputs(&self) -> (i32, i32, i32) {
        (self.vhp, self.vbp, self.vlp)
    }

    // ------------------------------------------------------------------
    // Filter update
    // ------------------------------------------------------------------

    /// Split the inputs into the filtered sum (returned) and the unfiltered
    /// sum (stored in `vnf`), scaling each voice from 20 to 13 bits
    #[inline]
    fn route(&mut self, voice1: i32, voice2: i32, voice3: i32, ext_in: i32) -> i32 {
        let routing = self.regs.routing;
        // Voice 3 is not silenced by voice3off if it is routed through the
        // filter.
        let voice3 = if self.regs.voice3_off && !routing.contains(Routing::VOICE3) {
            0
        } else {
            voice3 >> 7
        };
        let inputs = [
            (Routing::VOICE1, voice1 >> 7),
            (Routing::VOICE2, voice2 >> 7),
            (Routing::VOICE3, voice3),
            (Routing::EXT_IN, ext_in >> 7),
        ];

        let mut vi = 0;
        self.vnf = 0;
        for (path, v) in inputs {
            if self.enabled && routing.contains(path) {
                vi += v;
            } else {
                self.vnf += v;
            }
        }
        vi
    }

    /// Advance the filter by one 1 MHz cycle
    #[inline]
    pub fn clock(&mut self, voice1: i32, voice2: i32, voice3: i32, ext_in: i32) {
        let vi = self.route(voice1, voice2, voice3, ext_in);

        if !self.enabled {
            self.vhp = 0;
            self.vbp = 0;
            self.vlp = 0;
            return;
        }

        // dt = 1 cycle = 1/1000000 s, folded into the shift by 20.
        let dvbp = mul_shift(self.coeffs.w0_ceil_1, self.vhp, W0_SHIFT);
        let dvlp = mul_shift(self.coeffs.w0_ceil_1, self.vbp, W0_SHIFT);
        self.vbp -= dvbp;
        self.vlp -= dvlp;
        self.vhp = mul_shift(self.vbp, self.coeffs.q_1024_div, Q_SHIFT) - self.vlp - vi;
    }

    /// Advance the filter by `delta` cycles
    ///
    /// Steps of at most 8 cycles keep the update stable under the 4 kHz
    /// cutoff ceiling.
    #[inline]
    pub fn clock_delta(
        &mut self,
        mut delta: u32,
        voice1: i32,
        voice2: i32,
        voice3: i32,
        ext_in: i32,
    ) {
        let vi = self.route(voice1, voice2, voice3, ext_in);

        if !self.enabled {
            self.vhp = 0;
            self.vbp = 0;
            self.vlp = 0;
            return;
        }

        let mut delta_flt = DELTA_MAX_CYCLES;
        while delta != 0 {
            if delta < delta_flt {
                delta_flt = delta;
            }

            // Divide by 1 000 000 in two steps to avoid overflow.
            let w0_delta_t = mul_shift(self.coeffs.w0_ceil_dt, delta_flt as i32, 6);
            let dvbp = mul_shift(w0_delta_t, self.vhp, 14);
            let dvlp = mul_shift(w0_delta_t, self.vbp, 14);
            self.vbp -= dvbp;
            self.vlp -= dvlp;
            self.vhp = mul_shift(self.vbp, self.coeffs.q_1024_div, Q_SHIFT) - self.vlp - vi;

            delta -= delta_flt;
        }
    }

    /// Filter output: selected filter outputs plus the unfiltered path,
    /// scaled by the master volume
    ///
    /// The selected outputs are summed without weighting, as sampled from
    /// real chips.
    #[inline]
    pub fn output(&self) -> i32 {
        let vol = i32::from(self.regs.vol);
        if !self.enabled {
            return self.vnf * vol;
        }

        let mode = self.regs.mode;
        let mut vf = 0;
        if mode.contains(FilterMode::LOWPASS) {
            vf += self.vlp;
        }
        if mode.contains(FilterMode::BANDPASS) {
            vf += self.vbp;
        }
        if mode.contains(FilterMode::HIGHPASS) {
            vf += self.vhp;
        }
        (self.vnf + vf) * vol
    }
}

/// `(a * b) >> shift` with a 64-bit intermediate product
///
/// A full-scale step through a high-cutoff, high-resonance filter drives
/// `w0 * Vhp` past `i32::MAX`; the shifted result always fits.
#[inline]
fn mul_shift(a: i32, b: i32, shift: u32) -> i32 {
    ((i64::from(a) * i64::from(b)) >> shift) as i32
}

impl Clone for Filter {
    /// The clone gets its own [`SharedCutoffTable`] handle.
    fn clone(&self) -> Self {
        Self {
            enabled: self.enabled,
            model: self.model,
            voice_dc: self.voice_dc,
            curve: self.curve.clone(),
            f0: Arc::clone(&self.f0),
            published: SharedCutoffTable::new(Arc::clone(&self.f0)),
            regs: self.regs,
            coeffs: self.coeffs,
            vhp: self.vhp,
            vbp: self.vbp,
            vlp: self.vlp,
            vnf: self.vnf,
        }
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::new(ChipModel::Mos6581)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::coefficients::{angular_cutoff, damping};
    use crate::SidFilterError;

    #[test]
    fn test_new_is_reset() {
        let filter = Filter::new(ChipModel::Mos6581);
        assert!(filter.is_enabled());
        assert_eq!(*filter.registers(), FilterRegisters::new());
        assert_eq!(filter.outputs(), (0, 0, 0));
        assert_eq!(filter.w0(), angular_cutoff(220.0));
        assert_eq!(filter.q_1024_div(), 1448);
    }

    #[test]
    fn test_default_is_6581() {
        let filter = Filter::default();
        assert_eq!(filter.chip_model(), ChipModel::Mos6581);
        assert_eq!(filter.voice_dc(), ChipModel::Mos6581.voice_dc());
    }

    #[test]
    fn test_fc_write_rederives_w0() {
        let mut filter = Filter::new(ChipModel::Mos8580);
        filter.write_fc_hi(0x80);
        assert_eq!(filter.registers().fc, 1024);
        assert_eq!(filter.cutoff_frequency(), 6500);
        assert_eq!(filter.w0(), angular_cutoff(6500.0));
    }

    #[test]
    fn test_set_fc_rederives_w0() {
        let mut filter = Filter::new(ChipModel::Mos6581);
        filter.set_fc(0xf800 | 1023);
        assert_eq!(filter.registers().fc, 1023);
        assert_eq!(filter.read_register(0x15), 0x07);
        assert_eq!(filter.read_register(0x16), 0x7f);
        assert_eq!(filter.w0(), angular_cutoff(6000.0));
    }

    #[test]
    fn test_res_write_rederives_q() {
        let mut filter = Filter::new(ChipModel::Mos6581);
        filter.write_res_filt(0xf0);
        assert_eq!(filter.q_1024_div(), damping(15));
        let w0 = filter.w0();
        filter.write_res_filt(0x00);
        assert_eq!(filter.w0(), w0, "resonance must not touch w0");
    }

    #[test]
    fn test_mode_vol_has_no_coefficient_effect() {
        let mut filter = Filter::new(ChipModel::Mos6581);
        filter.write_fc_hi(0x40);
        let before = filter.coefficients();
        filter.write_mode_vol(0xff);
        assert_eq!(filter.coefficients(), before);
        assert_eq!(filter.registers().vol, 0x0f);
    }

    #[test]
    fn test_write_register_dispatch() {
        let mut filter = Filter::new(ChipModel::Mos6581);
        filter.write_register(0x15, 0x07);
        filter.write_register(0x16, 0x7f);
        filter.write_register(0x17, 0x31);
        filter.write_register(0x18, 0x1f);
        filter.write_register(0x04, 0xff); // not a filter register

        assert_eq!(filter.registers().fc, 1023);
        assert_eq!(filter.read_register(0x15), 0x07);
        assert_eq!(filter.read_register(0x16), 0x7f);
        assert_eq!(filter.read_register(0x17), 0x31);
        assert_eq!(filter.read_register(0x18), 0x1f);
        assert_eq!(filter.read_register(0x04), 0);
    }

    #[test]
    fn test_chip_model_change_keeps_registers() {
        let mut filter = Filter::new(ChipModel::Mos6581);
        filter.write_fc_hi(0x80);
        filter.write_res_filt(0x81);
        let regs = *filter.registers();

        filter.set_chip_model(ChipModel::Mos8580);
        assert_eq!(*filter.registers(), regs);
        assert_eq!(filter.voice_dc(), 0);
        assert_eq!(filter.cutoff_frequency(), 6500);
        assert_eq!(filter.w0(), angular_cutoff(6500.0));
        assert_eq!(filter.q_1024_div(), damping(8));
    }

    #[test]
    fn test_custom_curve_rejected_keeps_previous() {
        let mut filter = Filter::new(ChipModel::Mos6581);
        filter.write_fc_hi(0xff);
        filter.write_fc_lo(0x07);
        let before = filter.coefficients();

        let err = filter.try_set_cutoff_points(vec![
            ControlPoint::new(0, 100),
            ControlPoint::new(1500, 200),
        ]);
        assert!(matches!(err, Err(SidFilterError::InvalidControlPoints(_))));
        assert_eq!(filter.coefficients(), before);
        assert_eq!(filter.fc_default(), ChipModel::Mos6581.control_points().points());
    }

    #[test]
    fn test_custom_curve_then_model_change_restores_builtin() {
        let mut filter = Filter::new(ChipModel::Mos6581);
        filter
            .try_set_cutoff_points(vec![ControlPoint::new(0, 3000), ControlPoint::new(2047, 3000)])
            .unwrap();
        assert_eq!(filter.cutoff_frequency(), 3000);
        assert_eq!(filter.w0(), angular_cutoff(3000.0));
        assert_eq!(filter.chip_model(), ChipModel::Mos6581);

        filter.set_chip_model(ChipModel::Mos6581);
        assert_eq!(filter.cutoff_frequency(), 220);
        assert_eq!(filter.fc_default().len(), 29);
    }

    #[test]
    fn test_shared_table_follows_model_change() {
        let mut filter = Filter::new(ChipModel::Mos6581);
        let handle = filter.shared_cutoff_table();
        assert_eq!(handle.snapshot().frequency(1024), 4600);

        filter.set_chip_model(ChipModel::Mos8580);
        assert_eq!(handle.snapshot().frequency(1024), 6500);

        let clone = filter.clone();
        filter.set_chip_model(ChipModel::Mos6581);
        assert_eq!(clone.shared_cutoff_table().snapshot().frequency(1024), 6500);
        assert_eq!(handle.snapshot().frequency(1024), 4600);
    }

    #[test]
    fn test_reset_keeps_model_and_enable() {
        let mut filter = Filter::new(ChipModel::Mos8580);
        filter.enable_filter(false);
        filter.write_mode_vol(0x9f);
        filter.reset();
        assert_eq!(filter.chip_model(), ChipModel::Mos8580);
        assert!(!filter.is_enabled());
        assert_eq!(filter.registers().vol, 0);
        assert!(!filter.registers().voice3_off);
    }

    #[test]
    fn test_lowpass_settles_to_dc_input() {
        let mut filter = Filter::new(ChipModel::Mos8580);
        filter.write_fc_hi(0x40);
        filter.write_res_filt(0x01);
        filter.write_mode_vol(0x1f);

        let input = 4000 << 7;
        for _ in 0..20_000 {
            filter.clock(input, 0, 0, 0);
        }
        let (_, _, vlp) = filter.outputs();
        // Outputs are inverted.
        assert!((vlp + 4000).abs() <= 40, "vlp = {vlp}");
        assert_eq!(filter.output(), vlp * 15);
    }

    #[test]
    fn test_disabled_filter_bypasses() {
        let mut filter = Filter::new(ChipModel::Mos6581);
        filter.enable_filter(false);
        filter.write_res_filt(0x0f);
        filter.write_mode_vol(0x7a);

        filter.clock(128 << 7, 256 << 7, 512 << 7, 1024 << 7);
        assert_eq!(filter.outputs(), (0, 0, 0));
        assert_eq!(filter.output(), (128 + 256 + 512 + 1024) * 10);
    }

    #[test]
    fn test_voice3_off_only_affects_unfiltered_path() {
        let mut filter = Filter::new(ChipModel::Mos6581);
        filter.write_mode_vol(0x8f);
        filter.clock(0, 0, 100 << 7, 0);
        assert_eq!(filter.output(), 0);

        filter.reset();
        filter.write_res_filt(0x04);
        filter.write_mode_vol(0x8f);
        filter.clock(0, 0, 100 << 7, 0);
        // Voice 3 is routed into the filter, so it reaches the summer.
        let (vhp, _, _) = filter.outputs();
        assert_eq!(vhp, -100);
    }

    #[test]
    fn test_full_scale_square_at_max_cutoff_and_resonance() {
        let mut filter = Filter::new(ChipModel::Mos6581);
        filter.write_register(0x15, 0x07);
        filter.write_register(0x16, 0xff);
        filter.write_register(0x17, 0xff);
        filter.write_register(0x18, 0x7f);
        assert_eq!(filter.w0(), angular_cutoff(18000.0));

        let full = (1 << 19) - 1;
        for cycle in 0..20_000 {
            let v = if (cycle / 500) % 2 == 0 { full } else { -full };
            filter.clock(v, v, v, v);

            let (vhp, vbp, vlp) = filter.outputs();
            assert!(
                vhp.abs() < 1 << 16 && vbp.abs() < 1 << 16 && vlp.abs() < 1 << 16,
                "cycle {cycle}: ({vhp}, {vbp}, {vlp})"
            );
        }
    }

    #[test]
    fn test_mul_shift_widens_product() {
        assert_eq!(mul_shift(105_414, 32_773, W0_SHIFT), 3_294);
        assert_eq!(mul_shift(105_414, -32_773, W0_SHIFT), -3_295);
        assert_eq!(mul_shift(1448, 4000, Q_SHIFT), 5656);
    }

    #[test]
    fn test_clock_delta_splits_into_eight_cycle_steps() {
        let mut a = Filter::new(ChipModel::Mos6581);
        let mut b = Filter::new(ChipModel::Mos6581);
        for f in [&mut a, &mut b] {
            f.write_res_filt(0x01);
            f.write_mode_vol(0x1f);
        }

        for _ in 0..2_500 {
            a.clock_delta(16, 4000 << 7, 0, 0, 0);
            b.clock_delta(8, 4000 << 7, 0, 0, 0);
            b.clock_delta(8, 4000 << 7, 0, 0, 0);
        }
        assert_eq!(a.outputs(), b.outputs());
        let (_, _, vlp) = a.outputs();
        assert!((vlp + 4000).abs() <= 40, "vlp = {vlp}");
    }
}
