//! Current and power scaling derived from the shunt circuit.
//!
//! The chip computes `current = shunt_voltage × CAL / 4096` and
//! `power = current × bus_voltage / 5000`. Picking `CAL` fixes the weight of
//! one current register unit (the current LSB) and of one power register unit
//! (20 × current LSB).

use crate::{decimal::Decimal, templates::TemplateId, Rounding};

/// `I_max / 2¹⁵` in 10⁻²¹ A per µA.
const MINIMUM_LSB_PER_UA: i128 = 30_517_578_125; // 5¹⁵
/// `I_max / 2¹²` in 10⁻²¹ A per µA.
const MAXIMUM_LSB_PER_UA: i128 = 244_140_625_000; // 5¹² × 1000

/// Decimal places of amps kept when rounding the current LSB.
pub const CURRENT_LSB_PLACES: u32 = 5;

/// `0.04096 / (I × R)` with `I` in 10⁻²¹ A and `R` in µΩ.
const CALIBRATION_SCALE: i128 = 4_096 * 10i128.pow(22);

/// Power register LSB as a multiple of the current LSB.
pub const POWER_LSB_FACTOR: i128 = 20;

/// Circuit description, in integer sub-units so that every derived value is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationParameters {
    pub bus_voltage_max_mv: u32,
    pub shunt_resistance_uohm: u32,
    /// Full-scale shunt voltage of the selected PGA gain.
    pub gain_voltage_mv: u32,
    pub current_max_expected_ua: u32,
}

impl CalibrationParameters {
    pub const fn new(
        bus_voltage_max_mv: u32,
        shunt_resistance_uohm: u32,
        gain_voltage_mv: u32,
        current_max_expected_ua: u32,
    ) -> Self {
        Self {
            bus_voltage_max_mv,
            shunt_resistance_uohm,
            gain_voltage_mv,
            current_max_expected_ua,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationError {
    ZeroCurrent,
    ZeroResistance,
    /// The rounded calibration value does not fit the 16 bit register, or is zero.
    OutOfRange,
}

impl CalibrationError {
    pub const fn message(self) -> &'static str {
        match self {
            CalibrationError::ZeroCurrent => "Expected maximum current must not be zero",
            CalibrationError::ZeroResistance => "Shunt resistance must not be zero",
            CalibrationError::OutOfRange => "Calibration value does not fit the register",
        }
    }
}

/// Every value derived from a set of [`CalibrationParameters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationState {
    pub parameters: CalibrationParameters,
    pub minimum_lsb: Decimal,
    pub maximum_lsb: Decimal,
    pub current_lsb: Decimal,
    pub current_lsb_rounded: Decimal,
    pub power_lsb: Decimal,
    /// Power weight used when decoding the power register.
    pub power_lsb_rounded: Decimal,
    pub calibration_value: u32,
    /// Value written to the calibration register.
    pub calibration_value_rounded: u16,
    pub max_possible_current: Decimal,
    /// `None` when the parameters were supplied by the caller.
    pub template: Option<TemplateId>,
}

impl CalibrationState {
    pub fn with_template(mut self, template: Option<TemplateId>) -> Self {
        self.template = template;
        self
    }

    /// True when the expected current exceeds what the shunt can measure at
    /// the configured gain.
    pub fn exceeds_measurable_current(&self) -> bool {
        Decimal::from_micro(self.parameters.current_max_expected_ua as i64)
            > self.max_possible_current
    }
}

const fn calibration_value(current_lsb: Decimal, shunt_resistance_uohm: u32) -> i128 {
    CALIBRATION_SCALE / (current_lsb.scaled() * shunt_resistance_uohm as i128)
}

/// Derives the calibration of a circuit.
///
/// ```rust
/// # use ina219_ups::calibration::{calibrate, CalibrationParameters};
/// # use ina219_ups::Decimal;
/// let state = calibrate(CalibrationParameters::new(32_000, 100_000, 320, 3_200_000)).unwrap();
///
/// assert_eq!(state.current_lsb_rounded, Decimal::from_micro(100));
/// assert_eq!(state.calibration_value, 4194);
/// assert_eq!(state.calibration_value_rounded, 4096);
/// ```
pub const fn calibrate(
    parameters: CalibrationParameters,
) -> Result<CalibrationState, CalibrationError> {
    if parameters.current_max_expected_ua == 0 {
        return Err(CalibrationError::ZeroCurrent);
    }
    if parameters.shunt_resistance_uohm == 0 {
        return Err(CalibrationError::ZeroResistance);
    }

    let current_max = parameters.current_max_expected_ua as i128;

    let minimum_lsb = Decimal::from_scaled(current_max * MINIMUM_LSB_PER_UA);
    let maximum_lsb = Decimal::from_scaled(current_max * MAXIMUM_LSB_PER_UA);

    let current_lsb = minimum_lsb;
    let current_lsb_rounded = current_lsb.round_dp(CURRENT_LSB_PLACES, Rounding::Up);

    let calibration = calibration_value(current_lsb, parameters.shunt_resistance_uohm);
    let calibration_rounded =
        calibration_value(current_lsb_rounded, parameters.shunt_resistance_uohm);

    if calibration_rounded < 1 || calibration_rounded > u16::MAX as i128 {
        return Err(CalibrationError::OutOfRange);
    }

    // V / Ω, with mV and µΩ inputs
    let max_possible_current = Decimal::from_scaled(
        parameters.gain_voltage_mv as i128 * 10i128.pow(24)
            / parameters.shunt_resistance_uohm as i128,
    );

    Ok(CalibrationState {
        parameters,
        minimum_lsb,
        maximum_lsb,
        current_lsb,
        current_lsb_rounded,
        power_lsb: current_lsb.mul_int(POWER_LSB_FACTOR),
        power_lsb_rounded: current_lsb_rounded.mul_int(POWER_LSB_FACTOR),
        calibration_value: if calibration > u32::MAX as i128 {
            u32::MAX
        } else {
            calibration as u32
        },
        calibration_value_rounded: calibration_rounded as u16,
        max_possible_current,
        template: None,
    })
}
