//! Conversion of raw register words into engineering values.

use device_descriptor::{ExtendedView, UnitLabel};
use heapless::String;

use crate::{
    calibration::CalibrationState,
    decimal::{Decimal, DECIMAL_TEXT_LEN},
    registers::{
        Quantity, RawReading, RegisterDescriptor, CHARGE_REMAINING_NAME, CHARGE_REMAINING_UNIT,
        POWER_SUPPLY_VOLTAGE_NAME, POWER_SUPPLY_VOLTAGE_UNIT,
    },
};

/// Decimal places of [`DecodedValue::text`].
pub const TEXT_PLACES: u32 = 4;

/// Bus voltage register LSB.
const BUS_VOLTAGE_LSB_MV: i64 = 4;
/// Shunt voltage register LSB.
const SHUNT_VOLTAGE_LSB_UV: i64 = 10;

/// Battery pack voltage reported as empty.
const EMPTY_PACK: Decimal = Decimal::from_integer(6);
/// Voltage span between an empty and a full pack, in tenths of a volt.
const PACK_SPAN_DV: i128 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum View {
    #[default]
    Value,
    /// Value plus the per-bit diagnostic view.
    Extended,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodedValue {
    pub name: &'static str,
    pub value: f32,
    pub exact: Decimal,
    /// `exact` with four decimal places. Empty for registers that have no unit.
    pub text: String<DECIMAL_TEXT_LEN>,
    pub unit: Option<UnitLabel>,
    pub extended: Option<ExtendedView>,
}

impl DecodedValue {
    fn new(
        name: &'static str,
        exact: Decimal,
        unit: Option<UnitLabel>,
        extended: Option<ExtendedView>,
    ) -> Self {
        Self {
            name,
            value: exact.to_f32(),
            exact,
            text: if unit.is_some() {
                exact.to_text(TEXT_PLACES)
            } else {
                String::new()
            },
            unit,
            extended,
        }
    }
}

fn scale(quantity: Quantity, raw: &RawReading, calibration: Option<&CalibrationState>) -> Decimal {
    match quantity {
        Quantity::Bits => Decimal::from_integer(raw.word() as i64),
        // the low 3 bits are status flags
        Quantity::BusVoltage => Decimal::from_milli((raw.word() >> 3) as i64 * BUS_VOLTAGE_LSB_MV),
        Quantity::ShuntVoltage => Decimal::from_micro(raw.payload as i64 * SHUNT_VOLTAGE_LSB_UV),
        Quantity::Current => calibration
            .map(|cal| cal.current_lsb_rounded.mul_int(raw.payload as i128))
            .unwrap_or(Decimal::ZERO),
        Quantity::Power => calibration
            .map(|cal| cal.power_lsb_rounded.mul_int(raw.word() as i128))
            .unwrap_or(Decimal::ZERO),
    }
}

/// Decodes a register word.
///
/// Without a calibration the chip reports zero current and power, and so does this.
///
/// ```rust
/// # use ina219_ups::{codec::{decode, View}, registers::{RawReading, BUS_VOLTAGE}};
/// let value = decode(&BUS_VOLTAGE, &RawReading::from_word(0x0868), None, View::Value);
///
/// assert_eq!(value.text.as_str(), "1.0760");
/// assert!(value.extended.is_none());
/// ```
pub fn decode(
    descriptor: &RegisterDescriptor,
    raw: &RawReading,
    calibration: Option<&CalibrationState>,
    view: View,
) -> DecodedValue {
    let exact = scale(descriptor.quantity, raw, calibration);

    let extended = match view {
        View::Value => None,
        View::Extended => Some(ExtendedView::new(&descriptor.labels, raw.buffer)),
    };

    DecodedValue::new(descriptor.name, exact, descriptor.unit, extended)
}

fn composite_view(view: View) -> Option<ExtendedView> {
    match view {
        View::Value => None,
        View::Extended => Some(ExtendedView::empty()),
    }
}

/// Voltage at the UPS input: bus voltage plus the drop over the shunt.
pub fn power_supply_voltage(
    bus_voltage: &DecodedValue,
    shunt_voltage: &DecodedValue,
    view: View,
) -> DecodedValue {
    DecodedValue::new(
        POWER_SUPPLY_VOLTAGE_NAME,
        bus_voltage.exact + shunt_voltage.exact,
        Some(POWER_SUPPLY_VOLTAGE_UNIT),
        composite_view(view),
    )
}

/// Battery charge in percent, linear between 6 V and 8.4 V.
///
/// ```rust
/// # use ina219_ups::{codec::{charge_remaining, decode, View}, registers::{RawReading, BUS_VOLTAGE}};
/// // 7.2 V
/// let bus = decode(&BUS_VOLTAGE, &RawReading::from_word(1800 << 3), None, View::Value);
///
/// assert_eq!(charge_remaining(&bus, View::Value).text.as_str(), "50.0000");
/// ```
pub fn charge_remaining(bus_voltage: &DecodedValue, view: View) -> DecodedValue {
    let percent = (bus_voltage.exact - EMPTY_PACK)
        .mul_int(1000)
        .div_int(PACK_SPAN_DV)
        .clamp_to(Decimal::ZERO, Decimal::HUNDRED);

    DecodedValue::new(
        CHARGE_REMAINING_NAME,
        percent,
        Some(CHARGE_REMAINING_UNIT),
        composite_view(view),
    )
}
