//! Fields of the configuration register and single-field edits of its word.

use device_descriptor::{field_enum, BitField};

field_enum! {
    /// Operating mode.
    pub enum Mode {
        PowerDown = 0,
        ShuntTriggered = 1,
        BusTriggered = 2,
        ShuntAndBusTriggered = 3,
        AdcOff = 4,
        ShuntContinuous = 5,
        BusContinuous = 6,
        ShuntAndBusContinuous = 7
    }
}

field_enum! {
    /// ADC resolution or sample averaging, shared by the bus and shunt ADCs.
    pub enum AdcSetting {
        Bits9 = 0,
        Bits10 = 1,
        Bits11 = 2,
        Bits12 = 3,
        /// Same conversion as `Bits12`.
        Bits12Alt = 8,
        Samples2 = 9,
        Samples4 = 10,
        Samples8 = 11,
        Samples16 = 12,
        Samples32 = 13,
        Samples64 = 14,
        Samples128 = 15
    }
}

impl AdcSetting {
    /// Decodes a raw 4-bit setting. With bit 3 clear, bit 2 is ignored by the chip.
    pub fn from_bits(bits: u16) -> Self {
        let bits = if bits & 0b1000 == 0 { bits & 0b0011 } else { bits };
        Self::try_from(bits & 0b1111).unwrap_or(AdcSetting::Bits12)
    }

    /// Conversion time in microseconds.
    pub const fn conversion_time_us(self) -> u32 {
        match self {
            AdcSetting::Bits9 => 84,
            AdcSetting::Bits10 => 148,
            AdcSetting::Bits11 => 276,
            AdcSetting::Bits12 | AdcSetting::Bits12Alt => 532,
            AdcSetting::Samples2 => 1_060,
            AdcSetting::Samples4 => 2_130,
            AdcSetting::Samples8 => 4_260,
            AdcSetting::Samples16 => 8_510,
            AdcSetting::Samples32 => 17_020,
            AdcSetting::Samples64 => 34_050,
            AdcSetting::Samples128 => 68_100,
        }
    }
}

field_enum! {
    /// Shunt programmable gain amplifier setting.
    pub enum Gain {
        /// ±40 mV
        Div1 = 0,
        /// ±80 mV
        Div2 = 1,
        /// ±160 mV
        Div4 = 2,
        /// ±320 mV
        Div8 = 3
    }
}

impl Gain {
    /// Full-scale shunt voltage in millivolts.
    pub const fn full_scale_mv(self) -> u32 {
        match self {
            Gain::Div1 => 40,
            Gain::Div2 => 80,
            Gain::Div4 => 160,
            Gain::Div8 => 320,
        }
    }
}

field_enum! {
    pub enum BusVoltageRange {
        Range16V = 0,
        Range32V = 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigField {
    Mode,
    ShuntAdc,
    BusAdc,
    Gain,
    BusVoltageRange,
    Reset,
}

impl ConfigField {
    pub const ALL: [ConfigField; 6] = [
        ConfigField::Mode,
        ConfigField::ShuntAdc,
        ConfigField::BusAdc,
        ConfigField::Gain,
        ConfigField::BusVoltageRange,
        ConfigField::Reset,
    ];

    pub const fn bits(self) -> BitField {
        match self {
            ConfigField::Mode => BitField::new(0, 3),
            ConfigField::ShuntAdc => BitField::new(3, 4),
            ConfigField::BusAdc => BitField::new(7, 4),
            ConfigField::Gain => BitField::new(11, 2),
            ConfigField::BusVoltageRange => BitField::new(13, 1),
            ConfigField::Reset => BitField::new(15, 1),
        }
    }
}

/// A configuration field together with the setting to store in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FieldValue {
    Mode(Mode),
    ShuntAdc(AdcSetting),
    BusAdc(AdcSetting),
    Gain(Gain),
    BusVoltageRange(BusVoltageRange),
    /// Power-on reset. The chip clears the bit by itself.
    Reset,
}

impl FieldValue {
    pub const fn field(self) -> ConfigField {
        match self {
            FieldValue::Mode(_) => ConfigField::Mode,
            FieldValue::ShuntAdc(_) => ConfigField::ShuntAdc,
            FieldValue::BusAdc(_) => ConfigField::BusAdc,
            FieldValue::Gain(_) => ConfigField::Gain,
            FieldValue::BusVoltageRange(_) => ConfigField::BusVoltageRange,
            FieldValue::Reset => ConfigField::Reset,
        }
    }

    pub fn bits(self) -> u16 {
        match self {
            FieldValue::Mode(mode) => mode.into(),
            FieldValue::ShuntAdc(setting) | FieldValue::BusAdc(setting) => setting.into(),
            FieldValue::Gain(gain) => gain.into(),
            FieldValue::BusVoltageRange(range) => range.into(),
            FieldValue::Reset => 1,
        }
    }
}

/// Returns `word` with the field of `value` replaced. No other bit changes.
///
/// ```rust
/// # use ina219_ups::configuration::{edit_field, FieldValue, Gain, Mode};
/// let word = edit_field(0x3EEF, FieldValue::Gain(Gain::Div1));
/// assert_eq!(word, 0x26EF);
///
/// let word = edit_field(word, FieldValue::Mode(Mode::PowerDown));
/// assert_eq!(word, 0x26E8);
/// ```
pub fn edit_field(word: u16, value: FieldValue) -> u16 {
    value.field().bits().write(word, value.bits())
}

/// Decodes one field of a configuration word.
pub fn read_field(word: u16, field: ConfigField) -> FieldValue {
    let bits = field.bits().read(word);

    match field {
        ConfigField::Mode => FieldValue::Mode(Mode::try_from(bits).unwrap_or(Mode::PowerDown)),
        ConfigField::ShuntAdc => FieldValue::ShuntAdc(AdcSetting::from_bits(bits)),
        ConfigField::BusAdc => FieldValue::BusAdc(AdcSetting::from_bits(bits)),
        ConfigField::Gain => FieldValue::Gain(Gain::try_from(bits).unwrap_or(Gain::Div8)),
        ConfigField::BusVoltageRange => FieldValue::BusVoltageRange(
            BusVoltageRange::try_from(bits).unwrap_or(BusVoltageRange::Range32V),
        ),
        ConfigField::Reset => FieldValue::Reset,
    }
}

/// The programmed gain of a configuration word.
pub fn gain(word: u16) -> Gain {
    match read_field(word, ConfigField::Gain) {
        FieldValue::Gain(gain) => gain,
        _ => Gain::Div8,
    }
}

/// Builds a configuration word with the reset bit clear.
pub const fn compose(
    range: BusVoltageRange,
    gain: Gain,
    bus_adc: AdcSetting,
    shunt_adc: AdcSetting,
    mode: Mode,
) -> u16 {
    (range as u16) << 13
        | (gain as u16) << 11
        | (bus_adc as u16) << 7
        | (shunt_adc as u16) << 3
        | mode as u16
}
