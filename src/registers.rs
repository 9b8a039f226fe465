use byteorder::{BigEndian, ByteOrder};
use device_descriptor::{BitLabels, UnitLabel};

use crate::configuration::Gain;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    Configuration,
    ShuntVoltage,
    BusVoltage,
    Power,
    Current,
    Calibration,
}

impl Register {
    pub const ALL: [Register; 6] = [
        Register::Configuration,
        Register::ShuntVoltage,
        Register::BusVoltage,
        Register::Power,
        Register::Current,
        Register::Calibration,
    ];

    pub const fn addr(self) -> u8 {
        match self {
            Register::Configuration => 0x00,
            Register::ShuntVoltage => 0x01,
            Register::BusVoltage => 0x02,
            Register::Power => 0x03,
            Register::Current => 0x04,
            Register::Calibration => 0x05,
        }
    }

    pub const fn from_addr(addr: u8) -> Option<Self> {
        match addr {
            0x00 => Some(Register::Configuration),
            0x01 => Some(Register::ShuntVoltage),
            0x02 => Some(Register::BusVoltage),
            0x03 => Some(Register::Power),
            0x04 => Some(Register::Current),
            0x05 => Some(Register::Calibration),
            _ => None,
        }
    }

    /// Only these two accept writes, the rest are measurement results.
    pub const fn is_writable(self) -> bool {
        matches!(self, Register::Configuration | Register::Calibration)
    }
}

/// How the raw word of a register maps to an engineering value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Quantity {
    /// Bit pattern only, no engineering value.
    Bits,
    BusVoltage,
    ShuntVoltage,
    Current,
    Power,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterDescriptor {
    pub name: &'static str,
    pub register: Register,
    pub labels: BitLabels,
    pub unit: Option<UnitLabel>,
    pub quantity: Quantity,
}

const VOLT: UnitLabel = UnitLabel::new("volt", "volts", "v");
const AMP: UnitLabel = UnitLabel::new("amp", "amps", "a");
const WATT: UnitLabel = UnitLabel::new("watt", "watts", "w");
const PERCENT: UnitLabel = UnitLabel::new("percent", "percent", "%");

pub const CONFIGURATION: RegisterDescriptor = RegisterDescriptor {
    name: "configuration",
    register: Register::Configuration,
    labels: [
        "RST", "-", "BRNG", "PG1", "PG0",
        "BADC4", "BADC3", "BADC2", "BADC1",
        "SADC4", "SADC3", "SADC2", "SADC1",
        "MODE3", "MODE2", "MODE1",
    ],
    unit: None,
    quantity: Quantity::Bits,
};

pub const CALIBRATION: RegisterDescriptor = RegisterDescriptor {
    name: "calibration",
    register: Register::Calibration,
    labels: [
        "FS15", "FS14", "FS13", "FS12", "FS11", "FS10", "FS9", "FS8",
        "FS7", "FS6", "FS5", "FS4", "FS3", "FS2", "FS1", "FS0",
    ],
    unit: None,
    quantity: Quantity::Bits,
};

pub const BUS_VOLTAGE: RegisterDescriptor = RegisterDescriptor {
    name: "bus voltage",
    register: Register::BusVoltage,
    labels: [
        "BD12", "BD11", "BD10", "BD9", "BD8", "BD7", "BD6", "BD5",
        "BD4", "BD3", "BD2", "BD1", "BD0", "-", "CNVR", "OVF",
    ],
    unit: Some(VOLT),
    quantity: Quantity::BusVoltage,
};

pub const SHUNT_VOLTAGE_PGA_8: RegisterDescriptor = RegisterDescriptor {
    name: "shunt voltage",
    register: Register::ShuntVoltage,
    labels: [
        "SIGN", "SD14_8", "SD13_8", "SD12_8", "SD11_8", "SD10_8", "SD9_8", "SD8_8",
        "SD7_8", "SD6_8", "SD5_8", "SD4_8", "SD3_8", "SD2_8", "SD1_8", "SD0_8",
    ],
    unit: Some(VOLT),
    quantity: Quantity::ShuntVoltage,
};

pub const SHUNT_VOLTAGE_PGA_4: RegisterDescriptor = RegisterDescriptor {
    labels: [
        "SIGN", "SIGN", "SD13_4", "SD12_4", "SD11_4", "SD10_4", "SD9_4", "SD8_4",
        "SD7_4", "SD6_4", "SD5_4", "SD4_4", "SD3_4", "SD2_4", "SD1_4", "SD0_4",
    ],
    ..SHUNT_VOLTAGE_PGA_8
};

pub const SHUNT_VOLTAGE_PGA_2: RegisterDescriptor = RegisterDescriptor {
    labels: [
        "SIGN", "SIGN", "SIGN", "SD12_2", "SD11_2", "SD10_2", "SD9_2", "SD8_2",
        "SD7_2", "SD6_2", "SD5_2", "SD4_2", "SD3_2", "SD2_2", "SD1_2", "SD0_2",
    ],
    ..SHUNT_VOLTAGE_PGA_8
};

pub const SHUNT_VOLTAGE_PGA_1: RegisterDescriptor = RegisterDescriptor {
    labels: [
        "SIGN", "SIGN", "SIGN", "SIGN", "SD11_1", "SD10_1", "SD9_1", "SD8_1",
        "SD7_1", "SD6_1", "SD5_1", "SD4_1", "SD3_1", "SD2_1", "SD1_1", "SD0_1",
    ],
    ..SHUNT_VOLTAGE_PGA_8
};

pub const POWER: RegisterDescriptor = RegisterDescriptor {
    name: "power",
    register: Register::Power,
    labels: [
        "PD15", "PD14", "PD13", "PD12", "PD11", "PD10", "PD9", "PD8",
        "PD7", "PD6", "PD5", "PD4", "PD3", "PD2", "PD1", "PD0",
    ],
    unit: Some(WATT),
    quantity: Quantity::Power,
};

pub const CURRENT: RegisterDescriptor = RegisterDescriptor {
    name: "current",
    register: Register::Current,
    labels: [
        "CSIGN", "CD14", "CD13", "CD12", "CD11", "CD10", "CD9", "CD8",
        "CD7", "CD6", "CD5", "CD4", "CD3", "CD2", "CD1", "CD0",
    ],
    unit: Some(AMP),
    quantity: Quantity::Current,
};

pub const POWER_SUPPLY_VOLTAGE_NAME: &str = "power supply voltage";
pub const POWER_SUPPLY_VOLTAGE_UNIT: UnitLabel = VOLT;
pub const CHARGE_REMAINING_NAME: &str = "charge remaining";
pub const CHARGE_REMAINING_UNIT: UnitLabel = PERCENT;

/// The shunt voltage register sign-extends into more bits as the PGA range shrinks.
pub const fn shunt_voltage(gain: Gain) -> &'static RegisterDescriptor {
    match gain {
        Gain::Div8 => &SHUNT_VOLTAGE_PGA_8,
        Gain::Div4 => &SHUNT_VOLTAGE_PGA_4,
        Gain::Div2 => &SHUNT_VOLTAGE_PGA_2,
        Gain::Div1 => &SHUNT_VOLTAGE_PGA_1,
    }
}

/// Descriptor of `register`. Shunt voltage labels depend on the configured gain.
pub const fn descriptor(register: Register, gain: Gain) -> &'static RegisterDescriptor {
    match register {
        Register::Configuration => &CONFIGURATION,
        Register::ShuntVoltage => shunt_voltage(gain),
        Register::BusVoltage => &BUS_VOLTAGE,
        Register::Power => &POWER,
        Register::Current => &CURRENT,
        Register::Calibration => &CALIBRATION,
    }
}

/// A register word as it came off the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawReading {
    pub bytes_read: usize,
    pub buffer: [u8; 2],
    pub payload: i16,
}

impl RawReading {
    /// Returns `None` unless exactly two bytes were read.
    pub fn new(bytes: &[u8]) -> Option<Self> {
        let buffer: [u8; 2] = bytes.try_into().ok()?;

        Some(Self {
            bytes_read: bytes.len(),
            buffer,
            payload: BigEndian::read_i16(&buffer),
        })
    }

    pub fn from_word(word: u16) -> Self {
        let mut buffer = [0; 2];
        BigEndian::write_u16(&mut buffer, word);

        Self {
            bytes_read: buffer.len(),
            buffer,
            payload: word as i16,
        }
    }

    /// The unsigned view of the payload.
    pub fn word(&self) -> u16 {
        BigEndian::read_u16(&self.buffer)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn register_addresses() {
        for register in Register::ALL {
            assert_eq!(Register::from_addr(register.addr()), Some(register));
        }
        assert_eq!(Register::from_addr(0x06), None);
    }

    #[test]
    fn raw_reading_is_big_endian() {
        let reading = RawReading::new(&[0xFF, 0x9C]).unwrap();

        assert_eq!(reading.bytes_read, 2);
        assert_eq!(reading.payload, -100);
        assert_eq!(reading.word(), 0xFF9C);
        assert_eq!(RawReading::from_word(0xFF9C), reading);
    }

    #[test]
    fn raw_reading_needs_two_bytes() {
        assert_eq!(RawReading::new(&[]), None);
        assert_eq!(RawReading::new(&[0x01]), None);
        assert_eq!(RawReading::new(&[0x01, 0x02, 0x03]), None);
    }

    #[test]
    fn shunt_labels_follow_gain() {
        let sign_bits = |gain| {
            shunt_voltage(gain)
                .labels
                .iter()
                .take_while(|label| **label == "SIGN")
                .count()
        };

        assert_eq!(sign_bits(Gain::Div8), 1);
        assert_eq!(sign_bits(Gain::Div4), 2);
        assert_eq!(sign_bits(Gain::Div2), 3);
        assert_eq!(sign_bits(Gain::Div1), 4);
    }

    #[test]
    fn only_configuration_and_calibration_are_writable() {
        let writable = Register::ALL
            .iter()
            .filter(|register| register.is_writable())
            .count();

        assert_eq!(writable, 2);
        assert!(Register::Calibration.is_writable());
    }
}
