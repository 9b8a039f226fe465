use crate::{
    calibration::CalibrationError, device::DeviceState, registers::Register,
    templates::UnknownTemplate,
};

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ina219Error<E> {
    BusOpen(E),
    DeviceNotFound {
        address: u8,
    },
    Scan(E),
    RegisterRead {
        register: Register,
        error: E,
    },
    RegisterWrite {
        register: Register,
        error: E,
    },
    /// The transport returned something other than a 2 byte word.
    MalformedRead {
        register: Register,
        bytes_read: usize,
    },
    UnknownTemplate(UnknownTemplate),
    /// Read-only registers, and the calibration register, which only the
    /// calibration operations may write.
    RawWriteRejected(Register),
    Calibration(CalibrationError),
    NotReady(DeviceState),
}

impl<E> Ina219Error<E> {
    pub const fn message(&self) -> &'static str {
        match self {
            Ina219Error::BusOpen(_) => "Failed to open the I2C bus",
            Ina219Error::DeviceNotFound { .. } => "Device not found on the I2C bus",
            Ina219Error::Scan(_) => "Failed to scan the I2C bus",
            Ina219Error::RegisterRead { .. } => "Failed to read register",
            Ina219Error::RegisterWrite { .. } => "Failed to write register",
            Ina219Error::MalformedRead { .. } => "Register read returned an unexpected length",
            Ina219Error::UnknownTemplate(_) => "Unknown configuration template Id",
            Ina219Error::RawWriteRejected(_) => "Register does not accept raw writes",
            Ina219Error::Calibration(error) => error.message(),
            Ina219Error::NotReady(_) => "Device is not initialized",
        }
    }

    /// The bus error behind this failure, if there is one.
    pub fn bus_error(&self) -> Option<&E> {
        match self {
            Ina219Error::BusOpen(error)
            | Ina219Error::Scan(error)
            | Ina219Error::RegisterRead { error, .. }
            | Ina219Error::RegisterWrite { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl<E> From<CalibrationError> for Ina219Error<E> {
    fn from(error: CalibrationError) -> Self {
        Ina219Error::Calibration(error)
    }
}

impl<E> From<UnknownTemplate> for Ina219Error<E> {
    fn from(error: UnknownTemplate) -> Self {
        Ina219Error::UnknownTemplate(error)
    }
}
