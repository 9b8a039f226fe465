#![cfg_attr(not(test), no_std)]

//! Async driver for the INA219 current and power monitor of the WaveShare UPS HAT.
//!
//! ```rust,no_run
//! # use ina219_ups::{Ina219, TemplateId, View, DEFAULT_ADDRESS, DEFAULT_BUS};
//! # use register_access::RegisterBus;
//! # async fn run<B: RegisterBus>(bus: B) -> Result<(), ina219_ups::Ina219Error<B::Error>> {
//! let mut ups = Ina219::new(bus);
//! ups.initialize(DEFAULT_ADDRESS, DEFAULT_BUS, TemplateId::Range32V2A).await?;
//!
//! let voltage = ups.get_bus_voltage(View::Value).await?;
//! let charge = ups.get_charge_remaining(View::Value).await?;
//! # Ok(())
//! # }
//! ```

pub mod calibration;
pub mod codec;
pub mod configuration;
pub mod decimal;
pub mod device;
pub mod envelope;
pub mod error;
pub mod registers;
pub mod shared;
pub mod templates;

#[cfg(test)]
mod testing;

pub use calibration::{CalibrationError, CalibrationParameters, CalibrationState};
pub use codec::{DecodedValue, View};
pub use configuration::FieldValue;
pub use decimal::{Decimal, Rounding};
pub use device::{DeviceInformation, DeviceState, Fault, Ina219, InitStep};
pub use envelope::Envelope;
pub use register_access::{AddressList, I2cBus, RegisterBus};
pub use error::Ina219Error;
pub use registers::{RawReading, Register};
pub use shared::SharedIna219;
pub use templates::{ConfigurationTemplate, TemplateId};

/// Address of the INA219 on the UPS HAT.
pub const DEFAULT_ADDRESS: u8 = 0x42;
/// I2C bus the HAT is wired to on a Raspberry Pi.
pub const DEFAULT_BUS: u8 = 1;
