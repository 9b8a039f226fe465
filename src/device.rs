use byteorder::{BigEndian, ByteOrder};
use device_descriptor::ExtendedView;
use logger::{debug, error, info, trace, warn};
use register_access::{AddressList, RegisterBus};

use crate::{
    calibration::{calibrate, CalibrationParameters, CalibrationState},
    codec::{self, DecodedValue, View},
    configuration::{self, edit_field, ConfigField, FieldValue},
    error::Ina219Error,
    registers::{descriptor, RawReading, Register},
    templates::{ConfigurationTemplate, TemplateId},
    DEFAULT_ADDRESS, DEFAULT_BUS,
};

/// Configuration register content after a power-on reset.
pub const POWER_ON_CONFIGURATION: u16 = 0x399F;

/// Initialization step that can fail after the device was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitStep {
    Configure,
    Calibrate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Fault {
    pub step: InitStep,
    pub cause: &'static str,
}

impl Fault {
    /// The last state the session reached before the failing step.
    pub const fn reached(&self) -> DeviceState {
        match self.step {
            InitStep::Configure => DeviceState::DeviceFound,
            InitStep::Calibrate => DeviceState::Configured,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    #[default]
    Uninitialized,
    BusOpen,
    DeviceFound,
    Configured,
    Calibrated,
    Ready,
    /// Initialization stopped part way. Nothing was rolled back.
    Error(Fault),
}

/// Bus details and live register views of a ready device.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Connection {
    pub address: u8,
    pub bus_number: u8,
    pub configuration: ExtendedView,
    pub calibration: ExtendedView,
    pub calculation_values: CalibrationState,
    pub bus_scan: AddressList,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceInformation {
    pub manufacturer: &'static str,
    pub device_name: &'static str,
    pub sensor: &'static str,
    pub kind: &'static str,
    /// `None` unless the session is ready.
    pub connection: Option<Connection>,
}

impl DeviceInformation {
    const fn disconnected() -> Self {
        Self {
            manufacturer: "WaveShare",
            device_name: "WaveShare UPS",
            sensor: "ina219",
            kind: "Voltage reading",
            connection: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }
}

/// Reset clears the reset bit and loads the power-on configuration.
fn settled_configuration(word: u16) -> u16 {
    if ConfigField::Reset.bits().read(word) != 0 {
        POWER_ON_CONFIGURATION
    } else {
        word
    }
}

/// One INA219 on one bus.
///
/// The chip only updates its current and power registers after the
/// calibration register is written, so every register read writes the active
/// calibration first.
pub struct Ina219<B> {
    bus: B,
    address: u8,
    bus_number: u8,
    state: DeviceState,
    configuration: Option<u16>,
    calibration: Option<CalibrationState>,
}

impl<B> Ina219<B> {
    pub const fn new(bus: B) -> Self {
        Self {
            bus,
            address: DEFAULT_ADDRESS,
            bus_number: DEFAULT_BUS,
            state: DeviceState::Uninitialized,
            configuration: None,
            calibration: None,
        }
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn bus_number(&self) -> u8 {
        self.bus_number
    }

    /// The configuration word the device was last confirmed to hold.
    pub fn configuration(&self) -> Option<u16> {
        self.configuration
    }

    /// The active calibration, without touching the bus.
    pub fn calculation_values(&self) -> Option<&CalibrationState> {
        self.calibration.as_ref()
    }

    pub fn release(self) -> B {
        self.bus
    }

    fn reset_session(&mut self, address: u8, bus_number: u8) {
        self.address = address;
        self.bus_number = bus_number;
        self.state = DeviceState::Uninitialized;
        self.configuration = None;
        self.calibration = None;
    }

    fn gain(&self) -> configuration::Gain {
        configuration::gain(self.configuration.unwrap_or(POWER_ON_CONFIGURATION))
    }
}

impl<B> Ina219<B>
where
    B: RegisterBus,
{
    fn ready(&self) -> Result<CalibrationState, Ina219Error<B::Error>> {
        match (self.state, self.calibration) {
            (DeviceState::Ready, Some(calibration)) => Ok(calibration),
            (state, _) => Err(Ina219Error::NotReady(state)),
        }
    }

    fn fail(&mut self, step: InitStep, error: Ina219Error<B::Error>) -> Ina219Error<B::Error> {
        let fault = Fault {
            step,
            cause: error.message(),
        };
        error!("Initialization failed: {:?}", fault);
        self.state = DeviceState::Error(fault);
        error
    }

    async fn write_word(&mut self, register: Register, value: u16) -> Result<(), Ina219Error<B::Error>> {
        let mut bytes = [0; 2];
        BigEndian::write_u16(&mut bytes, value);

        trace!("Writing {:?} = {:#x}", register, value);

        self.bus
            .write_block(self.address, register.addr(), &bytes)
            .await
            .map_err(|error| Ina219Error::RegisterWrite { register, error })
    }

    /// Writes a configuration word and caches what the chip holds afterwards.
    async fn write_configuration(&mut self, word: u16) -> Result<(), Ina219Error<B::Error>> {
        self.write_word(Register::Configuration, word).await?;
        self.configuration = Some(settled_configuration(word));
        Ok(())
    }

    async fn read_word(&mut self, register: Register) -> Result<RawReading, Ina219Error<B::Error>> {
        let mut buffer = [0; 2];

        let bytes_read = self
            .bus
            .read_block(self.address, register.addr(), &mut buffer)
            .await
            .map_err(|error| Ina219Error::RegisterRead { register, error })?;

        buffer
            .get(..bytes_read)
            .and_then(RawReading::new)
            .ok_or(Ina219Error::MalformedRead {
                register,
                bytes_read,
            })
    }

    async fn find_device(&mut self) -> Result<(), Ina219Error<B::Error>> {
        let address = self.address;

        // a sleeping device may only answer once the first scan woke it up
        self.bus
            .scan(Some(address))
            .await
            .map_err(Ina219Error::Scan)?;
        let found = self
            .bus
            .scan(Some(address))
            .await
            .map_err(Ina219Error::Scan)?;

        if found.contains(&address) {
            Ok(())
        } else {
            Err(Ina219Error::DeviceNotFound { address })
        }
    }

    /// Opens the bus, looks for the device and programs `template`.
    ///
    /// Any earlier session is discarded first. Failing to open the bus or to
    /// find the device leaves the session uninitialized. A failed register
    /// write after that leaves it in [`DeviceState::Error`].
    pub async fn initialize(
        &mut self,
        address: u8,
        bus_number: u8,
        template: TemplateId,
    ) -> Result<(), Ina219Error<B::Error>> {
        self.reset_session(address, bus_number);

        self.bus
            .open(bus_number)
            .await
            .map_err(Ina219Error::BusOpen)?;
        self.state = DeviceState::BusOpen;

        if let Err(error) = self.find_device().await {
            warn!("No INA219 at {:#x} on bus {}", address, bus_number);
            self.state = DeviceState::Uninitialized;
            return Err(error);
        }
        self.state = DeviceState::DeviceFound;

        let template = template.template();

        if let Err(error) = self.write_configuration(template.configuration).await {
            return Err(self.fail(InitStep::Configure, error));
        }
        self.state = DeviceState::Configured;

        if let Err(error) = self
            .write_word(
                Register::Calibration,
                template.calibration.calibration_value_rounded,
            )
            .await
        {
            return Err(self.fail(InitStep::Calibrate, error));
        }
        self.calibration = Some(template.calibration);
        self.state = DeviceState::Calibrated;

        info!(
            "INA219 ready at {:#x} on bus {} with template {:?}",
            address, bus_number, template.id
        );
        self.state = DeviceState::Ready;

        Ok(())
    }

    /// Rewrites the active calibration value. Nothing is recomputed.
    pub async fn trigger_calibration(&mut self) -> Result<CalibrationState, Ina219Error<B::Error>> {
        let calibration = self.ready()?;

        self.write_word(Register::Calibration, calibration.calibration_value_rounded)
            .await?;

        Ok(calibration)
    }

    /// Reads `register` after re-arming the calibration.
    pub async fn read_register(&mut self, register: Register) -> Result<RawReading, Ina219Error<B::Error>> {
        self.trigger_calibration().await?;
        self.read_word(register).await
    }

    /// Writes `value` to the configuration register as is and reads it back.
    ///
    /// Other registers are rejected: the measurement registers are read-only
    /// and the calibration register has to match the active
    /// [`CalibrationState`], so it is only written through
    /// [`Self::set_custom_calibration`] and the template operations.
    pub async fn write_register(
        &mut self,
        register: Register,
        value: u16,
    ) -> Result<(), Ina219Error<B::Error>> {
        self.ready()?;

        if register != Register::Configuration {
            return Err(Ina219Error::RawWriteRejected(register));
        }

        self.write_configuration(value).await?;
        self.confirm_configuration().await?;

        Ok(())
    }

    /// Programs the configuration and calibration of a template.
    pub async fn set_configuration_by_template(
        &mut self,
        id: TemplateId,
    ) -> Result<&'static ConfigurationTemplate, Ina219Error<B::Error>> {
        self.ready()?;
        let template = id.template();

        self.write_configuration(template.configuration).await?;
        self.write_word(
            Register::Calibration,
            template.calibration.calibration_value_rounded,
        )
        .await?;
        self.calibration = Some(template.calibration);

        debug!("Configuration template {:?} applied", id);

        Ok(template)
    }

    /// [`Self::set_configuration_by_template`] with the template given by name.
    pub async fn set_configuration_by_name(
        &mut self,
        name: &str,
    ) -> Result<&'static ConfigurationTemplate, Ina219Error<B::Error>> {
        let id = name.parse::<TemplateId>()?;
        self.set_configuration_by_template(id).await
    }

    /// Programs only the calibration of a template.
    pub async fn set_calibration_by_template(
        &mut self,
        id: TemplateId,
    ) -> Result<CalibrationState, Ina219Error<B::Error>> {
        self.ready()?;
        let calibration = id.template().calibration;

        self.write_word(Register::Calibration, calibration.calibration_value_rounded)
            .await?;
        self.calibration = Some(calibration);

        Ok(calibration)
    }

    pub async fn set_calibration_by_name(
        &mut self,
        name: &str,
    ) -> Result<CalibrationState, Ina219Error<B::Error>> {
        let id = name.parse::<TemplateId>()?;
        self.set_calibration_by_template(id).await
    }

    /// Calibrates for a circuit that matches none of the templates.
    pub async fn set_custom_calibration(
        &mut self,
        parameters: CalibrationParameters,
    ) -> Result<CalibrationState, Ina219Error<B::Error>> {
        self.ready()?;
        let calibration = calibrate(parameters)?;

        if calibration.exceeds_measurable_current() {
            warn!(
                "Expected current of {} uA exceeds the measurable range",
                parameters.current_max_expected_ua
            );
        }

        self.write_word(Register::Calibration, calibration.calibration_value_rounded)
            .await?;
        self.calibration = Some(calibration);

        Ok(calibration)
    }

    async fn confirm_configuration(&mut self) -> Result<DecodedValue, Ina219Error<B::Error>> {
        let raw = self.read_register(Register::Configuration).await?;
        self.configuration = Some(raw.word());

        Ok(codec::decode(
            descriptor(Register::Configuration, self.gain()),
            &raw,
            None,
            View::Extended,
        ))
    }

    /// Writes a whole configuration word and reads it back.
    pub async fn set_configuration(&mut self, word: u16) -> Result<DecodedValue, Ina219Error<B::Error>> {
        self.ready()?;
        self.write_configuration(word).await?;
        self.confirm_configuration().await
    }

    /// Changes one field of the configuration and reads the result back.
    pub async fn set_configuration_field(
        &mut self,
        value: FieldValue,
    ) -> Result<DecodedValue, Ina219Error<B::Error>> {
        self.ready()?;
        let old = self.configuration.unwrap_or(POWER_ON_CONFIGURATION);
        let word = edit_field(old, value);

        debug!("Configuration {:#x} -> {:#x}", old, word);

        self.write_configuration(word).await?;
        self.confirm_configuration().await
    }

    async fn read_decoded(
        &mut self,
        register: Register,
        view: View,
    ) -> Result<DecodedValue, Ina219Error<B::Error>> {
        let raw = self.read_register(register).await?;

        Ok(codec::decode(
            descriptor(register, self.gain()),
            &raw,
            self.calibration.as_ref(),
            view,
        ))
    }

    /// Reads the configuration register, with its per-bit view.
    pub async fn get_configuration(&mut self) -> Result<DecodedValue, Ina219Error<B::Error>> {
        self.read_decoded(Register::Configuration, View::Extended)
            .await
    }

    /// Reads the calibration register, with its per-bit view.
    pub async fn get_calibration(&mut self) -> Result<DecodedValue, Ina219Error<B::Error>> {
        self.read_decoded(Register::Calibration, View::Extended)
            .await
    }

    pub async fn get_bus_voltage(&mut self, view: View) -> Result<DecodedValue, Ina219Error<B::Error>> {
        self.read_decoded(Register::BusVoltage, view).await
    }

    pub async fn get_shunt_voltage(
        &mut self,
        view: View,
    ) -> Result<DecodedValue, Ina219Error<B::Error>> {
        self.read_decoded(Register::ShuntVoltage, view).await
    }

    pub async fn get_current(&mut self, view: View) -> Result<DecodedValue, Ina219Error<B::Error>> {
        self.read_decoded(Register::Current, view).await
    }

    pub async fn get_power(&mut self, view: View) -> Result<DecodedValue, Ina219Error<B::Error>> {
        self.read_decoded(Register::Power, view).await
    }

    /// Bus voltage plus shunt voltage. Fails with the first failing read.
    pub async fn get_power_supply_voltage(
        &mut self,
        view: View,
    ) -> Result<DecodedValue, Ina219Error<B::Error>> {
        let bus_voltage = self.get_bus_voltage(View::Value).await?;
        let shunt_voltage = self.get_shunt_voltage(View::Value).await?;

        Ok(codec::power_supply_voltage(&bus_voltage, &shunt_voltage, view))
    }

    pub async fn get_charge_remaining(
        &mut self,
        view: View,
    ) -> Result<DecodedValue, Ina219Error<B::Error>> {
        let bus_voltage = self.get_bus_voltage(View::Value).await?;

        Ok(codec::charge_remaining(&bus_voltage, view))
    }

    /// Scans the whole bus. The first pass wakes sleeping devices.
    async fn scan_bus(&mut self) -> Result<AddressList, Ina219Error<B::Error>> {
        self.bus.scan(None).await.map_err(Ina219Error::Scan)?;
        self.bus.scan(None).await.map_err(Ina219Error::Scan)
    }

    /// Describes the device. A session that is not ready yields the
    /// disconnected description instead of an error.
    pub async fn device_information(&mut self) -> Result<DeviceInformation, Ina219Error<B::Error>> {
        let mut information = DeviceInformation::disconnected();

        if self.state != DeviceState::Ready {
            return Ok(information);
        }

        let configuration = self.get_configuration().await?;
        let calibration = self.get_calibration().await?;
        let calculation_values = self.ready()?;
        let bus_scan = self.scan_bus().await?;

        information.connection = Some(Connection {
            address: self.address,
            bus_number: self.bus_number,
            configuration: configuration.extended.unwrap_or_default(),
            calibration: calibration.extended.unwrap_or_default(),
            calculation_values,
            bus_scan,
        });

        Ok(information)
    }
}
