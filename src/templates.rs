use core::{fmt, str::FromStr};

use heapless::String;

use crate::{
    calibration::{calibrate, CalibrationParameters, CalibrationState},
    configuration::{compose, AdcSetting, BusVoltageRange, ConfigField, Gain, Mode},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TemplateId {
    /// Power-on reset of the chip.
    Default,
    /// 32 V bus range, ±320 mV shunt range, 32 sample averaging, continuous conversion.
    Range32V2A,
}

impl TemplateId {
    pub const ALL: [TemplateId; 2] = [TemplateId::Default, TemplateId::Range32V2A];

    pub const fn name(self) -> &'static str {
        match self {
            TemplateId::Default => "DEFAULT",
            TemplateId::Range32V2A => "32V2A",
        }
    }

    pub const fn template(self) -> &'static ConfigurationTemplate {
        match self {
            TemplateId::Default => &DEFAULT,
            TemplateId::Range32V2A => &RANGE_32V_2A,
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Longest requested name kept by [`UnknownTemplate`].
pub const TEMPLATE_NAME_LEN: usize = 16;

/// A name that matches none of the templates.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnknownTemplate {
    /// The requested name, cut after [`TEMPLATE_NAME_LEN`] bytes.
    pub requested: String<TEMPLATE_NAME_LEN>,
}

impl UnknownTemplate {
    pub fn new(name: &str) -> Self {
        let mut requested = String::new();
        for c in name.chars() {
            if requested.push(c).is_err() {
                break;
            }
        }

        Self { requested }
    }
}

impl FromStr for TemplateId {
    type Err = UnknownTemplate;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        TemplateId::ALL
            .into_iter()
            .find(|id| id.name() == name)
            .ok_or_else(|| UnknownTemplate::new(name))
    }
}

/// A configuration word with the calibration that matches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigurationTemplate {
    pub id: TemplateId,
    pub configuration: u16,
    pub parameters: CalibrationParameters,
    pub calibration: CalibrationState,
}

/// WaveShare UPS HAT: 0.1 Ω shunt, up to 3.2 A.
const UPS_HAT: CalibrationParameters = CalibrationParameters::new(32_000, 100_000, 320, 3_200_000);

const fn template(id: TemplateId, configuration: u16) -> ConfigurationTemplate {
    let calibration = match calibrate(UPS_HAT) {
        Ok(state) => state,
        Err(_) => panic!("invalid template calibration"),
    };

    ConfigurationTemplate {
        id,
        configuration,
        parameters: UPS_HAT,
        calibration: CalibrationState {
            template: Some(id),
            ..calibration
        },
    }
}

pub const DEFAULT: ConfigurationTemplate =
    template(TemplateId::Default, ConfigField::Reset.bits().mask());

pub const RANGE_32V_2A: ConfigurationTemplate = template(
    TemplateId::Range32V2A,
    compose(
        BusVoltageRange::Range32V,
        Gain::Div8,
        AdcSetting::Samples32,
        AdcSetting::Samples32,
        Mode::ShuntAndBusContinuous,
    ),
);

pub const TEMPLATES: [&ConfigurationTemplate; 2] = [&DEFAULT, &RANGE_32V_2A];
