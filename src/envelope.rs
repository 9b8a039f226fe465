use crate::error::Ina219Error;

/// Uniform outcome of an operation, for callers that branch on a flag
/// rather than on a `Result`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Envelope<T, E> {
    pub success: bool,
    pub message: &'static str,
    pub data: Option<T>,
    pub error: Option<Ina219Error<E>>,
}

impl<T, E> Envelope<T, E> {
    /// Wraps `result`, using `message` when it is a success.
    ///
    /// ```rust
    /// # use ina219_ups::{templates::UnknownTemplate, Envelope, Ina219Error};
    /// let ok: Envelope<u16, ()> = Envelope::new(Ok(4096), "Calibration register updated");
    /// assert!(ok.success);
    /// assert_eq!(ok.data, Some(4096));
    ///
    /// let unknown = Ina219Error::UnknownTemplate(UnknownTemplate::new("16V400mA"));
    /// let failed: Envelope<u16, ()> = Envelope::new(Err(unknown), "unused");
    /// assert!(!failed.success);
    /// assert_eq!(failed.message, "Unknown configuration template Id");
    /// ```
    pub fn new(result: Result<T, Ina219Error<E>>, message: &'static str) -> Self {
        match result {
            Ok(data) => Self {
                success: true,
                message,
                data: Some(data),
                error: None,
            },
            Err(error) => Self {
                success: false,
                message: error.message(),
                data: None,
                error: Some(error),
            },
        }
    }

    pub fn into_result(self) -> Result<Option<T>, Ina219Error<E>> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.data),
        }
    }
}

impl<T, E> From<Result<T, Ina219Error<E>>> for Envelope<T, E> {
    fn from(result: Result<T, Ina219Error<E>>) -> Self {
        Self::new(result, "Success")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{device::DeviceState, registers::Register};

    #[test]
    fn errors_carry_their_message() {
        let envelope: Envelope<(), u8> = Err(Ina219Error::RegisterRead {
            register: Register::Power,
            error: 7,
        })
        .into();

        assert!(!envelope.success);
        assert_eq!(envelope.message, "Failed to read register");
        assert_eq!(envelope.data, None);
        assert_eq!(
            envelope.error.as_ref().and_then(Ina219Error::bus_error),
            Some(&7)
        );
    }

    #[test]
    fn round_trip_to_result() {
        let envelope: Envelope<u8, ()> = Ok(1).into();
        assert_eq!(envelope.message, "Success");
        assert_eq!(envelope.into_result(), Ok(Some(1)));

        let envelope: Envelope<u8, ()> =
            Err(Ina219Error::NotReady(DeviceState::Uninitialized)).into();
        assert_eq!(
            envelope.into_result(),
            Err(Ina219Error::NotReady(DeviceState::Uninitialized))
        );
    }
}
