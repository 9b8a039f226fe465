use embassy_sync::{
    blocking_mutex::raw::RawMutex,
    mutex::{Mutex, MutexGuard},
};
use register_access::RegisterBus;

use crate::{
    codec::{DecodedValue, View},
    device::{DeviceInformation, Ina219},
    error::Ina219Error,
};

/// An [`Ina219`] that several tasks can use. Operations queue up behind the
/// mutex, so the calibration write of one read is never interleaved with
/// another task's transactions.
pub struct SharedIna219<M: RawMutex, B> {
    device: Mutex<M, Ina219<B>>,
}

impl<M: RawMutex, B> SharedIna219<M, B> {
    pub const fn new(device: Ina219<B>) -> Self {
        Self {
            device: Mutex::new(device),
        }
    }

    /// Exclusive access for a sequence of operations.
    pub async fn lock(&self) -> MutexGuard<'_, M, Ina219<B>> {
        self.device.lock().await
    }

    pub fn into_inner(self) -> Ina219<B> {
        self.device.into_inner()
    }
}

impl<M: RawMutex, B: RegisterBus> SharedIna219<M, B> {
    pub async fn get_bus_voltage(&self, view: View) -> Result<DecodedValue, Ina219Error<B::Error>> {
        self.lock().await.get_bus_voltage(view).await
    }

    pub async fn get_shunt_voltage(&self, view: View) -> Result<DecodedValue, Ina219Error<B::Error>> {
        self.lock().await.get_shunt_voltage(view).await
    }

    pub async fn get_current(&self, view: View) -> Result<DecodedValue, Ina219Error<B::Error>> {
        self.lock().await.get_current(view).await
    }

    pub async fn get_power(&self, view: View) -> Result<DecodedValue, Ina219Error<B::Error>> {
        self.lock().await.get_power(view).await
    }

    pub async fn get_power_supply_voltage(
        &self,
        view: View,
    ) -> Result<DecodedValue, Ina219Error<B::Error>> {
        self.lock().await.get_power_supply_voltage(view).await
    }

    pub async fn get_charge_remaining(&self, view: View) -> Result<DecodedValue, Ina219Error<B::Error>> {
        self.lock().await.get_charge_remaining(view).await
    }

    pub async fn device_information(&self) -> Result<DeviceInformation, Ina219Error<B::Error>> {
        self.lock().await.device_information().await
    }
}
