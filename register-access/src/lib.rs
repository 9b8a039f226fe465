#![no_std]
#![allow(async_fn_in_trait)]

use embedded_hal_async::i2c::I2c as AsyncI2c;
use heapless::Vec;

/// First address probed by a full bus scan. Lower addresses are reserved.
pub const FIRST_SCAN_ADDRESS: u8 = 0x03;
/// Last address probed by a full bus scan. Higher addresses are reserved.
pub const LAST_SCAN_ADDRESS: u8 = 0x77;

/// Addresses that acknowledged a scan.
pub type AddressList = Vec<u8, 128>;

/// Block access to the registers of devices on a two-wire bus.
///
/// Every method is a single bus transaction. Implementations must not
/// interleave transactions: callers rely on strict ordering between writes and
/// the reads that follow them.
pub trait RegisterBus {
    type Error;

    /// Prepares bus `bus_number` for use.
    async fn open(&mut self, bus_number: u8) -> Result<(), Self::Error>;

    /// Lists responding addresses. With `Some(address)` only that address is
    /// probed.
    async fn scan(&mut self, address: Option<u8>) -> Result<AddressList, Self::Error>;

    /// Reads `buffer.len()` bytes starting at `register`, returns the number of
    /// bytes read.
    async fn read_block(
        &mut self,
        address: u8,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<usize, Self::Error>;

    async fn write_block(
        &mut self,
        address: u8,
        register: u8,
        bytes: &[u8],
    ) -> Result<(), Self::Error>;
}

impl<T: RegisterBus> RegisterBus for &mut T {
    type Error = T::Error;

    async fn open(&mut self, bus_number: u8) -> Result<(), Self::Error> {
        (**self).open(bus_number).await
    }

    async fn scan(&mut self, address: Option<u8>) -> Result<AddressList, Self::Error> {
        (**self).scan(address).await
    }

    async fn read_block(
        &mut self,
        address: u8,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<usize, Self::Error> {
        (**self).read_block(address, register, buffer).await
    }

    async fn write_block(
        &mut self,
        address: u8,
        register: u8,
        bytes: &[u8],
    ) -> Result<(), Self::Error> {
        (**self).write_block(address, register, bytes).await
    }
}

/// [`RegisterBus`] over an already configured `embedded-hal-async` I2C peripheral.
///
/// The peripheral is owned by the HAL, so opening a bus number does nothing.
pub struct I2cBus<I> {
    pub i2c: I,
}

impl<I> I2cBus<I> {
    pub const fn new(i2c: I) -> Self {
        Self { i2c }
    }

    pub fn into_inner(self) -> I {
        self.i2c
    }
}

impl<I> I2cBus<I>
where
    I: AsyncI2c,
{
    async fn probe(&mut self, address: u8) -> bool {
        let mut byte = [0];
        self.i2c.read(address, &mut byte).await.is_ok()
    }
}

impl<I> RegisterBus for I2cBus<I>
where
    I: AsyncI2c,
{
    type Error = I::Error;

    async fn open(&mut self, _bus_number: u8) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn scan(&mut self, address: Option<u8>) -> Result<AddressList, Self::Error> {
        let mut found = AddressList::new();

        match address {
            Some(address) => {
                if self.probe(address).await {
                    _ = found.push(address);
                }
            }
            None => {
                for address in FIRST_SCAN_ADDRESS..=LAST_SCAN_ADDRESS {
                    if self.probe(address).await {
                        _ = found.push(address);
                    }
                }
            }
        }

        Ok(found)
    }

    async fn read_block(
        &mut self,
        address: u8,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<usize, Self::Error> {
        self.i2c.write_read(address, &[register], buffer).await?;

        Ok(buffer.len())
    }

    async fn write_block(
        &mut self,
        address: u8,
        register: u8,
        bytes: &[u8],
    ) -> Result<(), Self::Error> {
        let mut frame = Vec::<u8, 33>::new();
        // register pointer followed by at most a 32 byte block
        debug_assert!(bytes.len() < frame.capacity());
        _ = frame.push(register);
        _ = frame.extend_from_slice(bytes);

        self.i2c.write(address, &frame).await
    }
}

#[cfg(test)]
mod test {
    extern crate std;

    use std::vec::Vec as StdVec;

    use embassy_futures::block_on;
    use embedded_hal_async::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};

    use super::*;

    #[derive(Default)]
    struct Recorder {
        present: StdVec<u8>,
        writes: StdVec<(u8, StdVec<u8>)>,
    }

    impl ErrorType for Recorder {
        type Error = ErrorKind;
    }

    impl AsyncI2c for Recorder {
        async fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if !self.present.contains(&address) {
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }

            for op in operations {
                match op {
                    Operation::Write(bytes) => self.writes.push((address, bytes.to_vec())),
                    Operation::Read(buffer) => buffer.fill(0xA5),
                }
            }

            Ok(())
        }
    }

    #[test]
    fn scan_reports_acknowledging_addresses() {
        let mut bus = I2cBus::new(Recorder {
            present: std::vec![0x40, 0x42],
            ..Default::default()
        });

        let all = block_on(bus.scan(None)).unwrap();
        assert_eq!(all.as_slice(), &[0x40, 0x42]);

        let one = block_on(bus.scan(Some(0x42))).unwrap();
        assert_eq!(one.as_slice(), &[0x42]);

        let none = block_on(bus.scan(Some(0x41))).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn write_block_prefixes_register_pointer() {
        let mut bus = I2cBus::new(Recorder {
            present: std::vec![0x42],
            ..Default::default()
        });

        block_on(bus.write_block(0x42, 0x05, &[0x10, 0x00])).unwrap();

        assert_eq!(bus.i2c.writes, std::vec![(0x42, std::vec![0x05, 0x10, 0x00])]);
    }

    #[test]
    fn read_block_fills_buffer() {
        let mut bus = I2cBus::new(Recorder {
            present: std::vec![0x42],
            ..Default::default()
        });

        let mut buffer = [0; 2];
        let read = block_on(bus.read_block(0x42, 0x02, &mut buffer)).unwrap();

        assert_eq!(read, 2);
        assert_eq!(buffer, [0xA5, 0xA5]);
        assert_eq!(bus.i2c.writes, std::vec![(0x42, std::vec![0x02])]);
    }

    #[test]
    fn read_from_absent_device_fails() {
        let mut bus = I2cBus::new(Recorder::default());

        let mut buffer = [0; 2];
        let result = block_on(bus.read_block(0x42, 0x02, &mut buffer));

        assert_eq!(
            result,
            Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))
        );
    }
}
