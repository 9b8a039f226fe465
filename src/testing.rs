//! In-memory register bus for tests.

use register_access::{AddressList, RegisterBus, FIRST_SCAN_ADDRESS, LAST_SCAN_ADDRESS};

use crate::{configuration::ConfigField, device::POWER_ON_CONFIGURATION, registers::Register};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeError {
    Open,
    Nack,
}

/// A bus transaction, as seen by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Open(u8),
    Scan(Option<u8>),
    Read(Register),
    Write(Register, u16),
}

#[derive(Debug, Default)]
pub struct FakeBus {
    /// Addresses that answer a scan.
    pub present: Vec<u8>,
    registers: [u16; Register::ALL.len()],
    pub log: Vec<Op>,
    /// Number of scans the devices sleep through before answering.
    pub hidden_scans: usize,
    scans: usize,
    pub fail_open: bool,
    pub fail_read: Option<Register>,
    pub fail_write: Option<Register>,
    /// Reads return a single byte.
    pub short_read: bool,
}

impl FakeBus {
    pub fn with_device(address: u8) -> Self {
        let mut bus = Self {
            present: vec![address],
            ..Default::default()
        };
        bus.power_on_reset();
        bus
    }

    pub fn register(&self, register: Register) -> u16 {
        self.registers[register.addr() as usize]
    }

    pub fn set_register(&mut self, register: Register, value: u16) {
        self.registers[register.addr() as usize] = value;
    }

    fn power_on_reset(&mut self) {
        self.registers = [0; Register::ALL.len()];
        self.set_register(Register::Configuration, POWER_ON_CONFIGURATION);
    }

    fn visible(&self, address: u8) -> bool {
        self.scans > self.hidden_scans && self.present.contains(&address)
    }
}

impl RegisterBus for FakeBus {
    type Error = FakeError;

    async fn open(&mut self, bus_number: u8) -> Result<(), Self::Error> {
        self.log.push(Op::Open(bus_number));

        if self.fail_open {
            Err(FakeError::Open)
        } else {
            Ok(())
        }
    }

    async fn scan(&mut self, address: Option<u8>) -> Result<AddressList, Self::Error> {
        self.log.push(Op::Scan(address));
        self.scans += 1;

        let mut found = AddressList::new();
        for candidate in FIRST_SCAN_ADDRESS..=LAST_SCAN_ADDRESS {
            if address.map_or(true, |address| address == candidate) && self.visible(candidate) {
                _ = found.push(candidate);
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
        let register = Register::from_addr(register).ok_or(FakeError::Nack)?;
        self.log.push(Op::Read(register));

        if !self.present.contains(&address) || self.fail_read == Some(register) {
            return Err(FakeError::Nack);
        }

        let bytes = self.register(register).to_be_bytes();
        let len = if self.short_read { 1 } else { bytes.len().min(buffer.len()) };
        buffer[..len].copy_from_slice(&bytes[..len]);

        Ok(len)
    }

    async fn write_block(
        &mut self,
        address: u8,
        register: u8,
        bytes: &[u8],
    ) -> Result<(), Self::Error> {
        let register = Register::from_addr(register).ok_or(FakeError::Nack)?;
        let value = u16::from_be_bytes(bytes.try_into().map_err(|_| FakeError::Nack)?);
        self.log.push(Op::Write(register, value));

        if !self.present.contains(&address)
            || self.fail_write == Some(register)
            || !register.is_writable()
        {
            return Err(FakeError::Nack);
        }

        if register == Register::Configuration && ConfigField::Reset.bits().read(value) != 0 {
            self.power_on_reset();
        } else {
            self.set_register(register, value);
        }

        Ok(())
    }
}
