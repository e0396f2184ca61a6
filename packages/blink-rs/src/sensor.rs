// Proximity sensor register protocol
//
// The device exposes a command/acknowledge protocol: a command byte is
// written, then a response register is polled until its 4-bit command
// counter advances by exactly one or the error bit is observed. The
// poll count is bounded and exhaustion surfaces as a distinct error so
// a dead device cannot hang the loop forever.

use crate::error::{BlinkError, Result};
use crate::types::Sample;

/// Device register addresses and command opcodes.
pub mod registers {
    pub const PART_ID: u8 = 0x00;
    pub const HOSTIN0: u8 = 0x0A;
    pub const COMMAND: u8 = 0x0B;
    pub const IRQ_ENABLE: u8 = 0x0F;
    pub const RESPONSE1: u8 = 0x10;
    pub const RESPONSE0: u8 = 0x11;
    pub const IRQ_STATUS: u8 = 0x12;
    pub const HOSTOUT0: u8 = 0x13;
    pub const HOSTOUT1: u8 = 0x14;

    /// ORed with a parameter-table address to read it
    pub const PARAM_QUERY: u8 = 0x40;
    /// ORed with a parameter-table address to write it
    pub const PARAM_SET: u8 = 0x80;
    pub const RESET_CMD_CTR: u8 = 0x00;
    pub const START: u8 = 0x13;

    /// Low nibble of RESPONSE0: the command counter
    pub const CMD_CTR_MASK: u8 = 0x0F;
    /// Error bit of RESPONSE0
    pub const CMD_ERR_MASK: u8 = 0x10;
}

/// Parameter-table addresses used when configuring a measurement channel.
pub mod params {
    pub const CHAN_LIST: u8 = 0x01;
    pub const ADCCONFIG0: u8 = 0x02;
    pub const ADCSENS0: u8 = 0x03;
    pub const ADCPOST0: u8 = 0x04;
    pub const MEASCONFIG0: u8 = 0x05;
    pub const MEASRATE_H: u8 = 0x1A;
    pub const MEASRATE_L: u8 = 0x1B;
    pub const MEASCOUNT0: u8 = 0x1C;
    pub const LED1_A: u8 = 0x1F;
}

/// Byte-level register transport (I2C behind the scenes on hardware).
///
/// Implementations live outside the core; tests use an in-memory double.
pub trait RegisterBus {
    fn read_register(&mut self, address: u8) -> Result<u8>;
    fn write_register(&mut self, address: u8, value: u8) -> Result<()>;
    /// Burst read of consecutive registers starting at `address`.
    fn read_burst(&mut self, address: u8, out: &mut [u8]) -> Result<()>;
}

/// Anything that can produce the latest proximity reading.
pub trait ProximitySensor {
    fn read_reading(&mut self) -> Result<Sample>;
}

/// Command/acknowledge protocol driver over a [`RegisterBus`].
pub struct SensorLink<B: RegisterBus> {
    bus: B,
    max_handshake_polls: u32,
}

impl<B: RegisterBus> SensorLink<B> {
    /// Default poll bound; generous against a live device, finite
    /// against a dead one.
    pub const DEFAULT_MAX_POLLS: u32 = 1000;

    pub fn new(bus: B) -> Self {
        Self::with_poll_bound(bus, Self::DEFAULT_MAX_POLLS)
    }

    pub fn with_poll_bound(bus: B, max_handshake_polls: u32) -> Self {
        Self {
            bus,
            max_handshake_polls,
        }
    }

    /// Read a value from the parameter table.
    pub fn param_query(&mut self, param_address: u8) -> Result<u8> {
        let initial = self.command_counter()?;
        self.bus
            .write_register(registers::COMMAND, registers::PARAM_QUERY | param_address)?;
        self.await_acknowledge(initial)?;
        self.bus.read_register(registers::RESPONSE1)
    }

    /// Write a value into the parameter table.
    pub fn param_set(&mut self, param_address: u8, value: u8) -> Result<()> {
        self.bus.write_register(registers::HOSTIN0, value)?;
        let initial = self.command_counter()?;
        self.bus
            .write_register(registers::COMMAND, registers::PARAM_SET | param_address)?;
        self.await_acknowledge(initial)
    }

    /// Issue a bare command (start, reset, pause).
    pub fn send_command(&mut self, command: u8) -> Result<()> {
        let initial = self.command_counter()?;
        self.bus.write_register(registers::COMMAND, command)?;
        self.await_acknowledge(initial)
    }

    fn command_counter(&mut self) -> Result<u8> {
        Ok(self.bus.read_register(registers::RESPONSE0)? & registers::CMD_CTR_MASK)
    }

    /// Poll until the command counter advances by exactly one (mod 16),
    /// the error bit shows, or the poll bound runs out.
    fn await_acknowledge(&mut self, initial_counter: u8) -> Result<()> {
        let expected = (initial_counter + 1) & registers::CMD_CTR_MASK;
        for _ in 0..self.max_handshake_polls {
            let response = self.bus.read_register(registers::RESPONSE0)?;
            if response & registers::CMD_ERR_MASK != 0 {
                return Err(BlinkError::Handshake(format!(
                    "device reported command error (response {:#04x})",
                    response
                )));
            }
            if response & registers::CMD_CTR_MASK == expected {
                return Ok(());
            }
        }
        Err(BlinkError::DeviceUnresponsive {
            polls: self.max_handshake_polls,
        })
    }

    pub fn bus(&mut self) -> &mut B {
        &mut self.bus
    }
}

impl<B: RegisterBus> ProximitySensor for SensorLink<B> {
    /// Latest 16-bit reading: one burst covering the interrupt status and
    /// both output bytes, high byte first.
    fn read_reading(&mut self) -> Result<Sample> {
        let mut raw = [0u8; 3];
        self.bus.read_burst(registers::IRQ_STATUS, &mut raw)?;
        Ok(i16::from_be_bytes([raw[1], raw[2]]) as Sample)
    }
}
