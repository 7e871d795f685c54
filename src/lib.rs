//! This crate exposes the GPIO pins of the [Raspberry Pi](https://www.raspberrypi.org/) to Rust programs
//! by memory-mapping the BCM2835 GPIO registers.
//!
//! A `Session` detects the board revision, maps the register window and then configures, reads and drives pins
//! addressed either by their position on the board header (`PinMap::Board`) or by BCM GPIO number (`PinMap::Gpio`).
//! Cleaning up the session (explicitly or by dropping it) returns every pin it configured to an input with the
//! pull resistor disabled.
//!
//! ```no_run
//! use rpio_mmap_gpio::{Direction, Level, PinMap, Pull, Session};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = Session::open(PinMap::Board)?;
//!     session.pin_setup(7, Direction::Output, Pull::Off)?;
//!     session.output(7, Level::High)?;
//!     session.cleanup();
//!     Ok(())
//! }
//! ```
//!
//! Pins configured through a session can also be used as [`embedded_hal`](https://crates.io/crates/embedded-hal)
//! digital pins, see `Session::output_pin` and `Session::input_pin`.
//!
//! Only boards reporting a BCM2708/BCM2835 SoC in `/proc/cpuinfo` are recognised. Alternate pin functions,
//! edge detection and bit-banged protocols are not provided.

use derive_try_from_primitive::TryFromPrimitive;
use thiserror::Error;

mod device;
mod hal;
mod pin_map;
pub mod revision;
mod session;

pub use device::error::DeviceError;
pub use device::error::PinError;
pub use device::{
    BufferRegisters, Device, DeviceOptions, Direction, GpioLine, Level, MappedRegisters,
    MemoryDevice, Platform, Pull, RegisterBlock, BLOCK_SIZE, FSEL_INPUT, FSEL_OUTPUT, GPIO_LINES,
};
pub use hal::{InputPin, OutputPin};
pub use pin_map::{PinMap, PinMappingTable};
pub use revision::BoardRevision;
pub use session::Session;

/// Main error type for this crate.
///
/// For more details, see `PinError` and `DeviceError` enums documentation.
#[derive(Error, Debug)]
pub enum RpioError {
    #[error("invalid argument")]
    InvalidArgument,
    #[error("unable to determine board revision")]
    UnknownBoardRevision,
    #[error("session is not set up")]
    NotInitialised,
    #[error("error while operating on a pin")]
    PinError(#[source] PinError),
    #[error("error while operating on a device")]
    DeviceError(#[source] DeviceError),
}

pub type RpioResult<T> = Result<T, RpioError>;

/// Flat status code of an operation, in the numbering used by C callers.
#[repr(u8)]
#[derive(TryFromPrimitive, Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Status {
    Ok = 0,
    InvalidArgument = 1,
    UnknownBoardRevision = 2,
    FileDescriptorFailure = 3,
    MemoryMapFailure = 4,
    NotInitialised = 5,
    InvalidChannel = 6,
    InvalidDirection = 7,
}

impl Status {
    pub fn of<T>(result: &RpioResult<T>) -> Status {
        match result {
            Ok(_) => Status::Ok,
            Err(err) => err.status(),
        }
    }
}

impl RpioError {
    pub fn status(&self) -> Status {
        match self {
            RpioError::InvalidArgument => Status::InvalidArgument,
            RpioError::UnknownBoardRevision => Status::UnknownBoardRevision,
            RpioError::NotInitialised => Status::NotInitialised,
            RpioError::PinError(PinError::InvalidChannel(_)) => Status::InvalidChannel,
            RpioError::PinError(PinError::InvalidDirection(_)) => Status::InvalidDirection,
            RpioError::DeviceError(DeviceError::DeviceAccessFailed(_)) => {
                Status::FileDescriptorFailure
            }
            RpioError::DeviceError(DeviceError::MemoryMapFailed(_)) => Status::MemoryMapFailure,
        }
    }
}
