use std::io;
use thiserror::Error;

/// Enum representing possible failures when mapping the GPIO registers.
///
/// Mapping the registers can fail in two ways:
/// - DeviceAccessFailed - There is no access to the memory device file, either because of insufficient permissions or operating system misconfiguration.
/// - MemoryMapFailed - The device file was opened but the register window could not be mapped.
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("failed to open memory device")]
    DeviceAccessFailed(#[source] nix::Error),
    #[error("failed to map device memory")]
    MemoryMapFailed(#[source] io::Error),
}

/// Enum representing possible failures when addressing a pin.
///
/// - InvalidChannel - The channel is out of range for the addressing mode and board revision, or names a header position without a GPIO line.
/// - InvalidDirection - The GPIO line was never configured with `pin_setup`.
#[derive(Error, Debug)]
pub enum PinError {
    #[error("channel {0} does not name a usable GPIO line")]
    InvalidChannel(u8),
    #[error("gpio {0} has no configured direction")]
    InvalidDirection(u8),
}
