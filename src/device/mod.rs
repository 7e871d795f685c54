use super::RpioError;
use memmap::{MmapMut, MmapOptions};
use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use std::convert::AsRef;
use std::fs::File;
use std::path::{Path, PathBuf};

pub mod error;
mod memory;
mod pin;
mod registers;

use crate::revision::{self, BoardRevision};
use crate::RpioResult;
use error::DeviceError;

pub use memory::{BufferRegisters, MappedRegisters, RegisterBlock};
pub use pin::{Direction, GpioLine, Level, LinePin, Pull, FSEL_INPUT, FSEL_OUTPUT, GPIO_LINES};
pub use registers::BLOCK_SIZE;

/// Host environment a session runs on.
///
/// It names the board revision, hands out the register window and provides the short settling delay
/// required by the pull resistor sequence. `Device` is the Linux implementation; tests substitute
/// an in-memory one.
pub trait Platform {
    type Registers: RegisterBlock;

    fn board_revision(&self) -> RpioResult<BoardRevision>;

    fn map_registers(&self, revision: BoardRevision) -> RpioResult<Self::Registers>;

    /// Busy-waits long enough for a pull mode write to settle.
    fn settle(&self);
}

/// Memory device file used to reach the GPIO registers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MemoryDevice {
    /// `/dev/mem` for root, `/dev/gpiomem` otherwise.
    Auto,
    /// `/dev/mem`, mapped at the physical GPIO base address.
    Mem,
    /// `/dev/gpiomem`, which exposes only the GPIO window at offset 0.
    GpioMem,
}

/// Configuration of the Linux `Device`.
#[derive(Clone, Debug)]
pub struct DeviceOptions {
    /// Hardware identification source.
    pub cpuinfo: PathBuf,
    pub memory: MemoryDevice,
    /// Physical base address override. Defaults to the one of the detected SoC family.
    pub gpio_base: Option<u64>,
    /// Spin iterations of the settle delay.
    pub settle_cycles: u32,
    /// Fail on revision codes outside the known table instead of assuming the newest layout.
    pub strict_revision: bool,
}

impl Default for DeviceOptions {
    fn default() -> Self {
        Self {
            cpuinfo: PathBuf::from("/proc/cpuinfo"),
            memory: MemoryDevice::Auto,
            gpio_base: None,
            settle_cycles: 150,
            strict_revision: false,
        }
    }
}

/// Raspberry Pi running Linux.
///
/// Reads the revision from cpuinfo and maps the GPIO registers from the memory device file.
/// Root access is needed for `/dev/mem`; on systems with `/dev/gpiomem` membership of the `gpio` group is enough.
#[derive(Clone, Debug, Default)]
pub struct Device {
    options: DeviceOptions,
}

impl Device {
    const MEM_PATH: &'static str = "/dev/mem";
    const GPIOMEM_PATH: &'static str = "/dev/gpiomem";

    pub fn new(options: DeviceOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DeviceOptions {
        &self.options
    }

    fn load_device_file<T: AsRef<Path>>(device_path: T, offset: u64) -> RpioResult<MmapMut> {
        use std::os::unix::io::FromRawFd;
        use DeviceError::*;

        let mut open_flags = OFlag::empty();
        open_flags.insert(OFlag::O_RDWR);
        open_flags.insert(OFlag::O_SYNC);
        open_flags.insert(OFlag::O_CLOEXEC);

        let file_fd = open(device_path.as_ref(), open_flags, Mode::empty())
            .map_err(|err| RpioError::DeviceError(DeviceAccessFailed(err)))?;

        // SAFETY: Validity of file_fd is checked by Nix.
        let handle = unsafe { File::from_raw_fd(file_fd) };

        let mut map_opts = MmapOptions::new();
        map_opts.offset(offset);
        map_opts.len(BLOCK_SIZE);

        // SAFETY: File handle is valid at this point. The mapping stays valid after the handle is closed.
        let map = unsafe {
            map_opts
                .map_mut(&handle)
                .map_err(|err| RpioError::DeviceError(MemoryMapFailed(err)))?
        };

        Ok(map)
    }
}

impl Platform for Device {
    type Registers = MappedRegisters;

    fn board_revision(&self) -> RpioResult<BoardRevision> {
        revision::read_cpuinfo(&self.options.cpuinfo, self.options.strict_revision)
    }

    fn map_registers(&self, revision: BoardRevision) -> RpioResult<MappedRegisters> {
        use nix::unistd::Uid;

        let use_mem = match self.options.memory {
            MemoryDevice::Auto => Uid::effective().is_root(),
            MemoryDevice::Mem => true,
            MemoryDevice::GpioMem => false,
        };

        let (path, offset) = if use_mem {
            let base = self.options.gpio_base.unwrap_or_else(|| revision.gpio_base());
            (Self::MEM_PATH, base)
        } else {
            (Self::GPIOMEM_PATH, 0)
        };

        log::debug!("mapping GPIO registers from {} at {:#x}", path, offset);
        Self::load_device_file(path, offset).map(MappedRegisters::new)
    }

    fn settle(&self) {
        for _ in 0..self.options.settle_cycles {
            std::hint::spin_loop();
        }
    }
}
