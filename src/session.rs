use crate::device::{
    Device, DeviceOptions, Direction, GpioLine, Level, LinePin, Platform, Pull, RegisterBlock,
    GPIO_LINES,
};
use crate::pin_map::{PinMap, PinMappingTable};
use crate::revision::{self, BoardRevision};
use crate::{PinError, RpioError, RpioResult};

/// The GPIO controller handle.
///
/// A session starts uninitialised. `setup` detects the board revision and maps the registers, after which pins can be
/// configured with `pin_setup` and then driven with `output` or read with `input`. `cleanup` (also run on drop) puts every
/// configured pin back to an input without pull resistor and unmaps the registers.
///
/// Every operation that touches pins needs `&mut self` or `&self` of this handle, so the borrow checker keeps a session
/// used from one place at a time. Sharing one between threads needs a `Mutex` around it; the register window has no
/// atomicity of its own, and two sessions in one process must not drive the same lines.
pub struct Session<P: Platform = Device> {
    platform: P,
    registers: Option<P::Registers>,
    initialised: bool,
    pin_map: Option<PinMap>,
    revision: Option<BoardRevision>,
    table: Option<&'static PinMappingTable>,
    directions: [Option<Direction>; GPIO_LINES],
}

impl Session<Device> {
    /// Uninitialised session for the Linux device with default options.
    pub fn new() -> Self {
        Self::with_platform(Device::default())
    }

    pub fn with_options(options: DeviceOptions) -> Self {
        Self::with_platform(Device::new(options))
    }

    /// Creates and sets up a session for the Linux device.
    pub fn open(pin_map: PinMap) -> RpioResult<Self> {
        let mut session = Self::new();
        session.setup(pin_map)?;
        Ok(session)
    }
}

impl Default for Session<Device> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Platform> Session<P> {
    pub fn with_platform(platform: P) -> Self {
        Self {
            platform,
            registers: None,
            initialised: false,
            pin_map: None,
            revision: None,
            table: None,
            directions: [None; GPIO_LINES],
        }
    }

    /// Detects the board revision, maps the registers and selects the addressing mode.
    ///
    /// Calling it again on a set up session only switches the addressing mode: the registers are not remapped
    /// and configured directions are kept.
    ///
    /// Fails with `UnknownBoardRevision` if the revision cannot be determined, `InvalidArgument` for board
    /// addressing on a compute module, and with a `DeviceError` if the registers cannot be mapped.
    pub fn setup(&mut self, pin_map: PinMap) -> RpioResult<()> {
        let revision = match self.revision {
            Some(revision) => revision,
            None => self.platform.board_revision()?,
        };

        if revision == BoardRevision::ComputeModule && pin_map == PinMap::Board {
            return Err(RpioError::InvalidArgument);
        }

        if self.registers.is_none() {
            self.registers = Some(self.platform.map_registers(revision)?);
        }

        if !self.initialised {
            self.directions = [None; GPIO_LINES];
        }

        log::debug!("gpio session ready: {:?}, {:?} addressing", revision, pin_map);
        self.revision = Some(revision);
        self.table = PinMappingTable::for_revision(revision);
        self.pin_map = Some(pin_map);
        self.initialised = true;

        Ok(())
    }

    /// Returns configured pins to inputs without pull resistor and unmaps the registers.
    ///
    /// Safe to call on an uninitialised session.
    pub fn cleanup(&mut self) {
        if let Some(mut registers) = self.registers.take() {
            let platform = &self.platform;

            for (line, direction) in GpioLine::all().zip(self.directions.iter_mut()) {
                if direction.take().is_some() {
                    let pin = LinePin::new(line);
                    pin.set_pull(&mut registers, Pull::Off, || platform.settle());
                    pin.set_direction(&mut registers, Direction::Input);
                }
            }

            registers.release();
            log::debug!("gpio session cleaned up");
        }

        self.initialised = false;
        self.pin_map = None;
        self.revision = None;
        self.table = None;
    }

    /// Switches the addressing mode without touching any pin.
    pub fn set_pin_map(&mut self, pin_map: PinMap) -> RpioResult<()> {
        self.ensure_ready()?;

        if self.revision == Some(BoardRevision::ComputeModule) && pin_map == PinMap::Board {
            return Err(RpioError::InvalidArgument);
        }

        self.pin_map = Some(pin_map);
        Ok(())
    }

    /// Raw function select code of a channel: 0 input, 1 output, other values alternate functions.
    pub fn pin_function(&self, channel: u8) -> RpioResult<u8> {
        let pin = self.resolve(channel)?;
        Ok(pin.function(self.registers()?))
    }

    /// Sets the pull resistor and then the direction of a channel.
    pub fn pin_setup(&mut self, channel: u8, direction: Direction, pull: Pull) -> RpioResult<()> {
        let pin = self.resolve(channel)?;
        let platform = &self.platform;
        let registers = self.registers.as_mut().ok_or(RpioError::NotInitialised)?;

        pin.set_pull(registers, pull, || platform.settle());
        pin.set_direction(registers, direction);
        self.directions[usize::from(pin.line().number())] = Some(direction);

        Ok(())
    }

    /// Drives a channel high or low. The channel must have been configured with `pin_setup`.
    pub fn output(&mut self, channel: u8, level: Level) -> RpioResult<()> {
        let pin = self.configured(channel)?;
        let registers = self.registers.as_mut().ok_or(RpioError::NotInitialised)?;

        pin.write(registers, level);
        Ok(())
    }

    /// Reads the level of a channel. The channel must have been configured with `pin_setup`.
    ///
    /// Callers wanting the conventional low reading on failure can use `unwrap_or(Level::Low)`.
    pub fn input(&self, channel: u8) -> RpioResult<Level> {
        let pin = self.configured(channel)?;
        Ok(pin.read(self.registers()?))
    }

    /// Direction recorded for a channel by `pin_setup`, if any.
    pub fn direction(&self, channel: u8) -> RpioResult<Option<Direction>> {
        let pin = self.resolve(channel)?;
        Ok(self.directions[usize::from(pin.line().number())])
    }

    /// Revision class index of the board (see `BoardRevision`), or `-1` if it cannot be determined.
    pub fn board_revision_class(&self) -> i32 {
        match self.revision {
            Some(revision) => revision as i32,
            None => revision::board_revision_class(&self.platform.board_revision()),
        }
    }

    pub fn is_initialised(&self) -> bool {
        self.initialised
    }

    pub fn pin_map(&self) -> Option<PinMap> {
        self.pin_map
    }

    pub fn revision(&self) -> Option<BoardRevision> {
        self.revision
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    fn ensure_ready(&self) -> RpioResult<()> {
        if self.initialised {
            Ok(())
        } else {
            Err(RpioError::NotInitialised)
        }
    }

    fn registers(&self) -> RpioResult<&P::Registers> {
        self.registers.as_ref().ok_or(RpioError::NotInitialised)
    }

    /// Translates a channel into a GPIO line according to the addressing mode and revision.
    fn resolve(&self, channel: u8) -> RpioResult<LinePin> {
        self.ensure_ready()?;
        let invalid = || RpioError::PinError(PinError::InvalidChannel(channel));

        let line = match (self.pin_map, self.revision) {
            (Some(PinMap::Gpio), _) => GpioLine::new(channel),
            (Some(PinMap::Board), Some(revision)) => {
                if channel < 1 || channel > revision.max_board_pin() {
                    return Err(invalid());
                }
                self.table
                    .and_then(|table| table.resolve(channel))
                    .and_then(GpioLine::new)
            }
            _ => return Err(RpioError::NotInitialised),
        };

        line.map(LinePin::new).ok_or_else(invalid)
    }

    fn configured(&self, channel: u8) -> RpioResult<LinePin> {
        let pin = self.resolve(channel)?;
        let number = pin.line().number();

        match self.directions[usize::from(number)] {
            Some(_) => Ok(pin),
            None => Err(RpioError::PinError(PinError::InvalidDirection(number))),
        }
    }
}

impl<P: Platform> Drop for Session<P> {
    fn drop(&mut self) {
        if self.initialised {
            log::warn!("gpio session dropped without cleanup, restoring pins");
        }
        self.cleanup();
    }
}
