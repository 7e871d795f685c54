use derive_try_from_primitive::TryFromPrimitive;
use std::convert::TryFrom;

use super::memory::RegisterBlock;
use super::registers::{RegistersOffsets, GPPUD, PUD_MASK};
use crate::{RpioError, RpioResult};

/// Number of GPIO lines exposed by the BCM2835 GPIO controller.
pub const GPIO_LINES: usize = 54;

/// Function select code of an input line.
pub const FSEL_INPUT: u8 = 0b000;
/// Function select code of an output line.
pub const FSEL_OUTPUT: u8 = 0b001;
const FSEL_MASK: u32 = 0b111;

/// A BCM GPIO line number, guaranteed to be in 0..53.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct GpioLine(u8);

impl GpioLine {
    pub fn new(number: u8) -> Option<Self> {
        if usize::from(number) < GPIO_LINES {
            Some(Self(number))
        } else {
            None
        }
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = GpioLine> {
        (0..GPIO_LINES as u8).map(GpioLine)
    }
}

/// Enum representing the state of a given pin.
///
/// This usually correlates to electric low/high state of voltage for GPIO pins,
/// but keep in mind that this can be changed by pull-up/pull-down resistors.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
pub enum Level {
    Low = 0,
    High = 1,
}

/// Direction a pin is configured for.
///
/// The numeric codes are the public ones, not the function select field values.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
pub enum Direction {
    Output = 0,
    Input = 1,
}

/// Internal pull resistor mode, with the value written to `GPPUD`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
pub enum Pull {
    Off = 0,
    Down = 1,
    Up = 2,
}

macro_rules! from_raw {
    ($($ty:ident),*) => {
        $(
            impl $ty {
                /// Converts a numeric code, failing with `InvalidArgument` for unknown codes.
                pub fn from_raw(code: u8) -> RpioResult<Self> {
                    Self::try_from(code).map_err(|_| RpioError::InvalidArgument)
                }
            }
        )*
    };
}

from_raw!(Level, Direction, Pull);

/// Register-level operations for one GPIO line.
///
/// Every operation takes the register block explicitly, so the same line can be driven through a real
/// mapping or an in-memory buffer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LinePin {
    registers: RegistersOffsets,
}

impl LinePin {
    pub fn new(line: GpioLine) -> Self {
        Self {
            registers: RegistersOffsets::new(line),
        }
    }

    pub fn line(&self) -> GpioLine {
        self.registers.line()
    }

    /// Raw 3-bit function select value: 0 input, 1 output, anything else an alternate function.
    pub fn function<R: RegisterBlock + ?Sized>(&self, memory: &R) -> u8 {
        let fsel = memory.read_word(self.registers.gpfsel());
        ((fsel >> self.registers.fsel_shift()) & FSEL_MASK) as u8
    }

    pub fn set_direction<R: RegisterBlock + ?Sized>(&self, memory: &mut R, direction: Direction) {
        let offset = self.registers.gpfsel();
        let shift = self.registers.fsel_shift();
        let cleared = memory.read_word(offset) & !(FSEL_MASK << shift);

        let value = match direction {
            Direction::Input => cleared | (u32::from(FSEL_INPUT) << shift),
            Direction::Output => cleared | (u32::from(FSEL_OUTPUT) << shift),
        };

        log::trace!("gpio {}: direction {:?}", self.line().number(), direction);
        memory.write_word(offset, value);
    }

    /// Latches a pull mode into this line.
    ///
    /// The hardware only accepts the sequence: mode into GPPUD, wait, clock the line, wait,
    /// then clear GPPUD and the clock. `settle` must hold for at least 150 core cycles.
    pub fn set_pull<R, S>(&self, memory: &mut R, pull: Pull, settle: S)
    where
        R: RegisterBlock + ?Sized,
        S: Fn(),
    {
        let clock = self.registers.gppudclk();
        let mode = memory.read_word(GPPUD) & !PUD_MASK;

        log::trace!("gpio {}: pull {:?}", self.line().number(), pull);
        memory.write_word(GPPUD, mode | pull as u32);
        settle();
        memory.write_word(clock, self.registers.bank_bit());
        settle();
        let mode = memory.read_word(GPPUD) & !PUD_MASK;
        memory.write_word(GPPUD, mode);
        memory.write_word(clock, 0);
    }

    /// Drives the line by strobing its bit in the set or clear register.
    pub fn write<R: RegisterBlock + ?Sized>(&self, memory: &mut R, level: Level) {
        let offset = match level {
            Level::High => self.registers.gpset(),
            Level::Low => self.registers.gpclr(),
        };

        memory.write_word(offset, self.registers.bank_bit());
    }

    pub fn read<R: RegisterBlock + ?Sized>(&self, memory: &R) -> Level {
        if memory.read_word(self.registers.gplev()) & self.registers.bank_bit() == 0 {
            Level::Low
        } else {
            Level::High
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::BufferRegisters;

    fn pin(line: u8) -> LinePin {
        LinePin::new(GpioLine::new(line).unwrap())
    }

    #[test]
    fn line_range() {
        assert!(GpioLine::new(0).is_some());
        assert!(GpioLine::new(53).is_some());
        assert!(GpioLine::new(54).is_none());
        assert_eq!(GpioLine::all().count(), GPIO_LINES);
    }

    #[test]
    fn direction_only_touches_own_field() {
        let mut memory = BufferRegisters::new();
        memory.poke(1, 0xffff_ffff);

        pin(17).set_direction(&mut memory, Direction::Input);
        assert_eq!(memory.read_word(1), 0xffff_ffff & !(0b111 << 21));
        assert_eq!(pin(17).function(&memory), FSEL_INPUT);
        assert_eq!(pin(18).function(&memory), 0b111);

        pin(17).set_direction(&mut memory, Direction::Output);
        assert_eq!(pin(17).function(&memory), FSEL_OUTPUT);
        assert_eq!(pin(16).function(&memory), 0b111);
    }

    #[test]
    fn pull_sequence_order() {
        let mut memory = BufferRegisters::new();
        memory.poke(GPPUD, 0xffff_fff0);
        let settles = std::cell::Cell::new(0);

        pin(33).set_pull(&mut memory, Pull::Up, || settles.set(settles.get() + 1));

        assert_eq!(settles.get(), 2);
        assert_eq!(
            memory.writes(),
            vec![
                (GPPUD, 0xffff_fff2),
                (39, 1 << 1),
                (GPPUD, 0xffff_fff0),
                (39, 0),
            ]
        );
    }

    #[test]
    fn write_strobes_set_and_clear() {
        let mut memory = BufferRegisters::new();

        pin(4).write(&mut memory, Level::High);
        pin(40).write(&mut memory, Level::Low);
        assert_eq!(memory.writes(), vec![(7, 1 << 4), (11, 1 << 8)]);
    }

    #[test]
    fn read_level_bit() {
        let memory = BufferRegisters::new();
        memory.poke(14, 1 << 3);

        assert_eq!(pin(35).read(&memory), Level::High);
        assert_eq!(pin(34).read(&memory), Level::Low);
        assert_eq!(pin(3).read(&memory), Level::Low);
    }

    #[test]
    fn raw_codes() {
        assert_eq!(Direction::from_raw(0).unwrap(), Direction::Output);
        assert_eq!(Direction::from_raw(1).unwrap(), Direction::Input);
        assert_eq!(Pull::from_raw(2).unwrap(), Pull::Up);
        assert!(Pull::from_raw(3).is_err());
        assert_eq!(Level::from_raw(1).unwrap(), Level::High);
        assert!(Level::from_raw(2).is_err());
    }
}
