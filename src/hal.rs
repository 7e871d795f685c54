use embedded_hal::digital::v2 as eh;

use crate::device::{Direction, Level, Platform, Pull};
use crate::{RpioError, RpioResult, Session};

/// Abstraction over a channel configured as input, implementing `embedded_hal` `InputPin`.
///
/// This is obtainable by using `input_pin` method of `Session`. It borrows the session, so the addressing mode
/// cannot change while the pin is alive.
pub struct InputPin<'session, P: Platform> {
    session: &'session Session<P>,
    channel: u8,
}

/// Abstraction over a channel configured as output, implementing `embedded_hal` `OutputPin`.
///
/// This is obtainable by using `output_pin` method of `Session`.
pub struct OutputPin<'session, P: Platform> {
    session: &'session mut Session<P>,
    channel: u8,
}

impl<P: Platform> Session<P> {
    /// Configures a channel as input and wraps it as an `embedded_hal` input pin.
    pub fn input_pin(&mut self, channel: u8, pull: Pull) -> RpioResult<InputPin<'_, P>> {
        self.pin_setup(channel, Direction::Input, pull)?;
        Ok(InputPin {
            session: self,
            channel,
        })
    }

    /// Configures a channel as output and wraps it as an `embedded_hal` output pin.
    pub fn output_pin(&mut self, channel: u8, pull: Pull) -> RpioResult<OutputPin<'_, P>> {
        self.pin_setup(channel, Direction::Output, pull)?;
        Ok(OutputPin {
            session: self,
            channel,
        })
    }
}

impl<'session, P: Platform> InputPin<'session, P> {
    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn get_value(&self) -> RpioResult<Level> {
        self.session.input(self.channel)
    }
}

impl<'session, P: Platform> OutputPin<'session, P> {
    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn set_value(&mut self, value: Level) -> RpioResult<()> {
        self.session.output(self.channel, value)
    }
}

impl<'session, P: Platform> eh::InputPin for InputPin<'session, P> {
    type Error = RpioError;

    fn is_high(&self) -> Result<bool, Self::Error> {
        Ok(self.get_value()? == Level::High)
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        self.is_high().map(|v| !v)
    }
}

impl<'session, P: Platform> eh::OutputPin for OutputPin<'session, P> {
    type Error = RpioError;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set_value(Level::Low)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set_value(Level::High)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::RegisterBlock;
    use crate::revision::BoardRevision;
    use crate::session::tests::ready;
    use crate::{PinMap, Status};
    use embedded_hal::digital::v2::{InputPin as _, OutputPin as _};

    #[test]
    fn output_pin_drives_set_and_clear() {
        let (mut session, observer) = ready(BoardRevision::Rev3Plus, PinMap::Board);
        let mut led = session.output_pin(7, Pull::Off).unwrap();

        led.set_high().unwrap();
        assert_eq!(observer.writes().last(), Some(&(7, 1 << 4)));
        led.set_low().unwrap();
        assert_eq!(observer.writes().last(), Some(&(10, 1 << 4)));
        assert_eq!(led.channel(), 7);
    }

    #[test]
    fn input_pin_reads_level() {
        let (mut session, observer) = ready(BoardRevision::Rev2, PinMap::Gpio);
        observer.poke(13, 1 << 22);

        let button = session.input_pin(22, Pull::Up).unwrap();
        assert!(button.is_high().unwrap());
        assert!(!button.is_low().unwrap());
        assert_eq!(observer.read_word(2) & (0b111 << 6), 0);
    }

    #[test]
    fn invalid_channel_is_reported() {
        let (mut session, _) = ready(BoardRevision::Rev1, PinMap::Board);
        let result = session.output_pin(1, Pull::Off);
        assert_eq!(Status::of(&result), Status::InvalidChannel);
    }
}
