//! This example demonstrates the usage of embedded_hal trait usage.
//!
//! The main benefit over the blinking_led example is that `blink_led`
//! can be used for _any_ device with embedded-hal digital pins abstraction.
//!
//! This example assumes that board pin #7 is connected to diode's anode (+).
//! Make sure to put resistor to reduce current flowing through the diode.

use embedded_hal::digital::v2::*;
use rpio_mmap_gpio::{PinMap, Pull, Session};
use std::error::Error;
use std::thread::sleep;
use std::time::Duration;

fn blink_led<T: OutputPin<Error = impl Error + 'static>>(mut pin: T) -> Result<(), Box<dyn Error>> {
    let blink_interval = Duration::from_millis(500);

    for _ in 0..10 {
        pin.set_high()?;
        sleep(blink_interval);
        pin.set_low()?;
        sleep(blink_interval);
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut gpio = Session::open(PinMap::Board)?;
    let led_pin = gpio.output_pin(7, Pull::Off)?;

    // Dropping the session afterwards restores the pin.
    blink_led(led_pin)
}
