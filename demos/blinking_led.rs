//! A very basic example of a program blinking a LED diode using native library API.
//!
//! This example assumes that board pin #7 is connected to diode's anode (+).
//! Make sure to put resistor to reduce current flowing through the diode.

use rpio_mmap_gpio::{Direction, Level, PinMap, Pull, Session};
use std::error::Error;
use std::thread::sleep;
use std::time::Duration;

const LED: u8 = 7;

fn main() -> Result<(), Box<dyn Error>> {
    let mut gpio = Session::open(PinMap::Board)?;
    gpio.pin_setup(LED, Direction::Output, Pull::Off)?;
    let blink_interval = Duration::from_millis(500);

    for _ in 0..10 {
        gpio.output(LED, Level::High)?;
        sleep(blink_interval);
        gpio.output(LED, Level::Low)?;
        sleep(blink_interval);
    }

    gpio.cleanup();
    Ok(())
}
