//! Prints the function of every board header pin, then toggles board pin #40.
//!
//! Pin #40 exists only on B+/A+ and later boards. Press enter to advance between steps.

use rpio_mmap_gpio::{Direction, Level, PinMap, Pull, Session};
use std::error::Error;
use std::io::{self, BufRead};

fn pause() -> io::Result<()> {
    println!("PAUSED");
    io::stdin().lock().read_line(&mut String::new()).map(|_| ())
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut gpio = Session::open(PinMap::Board)?;
    println!("Board revision class: {}", gpio.board_revision_class());

    println!("Default pin functions:");
    for pin in 1..=40 {
        match gpio.pin_function(pin) {
            Ok(function) => println!("Pin {}: {}", pin, function),
            Err(err) => println!("Pin {}: {}", pin, err),
        }
    }

    pause()?;
    gpio.pin_setup(40, Direction::Output, Pull::Down)?;
    println!("Pin 40 function: {}", gpio.pin_function(40)?);

    for &level in &[Level::High, Level::Low, Level::High] {
        println!("Setting pin 40 to {:?}", level);
        gpio.output(40, level)?;
        pause()?;
    }

    println!("CLEANUP");
    gpio.cleanup();
    Ok(())
}
