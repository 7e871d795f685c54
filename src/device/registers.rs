use super::pin::GpioLine;

/* BCM2835 GPIO register layout, in 32-bit words from the start of the GPIO window.
 *
 * Function select packs ten 3-bit fields per word (GPFSEL0..5). Set, clear, level and pull clock
 * registers hold one bit per line, 32 lines per word (two banks each). GPPUD is a single global
 * 2-bit pull mode latched into the lines whose GPPUDCLK bit is strobed.
 */
const GPFSEL: usize = 0;
const GPSET: usize = 7;
const GPCLR: usize = 10;
const GPLEV: usize = 13;
pub const GPPUD: usize = 37;
const GPPUDCLK: usize = 38;

/// Size of the mapped GPIO window in bytes.
pub const BLOCK_SIZE: usize = 4096;

/// Mask of the 2-bit pull mode field in `GPPUD`.
pub const PUD_MASK: u32 = 0b11;

/// Word offsets and bit positions needed to drive one GPIO line.
///
/// All computations are done once when the struct is created so pin operations only do the memory access.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RegistersOffsets {
    line: GpioLine,
    fsel_word: usize,
    fsel_shift: u32,
    bank: usize,
    bank_bit: u32,
}

impl RegistersOffsets {
    pub fn new(line: GpioLine) -> Self {
        let n = usize::from(line.number());

        Self {
            line,
            fsel_word: GPFSEL + n / 10,
            fsel_shift: (n % 10) as u32 * 3,
            bank: n / 32,
            bank_bit: 1 << (n % 32),
        }
    }

    pub fn line(&self) -> GpioLine {
        self.line
    }

    pub fn gpfsel(&self) -> usize {
        self.fsel_word
    }

    pub fn fsel_shift(&self) -> u32 {
        self.fsel_shift
    }

    pub fn gpset(&self) -> usize {
        GPSET + self.bank
    }

    pub fn gpclr(&self) -> usize {
        GPCLR + self.bank
    }

    pub fn gplev(&self) -> usize {
        GPLEV + self.bank
    }

    pub fn gppudclk(&self) -> usize {
        GPPUDCLK + self.bank
    }

    /// Single-bit mask of this line within its set/clear/level/clock word.
    pub fn bank_bit(&self) -> u32 {
        self.bank_bit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets(line: u8) -> RegistersOffsets {
        RegistersOffsets::new(GpioLine::new(line).unwrap())
    }

    #[test]
    fn function_select_fields() {
        let first = offsets(0);
        assert_eq!((first.gpfsel(), first.fsel_shift()), (0, 0));

        let seventeen = offsets(17);
        assert_eq!((seventeen.gpfsel(), seventeen.fsel_shift()), (1, 21));

        let last = offsets(53);
        assert_eq!((last.gpfsel(), last.fsel_shift()), (5, 9));
    }

    #[test]
    fn banked_registers() {
        let low = offsets(31);
        assert_eq!(low.gpset(), 7);
        assert_eq!(low.gpclr(), 10);
        assert_eq!(low.gplev(), 13);
        assert_eq!(low.gppudclk(), 38);
        assert_eq!(low.bank_bit(), 1 << 31);

        let high = offsets(32);
        assert_eq!(high.gpset(), 8);
        assert_eq!(high.gpclr(), 11);
        assert_eq!(high.gplev(), 14);
        assert_eq!(high.gppudclk(), 39);
        assert_eq!(high.bank_bit(), 1);
    }

    #[test]
    fn all_registers_fit_in_the_window() {
        let last = offsets(53);
        let highest = last.gppudclk().max(GPPUD).max(last.gplev());
        assert!((highest + 1) * 4 <= BLOCK_SIZE);
    }
}
