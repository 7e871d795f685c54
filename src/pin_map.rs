use derive_try_from_primitive::TryFromPrimitive;
use std::convert::TryFrom;

use crate::revision::BoardRevision;
use crate::{RpioError, RpioResult};

/// Addressing mode used to interpret channel numbers.
///
/// - Board - channels are physical positions on the board header (1..26, or 1..40 on B+/A+ and later).
/// - Gpio - channels are BCM GPIO line numbers (0..53).
#[repr(u8)]
#[derive(TryFromPrimitive, Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PinMap {
    Board = 10,
    Gpio = 11,
}

impl PinMap {
    /// Converts a numeric addressing mode code, failing with `InvalidArgument` for unknown codes.
    pub fn from_raw(code: u8) -> RpioResult<Self> {
        Self::try_from(code).map_err(|_| RpioError::InvalidArgument)
    }
}

const NP: Option<u8> = None;

/// Mapping from board header positions to GPIO line numbers for one board family.
///
/// Index 0 is unused. Positions without a GPIO line (power, ground) are `None`.
#[derive(Debug, PartialEq, Eq)]
pub struct PinMappingTable([Option<u8>; 41]);

impl PinMappingTable {
    pub const REV1: PinMappingTable = PinMappingTable([
        NP, NP, NP, Some(0), NP, Some(1), NP, Some(4), Some(14), NP,
        Some(15), Some(17), Some(18), Some(21), NP, Some(22), Some(23), NP, Some(24), Some(10),
        NP, Some(9), Some(25), Some(11), Some(8), NP, Some(7), NP, NP, NP,
        NP, NP, NP, NP, NP, NP, NP, NP, NP, NP, NP,
    ]);

    pub const REV2: PinMappingTable = PinMappingTable([
        NP, NP, NP, Some(2), NP, Some(3), NP, Some(4), Some(14), NP,
        Some(15), Some(17), Some(18), Some(27), NP, Some(22), Some(23), NP, Some(24), Some(10),
        NP, Some(9), Some(25), Some(11), Some(8), NP, Some(7), NP, NP, NP,
        NP, NP, NP, NP, NP, NP, NP, NP, NP, NP, NP,
    ]);

    pub const REV3: PinMappingTable = PinMappingTable([
        NP, NP, NP, Some(2), NP, Some(3), NP, Some(4), Some(14), NP,
        Some(15), Some(17), Some(18), Some(27), NP, Some(22), Some(23), NP, Some(24), Some(10),
        NP, Some(9), Some(25), Some(11), Some(8), NP, Some(7), NP, NP, Some(5),
        NP, Some(6), Some(12), Some(13), NP, Some(19), Some(16), Some(26), Some(20), NP, Some(21),
    ]);

    /// Table for a revision. The compute module has no board header, so no table.
    pub fn for_revision(revision: BoardRevision) -> Option<&'static PinMappingTable> {
        use BoardRevision::*;
        match revision {
            ComputeModule => None,
            Rev1 => Some(&Self::REV1),
            Rev2 => Some(&Self::REV2),
            Rev3Plus => Some(&Self::REV3),
        }
    }

    /// GPIO line behind a board position, or `None` if the position carries no GPIO line.
    pub fn resolve(&self, board_pin: u8) -> Option<u8> {
        self.0.get(usize::from(board_pin)).copied().flatten()
    }

    /// Iterates `(board_pin, gpio_line)` pairs present in the table.
    pub fn entries(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(pin, line)| line.map(|line| (pin as u8, line)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tables_never_alias_a_line() {
        for table in &[&PinMappingTable::REV1, &PinMappingTable::REV2, &PinMappingTable::REV3] {
            let mut seen = HashSet::new();
            for (pin, line) in table.entries() {
                assert!(line < 54, "pin {} maps outside the GPIO range", pin);
                assert!(seen.insert(line), "line {} mapped twice", line);
            }
        }
    }

    #[test]
    fn resolves_known_positions() {
        assert_eq!(PinMappingTable::REV1.resolve(3), Some(0));
        assert_eq!(PinMappingTable::REV2.resolve(3), Some(2));
        assert_eq!(PinMappingTable::REV2.resolve(13), Some(27));
        assert_eq!(PinMappingTable::REV3.resolve(40), Some(21));
        assert_eq!(PinMappingTable::REV3.resolve(1), None);
        assert_eq!(PinMappingTable::REV3.resolve(0), None);
        assert_eq!(PinMappingTable::REV3.resolve(41), None);
    }

    #[test]
    fn legacy_tables_end_at_pin_26() {
        assert!(PinMappingTable::REV1.entries().all(|(pin, _)| pin <= 26));
        assert!(PinMappingTable::REV2.entries().all(|(pin, _)| pin <= 26));
        assert_eq!(PinMappingTable::REV3.entries().count(), 26);
    }

    #[test]
    fn table_selection() {
        assert!(PinMappingTable::for_revision(BoardRevision::ComputeModule).is_none());
        assert_eq!(
            PinMappingTable::for_revision(BoardRevision::Rev1),
            Some(&PinMappingTable::REV1)
        );
        assert_eq!(
            PinMappingTable::for_revision(BoardRevision::Rev3Plus),
            Some(&PinMappingTable::REV3)
        );
    }

    #[test]
    fn raw_pin_map_codes() {
        assert_eq!(PinMap::from_raw(10).unwrap(), PinMap::Board);
        assert_eq!(PinMap::from_raw(11).unwrap(), PinMap::Gpio);
        assert!(matches!(PinMap::from_raw(12), Err(RpioError::InvalidArgument)));
    }
}
