//! Board revision detection.
//!
//! The revision is read from the `Hardware` and `Revision` fields of a `/proc/cpuinfo`-style source
//! and folded into one of the four revision classes that decide which pin mapping table applies.
use derive_try_from_primitive::TryFromPrimitive;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::{RpioError, RpioResult};

/// System-on-chip identifiers reported by supported boards.
const KNOWN_HARDWARE: [&str; 2] = ["BCM2708", "BCM2835"];

/// Revision class of the running board.
///
/// The numeric value is the class index reported by `board_revision_class`.
#[repr(u8)]
#[derive(TryFromPrimitive, Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BoardRevision {
    ComputeModule = 0,
    Rev1 = 1,
    Rev2 = 2,
    Rev3Plus = 3,
}

impl BoardRevision {
    /// Highest board pin number addressable on this revision.
    pub fn max_board_pin(self) -> u8 {
        match self {
            BoardRevision::Rev3Plus => 40,
            _ => 26,
        }
    }

    /// Physical base address of the GPIO register window for this board's SoC family.
    pub fn gpio_base(self) -> u64 {
        // Every class detected here runs on a BCM2708/BCM2835 family part.
        0x2020_0000
    }
}

/// Classifies the last four characters of a revision code.
///
/// Returns `None` only for codes outside the fixed table. The overvolt prefix (`1000...`) is ignored.
pub fn classify_strict(revision: &str) -> Option<BoardRevision> {
    use BoardRevision::*;

    match revision_suffix(revision) {
        "0002" | "0003" => Some(Rev1),
        "0004" | "0005" | "0006" | "0007" | "0008" | "0009" | "000d" | "000e" | "000f" => {
            Some(Rev2)
        }
        "0011" => Some(ComputeModule),
        "0010" | "0012" | "0013" | "0015" => Some(Rev3Plus),
        _ => None,
    }
}

/// Classifies a revision code, assuming the latest family for anything not in the table.
pub fn classify(revision: &str) -> BoardRevision {
    classify_strict(revision).unwrap_or_else(|| {
        log::warn!(
            "unrecognised board revision code {:?}, assuming B+/A+ pin layout",
            revision
        );
        BoardRevision::Rev3Plus
    })
}

/// Scans `key: value` lines for a supported `Hardware` entry and a `Revision` entry.
///
/// Fails with `UnknownBoardRevision` if either one is missing. With `strict` set, revision codes
/// outside the fixed table fail too instead of falling back to `Rev3Plus`.
pub fn detect<R: BufRead>(source: R, strict: bool) -> RpioResult<BoardRevision> {
    let mut hardware_found = false;
    let mut revision = None;

    for line in source.split(b'\n') {
        let line = line.map_err(|err| {
            log::debug!("failed to read hardware description: {}", err);
            RpioError::UnknownBoardRevision
        })?;
        // Only the two keys matter, stray bytes elsewhere must not abort detection.
        let line = String::from_utf8_lossy(&line);
        let (key, value) = match line.split_once(':') {
            Some(pair) => pair,
            None => continue,
        };
        let value = match value.split_whitespace().next() {
            Some(token) => token,
            None => continue,
        };

        match key.trim() {
            "Hardware" if KNOWN_HARDWARE.contains(&value) => hardware_found = true,
            "Revision" => revision = Some(value.to_owned()),
            _ => {}
        }
    }

    match (hardware_found, revision) {
        (true, Some(code)) if strict => {
            classify_strict(&code).ok_or(RpioError::UnknownBoardRevision)
        }
        (true, Some(code)) => Ok(classify(&code)),
        _ => Err(RpioError::UnknownBoardRevision),
    }
}

/// Reads the revision from a cpuinfo file. An unreadable file counts as an unknown revision.
pub fn read_cpuinfo<T: AsRef<Path>>(path: T, strict: bool) -> RpioResult<BoardRevision> {
    let file = File::open(path.as_ref()).map_err(|err| {
        log::debug!("cannot open {}: {}", path.as_ref().display(), err);
        RpioError::UnknownBoardRevision
    })?;

    detect(BufReader::new(file), strict)
}

/// Revision class index of a detection result, or `-1` on failure.
pub fn board_revision_class(revision: &RpioResult<BoardRevision>) -> i32 {
    match revision {
        Ok(revision) => *revision as i32,
        Err(_) => -1,
    }
}

fn revision_suffix(revision: &str) -> &str {
    match revision.char_indices().rev().nth(3) {
        Some((start, _)) => &revision[start..],
        None => revision,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;
    use std::io::Cursor;

    fn cpuinfo(hardware: &str, revision: &str) -> Cursor<String> {
        Cursor::new(format!(
            "processor\t: 0\nmodel name\t: ARMv6-compatible processor rev 7 (v6l)\n\nHardware\t: {}\nRevision\t: {}\nSerial\t\t: 00000000deadbeef\n",
            hardware, revision
        ))
    }

    #[test]
    fn classifies_fixed_codes() {
        assert_eq!(classify("0002"), BoardRevision::Rev1);
        assert_eq!(classify("0003"), BoardRevision::Rev1);
        assert_eq!(classify("0009"), BoardRevision::Rev2);
        assert_eq!(classify("000e"), BoardRevision::Rev2);
        assert_eq!(classify("0011"), BoardRevision::ComputeModule);
        assert_eq!(classify("0010"), BoardRevision::Rev3Plus);
    }

    #[test]
    fn ignores_overvolt_prefix() {
        assert_eq!(classify("10000002"), BoardRevision::Rev1);
        assert_eq!(classify("1000000f"), BoardRevision::Rev2);
    }

    #[test]
    fn unknown_codes_fall_back_to_latest_family() {
        assert_eq!(classify("a02082"), BoardRevision::Rev3Plus);
        assert_eq!(classify_strict("a02082"), None);
        assert_eq!(classify_strict("02"), None);
    }

    #[test]
    fn detects_revision_from_cpuinfo() {
        let revision = detect(cpuinfo("BCM2708", "000e"), false).unwrap();
        assert_eq!(revision, BoardRevision::Rev2);

        let revision = detect(cpuinfo("BCM2835", "0011"), false).unwrap();
        assert_eq!(revision, BoardRevision::ComputeModule);
    }

    #[test]
    fn codes_are_matched_literally() {
        assert_eq!(classify_strict("000d"), Some(BoardRevision::Rev2));
        assert_eq!(classify_strict("000D"), None);
        assert_eq!(classify("000D"), BoardRevision::Rev3Plus);
    }

    #[test]
    fn skips_undecodable_lines() {
        let source = Cursor::new(&b"model\t: \xff\xfe\nHardware\t: BCM2835\nRevision\t: 0002\n"[..]);
        assert_eq!(detect(source, false).unwrap(), BoardRevision::Rev1);
    }

    #[test]
    fn rejects_unsupported_hardware() {
        let result = detect(cpuinfo("BCM2711", "0002"), false);
        assert!(matches!(result, Err(RpioError::UnknownBoardRevision)));
    }

    #[test]
    fn requires_both_fields() {
        let missing_revision = Cursor::new("Hardware\t: BCM2835\n");
        assert!(detect(missing_revision, false).is_err());

        let missing_hardware = Cursor::new("Revision\t: 0002\n");
        assert!(detect(missing_hardware, false).is_err());
    }

    #[test]
    fn strict_detection_rejects_unlisted_codes() {
        let result = detect(cpuinfo("BCM2835", "a02082"), true);
        assert!(matches!(result, Err(RpioError::UnknownBoardRevision)));
        assert_eq!(
            detect(cpuinfo("BCM2835", "a02082"), false).unwrap(),
            BoardRevision::Rev3Plus
        );
    }

    #[test]
    fn missing_cpuinfo_is_unknown_revision() {
        let result = read_cpuinfo("/nonexistent/cpuinfo", false);
        assert_eq!(board_revision_class(&result), -1);
    }

    #[test]
    fn class_indices() {
        assert_eq!(board_revision_class(&Ok(BoardRevision::ComputeModule)), 0);
        assert_eq!(board_revision_class(&Ok(BoardRevision::Rev3Plus)), 3);
        assert_eq!(BoardRevision::try_from(2u8).ok(), Some(BoardRevision::Rev2));
        assert_eq!(BoardRevision::Rev1.max_board_pin(), 26);
        assert_eq!(BoardRevision::Rev3Plus.max_board_pin(), 40);
    }
}
