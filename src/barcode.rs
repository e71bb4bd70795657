// Code 128 symbol encoding on top of barcoders.
// Picks the character sets, then hands the marked-up data to barcoders for the
// bar patterns and checksum.

use barcoders::sym::code128::Code128 as Symbology;

use crate::errors::BarcodeError;

// Character-set markers understood by barcoders, both as a start code and mid-data.
const SET_B: char = '\u{181}'; // Ɓ
const SET_C: char = '\u{106}'; // Ć

/// Smallest run of digits worth switching into code set C for.
const MIN_DIGIT_RUN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeSet {
    B,
    C,
}

impl CodeSet {
    fn marker(self) -> char {
        match self {
            CodeSet::B => SET_B,
            CodeSet::C => SET_C,
        }
    }
}

/// A Code 128 symbol ready to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code128 {
    data: String,
    modules: Vec<bool>,
}

impl Code128 {
    /// Encodes printable ASCII. Digit runs of four or more go through code set C.
    pub fn encode(payload: &str) -> Result<Self, BarcodeError> {
        if payload.is_empty() {
            return Err(BarcodeError::EmptyPayload);
        }

        let data = mark_code_sets(payload)?;
        let symbol = Symbology::new(&data).map_err(|e| BarcodeError::Symbology(e.to_string()))?;
        let modules = symbol.encode().into_iter().map(|m| m == 1).collect();

        Ok(Code128 { data, modules })
    }

    /// The payload with its character-set markers, as handed to barcoders.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Module pattern from start code through stop pattern. `true` is a bar.
    pub fn modules(&self) -> &[bool] {
        &self.modules
    }
}

fn mark_code_sets(payload: &str) -> Result<String, BarcodeError> {
    let bytes = printable_bytes(payload)?;
    let mut data = String::with_capacity(bytes.len() + 4);
    let mut current: Option<CodeSet> = None;
    let mut i = 0;

    while i < bytes.len() {
        let wanted = choose_code_set(&bytes[i..], current);
        if current != Some(wanted) {
            data.push(wanted.marker());
            current = Some(wanted);
        }

        let width = match wanted {
            CodeSet::C => 2,
            CodeSet::B => 1,
        };
        data.extend(bytes[i..i + width].iter().map(|&b| b as char));
        i += width;
    }

    Ok(data)
}

// Control characters and DEL are refused along with non-ASCII: file names never
// carry them, and everything left fits code set B.
fn printable_bytes(payload: &str) -> Result<Vec<u8>, BarcodeError> {
    payload
        .chars()
        .enumerate()
        .map(|(position, ch)| {
            if (' '..='~').contains(&ch) {
                Ok(ch as u8)
            } else {
                Err(BarcodeError::UnsupportedCharacter { ch, position })
            }
        })
        .collect()
}

fn digit_run(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn choose_code_set(rest: &[u8], current: Option<CodeSet>) -> CodeSet {
    let run = digit_run(rest);

    if current == Some(CodeSet::C) && run >= 2 {
        return CodeSet::C;
    }
    // An odd run is entered one digit late so code C always consumes pairs.
    if run >= MIN_DIGIT_RUN && run % 2 == 0 {
        return CodeSet::C;
    }
    // The whole payload being a digit pair is also cheapest in C.
    if current.is_none() && run == 2 && rest.len() == 2 {
        return CodeSet::C;
    }
    CodeSet::B
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(pattern: &str) -> Vec<bool> {
        pattern.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn test_short_digit_run_stays_in_b() {
        let symbol = Code128::encode("ABC123.prn").unwrap();

        assert_eq!(symbol.data(), "\u{181}ABC123.prn");
        // Start + 10 data + checksum at 11 modules each, plus the 13-module stop.
        assert_eq!(symbol.modules().len(), 12 * 11 + 13);
    }

    #[test]
    fn test_all_digits_use_code_c() {
        let symbol = Code128::encode("123456").unwrap();
        assert_eq!(symbol.data(), "\u{106}123456");
        assert_eq!(symbol.modules().len(), 5 * 11 + 13);
    }

    #[test]
    fn test_odd_digit_run_enters_c_one_digit_late() {
        let symbol = Code128::encode("12345").unwrap();
        assert_eq!(symbol.data(), "\u{181}1\u{106}2345");
    }

    #[test]
    fn test_leaves_c_for_trailing_text() {
        let symbol = Code128::encode("1234AB").unwrap();
        assert_eq!(symbol.data(), "\u{106}1234\u{181}AB");
    }

    #[test]
    fn test_digit_pair_payload_uses_code_c() {
        let symbol = Code128::encode("12").unwrap();
        assert_eq!(symbol.data(), "\u{106}12");
        assert_eq!(symbol.modules().len(), 3 * 11 + 13);
    }

    #[test]
    fn test_start_checksum_and_stop_patterns() {
        // Start B, then P J J 1 2 3 C; checksum is 879 mod 103 = 55.
        let symbol = Code128::encode("PJJ123C").unwrap();
        let modules = symbol.modules();
        let n = modules.len();

        assert_eq!(modules[..11], bars("11010010000")[..]);
        assert_eq!(modules[n - 24..n - 13], bars("11101000110")[..]);
        assert_eq!(modules[n - 13..], bars("1100011101011")[..]);
    }

    #[test]
    fn test_rejects_non_ascii() {
        let err = Code128::encode("caf\u{e9}").unwrap_err();
        assert!(matches!(
            err,
            BarcodeError::UnsupportedCharacter { ch: '\u{e9}', position: 3 }
        ));
    }

    #[test]
    fn test_rejects_set_markers_in_payload() {
        // The markers are non-ASCII, so they can never smuggle in a set switch.
        let err = Code128::encode("A\u{106}12").unwrap_err();
        assert!(matches!(
            err,
            BarcodeError::UnsupportedCharacter { position: 1, .. }
        ));
    }

    #[test]
    fn test_rejects_control_characters() {
        let err = Code128::encode("A\tB").unwrap_err();
        assert!(matches!(
            err,
            BarcodeError::UnsupportedCharacter { ch: '\t', position: 1 }
        ));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            Code128::encode(""),
            Err(BarcodeError::EmptyPayload)
        ));
    }
}
