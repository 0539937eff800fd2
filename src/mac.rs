use std::fmt;
use std::str::FromStr;

const MAC_LEN: usize = 6;
const SEPARATORS: [char; 2] = ['-', ':'];

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ParseError {
    #[error("MAC address is required")]
    Empty,
    #[error("MAC address must have 12 hex digits, found {0}")]
    WrongLength(usize),
    #[error("MAC address has invalid hex digit {0:?}")]
    InvalidDigit(char),
    #[error("MAC address must be six hex pairs separated by '-' or ':'")]
    Malformed,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MacAddress([u8; MAC_LEN]);

impl MacAddress {
    pub const fn new(octets: [u8; MAC_LEN]) -> Self {
        MacAddress(octets)
    }

    pub fn octets(&self) -> [u8; MAC_LEN] {
        self.0
    }
}

/// Lenient parse: every '-' and ':' is dropped, whatever is left has to be
/// exactly 12 hex digits.
impl FromStr for MacAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: Vec<char> = s.chars().filter(|c| !SEPARATORS.contains(c)).collect();
        if digits.len() != MAC_LEN * 2 {
            return Err(ParseError::WrongLength(digits.len()));
        }
        let mut octets = [0u8; MAC_LEN];
        for (i, pair) in digits.chunks(2).enumerate() {
            octets[i] = (hex_value(pair[0])? << 4) | hex_value(pair[1])?;
        }
        Ok(MacAddress(octets))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

fn hex_value(c: char) -> Result<u8, ParseError> {
    c.to_digit(16)
        .map(|d| d as u8)
        .ok_or(ParseError::InvalidDigit(c))
}

/// Strict check for user-supplied parameters: six hex pairs, each optionally
/// followed by a single separator, nothing else.
pub fn validate(input: &str) -> Result<MacAddress, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let mut chars = input.chars().peekable();
    for _ in 0..MAC_LEN {
        for _ in 0..2 {
            match chars.next() {
                Some(c) if c.is_ascii_hexdigit() => {}
                Some(c) if SEPARATORS.contains(&c) => return Err(ParseError::Malformed),
                Some(c) => return Err(ParseError::InvalidDigit(c)),
                None => return Err(ParseError::Malformed),
            }
        }
        chars.next_if(|c| SEPARATORS.contains(c));
    }
    if chars.next().is_some() {
        return Err(ParseError::Malformed);
    }
    input.parse()
}

#[cfg(test)]
mod tests {
    use crate::mac::*;

    macro_rules! test_parse {
        ($name:ident, $s:expr, $o:expr) => {
            #[test]
            fn $name() {
                assert_eq!($s.parse::<MacAddress>(), $o);
            }
        };
    }

    const WANT: MacAddress = MacAddress::new([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);

    test_parse! {colons, "AA:BB:CC:DD:EE:FF", Ok(WANT)}
    test_parse! {dashes, "AA-BB-CC-DD-EE-FF", Ok(WANT)}
    test_parse! {bare, "AABBCCDDEEFF", Ok(WANT)}
    test_parse! {lowercase, "aa:bb:cc:dd:ee:ff", Ok(WANT)}
    test_parse! {mixed_separators, "aA-bB:Cc-Dd:eE-Ff", Ok(WANT)}
    test_parse! {odd_grouping, "AAB:BCCD-DEEFF", Ok(WANT)}
    test_parse! {too_short, "AABBCCDDEEF", Err(ParseError::WrongLength(11))}
    test_parse! {too_long, "AABBCCDDEEFF00", Err(ParseError::WrongLength(14))}
    test_parse! {empty, "", Err(ParseError::WrongLength(0))}
    test_parse! {bad_digit, "ZZ:BB:CC:DD:EE:FF", Err(ParseError::InvalidDigit('Z'))}
    test_parse! {dot_separator, "AA.BB.CC.DD.EE.FF", Err(ParseError::WrongLength(17))}

    macro_rules! test_validate {
        ($name:ident, $s:expr, $o:expr) => {
            #[test]
            fn $name() {
                assert_eq!(validate($s), $o);
            }
        };
    }

    test_validate! {validate_colons, "AA:BB:CC:DD:EE:FF", Ok(WANT)}
    test_validate! {validate_dashes, "aa-bb-cc-dd-ee-ff", Ok(WANT)}
    test_validate! {validate_bare, "AABBCCDDEEFF", Ok(WANT)}
    test_validate! {validate_trailing_separator, "AA:BB:CC:DD:EE:FF:", Ok(WANT)}
    test_validate! {validate_leading_space, " AA:BB:CC:DD:EE:FF", Err(ParseError::InvalidDigit(' '))}
    test_validate! {validate_trailing_space, "AA:BB:CC:DD:EE:FF ", Err(ParseError::Malformed)}
    test_validate! {validate_empty, "", Err(ParseError::Empty)}
    test_validate! {validate_blank, "   ", Err(ParseError::Empty)}
    test_validate! {validate_short, "AABBCCDDEEF", Err(ParseError::Malformed)}
    test_validate! {validate_long, "AABBCCDDEEFF00", Err(ParseError::Malformed)}
    test_validate! {validate_bad_digit, "ZZ:BB:CC:DD:EE:FF", Err(ParseError::InvalidDigit('Z'))}
    test_validate! {validate_double_separator, "AA::BB:CC:DD:EE:FF", Err(ParseError::Malformed)}
    test_validate! {validate_split_pair, "A:ABBCCDDEEFF", Err(ParseError::Malformed)}

    #[test]
    fn test_display() {
        let mac: MacAddress = "00-1A-2b-3C-4d-5E".parse().unwrap();
        assert_eq!(mac.to_string(), "00:1a:2b:3c:4d:5e");
    }
}
