use crate::{
    Result,
    constants::{MAX_UID_LENGTH, MIN_UID_LENGTH},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Compare the first `length` bytes of two identifiers positionally.
///
/// Returns `false` at the first mismatching byte and `true` only if every
/// one of the `length` bytes matches. A slice shorter than `length` never
/// matches.
///
/// # Examples
///
/// ```
/// use latchkey_core::uid_equal;
///
/// assert!(uid_equal(&[0xB8, 0x24], &[0xB8, 0x24], 2));
/// assert!(!uid_equal(&[0xB8, 0x24], &[0xB8, 0x25], 2));
/// // Only the requested prefix is compared.
/// assert!(uid_equal(&[0xB8, 0x24, 0x01], &[0xB8, 0x24, 0x02], 2));
/// ```
#[must_use]
pub fn uid_equal(a: &[u8], b: &[u8], length: usize) -> bool {
    let (Some(a), Some(b)) = (a.get(..length), b.get(..length)) else {
        return false;
    };

    for (x, y) in a.iter().zip(b) {
        if x != y {
            return false;
        }
    }
    true
}

/// Card serial number (4-10 bytes).
///
/// Stored inline so identifiers can be copied freely between the reader,
/// the decision loop and diagnostics without allocating.
///
/// Formats as space-separated upper-case hex (`B8 24 A4 51`) and parses
/// from hex text with optional `:`, `-` or space separators.
#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier {
    bytes: [u8; MAX_UID_LENGTH],
    len: u8,
}

impl Identifier {
    /// Create a new identifier with length validation.
    ///
    /// # Errors
    /// Returns `Error::IdentifierLength` if `bytes` is not 4-10 bytes long.
    pub fn new(bytes: &[u8]) -> Result<Self> {
        let len = bytes.len();
        if !(MIN_UID_LENGTH..=MAX_UID_LENGTH).contains(&len) {
            return Err(Error::IdentifierLength {
                min: MIN_UID_LENGTH,
                max: MAX_UID_LENGTH,
                actual: len,
            });
        }

        let mut buf = [0u8; MAX_UID_LENGTH];
        buf[..len].copy_from_slice(bytes);
        Ok(Self {
            bytes: buf,
            len: len as u8,
        })
    }

    /// Build an identifier from a fixed-size array, checked at compile time.
    ///
    /// ```
    /// use latchkey_core::Identifier;
    ///
    /// const MASTER: Identifier = Identifier::from_array([0x94, 0x51, 0x94, 0xBF]);
    /// assert_eq!(MASTER.len(), 4);
    /// ```
    #[must_use]
    pub const fn from_array<const N: usize>(bytes: [u8; N]) -> Self {
        const { assert!(N >= MIN_UID_LENGTH && N <= MAX_UID_LENGTH) };

        let mut buf = [0u8; MAX_UID_LENGTH];
        let mut i = 0;
        while i < N {
            buf[i] = bytes[i];
            i += 1;
        }
        Self {
            bytes: buf,
            len: N as u8,
        }
    }

    /// The identifier bytes as reported by the reader.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len()]
    }

    /// Reported length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    /// Always `false`; identifiers are at least [`MIN_UID_LENGTH`] bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check whether a presented identifier matches this one.
    ///
    /// The comparison runs over the presented identifier's reported length
    /// and requires both identifiers to have that length.
    #[must_use]
    pub fn matches(&self, presented: &Identifier) -> bool {
        presented.len() == self.len()
            && uid_equal(presented.as_bytes(), self.as_bytes(), presented.len())
    }

    /// Compact upper-case hex without separators (`B824A451`).
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.as_bytes().iter().map(|b| format!("{b:02X}")).collect()
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other)
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, byte) in self.as_bytes().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Identifier({self})")
    }
}

impl std::str::FromStr for Identifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let digits: Vec<char> = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ':' | '-' | ' '))
            .collect();

        if digits.is_empty() || digits.len() % 2 != 0 {
            return Err(Error::InvalidIdentifier(format!(
                "expected an even number of hex digits in {s:?}"
            )));
        }

        let bytes = digits
            .chunks(2)
            .map(|pair| {
                let hi = pair[0].to_digit(16);
                let lo = pair[1].to_digit(16);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => Ok((hi * 16 + lo) as u8),
                    _ => Err(Error::InvalidIdentifier(format!(
                        "non-hex digit in {s:?}"
                    ))),
                }
            })
            .collect::<Result<Vec<u8>>>()?;

        Identifier::new(&bytes)
    }
}

impl TryFrom<String> for Identifier {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("B8 24 A4 51", &[0xB8, 0x24, 0xA4, 0x51])]
    #[case("b824a451", &[0xB8, 0x24, 0xA4, 0x51])]
    #[case("94:51:94:BF", &[0x94, 0x51, 0x94, 0xBF])]
    #[case("04-AB-CD-EF-01-02-03", &[0x04, 0xAB, 0xCD, 0xEF, 0x01, 0x02, 0x03])]
    fn test_identifier_parse_valid(#[case] input: &str, #[case] expected: &[u8]) {
        let uid: Identifier = input.parse().unwrap();
        assert_eq!(uid.as_bytes(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("B8 24 A4")] // 3 bytes
    #[case("B8 24 A4 5")] // odd digit count
    #[case("ZZ 24 A4 51")]
    #[case("0102030405060708090A0B")] // 11 bytes
    fn test_identifier_parse_invalid(#[case] input: &str) {
        assert!(input.parse::<Identifier>().is_err());
    }

    #[test]
    fn test_identifier_display_zero_pads() {
        let uid = Identifier::new(&[0x04, 0x0A, 0xFF, 0x00]).unwrap();
        assert_eq!(uid.to_string(), "04 0A FF 00");
        assert_eq!(uid.to_hex(), "040AFF00");
        assert_eq!(format!("{uid:?}"), "Identifier(04 0A FF 00)");
    }

    #[test]
    fn test_identifier_length_bounds() {
        assert!(Identifier::new(&[1, 2, 3]).is_err());
        assert!(Identifier::new(&[1, 2, 3, 4]).is_ok());
        assert!(Identifier::new(&[0; 10]).is_ok());
        assert!(Identifier::new(&[0; 11]).is_err());
    }

    #[test]
    fn test_identifier_from_array_matches_new() {
        let uid = Identifier::from_array(crate::constants::DEFAULT_AUTHORIZED_UID);
        assert_eq!(uid, Identifier::new(&[0xB8, 0x24, 0xA4, 0x51]).unwrap());
    }

    #[test]
    fn test_identifier_matches_requires_same_length() {
        let short = Identifier::new(&[0xB8, 0x24, 0xA4, 0x51]).unwrap();
        let long = Identifier::new(&[0xB8, 0x24, 0xA4, 0x51, 0x00, 0x00, 0x00]).unwrap();

        assert!(short.matches(&short));
        assert!(!short.matches(&long));
        assert!(!long.matches(&short));
        assert_ne!(short, long);
    }

    #[test]
    fn test_identifier_serde_as_string() {
        let uid = Identifier::new(&[0xB8, 0x24, 0xA4, 0x51]).unwrap();
        let json = serde_json::to_string(&uid).unwrap();
        assert_eq!(json, "\"B8 24 A4 51\"");

        let back: Identifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, uid);
    }

    #[test]
    fn test_uid_equal_short_slice_never_matches() {
        assert!(!uid_equal(&[1, 2], &[1, 2, 3], 3));
        assert!(!uid_equal(&[1, 2, 3], &[1, 2], 3));
    }

    #[test]
    fn test_uid_equal_zero_length() {
        assert!(uid_equal(&[1], &[2], 0));
    }
}
