//! Transcoding between concatenated `r ‖ s` signatures and ASN.1 DER.
//!
//! JWS and WebCrypto use the fixed-width concatenated form: `r` then `s`,
//! each a big-endian unsigned integer left-padded to the curve's coordinate
//! width. Synchronous native providers speak DER instead:
//!
//! ```text
//! SEQUENCE {
//!   INTEGER r
//!   INTEGER s
//! }
//! ```
//!
//! DER integers are signed and minimal, so leading zeros are stripped and a
//! single `0x00` is prepended whenever the top bit of the first remaining byte
//! is set.
//!
//! Decoding is strict: lengths and integers must be minimally encoded, no
//! trailing bytes are allowed, and negative integers are rejected.

use crate::error::Error;

const SEQUENCE: u8 = 0x30;
const INTEGER: u8 = 0x02;

/// Convert a concatenated `r ‖ s` signature into DER.
///
/// # Errors
///
/// Returns [`Error::MalformedSignature`] if `sig` is not exactly
/// `2 * width` bytes long.
///
/// # Examples
///
/// ```
/// use ecdsa_jwa::der::concat_to_der;
///
/// let der = concat_to_der(&[0; 64], 32).unwrap();
/// assert_eq!(der, [0x30, 0x06, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00]);
/// ```
pub fn concat_to_der(sig: &[u8], width: usize) -> Result<Vec<u8>, Error> {
    if sig.len() != 2 * width {
        return Err(Error::MalformedSignature("concatenated signature has wrong length"));
    }

    let (r, s) = sig.split_at(width);

    let mut body = Vec::with_capacity(2 * (width + 3));
    write_integer(&mut body, r);
    write_integer(&mut body, s);

    let mut der = Vec::with_capacity(body.len() + 3);
    der.push(SEQUENCE);
    write_length(&mut der, body.len());
    der.extend_from_slice(&body);
    Ok(der)
}

/// Convert a DER signature into the concatenated `r ‖ s` form with each
/// integer left-padded to `width` bytes.
///
/// # Errors
///
/// Returns [`Error::MalformedSignature`] if the input is not a SEQUENCE of
/// exactly two minimally encoded non-negative INTEGERs, or if either integer
/// needs more than `width` bytes.
pub fn der_to_concat(der: &[u8], width: usize) -> Result<Vec<u8>, Error> {
    let mut outer = Reader::new(der);
    let body = outer.tlv(SEQUENCE)?;
    if !outer.is_empty() {
        return Err(Error::MalformedSignature("trailing bytes after sequence"));
    }

    let mut inner = Reader::new(body);
    let r = inner.tlv(INTEGER)?;
    let s = inner.tlv(INTEGER)?;
    if !inner.is_empty() {
        return Err(Error::MalformedSignature(
            "sequence must hold exactly two integers",
        ));
    }

    let mut sig = vec![0u8; 2 * width];
    let (r_out, s_out) = sig.split_at_mut(width);
    read_integer(r, r_out)?;
    read_integer(s, s_out)?;
    Ok(sig)
}

fn write_integer(out: &mut Vec<u8>, value: &[u8]) {
    let start = value.iter().position(|&b| b != 0).unwrap_or(value.len());
    let magnitude = &value[start..];

    out.push(INTEGER);
    match magnitude.first() {
        None => {
            out.push(1);
            out.push(0);
        }
        Some(&first) if first >= 0x80 => {
            write_length(out, magnitude.len() + 1);
            out.push(0);
            out.extend_from_slice(magnitude);
        }
        Some(_) => {
            write_length(out, magnitude.len());
            out.extend_from_slice(magnitude);
        }
    }
}

fn write_length(out: &mut Vec<u8>, len: usize) {
    if let Ok(short @ 0..=0x7f) = u8::try_from(len) {
        out.push(short);
        return;
    }

    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    #[allow(clippy::cast_possible_truncation)] // at most size_of::<usize>()
    out.push(0x80 | (bytes.len() - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
}

/// Copy a DER INTEGER's contents into `out`, right-aligned.
fn read_integer(contents: &[u8], out: &mut [u8]) -> Result<(), Error> {
    let magnitude = match contents {
        [] => return Err(Error::MalformedSignature("empty integer")),
        [0x00] => &contents[1..],
        [0x00, next, ..] if *next >= 0x80 => &contents[1..],
        [0x00, ..] => {
            return Err(Error::MalformedSignature(
                "integer has redundant leading zero",
            ))
        }
        [first, ..] if *first >= 0x80 => {
            return Err(Error::MalformedSignature("integer is negative"))
        }
        _ => contents,
    };

    if magnitude.len() > out.len() {
        return Err(Error::MalformedSignature(
            "integer does not fit in coordinate width",
        ));
    }

    let offset = out.len() - magnitude.len();
    out[offset..].copy_from_slice(magnitude);
    Ok(())
}

struct Reader<'a> {
    bytes: &'a [u8],
}

impl<'a> Reader<'a> {
    const fn new(bytes: &'a [u8]) -> Self {
        Reader { bytes }
    }

    const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn byte(&mut self) -> Result<u8, Error> {
        let (&first, rest) = self
            .bytes
            .split_first()
            .ok_or(Error::MalformedSignature("truncated DER"))?;
        self.bytes = rest;
        Ok(first)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], Error> {
        if len > self.bytes.len() {
            return Err(Error::MalformedSignature("truncated DER"));
        }
        let (head, rest) = self.bytes.split_at(len);
        self.bytes = rest;
        Ok(head)
    }

    fn length(&mut self) -> Result<usize, Error> {
        let first = self.byte()?;
        if first < 0x80 {
            return Ok(first.into());
        }

        let count = usize::from(first & 0x7f);
        if count == 0 || count > 2 {
            return Err(Error::MalformedSignature("unsupported DER length form"));
        }

        let len = self
            .take(count)?
            .iter()
            .fold(0usize, |acc, &b| (acc << 8) | usize::from(b));

        if len < 0x80 || (count == 2 && len <= 0xff) {
            return Err(Error::MalformedSignature("non-minimal DER length"));
        }
        Ok(len)
    }

    fn tlv(&mut self, tag: u8) -> Result<&'a [u8], Error> {
        if self.byte()? != tag {
            return Err(Error::MalformedSignature("unexpected DER tag"));
        }
        let len = self.length()?;
        self.take(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use testresult::TestResult;

    #[test]
    fn test_all_zero_p256() -> TestResult {
        let der = concat_to_der(&[0; 64], 32)?;
        assert_eq!(der, [0x30, 0x06, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00]);
        assert_eq!(der_to_concat(&der, 32)?, vec![0; 64]);
        Ok(())
    }

    #[test]
    fn test_high_bit_gets_sign_byte() -> TestResult {
        let mut sig = vec![0xff; 32];
        sig.extend_from_slice(&[0x01; 32]);

        let der = concat_to_der(&sig, 32)?;
        assert_eq!(der[..5], [0x30, 0x45, 0x02, 0x21, 0x00]);
        assert_eq!(der[5..37], [0xff; 32]);
        assert_eq!(der[37..39], [0x02, 0x20]);
        assert_eq!(der.len(), 0x47);
        assert_eq!(der_to_concat(&der, 32)?, sig);
        Ok(())
    }

    #[test]
    fn test_leading_zeros_are_stripped() -> TestResult {
        let mut sig = vec![0; 64];
        sig[31] = 0x05;
        sig[62] = 0x7f;
        sig[63] = 0x01;

        let der = concat_to_der(&sig, 32)?;
        assert_eq!(
            der,
            [0x30, 0x07, 0x02, 0x01, 0x05, 0x02, 0x02, 0x7f, 0x01]
        );
        Ok(())
    }

    #[test]
    fn test_short_integer_is_left_padded() -> TestResult {
        let der = [0x30, 0x08, 0x02, 0x02, 0x12, 0x34, 0x02, 0x02, 0x00, 0x80];
        let sig = der_to_concat(&der, 32)?;

        let mut expected = vec![0; 64];
        expected[30] = 0x12;
        expected[31] = 0x34;
        expected[63] = 0x80;
        assert_eq!(sig, expected);
        Ok(())
    }

    #[test]
    fn test_p521_uses_long_form_sequence_length() -> TestResult {
        let sig = vec![0xff; 132];
        let der = concat_to_der(&sig, 66)?;

        // 2 * (tag + len + 0x00 + 66 bytes) = 138 = 0x8a
        assert_eq!(der[..3], [0x30, 0x81, 0x8a]);
        assert_eq!(der.len(), 3 + 138);
        assert_eq!(der_to_concat(&der, 66)?, sig);
        Ok(())
    }

    #[test]
    fn test_concat_wrong_length() {
        assert_matches!(concat_to_der(&[0; 63], 32), Err(Error::MalformedSignature(_)));
        assert_matches!(concat_to_der(&[0; 96], 32), Err(Error::MalformedSignature(_)));
    }

    #[test]
    fn test_integer_too_wide() {
        let der = concat_to_der(&[0x42; 96], 48).expect("valid input");
        assert_matches!(der_to_concat(&der, 32), Err(Error::MalformedSignature(_)));
    }

    #[test]
    fn test_rejects_malformed_structure() {
        let cases: &[&[u8]] = &[
            &[],
            &[0x30],
            &[0x31, 0x06, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00],
            &[0x30, 0x03, 0x02, 0x01, 0x00],
            &[0x30, 0x09, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00],
            &[0x30, 0x06, 0x02, 0x01, 0x00, 0x04, 0x01, 0x00],
            &[0x30, 0x06, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00, 0x00],
            &[0x30, 0x07, 0x02, 0x01, 0x00, 0x02, 0x02, 0x00],
            &[0x30, 0x80, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00, 0x00, 0x00],
        ];

        for der in cases {
            assert_matches!(
                der_to_concat(der, 32),
                Err(Error::MalformedSignature(_)),
                "{der:02x?}"
            );
        }
    }

    #[test]
    fn test_rejects_non_minimal_integers() {
        // Redundant zero before a byte without the high bit set.
        let redundant = [0x30, 0x07, 0x02, 0x02, 0x00, 0x05, 0x02, 0x01, 0x01];
        assert_matches!(
            der_to_concat(&redundant, 32),
            Err(Error::MalformedSignature("integer has redundant leading zero"))
        );

        // Two sign bytes.
        let doubled = [0x30, 0x08, 0x02, 0x03, 0x00, 0x00, 0x80, 0x02, 0x01, 0x01];
        assert_matches!(
            der_to_concat(&doubled, 32),
            Err(Error::MalformedSignature("integer has redundant leading zero"))
        );

        let negative = [0x30, 0x06, 0x02, 0x01, 0x80, 0x02, 0x01, 0x01];
        assert_matches!(
            der_to_concat(&negative, 32),
            Err(Error::MalformedSignature("integer is negative"))
        );

        let empty = [0x30, 0x05, 0x02, 0x00, 0x02, 0x01, 0x01];
        assert_matches!(
            der_to_concat(&empty, 32),
            Err(Error::MalformedSignature("empty integer"))
        );
    }

    #[test]
    fn test_rejects_non_minimal_length() {
        let der = [0x30, 0x81, 0x06, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00];
        assert_matches!(
            der_to_concat(&der, 32),
            Err(Error::MalformedSignature("non-minimal DER length"))
        );
    }

    fn coordinate(width: usize) -> impl Strategy<Value = Vec<u8>> {
        (0..=width, prop::collection::vec(any::<u8>(), width)).prop_map(|(zeros, mut bytes)| {
            bytes[..zeros].fill(0);
            bytes
        })
    }

    fn signature(width: usize) -> impl Strategy<Value = Vec<u8>> {
        (coordinate(width), coordinate(width)).prop_map(|(mut r, s)| {
            r.extend(s);
            r
        })
    }

    proptest! {
        #[test]
        fn prop_roundtrip_p256(sig in signature(32)) {
            let der = concat_to_der(&sig, 32)?;
            prop_assert_eq!(der_to_concat(&der, 32)?, sig);
        }

        #[test]
        fn prop_roundtrip_p384(sig in signature(48)) {
            let der = concat_to_der(&sig, 48)?;
            prop_assert_eq!(der_to_concat(&der, 48)?, sig);
        }

        #[test]
        fn prop_roundtrip_p521(sig in signature(66)) {
            let der = concat_to_der(&sig, 66)?;
            prop_assert_eq!(der_to_concat(&der, 66)?, sig);
        }

        #[test]
        fn prop_der_integers_are_minimal(sig in signature(32)) {
            let der = concat_to_der(&sig, 32)?;
            let mut outer = Reader::new(&der);
            let mut inner = Reader::new(outer.tlv(SEQUENCE)?);
            for _ in 0..2 {
                let int = inner.tlv(INTEGER)?;
                prop_assert!(!int.is_empty());
                prop_assert!(int[0] < 0x80);
                if int.len() > 1 && int[0] == 0 {
                    prop_assert!(int[1] >= 0x80);
                }
            }
        }
    }
}
