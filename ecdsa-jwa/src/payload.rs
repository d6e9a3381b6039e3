//! The uniform result shape of sign and verify.

/// Data and its concatenated `r ‖ s` signature.
///
/// Sign returns `valid: None`. Verify returns `valid: Some(true)`; a failed
/// verification is an [`Error::VerificationFailed`](crate::Error::VerificationFailed),
/// never `Some(false)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignaturePayload {
    /// The signed data.
    pub data: Vec<u8>,

    /// Fixed-width concatenated signature.
    pub mac: Vec<u8>,

    /// Set by verify.
    pub valid: Option<bool>,
}

impl SignaturePayload {
    pub(crate) fn signed(data: &[u8], mac: Vec<u8>) -> Self {
        SignaturePayload {
            data: data.to_vec(),
            mac,
            valid: None,
        }
    }

    pub(crate) fn verified(data: &[u8], mac: &[u8]) -> Self {
        SignaturePayload {
            data: data.to_vec(),
            mac: mac.to_vec(),
            valid: Some(true),
        }
    }

    /// Whether this payload came out of a successful verification.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid == Some(true)
    }
}
