//! HMAC key material for signing tokens.

use std::fmt;

use zeroize::Zeroize;

use crate::domain::tokens::errors::SigningTokenError;

#[derive(Clone)]
pub struct SigningTokenSecret {
    bytes: Vec<u8>,
}

impl SigningTokenSecret {
    /// Wrap raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SigningTokenError::EmptySecret`] for an empty key.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, SigningTokenError> {
        let bytes = bytes.into();

        if bytes.is_empty() {
            return Err(SigningTokenError::EmptySecret);
        }

        Ok(Self { bytes })
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for SigningTokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningTokenSecret(**redacted**)")?;
        Ok(())
    }
}

impl Drop for SigningTokenSecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}
