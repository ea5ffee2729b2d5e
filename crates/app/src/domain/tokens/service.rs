//! Signing token issuance and verification.
//!
//! Tokens use the compact JWS layout: `base64url(header).base64url(claims).base64url(mac)`
//! without padding, where `mac` is HMAC-SHA256 over the first two segments joined by `.`.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::domain::tokens::{errors::SigningTokenError, secret::SigningTokenSecret};

type HmacSha256 = Hmac<Sha256>;

/// Lifetime of an issued signing token.
pub const SIGNING_TOKEN_TTL: SignedDuration = SignedDuration::from_mins(20);

const TOKEN_ALGORITHM: &str = "HS256";
const TOKEN_TYPE: &str = "JWT";

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    code: String,
    exp: i64,
}

/// A freshly minted token and the instant it stops being accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSigningToken {
    pub token: String,
    pub expires_at: Timestamp,
}

/// What a verified token authorises: signing on behalf of one OTP code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningGrant {
    pub code: String,
    pub expires_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct SigningTokens {
    secret: SigningTokenSecret,
    ttl: SignedDuration,
}

impl SigningTokens {
    #[must_use]
    pub fn new(secret: SigningTokenSecret) -> Self {
        Self {
            secret,
            ttl: SIGNING_TOKEN_TTL,
        }
    }

    /// Mint a token for `code` that expires `ttl` after `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the header or claims cannot be serialised.
    pub fn issue(&self, code: &str, now: Timestamp) -> Result<IssuedSigningToken, SigningTokenError> {
        let expires_at = now + self.ttl;

        let header = serde_json::to_vec(&TokenHeader {
            alg: TOKEN_ALGORITHM.to_string(),
            typ: TOKEN_TYPE.to_string(),
        })
        .map_err(SigningTokenError::Encode)?;

        let claims = serde_json::to_vec(&TokenClaims {
            code: code.to_string(),
            exp: expires_at.as_second(),
        })
        .map_err(SigningTokenError::Encode)?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(claims)
        );

        let mut mac = self.mac()?;

        mac.update(signing_input.as_bytes());

        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(IssuedSigningToken {
            token: format!("{signing_input}.{signature}"),
            expires_at,
        })
    }

    /// Check integrity and expiry of `token`.
    ///
    /// # Errors
    ///
    /// Fails closed on anything other than a well-formed, correctly signed, unexpired token.
    pub fn verify(&self, token: &str, now: Timestamp) -> Result<SigningGrant, SigningTokenError> {
        let mut segments = token.split('.');

        let (Some(header), Some(claims), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(SigningTokenError::InvalidFormat);
        };

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_ignored| SigningTokenError::InvalidFormat)?;

        let mut mac = self.mac()?;

        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(claims.as_bytes());

        mac.verify_slice(&signature)
            .map_err(|_ignored| SigningTokenError::InvalidSignature)?;

        let header: TokenHeader = decode_segment(header)?;

        if header.alg != TOKEN_ALGORITHM {
            return Err(SigningTokenError::InvalidFormat);
        }

        let claims: TokenClaims = decode_segment(claims)?;

        if claims.code.is_empty() {
            return Err(SigningTokenError::InvalidClaims);
        }

        if now.as_second() >= claims.exp {
            return Err(SigningTokenError::Expired);
        }

        let expires_at =
            Timestamp::from_second(claims.exp).map_err(|_ignored| SigningTokenError::InvalidClaims)?;

        Ok(SigningGrant {
            code: claims.code,
            expires_at,
        })
    }

    fn mac(&self) -> Result<HmacSha256, SigningTokenError> {
        <HmacSha256 as Mac>::new_from_slice(self.secret.as_bytes())
            .map_err(|_ignored| SigningTokenError::InvalidKey)
    }
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str) -> Result<T, SigningTokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_ignored| SigningTokenError::InvalidFormat)?;

    serde_json::from_slice(&bytes).map_err(|_ignored| SigningTokenError::InvalidClaims)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn tokens(secret: &str) -> SigningTokens {
        SigningTokens::new(SigningTokenSecret::new(secret).expect("test secret is not empty"))
    }

    fn start() -> Timestamp {
        Timestamp::from_second(1_700_000_000).unwrap_or(Timestamp::UNIX_EPOCH)
    }

    #[test]
    fn issued_token_verifies_and_carries_code() -> TestResult {
        let tokens = tokens("secret");
        let issued = tokens.issue("123456", start())?;

        let grant = tokens.verify(&issued.token, start())?;

        assert_eq!(grant.code, "123456");
        assert_eq!(grant.expires_at, start() + SIGNING_TOKEN_TTL);
        assert_eq!(issued.expires_at, grant.expires_at);

        Ok(())
    }

    #[test]
    fn token_has_expected_wire_layout() -> TestResult {
        let issued = tokens("secret").issue("123456", start())?;
        let segments: Vec<&str> = issued.token.split('.').collect();

        let [header, claims, _signature] = segments.as_slice() else {
            return Err("token should have three segments".into());
        };

        assert_eq!(
            URL_SAFE_NO_PAD.decode(header)?,
            br#"{"alg":"HS256","typ":"JWT"}"#.to_vec()
        );
        assert_eq!(
            String::from_utf8(URL_SAFE_NO_PAD.decode(claims)?)?,
            format!(r#"{{"code":"123456","exp":{}}}"#, start().as_second() + 1_200)
        );
        assert!(!issued.token.contains('='), "segments must be unpadded");

        Ok(())
    }

    #[test]
    fn token_expires_after_twenty_minutes() -> TestResult {
        let tokens = tokens("secret");
        let issued = tokens.issue("123456", start())?;

        let before = start() + SIGNING_TOKEN_TTL - SignedDuration::from_secs(1);

        assert!(tokens.verify(&issued.token, before).is_ok(), "valid before expiry");
        assert!(
            matches!(
                tokens.verify(&issued.token, start() + SIGNING_TOKEN_TTL),
                Err(SigningTokenError::Expired)
            ),
            "invalid at expiry"
        );
        assert!(
            tokens
                .verify(&issued.token, start() + SignedDuration::from_mins(21))
                .is_err(),
            "invalid after expiry"
        );

        Ok(())
    }

    #[test]
    fn tampered_claims_are_rejected() -> TestResult {
        let tokens = tokens("secret");
        let issued = tokens.issue("123456", start())?;

        let mut segments: Vec<String> = issued.token.split('.').map(str::to_string).collect();
        let forged = URL_SAFE_NO_PAD.encode(br#"{"code":"654321","exp":9999999999}"#);

        if let Some(claims) = segments.get_mut(1) {
            *claims = forged;
        }

        let result = tokens.verify(&segments.join("."), start());

        assert!(
            matches!(result, Err(SigningTokenError::InvalidSignature)),
            "expected InvalidSignature, got {result:?}"
        );

        Ok(())
    }

    /// Every single-bit variant of the decoded `index`th segment, re-encoded into a token.
    fn bit_flips(token: &str, index: usize) -> TestResult<Vec<String>> {
        let segments: Vec<&str> = token.split('.').collect();
        let segment = segments.get(index).ok_or("token should have three segments")?;
        let bytes = URL_SAFE_NO_PAD.decode(segment)?;

        let mut flipped = Vec::with_capacity(bytes.len() * 8);

        for position in 0..bytes.len() * 8 {
            let mut mutated = bytes.clone();

            if let Some(byte) = mutated.get_mut(position / 8) {
                *byte ^= 1 << (position % 8);
            }

            let mut forged: Vec<String> = segments.iter().map(ToString::to_string).collect();

            if let Some(target) = forged.get_mut(index) {
                *target = URL_SAFE_NO_PAD.encode(&mutated);
            }

            flipped.push(forged.join("."));
        }

        Ok(flipped)
    }

    #[test]
    fn any_flipped_signature_bit_is_rejected() -> TestResult {
        let tokens = tokens("secret");
        let issued = tokens.issue("123456", start())?;
        let forgeries = bit_flips(&issued.token, 2)?;

        assert_eq!(forgeries.len(), 256, "hmac-sha256 signature is 32 bytes");

        for forged in forgeries {
            let result = tokens.verify(&forged, start());

            assert!(
                matches!(result, Err(SigningTokenError::InvalidSignature)),
                "expected InvalidSignature for {forged}, got {result:?}"
            );
        }

        Ok(())
    }

    #[test]
    fn any_flipped_claims_bit_is_rejected() -> TestResult {
        let tokens = tokens("secret");
        let issued = tokens.issue("123456", start())?;

        for forged in bit_flips(&issued.token, 1)? {
            let result = tokens.verify(&forged, start());

            assert!(
                matches!(result, Err(SigningTokenError::InvalidSignature)),
                "expected InvalidSignature for {forged}, got {result:?}"
            );
        }

        Ok(())
    }

    #[test]
    fn token_from_other_secret_is_rejected() -> TestResult {
        let issued = tokens("one").issue("123456", start())?;

        assert!(tokens("two").verify(&issued.token, start()).is_err());

        Ok(())
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let tokens = tokens("secret");

        for token in ["", "abc", "a.b", "a.b.c.d", "...", "a.b.!!!"] {
            assert!(
                tokens.verify(token, start()).is_err(),
                "token {token:?} should be rejected"
            );
        }
    }
}
