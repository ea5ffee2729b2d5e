//! OTP code generation.

use rand::{Rng, rngs::OsRng};

/// Number of decimal digits in an OTP code.
pub const OTP_CODE_LENGTH: usize = 6;

const OTP_CODE_SPACE: u32 = 1_000_000;

/// Draw a fresh zero-padded six digit code from the operating system RNG.
#[must_use]
pub fn generate_otp_code() -> String {
    format!("{:06}", OsRng.gen_range(0..OTP_CODE_SPACE))
}

/// Whether `code` has the shape of an issued OTP.
#[must_use]
pub fn is_well_formed(code: &str) -> bool {
    code.len() == OTP_CODE_LENGTH && code.bytes().all(|byte| byte.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..256 {
            let code = generate_otp_code();

            assert!(is_well_formed(&code), "unexpected code shape: {code}");
        }
    }

    #[test]
    fn well_formed_rejects_other_shapes() {
        assert!(!is_well_formed("12345"), "too short");
        assert!(!is_well_formed("1234567"), "too long");
        assert!(!is_well_formed("12a456"), "non-digit");
        assert!(is_well_formed("000042"), "leading zeros are valid");
    }
}
