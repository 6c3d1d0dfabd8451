//! Time-based one-time password verification.
//!
//! Implements RFC 6238 TOTP over HMAC-SHA1 with 30-second steps and a
//! +/-1 step acceptance window, plus single-use backup codes stored as
//! SHA-256 hex digests. All code comparisons are constant-time.

use base32::Alphabet;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

type HmacSha1 = Hmac<Sha1>;

/// TOTP time-step length in seconds.
pub const TIME_STEP_SECONDS: i64 = 30;
/// Accepted drift in time steps on either side of "now".
const VERIFICATION_WINDOW: i64 = 1;
const CODE_DIGITS: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TwoFactorError {
    /// Stored secret is not valid base32.
    InvalidSecret,
    /// HMAC key construction rejected the decoded secret.
    InvalidKey,
}

impl std::fmt::Display for TwoFactorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TwoFactorError::InvalidSecret => write!(f, "stored secret is not valid base32"),
            TwoFactorError::InvalidKey => write!(f, "secret rejected as HMAC key"),
        }
    }
}

impl std::error::Error for TwoFactorError {}

/// Stateless TOTP and backup-code verification.
#[derive(Debug, Clone)]
pub struct TotpService;

impl TotpService {
    /// Compute the 6-digit code for one specific time-step counter.
    pub fn code_for_step(secret: &str, step: i64) -> Result<String, TwoFactorError> {
        let key = base32::decode(Alphabet::Rfc4648 { padding: false }, secret)
            .ok_or(TwoFactorError::InvalidSecret)?;

        let mut mac =
            HmacSha1::new_from_slice(&key).map_err(|_| TwoFactorError::InvalidKey)?;
        mac.update(&(step as u64).to_be_bytes());
        let hash = mac.finalize().into_bytes();

        // RFC 4226 dynamic truncation.
        let offset = (hash[hash.len() - 1] & 0x0f) as usize;
        let binary = ((hash[offset] as u32 & 0x7f) << 24)
            | ((hash[offset + 1] as u32) << 16)
            | ((hash[offset + 2] as u32) << 8)
            | (hash[offset + 3] as u32);

        let code = binary % 10u32.pow(CODE_DIGITS);
        Ok(format!("{:01$}", code, CODE_DIGITS as usize))
    }

    /// Verify a candidate code against the secret at `now_unix`, accepting
    /// the current step and one step of drift in either direction.
    pub fn verify_totp(
        secret: &str,
        candidate: &str,
        now_unix: i64,
    ) -> Result<bool, TwoFactorError> {
        let current_step = now_unix / TIME_STEP_SECONDS;

        for drift in -VERIFICATION_WINDOW..=VERIFICATION_WINDOW {
            let step = current_step + drift;
            if step < 0 {
                continue;
            }
            let expected = Self::code_for_step(secret, step)?;
            if constant_time_eq(expected.as_bytes(), candidate.as_bytes()) {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// SHA-256 hex digest used for backup-code storage.
    pub fn hash_backup_code(code: &str) -> String {
        hex::encode(Sha256::digest(code.as_bytes()))
    }

    /// Find the stored hash matching a presented backup code.
    ///
    /// Returns the index so the caller can remove the entry; backup codes
    /// are single-use.
    pub fn match_backup_code(stored_hashes: &[String], candidate: &str) -> Option<usize> {
        let candidate_hash = Self::hash_backup_code(candidate);
        stored_hashes
            .iter()
            .position(|stored| constant_time_eq(stored.as_bytes(), candidate_hash.as_bytes()))
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Base32 of the ASCII secret "12345678901234567890".
    const RFC6238_SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

    #[test]
    fn test_known_rfc6238_vector() {
        // Unix time 59 falls in step 1; the published SHA-1 code there is
        // 94287082, of which the 6-digit truncation is 287082.
        let code = TotpService::code_for_step(RFC6238_SECRET, 59 / TIME_STEP_SECONDS).unwrap();
        assert_eq!(code, "287082");
    }

    #[test]
    fn test_window_accepts_one_step_of_drift() {
        let now = 1_700_000_000;
        let step = now / TIME_STEP_SECONDS;

        for drift in [-1, 0, 1] {
            let code = TotpService::code_for_step(RFC6238_SECRET, step + drift).unwrap();
            assert!(
                TotpService::verify_totp(RFC6238_SECRET, &code, now).unwrap(),
                "code at drift {} should verify",
                drift
            );
        }
        for drift in [-2, 2] {
            let code = TotpService::code_for_step(RFC6238_SECRET, step + drift).unwrap();
            assert!(
                !TotpService::verify_totp(RFC6238_SECRET, &code, now).unwrap(),
                "code at drift {} should be rejected",
                drift
            );
        }
    }

    #[test]
    fn test_wrong_length_code_is_rejected() {
        let now = 1_700_000_000;
        assert!(!TotpService::verify_totp(RFC6238_SECRET, "12345", now).unwrap());
        assert!(!TotpService::verify_totp(RFC6238_SECRET, "", now).unwrap());
    }

    #[test]
    fn test_invalid_secret_is_an_error() {
        let result = TotpService::verify_totp("not base32!!", "123456", 1_700_000_000);
        assert!(matches!(result, Err(TwoFactorError::InvalidSecret)));
    }

    #[test]
    fn test_backup_code_matches_by_hash() {
        let hashes = vec![
            TotpService::hash_backup_code("AAAA-1111"),
            TotpService::hash_backup_code("BBBB-2222"),
        ];

        assert_eq!(TotpService::match_backup_code(&hashes, "BBBB-2222"), Some(1));
        assert_eq!(TotpService::match_backup_code(&hashes, "CCCC-3333"), None);
    }

    #[test]
    fn test_consumed_backup_code_no_longer_matches() {
        let mut hashes = vec![
            TotpService::hash_backup_code("AAAA-1111"),
            TotpService::hash_backup_code("BBBB-2222"),
        ];

        let index = TotpService::match_backup_code(&hashes, "AAAA-1111").unwrap();
        hashes.remove(index);
        assert_eq!(TotpService::match_backup_code(&hashes, "AAAA-1111"), None);
    }
}
