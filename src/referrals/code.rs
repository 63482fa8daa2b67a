use rand::Rng;
use time::OffsetDateTime;

pub const REFERRAL_CODE_LEN: usize = 8;

const CODE_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Random mixed-alphanumeric code. Uniqueness is NOT guaranteed here; the
/// caller retries against the store until the code is unused.
pub fn generate_code(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Temporary password issued to brand-new accounts; the user is forced to
/// change it on first login.
pub fn temp_password() -> String {
    generate_code(10)
}

/// A code is invalid once past its expiry instant. At exactly `expires_at`
/// it is still valid.
pub fn is_expired(expires_at: OffsetDateTime, now: OffsetDateTime) -> bool {
    now > expires_at
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use time::Duration;

    #[test]
    fn codes_have_the_requested_length_and_alphabet() {
        let code = generate_code(REFERRAL_CODE_LEN);
        assert_eq!(code.len(), 8);
        assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }

    #[test]
    fn codes_are_distinct_in_bulk() {
        let codes: HashSet<String> =
            (0..1000).map(|_| generate_code(REFERRAL_CODE_LEN)).collect();
        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn temp_passwords_are_ten_chars() {
        assert_eq!(temp_password().len(), 10);
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let now = OffsetDateTime::now_utc();
        assert!(!is_expired(now, now));
        assert!(!is_expired(now + Duration::seconds(1), now));
        assert!(is_expired(now - Duration::seconds(1), now));
    }
}
