use rand::RngCore;
use time::{Duration, OffsetDateTime};

const TOKEN_BYTES: usize = 32;

/// 32 random bytes, hex encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn expires_at(now: OffsetDateTime, ttl: Duration) -> OffsetDateTime {
    now + ttl
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn tokens_are_64_hex_chars_and_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn expiry_adds_the_ttl() {
        let now = datetime!(2024-01-10 09:00 UTC);
        assert_eq!(
            expires_at(now, Duration::hours(24)),
            datetime!(2024-01-11 09:00 UTC)
        );
    }
}
