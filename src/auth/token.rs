use rand::{rngs::OsRng, RngCore};

const TOKEN_BYTES: usize = 20;

/// Opaque bearer key: 20 random bytes as 40 lowercase hex chars.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Pulls the key out of `Token <key>` or `Bearer <key>`.
pub fn parse_authorization(header: &str) -> Option<&str> {
    let mut parts = header.split_whitespace();
    let scheme = parts.next()?;
    let key = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    if scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer") {
        Some(key)
    } else {
        None
    }
}
