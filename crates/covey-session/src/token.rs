//! Random identifiers handed out to clients.
//!
//! All three generators draw from the thread-local RNG. None of them check
//! for collisions; callers that need uniqueness within a collection (the
//! session registry, the town registry) retry on a clash.

use rand::distr::Alphanumeric;
use rand::Rng;

/// Characters used for town ids. Uppercase hex reads well when spoken.
const TOWN_ID_ALPHABET: &[u8] = b"1234567890ABCDEF";

const TOWN_ID_LEN: usize = 8;

const UPDATE_PASSWORD_LEN: usize = 24;

/// Generates a random 32-character hex string (128 bits of entropy).
///
/// Used for session tokens.
pub fn generate_session_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Generates an 8-character town id over `0-9A-F`.
pub fn generate_town_id() -> String {
    let mut rng = rand::rng();
    (0..TOWN_ID_LEN)
        .map(|_| {
            let idx = rng.random_range(0..TOWN_ID_ALPHABET.len());
            char::from(TOWN_ID_ALPHABET[idx])
        })
        .collect()
}

/// Generates the 24-character alphanumeric password that guards a town's
/// settings.
pub fn generate_update_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(UPDATE_PASSWORD_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_session_token_is_32_lowercase_hex() {
        let token = generate_session_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_generate_town_id_uses_uppercase_hex_alphabet() {
        let id = generate_town_id();
        assert_eq!(id.len(), 8);
        assert!(id.bytes().all(|b| TOWN_ID_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_generate_update_password_is_alphanumeric() {
        let password = generate_update_password();
        assert_eq!(password.len(), 24);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_session_token_differs_between_calls() {
        assert_ne!(generate_session_token(), generate_session_token());
    }
}
