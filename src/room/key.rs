use rand::Rng;
use thiserror::Error;

/// Length of generated room keys
pub const ROOM_KEY_LENGTH: usize = 6;

/// Upper bound on accepted room keys
pub const MAX_ROOM_KEY_LENGTH: usize = 32;

const ROOM_KEY_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomKeyError {
    #[error("room key is empty")]
    Empty,

    #[error("room key is longer than {} characters", MAX_ROOM_KEY_LENGTH)]
    TooLong,

    #[error("room key contains non-alphanumeric characters: {0}")]
    InvalidCharacters(String),
}

/// Generates a short shareable key drawn from base-36, upper-cased
pub fn generate_room_key() -> String {
    let mut rng = rand::rng();
    (0..ROOM_KEY_LENGTH)
        .map(|_| {
            let index = rng.random_range(0..ROOM_KEY_ALPHABET.len());
            char::from(ROOM_KEY_ALPHABET[index])
        })
        .collect()
}

/// Trims and upper-cases a client supplied key so lookups are case-insensitive
pub fn normalize_room_key(raw: &str) -> Result<String, RoomKeyError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RoomKeyError::Empty);
    }
    if trimmed.chars().count() > MAX_ROOM_KEY_LENGTH {
        return Err(RoomKeyError::TooLong);
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(RoomKeyError::InvalidCharacters(trimmed.to_string()));
    }
    Ok(trimmed.to_ascii_uppercase())
}
