//! Salted choice payload sent with every bet.
//!
//! The payload is a fresh 32-byte salt followed by the ABI encoding of the
//! boolean choice. It travels in the clear inside the transaction: the salt
//! makes two payloads for the same choice differ, it does not hide the choice
//! from anyone reading the chain.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::errors::SessionError;

pub const SALT_LEN: usize = 32;
const WORD_LEN: usize = 32;
pub const PAYLOAD_LEN: usize = SALT_LEN + WORD_LEN;

fn abi_encode_bool(value: bool) -> [u8; WORD_LEN] {
    let mut word = [0u8; WORD_LEN];
    word[WORD_LEN - 1] = value as u8;
    word
}

/// Builds `salt || abi(bool)` with a new salt on every call.
pub fn encode_choice(choice: bool) -> Vec<u8> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let mut payload = Vec::with_capacity(PAYLOAD_LEN);
    payload.extend_from_slice(&salt);
    payload.extend_from_slice(&abi_encode_bool(choice));
    payload
}

pub fn decode_choice(payload: &[u8]) -> Result<bool, SessionError> {
    if payload.len() != PAYLOAD_LEN {
        return Err(SessionError::InvalidPayload);
    }

    let word = &payload[SALT_LEN..];
    if word[..WORD_LEN - 1].iter().any(|b| *b != 0) {
        return Err(SessionError::InvalidPayload);
    }

    match word[WORD_LEN - 1] {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(SessionError::InvalidPayload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_choice_gets_fresh_salt() {
        let first = encode_choice(true);
        let second = encode_choice(true);

        assert_eq!(first.len(), PAYLOAD_LEN);
        assert_ne!(first, second);
        assert_eq!(decode_choice(&first), Ok(true));
        assert_eq!(decode_choice(&second), Ok(true));
    }

    #[test]
    fn test_false_choice_decodes() {
        let payload = encode_choice(false);
        assert_eq!(&payload[SALT_LEN..], &[0u8; WORD_LEN][..]);
        assert_eq!(decode_choice(&payload), Ok(false));
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert_eq!(decode_choice(&[0u8; 32]), Err(SessionError::InvalidPayload));

        let mut dirty = encode_choice(true);
        dirty[SALT_LEN] = 1;
        assert_eq!(decode_choice(&dirty), Err(SessionError::InvalidPayload));

        let mut not_bool = encode_choice(true);
        not_bool[PAYLOAD_LEN - 1] = 2;
        assert_eq!(decode_choice(&not_bool), Err(SessionError::InvalidPayload));
    }
}
