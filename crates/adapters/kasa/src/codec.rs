//! TP-Link smart home protocol obfuscation.
//!
//! Payloads are JSON, XOR-ciphered with an autokey stream seeded at 171:
//! each plaintext byte is XORed with the previous *cipher* byte. TCP frames
//! prefix the ciphertext with its length as a big-endian `u32`.

const INITIAL_KEY: u8 = 171;

/// Cipher a plaintext payload for the wire.
#[must_use]
pub fn encrypt(plain: &[u8]) -> Vec<u8> {
    let mut key = INITIAL_KEY;
    plain
        .iter()
        .map(|byte| {
            key ^= byte;
            key
        })
        .collect()
}

/// Recover the plaintext from a ciphered payload.
#[must_use]
pub fn decrypt(cipher: &[u8]) -> Vec<u8> {
    let mut key = INITIAL_KEY;
    cipher
        .iter()
        .map(|byte| {
            let plain = key ^ byte;
            key = *byte;
            plain
        })
        .collect()
}
