//! c32check address encoding for Stacks principals.

use sha2::{Digest, Sha256};

const C32_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Crockford-style base32 encoding used by Stacks, preserving leading zero bytes.
pub fn c32_encode(input: &[u8]) -> String {
    let mut out: Vec<u8> = Vec::with_capacity(input.len() * 8 / 5 + 1);
    let mut carry: u16 = 0;
    let mut carry_bits: u32 = 0;

    for &byte in input.iter().rev() {
        let low_bits_to_take = 5 - carry_bits;
        let low_bits = u16::from(byte) & ((1 << low_bits_to_take) - 1);
        out.push(C32_ALPHABET[((low_bits << carry_bits) + carry) as usize]);

        carry_bits = 8 + carry_bits - 5;
        carry = u16::from(byte) >> (8 - carry_bits);

        if carry_bits >= 5 {
            out.push(C32_ALPHABET[(carry & 0x1f) as usize]);
            carry_bits -= 5;
            carry >>= 5;
        }
    }

    if carry_bits > 0 {
        out.push(C32_ALPHABET[carry as usize]);
    }

    while out.last() == Some(&C32_ALPHABET[0]) {
        out.pop();
    }
    for _ in input.iter().take_while(|b| **b == 0) {
        out.push(C32_ALPHABET[0]);
    }

    out.reverse();
    out.into_iter().map(char::from).collect()
}

/// Render `version` + `hash160` as a Stacks address (`SP...`, `ST...`).
pub fn c32_address(version: u8, hash160: &[u8; 20]) -> String {
    let mut preimage = Vec::with_capacity(21);
    preimage.push(version);
    preimage.extend_from_slice(hash160);
    let checksum = Sha256::digest(Sha256::digest(&preimage));

    let mut payload = Vec::with_capacity(24);
    payload.extend_from_slice(hash160);
    payload.extend_from_slice(&checksum[..4]);

    let version_char = char::from(C32_ALPHABET[usize::from(version & 0x1f)]);
    format!("S{}{}", version_char, c32_encode(&payload))
}
