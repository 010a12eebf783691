use rand::Rng;

use crate::RoomCode;

/// `{A-Z, 0-9}` minus the characters that are easy to confuse with one
/// another on a shared screen: `0, O, I, 1, L`.
pub const ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

pub const CODE_LEN: usize = 4;

/// Draws a fresh 4-character code from [`ALPHABET`] using `rng`.
///
/// Does not check for collisions against any registry; callers retry on a
/// failed insert.
pub fn generate(rng: &mut impl Rng) -> RoomCode {
    let mut s = String::with_capacity(CODE_LEN);
    for _ in 0..CODE_LEN {
        let idx = rng.random_range(0..ALPHABET.len());
        s.push(ALPHABET[idx] as char);
    }
    RoomCode::from_generated(s)
}
