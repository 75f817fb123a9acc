//! Synthetic user identifiers.

use std::collections::HashSet;

use rand::Rng;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const SUFFIX_LEN: usize = 10;

/// Mints `test-user-XXXXXXXXXX@example.com` ids, never the same one twice.
#[derive(Debug, Default)]
pub struct UserIdMinter {
    issued: HashSet<String>,
}

impl UserIdMinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint<R: Rng>(&mut self, rng: &mut R) -> String {
        loop {
            let id = format!("test-user-{}@example.com", random_suffix(rng));
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }
}

fn random_suffix<R: Rng>(rng: &mut R) -> String {
    (0..SUFFIX_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}
