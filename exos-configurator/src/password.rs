//! SHA-256 crypt for `configure account admin encrypted`.
//!
//! EXOS accepts pre-hashed account passwords in the glibc `$5$` format. This
//! is the standard SHA-crypt construction with the default 5000 rounds and a
//! six character lowercase salt, which is what the switch itself generates.

use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

const ROUNDS: usize = 5000;
const SALT_LEN: usize = 6;
const ITOA64: &[u8; 64] = b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Hash a password with a freshly generated salt.
pub fn hash_password(password: &SecretString) -> String {
    let mut rng = rand::thread_rng();
    let salt: String = (0..SALT_LEN)
        .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
        .collect();
    sha256_crypt(password.expose_secret().as_bytes(), &salt)
}

/// Hash `password` with an explicit salt (at most 16 bytes are used).
pub fn sha256_crypt(password: &[u8], salt: &str) -> String {
    let salt = &salt.as_bytes()[..salt.len().min(16)];
    let key_len = password.len();

    let alternate: [u8; 32] = Sha256::new()
        .chain_update(password)
        .chain_update(salt)
        .chain_update(password)
        .finalize()
        .into();

    let mut initial = Sha256::new();
    initial.update(password);
    initial.update(salt);
    let mut remaining = key_len;
    while remaining > 32 {
        initial.update(alternate);
        remaining -= 32;
    }
    initial.update(&alternate[..remaining]);

    let mut bits = key_len;
    while bits > 0 {
        if bits & 1 == 1 {
            initial.update(alternate);
        } else {
            initial.update(password);
        }
        bits >>= 1;
    }
    let mut digest: [u8; 32] = initial.finalize().into();

    let mut password_hasher = Sha256::new();
    for _ in 0..key_len {
        password_hasher.update(password);
    }
    let password_digest: [u8; 32] = password_hasher.finalize().into();
    let p_bytes = repeat_to_len(&password_digest, key_len);

    let mut salt_hasher = Sha256::new();
    for _ in 0..16 + usize::from(digest[0]) {
        salt_hasher.update(salt);
    }
    let salt_digest: [u8; 32] = salt_hasher.finalize().into();
    let s_bytes = repeat_to_len(&salt_digest, salt.len());

    for round in 0..ROUNDS {
        let mut hasher = Sha256::new();
        if round % 2 == 1 {
            hasher.update(&p_bytes);
        } else {
            hasher.update(digest);
        }
        if round % 3 != 0 {
            hasher.update(&s_bytes);
        }
        if round % 7 != 0 {
            hasher.update(&p_bytes);
        }
        if round % 2 == 1 {
            hasher.update(digest);
        } else {
            hasher.update(&p_bytes);
        }
        digest = hasher.finalize().into();
    }

    let mut encoded = String::with_capacity(43);
    for (a, b, c) in [
        (0, 10, 20),
        (21, 1, 11),
        (12, 22, 2),
        (3, 13, 23),
        (24, 4, 14),
        (15, 25, 5),
        (6, 16, 26),
        (27, 7, 17),
        (18, 28, 8),
        (9, 19, 29),
    ] {
        push_b64(&mut encoded, digest[a], digest[b], digest[c], 4);
    }
    push_b64(&mut encoded, 0, digest[31], digest[30], 3);

    format!("$5${}${}", String::from_utf8_lossy(salt), encoded)
}

fn repeat_to_len(block: &[u8; 32], len: usize) -> Vec<u8> {
    block.iter().copied().cycle().take(len).collect()
}

fn push_b64(out: &mut String, high: u8, mid: u8, low: u8, chars: usize) {
    let mut word = (u32::from(high) << 16) | (u32::from(mid) << 8) | u32::from(low);
    for _ in 0..chars {
        out.push(char::from(ITOA64[(word & 0x3f) as usize]));
        word >>= 6;
    }
}
