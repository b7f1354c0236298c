//! Chrome cookie value decryption (AES-128-CBC, PBKDF2-SHA1 derived key).

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};
use regex::Regex;
use sha1::Sha1;
use std::sync::LazyLock;

use crate::core::cookies::CookieError;

type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

pub const SALT: &[u8] = b"saltysalt";
pub const KEY_LEN: usize = 16;
/// Chrome uses a constant IV of sixteen spaces.
pub const IV: [u8; 16] = [0x20; 16];
/// Encrypted values start with a version tag such as `v10` or `v11`.
pub const VERSION_PREFIX_LEN: usize = 3;

static SESSION_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"sk-ant-sid\S+").expect("session key pattern compiles"));

pub fn derive_key(password: &str, iterations: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha1>(password.as_bytes(), SALT, iterations, &mut key);
    key
}

/// The version tag of an encrypted value, if it has one.
pub fn version_prefix(encrypted: &[u8]) -> Option<&[u8]> {
    encrypted
        .get(..VERSION_PREFIX_LEN)
        .filter(|p| p[0] == b'v' && p[1..].iter().all(u8::is_ascii_digit))
}

/// Strip the version tag and decrypt. The first block may come out garbled
/// for newer cookie databases, so callers should not trust the full output.
pub fn decrypt_value(key: &[u8; KEY_LEN], encrypted: &[u8]) -> Result<Vec<u8>, CookieError> {
    let ciphertext = encrypted
        .get(VERSION_PREFIX_LEN..)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| CookieError::Decrypt("encrypted value is too short".to_string()))?;

    let cipher = Aes128CbcDec::new_from_slices(key, &IV)
        .map_err(|e| CookieError::Decrypt(e.to_string()))?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CookieError::Decrypt("bad padding (wrong key?)".to_string()))
}

/// Keep only printable ASCII.
pub fn strip_non_printable(raw: &[u8]) -> String {
    raw.iter()
        .filter(|b| (0x20..=0x7E).contains(*b))
        .map(|b| *b as char)
        .collect()
}

/// Pull the `sk-ant-sid...` token out of decrypted bytes, falling back to the
/// printable characters when no token is found.
pub fn recover_session_key(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    SESSION_KEY_RE
        .find(&text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| strip_non_printable(raw))
}
