//! Content digests.
//!
//! - MD5 hex for anti-cache query strings (`lib.js?<md5>`)
//! - SHA-2 subresource integrity tokens (`sha384-<base64>`)

use crate::error::{OptimizeError, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fs;
use std::path::Path;

/// MD5 of `bytes` as 32 lowercase hex chars.
pub fn md5_hex(bytes: &[u8]) -> String {
    hex::encode(md5::compute(bytes).0)
}

pub fn file_md5(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| OptimizeError::Read(path.to_path_buf(), e))?;
    Ok(md5_hex(&bytes))
}

// ============================================================================
// Subresource Integrity
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SriAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl SriAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sha256" => Some(Self::Sha256),
            "sha384" => Some(Self::Sha384),
            "sha512" => Some(Self::Sha512),
            _ => None,
        }
    }

    fn digest(self, bytes: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => Sha256::digest(bytes).to_vec(),
            Self::Sha384 => Sha384::digest(bytes).to_vec(),
            Self::Sha512 => Sha512::digest(bytes).to_vec(),
        }
    }
}

/// Build an `algorithm-base64digest` token.
pub fn sri_token(bytes: &[u8], algorithm: SriAlgorithm) -> String {
    format!("{}-{}", algorithm.name(), STANDARD.encode(algorithm.digest(bytes)))
}

pub fn file_sri(path: &Path, algorithm: SriAlgorithm) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| OptimizeError::Read(path.to_path_buf(), e))?;
    Ok(sri_token(&bytes, algorithm))
}

/// Parsed entries of an `integrity` attribute value.
///
/// The attribute may hold several whitespace separated tokens, each with an
/// optional `?options` suffix. Tokens with unknown algorithms are skipped.
fn parse_sri(value: &str) -> Result<Vec<(SriAlgorithm, &str)>> {
    let tokens: Vec<_> = value
        .split_whitespace()
        .filter_map(|token| {
            let token = token.split('?').next().unwrap_or(token);
            let (alg, hash) = token.split_once('-')?;
            Some((SriAlgorithm::parse(alg)?, hash))
        })
        .collect();

    if tokens.is_empty() {
        return Err(OptimizeError::InvalidSri(value.to_string()));
    }
    Ok(tokens)
}

/// Outcome of checking bytes against a declared integrity value.
#[derive(Debug, PartialEq, Eq)]
pub enum SriCheck {
    Valid,
    /// Carries the token computed with the strongest declared algorithm.
    Mismatch(String),
}

/// Validate `bytes` against a declared integrity value.
///
/// Like browsers, only tokens of the strongest declared algorithm count.
pub fn check_sri(bytes: &[u8], declared: &str) -> Result<SriCheck> {
    let tokens = parse_sri(declared)?;
    let strongest = tokens.iter().map(|(alg, _)| *alg).max().unwrap_or(SriAlgorithm::Sha384);
    let actual = sri_token(bytes, strongest);

    let matched = tokens
        .iter()
        .filter(|(alg, _)| *alg == strongest)
        .any(|(alg, hash)| format!("{}-{hash}", alg.name()) == actual);

    Ok(if matched {
        SriCheck::Valid
    } else {
        SriCheck::Mismatch(actual)
    })
}

pub fn check_file_sri(path: &Path, declared: &str) -> Result<SriCheck> {
    let bytes = fs::read(path).map_err(|e| OptimizeError::Read(path.to_path_buf(), e))?;
    check_sri(&bytes, declared)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_md5_hex_is_32_chars() {
        assert_eq!(md5_hex(b""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(md5_hex(b"test"), "098f6bcd4621d373cade4e832627b4f6");
        assert_eq!(md5_hex(b"anything").len(), 32);
    }

    #[test]
    fn test_sri_token_known_value() {
        // echo -n "alert('Hello, world.');" | openssl dgst -sha384 -binary | openssl base64 -A
        assert_eq!(
            sri_token(b"alert('Hello, world.');", SriAlgorithm::Sha384),
            "sha384-H8BRh8j48O9oYatfu5AZzq6A9RINhZO5H16dQZngK7T62em8MUt1FLm52t+eX6xO"
        );
    }

    #[test]
    fn test_check_sri() {
        let data = b"body{color:red}";
        let token = sri_token(data, SriAlgorithm::Sha384);
        assert_eq!(check_sri(data, &token).unwrap(), SriCheck::Valid);

        let wrong = sri_token(b"other", SriAlgorithm::Sha384);
        assert_eq!(
            check_sri(data, &wrong).unwrap(),
            SriCheck::Mismatch(token.clone())
        );
    }

    #[test]
    fn test_check_sri_uses_strongest_algorithm() {
        let data = b"x";
        let weak_wrong = sri_token(b"y", SriAlgorithm::Sha256);
        let strong = sri_token(data, SriAlgorithm::Sha512);
        let declared = format!("{weak_wrong} {strong}?ct=application/javascript");
        assert_eq!(check_sri(data, &declared).unwrap(), SriCheck::Valid);
    }

    #[test]
    fn test_invalid_sri() {
        assert!(matches!(
            check_sri(b"x", "md5-abc"),
            Err(OptimizeError::InvalidSri(_))
        ));
        assert!(check_sri(b"x", "   ").is_err());
    }
}
