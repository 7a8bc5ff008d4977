//! Backup Code Value Object
//!
//! Single-use recovery codes. Plaintext exists only in the batch returned to
//! the caller at mint time; storage and lookup work exclusively on digests.
//!
//! Format: 10 characters from a 32-symbol alphabet (50 bits of entropy),
//! displayed grouped as `XXXXX-XXXXX`. The alphabet omits the ambiguous
//! characters I, O, 0 and 1.

use platform::crypto::{random_bytes, sha256_hex};

/// Codes issued per batch
pub const BACKUP_CODE_COUNT: usize = 10;
/// Characters per code (5 bits each)
pub const BACKUP_CODE_LEN: usize = 10;
/// Display grouping size
const BACKUP_CODE_GROUP: usize = 5;
/// 32 symbols so each character carries exactly 5 bits, with no modulo bias
const BACKUP_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Normalize a submitted backup code
///
/// Strips separators and whitespace, uppercases, and validates length and
/// alphabet. Returns `None` for anything that cannot be a backup code, so
/// callers can reject malformed input before touching storage.
pub fn normalize(input: &str) -> Option<String> {
    let normalized: String = input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if normalized.len() != BACKUP_CODE_LEN {
        return None;
    }
    if !normalized
        .bytes()
        .all(|b| BACKUP_CODE_ALPHABET.contains(&b))
    {
        return None;
    }

    Some(normalized)
}

/// Digest of a normalized code, the only form ever persisted
pub fn digest(normalized: &str) -> String {
    sha256_hex(normalized.as_bytes())
}

/// Format a normalized code for display (`XXXXX-XXXXX`)
pub fn format_for_display(normalized: &str) -> String {
    let mut out = String::with_capacity(BACKUP_CODE_LEN + 1);
    for (idx, chunk) in normalized.as_bytes().chunks(BACKUP_CODE_GROUP).enumerate() {
        if idx > 0 {
            out.push('-');
        }
        // Alphabet is ASCII, chunks are always valid UTF-8
        out.push_str(std::str::from_utf8(chunk).unwrap_or(""));
    }
    out
}

/// A freshly minted batch of backup codes
///
/// `codes` holds the display-form plaintext returned to the caller exactly
/// once; `digests` is what gets persisted. Index i of one corresponds to
/// index i of the other.
#[derive(Debug)]
pub struct BackupCodeBatch {
    pub codes: Vec<String>,
    pub digests: Vec<String>,
}

impl BackupCodeBatch {
    /// Generate `count` distinct random codes
    pub fn generate(count: usize) -> Self {
        let mut codes = Vec::with_capacity(count);
        let mut digests = Vec::with_capacity(count);

        while codes.len() < count {
            let normalized = generate_one();
            let digest = digest(&normalized);
            // 50-bit codes essentially never collide, but duplicates in one
            // batch would violate the (account, digest) primary key
            if digests.contains(&digest) {
                continue;
            }
            codes.push(format_for_display(&normalized));
            digests.push(digest);
        }

        Self { codes, digests }
    }
}

fn generate_one() -> String {
    let raw = random_bytes(BACKUP_CODE_LEN);
    raw.iter()
        .map(|&b| BACKUP_CODE_ALPHABET[usize::from(b) % BACKUP_CODE_ALPHABET.len()] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_has_32_symbols() {
        assert_eq!(BACKUP_CODE_ALPHABET.len(), 32);
        // No ambiguous characters
        for banned in [b'I', b'O', b'0', b'1'] {
            assert!(!BACKUP_CODE_ALPHABET.contains(&banned));
        }
    }

    #[test]
    fn test_generate_batch() {
        let batch = BackupCodeBatch::generate(BACKUP_CODE_COUNT);
        assert_eq!(batch.codes.len(), BACKUP_CODE_COUNT);
        assert_eq!(batch.digests.len(), BACKUP_CODE_COUNT);

        // All distinct
        let mut digests = batch.digests.clone();
        digests.sort();
        digests.dedup();
        assert_eq!(digests.len(), BACKUP_CODE_COUNT);

        for code in &batch.codes {
            assert_eq!(code.len(), BACKUP_CODE_LEN + 1);
            assert_eq!(&code[5..6], "-");
        }
    }

    #[test]
    fn test_display_form_normalizes_back() {
        let batch = BackupCodeBatch::generate(3);
        for (code, expected_digest) in batch.codes.iter().zip(&batch.digests) {
            let normalized = normalize(code).expect("display form must normalize");
            assert_eq!(&digest(&normalized), expected_digest);
        }
    }

    #[test]
    fn test_normalize_tolerates_case_and_separators() {
        assert_eq!(
            normalize("abcde-fghjk").as_deref(),
            Some("ABCDEFGHJK")
        );
        assert_eq!(
            normalize("  ABCDE FGHJK  ").as_deref(),
            Some("ABCDEFGHJK")
        );
    }

    #[test]
    fn test_normalize_rejects_bad_input() {
        assert!(normalize("").is_none());
        assert!(normalize("ABCDE-FGHJ").is_none()); // 9 chars
        assert!(normalize("ABCDE-FGHJKL").is_none()); // 11 chars
        assert!(normalize("ABCDE-FGH1K").is_none()); // '1' not in alphabet
        assert!(normalize("ABCDE-FGH0K").is_none()); // '0' not in alphabet
    }

    #[test]
    fn test_digest_is_stable_sha256() {
        // hex(sha256("ABCDEFGHJK"))
        assert_eq!(
            digest("ABCDEFGHJK"),
            hex::encode(platform::crypto::sha256(b"ABCDEFGHJK"))
        );
    }
}
