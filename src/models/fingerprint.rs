//! Content fingerprints for near-duplicate code detection.
//!
//! Blocks that differ only in whitespace share a fingerprint. The hash is a
//! 31-multiplier polynomial over UTF-16 code units, wrapped to `i32` at every
//! step, so fingerprints written by earlier stores stay comparable.

/// Collapses every whitespace run to one space and trims both ends
pub fn normalize_code(code: &str) -> String {
    code.split(is_code_whitespace)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// Unicode White_Space, plus the byte order mark and minus NEL. Stored
// fingerprints were computed over this set.
fn is_code_whitespace(c: char) -> bool {
    match c {
        '\u{feff}' => true,
        '\u{85}' => false,
        _ => c.is_whitespace(),
    }
}

/// Returns the hex fingerprint of the whitespace-normalized block
pub fn fingerprint(code: &str) -> String {
    let normalized = normalize_code(code);

    let hash = normalized
        .encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)));

    to_signed_hex(hash)
}

// Negative hashes keep their sign: "-1f" rather than two's complement.
fn to_signed_hex(hash: i32) -> String {
    if hash < 0 {
        format!("-{:x}", i64::from(hash).unsigned_abs())
    } else {
        format!("{:x}", hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize_code("  let x =\n\t 1;\r\n  "), "let x = 1;");
        assert_eq!(normalize_code(""), "");
    }

    #[test]
    fn test_normalize_whitespace_set() {
        assert_eq!(normalize_code("\u{feff}let\u{feff}x"), "let x");
        assert_eq!(normalize_code("a\u{85}b"), "a\u{85}b");
        assert_eq!(normalize_code("a\u{a0}\u{3000}b"), "a b");
        assert_eq!(fingerprint("\u{feff}a "), fingerprint("a"));
    }

    #[test]
    fn test_whitespace_variants_collide() {
        let a = "for (const item of items) {\n    total += item.price;\n}";
        let b = "for (const item of items) { total += item.price; }";
        let c = "\n\nfor  (const item of items)  {\n\ttotal += item.price;\n}\n";
        assert_eq!(fingerprint(a), fingerprint(b));
        assert_eq!(fingerprint(b), fingerprint(c));
    }

    #[test]
    fn test_known_values() {
        assert_eq!(fingerprint(""), "0");
        assert_eq!(fingerprint("a"), "61");
        // 97 * 31 + 98
        assert_eq!(fingerprint("ab"), "c21");
    }

    #[test]
    fn test_wraps_to_signed_32_bits() {
        let long = "x".repeat(64);
        let fp = fingerprint(&long);
        let value = i64::from_str_radix(fp.trim_start_matches('-'), 16).unwrap();
        assert!(value <= i64::from(i32::MAX) + 1);
    }

    #[test]
    fn test_negative_rendering() {
        assert_eq!(to_signed_hex(-1), "-1");
        assert_eq!(to_signed_hex(i32::MIN), "-80000000");
    }

    #[test]
    fn test_distinct_code_differs() {
        assert_ne!(fingerprint("items.sort()"), fingerprint("items.reverse()"));
    }
}
