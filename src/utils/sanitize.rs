// src/utils/sanitize.rs

/// Characters that are never allowed in an output directory name.
const FORBIDDEN: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Maximum length of a sanitized name, in characters.
const MAX_LEN: usize = 50;

/// Map arbitrary text to a filesystem-safe, length-bounded name.
///
/// Every forbidden character and every whitespace character becomes an
/// underscore; the result is truncated to 50 characters. Total function:
/// empty input yields an empty string, which callers must tolerate.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_whitespace() || FORBIDDEN.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .take(MAX_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_forbidden_characters() {
        let out = sanitize("a/b\\c:d*e?f\"g<h>i|j k");
        assert_eq!(out, "a_b_c_d_e_f_g_h_i_j_k");
        for c in FORBIDDEN {
            assert!(!out.contains(*c));
        }
    }

    #[test]
    fn test_whitespace_becomes_underscore() {
        assert_eq!(sanitize("hello\tworld\npage"), "hello_world_page");
    }

    #[test]
    fn test_truncates_to_fifty_characters() {
        let long = "x".repeat(200);
        assert_eq!(sanitize(&long).chars().count(), 50);
    }

    #[test]
    fn test_idempotent() {
        let inputs = ["Some Page: Title?", "", "short", &"y".repeat(80)];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once);
        }
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert_eq!(sanitize(""), "");
    }
}
