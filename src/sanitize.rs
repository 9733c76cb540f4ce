//! Filename sanitization.
//!
//! Every user-supplied identifier that becomes a path component (journal
//! ids, upload filenames, delete targets) passes through [`sanitize_segment`]
//! before any filesystem operation.

/// Upper bound on the length of a sanitized path segment.
const MAX_SEGMENT_LEN: usize = 100;

/// Map an arbitrary string to a path-segment-safe string.
///
/// Characters outside `[A-Za-z0-9._-]` become `_`, runs of two or more dots
/// collapse to a single dot (defeating `..` traversal while keeping single
/// extensions intact), and the result is truncated to 100 characters.
///
/// Total and deterministic; the output always matches
/// `^[A-Za-z0-9._-]{0,100}$` and never contains `..`. Not guaranteed
/// idempotent in general, so treat the result as normalized rather than
/// canonical.
pub fn sanitize_segment(input: &str) -> String {
    let mut out = String::with_capacity(input.len().min(MAX_SEGMENT_LEN));
    let mut prev_dot = false;
    for c in input.chars() {
        let c = if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            c
        } else {
            '_'
        };
        if c == '.' {
            if prev_dot {
                continue;
            }
            prev_dot = true;
        } else {
            prev_dot = false;
        }
        out.push(c);
    }
    // All retained characters are ASCII, so this cannot split a char.
    out.truncate(MAX_SEGMENT_LEN);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_safe(s: &str) -> bool {
        s.len() <= MAX_SEGMENT_LEN
            && !s.contains("..")
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    }

    #[test]
    fn plain_filenames_pass_through() {
        assert_eq!(sanitize_segment("IMG_0420.jpg"), "IMG_0420.jpg");
        assert_eq!(sanitize_segment("trip-1"), "trip-1");
    }

    #[test]
    fn traversal_is_defeated() {
        let out = sanitize_segment("../../etc/passwd");
        assert_eq!(out, "._._etc_passwd");
        assert!(is_safe(&out));
    }

    #[test]
    fn dot_runs_collapse() {
        assert_eq!(sanitize_segment("a....b"), "a.b");
        assert_eq!(sanitize_segment("...."), ".");
        assert_eq!(sanitize_segment("photo..jpg"), "photo.jpg");
    }

    #[test]
    fn illegal_characters_become_underscores() {
        assert_eq!(sanitize_segment("my photo (1).jpg"), "my_photo__1_.jpg");
        assert_eq!(sanitize_segment("été.png"), "_t_.png");
        assert_eq!(sanitize_segment("a/b\\c:d"), "a_b_c_d");
    }

    #[test]
    fn output_is_truncated() {
        let long = "x".repeat(300);
        assert_eq!(sanitize_segment(&long).len(), MAX_SEGMENT_LEN);
    }

    #[test]
    fn adversarial_inputs_are_always_safe() {
        let cases = [
            "",
            "..",
            "../",
            "..\\..\\windows",
            "%2e%2e%2f",
            "\0\0\0",
            "ファイル名.jpg",
            ".hidden",
            "a.b.c.d.e",
            "../..//....//etc",
        ];
        for case in cases {
            let out = sanitize_segment(case);
            assert!(is_safe(&out), "unsafe output {out:?} for input {case:?}");
        }
    }
}
