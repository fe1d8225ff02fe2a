//! URI quoting
//!
//! Turns a logical name into a URL path portion.

/// Characters left as-is on top of the unreserved set `urlencoding` keeps.
const SAFE: &[char] = &['/', '~', '!', '*', '(', ')', '\''];

/// Convert a filesystem-style path into a URI path portion.
///
/// Backslashes become `/`. Everything outside ASCII alphanumerics,
/// `-_.` and `/~!*()'` is percent-encoded as UTF-8.
pub fn filepath_to_uri(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut buf = [0u8; 4];
    for ch in path.replace('\\', "/").chars() {
        if SAFE.contains(&ch) {
            out.push(ch);
        } else {
            out.push_str(&urlencoding::encode(ch.encode_utf8(&mut buf)));
        }
    }
    out
}
