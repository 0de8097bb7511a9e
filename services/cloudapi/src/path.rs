//! Resource path encoding.
//!
//! Logical paths use `/` between segments. A literal `/` inside a segment is
//! written `\/` and a literal `\` is written `\\`.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use smartdc_core::{Error, Result};

/// Everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )` is percent encoded.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Encode a logical path into a URI path.
///
/// Every unescaped `/` ends a segment, every segment is percent encoded on its
/// own, and empty segments are dropped.
///
/// ```
/// use smartdc_cloudapi::encode_path;
///
/// assert_eq!(
///     encode_path(r"/my/machines/a\/b c").unwrap(),
///     "/my/machines/a%2Fb%20c"
/// );
/// ```
pub fn encode_path(path: &str) -> Result<String> {
    if path.is_empty() {
        return Err(Error::request_invalid("path must not be empty"));
    }

    let mut out = String::with_capacity(path.len() + 8);
    let mut segment = String::new();
    let mut escaped = false;

    for c in path.chars() {
        match c {
            _ if escaped => {
                segment.push(c);
                escaped = false;
            }
            '\\' => escaped = true,
            '/' => flush(&mut out, &mut segment),
            _ => segment.push(c),
        }
    }
    flush(&mut out, &mut segment);

    if out.is_empty() {
        out.push('/');
    }
    Ok(out)
}

fn flush(out: &mut String, segment: &mut String) {
    if segment.is_empty() {
        return;
    }
    out.push('/');
    out.extend(utf8_percent_encode(segment, SEGMENT));
    segment.clear();
}

/// Escape a raw value so that it stays a single segment of a logical path.
pub fn escape_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c == '\\' || c == '/' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("/acct/fabrics/default/vlans/5/networks", "/acct/fabrics/default/vlans/5/networks"; "plain")]
    #[test_case("//acct///machines/", "/acct/machines"; "empty segments dropped")]
    #[test_case(r"/my/images/a\/b", "/my/images/a%2Fb"; "escaped slash")]
    #[test_case(r"/my/images/a\\b", "/my/images/a%5Cb"; "escaped backslash")]
    #[test_case(r"/my/x\y", "/my/xy"; "escape of a plain char")]
    #[test_case("/my/tags/role name", "/my/tags/role%20name"; "space")]
    #[test_case("/my/tags/ü?#&=", "/my/tags/%C3%BC%3F%23%26%3D"; "reserved and non ascii")]
    #[test_case("/my/keys/it's(ok)!*~", "/my/keys/it's(ok)!*~"; "unreserved marks")]
    #[test_case("my/keys", "/my/keys"; "no leading slash")]
    #[test_case("///", "/"; "only separators")]
    fn test_encode_path(input: &str, expected: &str) {
        assert_eq!(encode_path(input).unwrap(), expected);
    }

    #[test]
    fn test_empty_path_is_argument_error() {
        let err = encode_path("").unwrap_err();
        assert!(err.is_argument_error());
    }

    #[test]
    fn test_escaped_segment_stays_whole() {
        let logical = format!("/my/machines/{}", escape_segment("a/b\\c"));
        assert_eq!(logical, r"/my/machines/a\/b\\c");
        assert_eq!(encode_path(&logical).unwrap(), "/my/machines/a%2Fb%5Cc");
    }
}
