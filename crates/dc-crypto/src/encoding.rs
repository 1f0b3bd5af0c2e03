//! Canonical text encoders applied before values enter a link.
//!
//! Every transform here is deterministic and one-directional: the link
//! builder never needs to undo them, and a verifier restores padding and the
//! standard alphabet on its own side.

use crate::KeyError;

const PEM_BOUNDARY: &str = "-----";

/// Collapse a PEM document into its single-line base64 body.
///
/// Boundary lines (`-----BEGIN ...-----` / `-----END ...-----`) and line
/// breaks (LF or CRLF) are dropped, the body lines are concatenated and
/// trailing `=` padding is stripped.
///
/// # Errors
///
/// Returns `KeyError::MalformedPem` when either boundary is missing, the
/// body is empty, or the body contains characters outside the standard
/// base64 alphabet.
pub fn pem_to_compact(pem: &str) -> Result<String, KeyError> {
    let mut saw_begin = false;
    let mut saw_end = false;
    let mut body = String::with_capacity(pem.len());

    for line in pem.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }
        if line.starts_with(PEM_BOUNDARY) {
            if line.starts_with("-----BEGIN ") {
                saw_begin = true;
            } else if line.starts_with("-----END ") {
                saw_end = true;
            }
            continue;
        }
        body.push_str(line);
    }

    if !saw_begin || !saw_end {
        return Err(KeyError::MalformedPem("missing BEGIN/END boundary"));
    }

    let body = body.trim_end_matches('=');
    if body.is_empty() {
        return Err(KeyError::MalformedPem("empty body"));
    }
    if !body
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/')
    {
        return Err(KeyError::MalformedPem("body is not base64"));
    }

    Ok(body.to_string())
}

/// Map standard base64 text onto the URL-safe alphabet.
///
/// `+` becomes `-`, `/` becomes `_`, and trailing `=` padding is removed.
#[must_use]
pub fn to_url_safe_base64(base64: &str) -> String {
    base64
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect()
}

/// Percent-encode UTF-8 text for use as a query value.
///
/// Every byte outside the RFC 3986 unreserved set (`A-Z a-z 0-9 - . _ ~`)
/// becomes `%XX` with uppercase hex digits.
#[must_use]
pub fn percent_encode(text: &str) -> String {
    urlencoding::encode(text).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPKI_PEM: &str = "-----BEGIN PUBLIC KEY-----\n\
        MFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAEaxfR8uEsQkf4vOblY6RA8ncDfYEt\n\
        6zOg9KE5RdiYwpZP40Li/hp/m47n60p8D54WK84zV2sxXs7LtkBoN79R9Q==\n\
        -----END PUBLIC KEY-----\n";

    #[test]
    fn compacts_pem_body_and_strips_padding() {
        let compact = pem_to_compact(SPKI_PEM).unwrap();
        assert!(compact.starts_with("MFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAE"));
        assert!(compact.ends_with("R9Q"));
        assert!(!compact.contains('\n'));
        assert!(!compact.contains('='));
    }

    #[test]
    fn compacts_crlf_pem() {
        let crlf = SPKI_PEM.replace('\n', "\r\n");
        assert_eq!(pem_to_compact(&crlf).unwrap(), pem_to_compact(SPKI_PEM).unwrap());
    }

    #[test]
    fn rejects_pem_without_boundaries() {
        let result = pem_to_compact("MFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAE");
        assert!(matches!(result, Err(KeyError::MalformedPem(_))));
    }

    #[test]
    fn rejects_pem_with_empty_body() {
        let result = pem_to_compact("-----BEGIN PUBLIC KEY-----\n-----END PUBLIC KEY-----\n");
        assert!(matches!(result, Err(KeyError::MalformedPem("empty body"))));
    }

    #[test]
    fn rejects_pem_with_non_base64_body() {
        let result =
            pem_to_compact("-----BEGIN PUBLIC KEY-----\nnot base64!\n-----END PUBLIC KEY-----\n");
        assert!(matches!(
            result,
            Err(KeyError::MalformedPem("body is not base64"))
        ));
    }

    #[test]
    fn url_safe_substitution() {
        assert_eq!(to_url_safe_base64("a+b/c=="), "a-b_c");
        assert_eq!(to_url_safe_base64("abcd"), "abcd");
        assert_eq!(to_url_safe_base64(""), "");
    }

    #[test]
    fn percent_encoding_cases() {
        let cases = [
            ("User123", "User123"),
            ("John Doe", "John%20Doe"),
            ("a/b?c=d&e", "a%2Fb%3Fc%3Dd%26e"),
            ("pipe|name", "pipe%7Cname"),
            ("plus+sign", "plus%2Bsign"),
            ("Zoë", "Zo%C3%AB"),
            ("keep-._~", "keep-._~"),
        ];

        for (input, expected) in cases {
            assert_eq!(percent_encode(input), expected, "case '{input}'");
        }
    }
}
