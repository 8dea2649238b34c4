//! Share links: the buffer, LZ-string compressed into a URL query parameter.

use url::Url;

use crate::error::EditorError;

/// Compress text into a URL-safe token.
pub fn encode_token(text: &str) -> String {
    lz_str::compress_to_encoded_uri_component(text)
}

/// Decompress a token produced by [`encode_token`].
///
/// A `+` that was turned into a space by form decoding is put back before
/// decompressing. Undecodable and empty tokens are rejected.
pub fn decode_token(token: &str) -> Result<String, EditorError> {
    let token = token.replace(' ', "+");
    let units = lz_str::decompress_from_encoded_uri_component(token.as_str())
        .ok_or(EditorError::InvalidShareToken)?;
    let text = String::from_utf16(&units).map_err(|_| EditorError::InvalidShareToken)?;
    if text.is_empty() {
        return Err(EditorError::InvalidShareToken);
    }
    Ok(text)
}

/// Build a share URL: `base` with its query and fragment replaced by
/// `?{param}={token}`.
pub fn share_url(base: &str, param: &str, text: &str) -> Result<String, EditorError> {
    let mut url = Url::parse(base).map_err(|e| EditorError::Platform(format!("bad page url: {e}")))?;
    url.set_query(None);
    url.set_fragment(None);
    url.query_pairs_mut().append_pair(param, &encode_token(text));
    Ok(url.into())
}

/// The value of `param` in a query string such as `location.search`.
pub fn token_from_query(search: &str, param: &str) -> Option<String> {
    let query = search.strip_prefix('?').unwrap_or(search);
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == param)
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{"test": "data", "number": 123}"#;

    #[test]
    fn test_token_roundtrip() {
        let token = encode_token(SAMPLE);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || "+-$".contains(c)));
        assert_eq!(decode_token(&token).unwrap(), SAMPLE);
    }

    #[test]
    fn test_share_url_contains_param() {
        let url = share_url("https://example.com/tool/?old=1#top", "json", SAMPLE).unwrap();
        assert!(url.starts_with("https://example.com/tool/?json="));
        assert!(!url.contains("old=1"));
        assert!(!url.contains('#'));

        let search = &url[url.find('?').unwrap()..];
        let token = token_from_query(search, "json").unwrap();
        assert_eq!(decode_token(&token).unwrap(), SAMPLE);
    }

    #[test]
    fn test_plus_survives_space_decoding() {
        let token = encode_token(SAMPLE);
        let mangled = token.replace('+', " ");
        assert_eq!(decode_token(&mangled).unwrap(), SAMPLE);
    }

    #[test]
    fn test_missing_param() {
        assert_eq!(token_from_query("", "json"), None);
        assert_eq!(token_from_query("?other=1", "json"), None);
        assert_eq!(token_from_query("?json=abc&x=1", "json").as_deref(), Some("abc"));
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(matches!(decode_token(""), Err(EditorError::InvalidShareToken)));
    }

    #[test]
    fn test_bad_base_url() {
        assert!(matches!(
            share_url("not a url", "json", SAMPLE),
            Err(EditorError::Platform(_))
        ));
    }
}
