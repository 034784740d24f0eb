//! Cacheable JSON responses for the public API.

use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use super::error::ApiError;

pub const LIST_MAX_AGE_SECS: u32 = 300;
pub const POST_MAX_AGE_SECS: u32 = 900;
pub const STALE_WHILE_REVALIDATE_SECS: u32 = 30;

const SOURCE: &str = "infra::http::response";

/// Serialize `data` with public caching headers and an ETag.
///
/// Answers `304 Not Modified` when the request's `If-None-Match` already
/// names the current ETag.
pub fn cached_json<T: Serialize + ?Sized>(
    request_headers: &HeaderMap,
    data: &T,
    max_age_secs: u32,
) -> Result<Response, ApiError> {
    let body = serde_json::to_string(data).map_err(|err| ApiError::internal(SOURCE, &err))?;
    let etag = format!("\"{}\"", body_hash(&body));
    let cache_control = format!(
        "public, max-age={max_age_secs}, stale-while-revalidate={STALE_WHILE_REVALIDATE_SECS}"
    );

    let mut response = if etag_matches(request_headers, &etag) {
        StatusCode::NOT_MODIFIED.into_response()
    } else {
        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .map_err(|err| ApiError::internal(SOURCE, &err))?
    };

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&cache_control) {
        headers.insert(header::CACHE_CONTROL, value);
    }
    if let Ok(value) = HeaderValue::from_str(&etag) {
        headers.insert(header::ETAG, value);
    }
    Ok(response)
}

/// 32-bit `h = h * 31 + c` over UTF-16 code units, rendered as the base-36
/// magnitude.
pub fn body_hash(body: &str) -> String {
    let hash = body
        .encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)));
    to_base36(i64::from(hash).unsigned_abs())
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

fn etag_matches(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .any(|candidate| {
            candidate == "*" || candidate == etag || candidate.strip_prefix("W/") == Some(etag)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_matches_known_values() {
        assert_eq!(body_hash(""), "0");
        // "a" = 97
        assert_eq!(body_hash("a"), "2p");
        // "ab" = 97 * 31 + 98 = 3105
        assert_eq!(body_hash("ab"), "2e9");
    }

    #[test]
    fn hash_wraps_to_32_bits() {
        assert_eq!(body_hash("hello world"), "to5x38");
        assert_eq!(body_hash(r#"[{"slug":"hello-world"}]"#), "fqc58o");
    }

    #[test]
    fn non_ascii_hashes_per_utf16_unit() {
        // U+1F600 is the surrogate pair D83D DE00.
        assert_eq!(body_hash("\u{1F600}"), "11zz7");
    }

    #[test]
    fn cached_json_sets_headers() {
        let response = cached_json(&HeaderMap::new(), &vec!["a", "b"], LIST_MAX_AGE_SECS)
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "public, max-age=300, stale-while-revalidate=30"
        );
        let etag = response.headers().get(header::ETAG).unwrap().to_str().unwrap();
        assert!(etag.starts_with('"') && etag.ends_with('"'));
    }

    #[test]
    fn matching_if_none_match_yields_not_modified() {
        let first = cached_json(&HeaderMap::new(), &"body", POST_MAX_AGE_SECS).expect("first");
        let etag = first.headers().get(header::ETAG).unwrap().clone();

        let mut headers = HeaderMap::new();
        headers.insert(header::IF_NONE_MATCH, etag.clone());
        let second = cached_json(&headers, &"body", POST_MAX_AGE_SECS).expect("second");

        assert_eq!(second.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(second.headers().get(header::ETAG).unwrap(), &etag);

        let mut stale = HeaderMap::new();
        stale.insert(header::IF_NONE_MATCH, HeaderValue::from_static("\"other\""));
        let third = cached_json(&stale, &"body", POST_MAX_AGE_SECS).expect("third");
        assert_eq!(third.status(), StatusCode::OK);
    }
}
