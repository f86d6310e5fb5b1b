//! BCE v1 request signing
//!
//! The `Authorization` header is
//! `bce-auth-v1/{ak}/{timestamp}/{expiration}/{signed headers}/{signature}`
//! where the signature is an HMAC-SHA256 over the canonical request, keyed
//! with an HMAC-SHA256 of the auth prefix under the secret key.

use std::fmt;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Seconds a signature stays valid.
pub const SIGNATURE_EXPIRATION_SECS: u32 = 1800;

const BCE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Access key pair for BOS.
#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Format a time the way BCE expects in `x-bce-date` and the auth prefix.
pub fn bce_timestamp(time: DateTime<Utc>) -> String {
    time.format(BCE_TIMESTAMP_FORMAT).to_string()
}

/// Compute the `Authorization` header value for a request.
///
/// `headers` are the headers covered by the signature; their names are
/// lowercased and listed in the signed-headers field.
pub fn sign_request(
    credentials: &Credentials,
    method: &str,
    path: &str,
    query: &[(String, String)],
    headers: &[(&str, &str)],
    time: DateTime<Utc>,
) -> String {
    let auth_prefix = format!(
        "bce-auth-v1/{}/{}/{}",
        credentials.access_key_id,
        bce_timestamp(time),
        SIGNATURE_EXPIRATION_SECS
    );
    let signing_key = hmac_sha256_hex(credentials.secret_access_key.as_bytes(), &auth_prefix);

    let mut canonical_headers: Vec<String> = headers
        .iter()
        .map(|(name, value)| {
            format!(
                "{}:{}",
                uri_encode(&name.to_lowercase(), false),
                uri_encode(value.trim(), false)
            )
        })
        .collect();
    canonical_headers.sort();

    let mut signed_headers: Vec<String> = headers.iter().map(|(n, _)| n.to_lowercase()).collect();
    signed_headers.sort();

    let canonical_request = format!(
        "{}\n{}\n{}\n{}",
        method.to_uppercase(),
        uri_encode(path, true),
        canonical_query_string(query),
        canonical_headers.join("\n")
    );
    let signature = hmac_sha256_hex(signing_key.as_bytes(), &canonical_request);

    format!("{}/{}/{}", auth_prefix, signed_headers.join(";"), signature)
}

/// Sorted, percent-encoded `k=v` pairs joined with `&`.
pub fn canonical_query_string(query: &[(String, String)]) -> String {
    let mut pairs: Vec<String> = query
        .iter()
        .filter(|(k, _)| !k.eq_ignore_ascii_case("authorization"))
        .map(|(k, v)| format!("{}={}", uri_encode(k, false), uri_encode(v, false)))
        .collect();
    pairs.sort();
    pairs.join("&")
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
pub fn uri_encode(input: &str, keep_slash: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b'/' if keep_slash => out.push('/'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

fn hmac_sha256_hex(key: &[u8], data: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn credentials() -> Credentials {
        Credentials {
            access_key_id: "aki".to_string(),
            secret_access_key: "sk".to_string(),
        }
    }

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn test_uri_encode() {
        assert_eq!(uri_encode("abc-_.~XYZ019", false), "abc-_.~XYZ019");
        assert_eq!(uri_encode("a b/c", false), "a%20b%2Fc");
        assert_eq!(uri_encode("/my bucket/k", true), "/my%20bucket/k");
        assert_eq!(uri_encode("é", false), "%C3%A9");
    }

    #[test]
    fn test_canonical_query_sorted_and_encoded() {
        let query = vec![
            pair("prefix", "logs/2024"),
            pair("maxKeys", "1000"),
            pair("marker", ""),
            pair("authorization", "ignored"),
        ];
        assert_eq!(
            canonical_query_string(&query),
            "marker=&maxKeys=1000&prefix=logs%2F2024"
        );
    }

    #[test]
    fn test_bce_timestamp() {
        let time = Utc.with_ymd_and_hms(2015, 4, 27, 8, 23, 49).unwrap();
        assert_eq!(bce_timestamp(time), "2015-04-27T08:23:49Z");
    }

    #[test]
    fn test_sign_request_is_deterministic() {
        let time = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let query = vec![pair("maxKeys", "1000"), pair("prefix", "a/b")];
        let date = bce_timestamp(time);
        let headers = [("Host", "bj.bcebos.com"), ("x-bce-date", date.as_str())];
        let auth = sign_request(&credentials(), "GET", "/bucket", &query, &headers, time);
        assert_eq!(
            auth,
            "bce-auth-v1/aki/2024-01-02T03:04:05Z/1800/host;x-bce-date/0c2dd92a1a4e0695c86ca571597f65d7cbfa412522b061bde2af349d8ff2bc79"
        );
        let again = sign_request(&credentials(), "GET", "/bucket", &query, &headers, time);
        assert_eq!(auth, again);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", credentials());
        assert!(debug.contains("aki"));
        assert!(!debug.contains("\"sk\""));
        assert!(debug.contains("<redacted>"));
    }
}
