//! Volcengine V4 request signing (HMAC-SHA256).

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::credentials::Credentials;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HMAC-SHA256";

/// The parts of an outgoing request that are covered by the signature.
#[derive(Debug, Clone)]
pub struct SignableRequest<'a> {
    /// HTTP method, upper case.
    pub method: &'a str,
    /// Request path; empty means `/`.
    pub path: &'a str,
    /// Query parameters, in any order.
    pub query: &'a [(&'a str, &'a str)],
    /// Value of the `Host` header.
    pub host: &'a str,
    /// Value of the `Content-Type` header.
    pub content_type: &'a str,
    /// Request body bytes.
    pub body: &'a [u8],
}

/// Headers to attach to a signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    /// `X-Date` header value.
    pub x_date: String,
    /// `X-Content-Sha256` header value.
    pub content_sha256: String,
    /// `Authorization` header value.
    pub authorization: String,
}

/// Signs requests for one region/service pair.
#[derive(Debug)]
pub struct Signer<'a> {
    credentials: &'a Credentials,
    region: &'a str,
    service: &'a str,
}

impl<'a> Signer<'a> {
    /// Create a signer for the given credential scope.
    #[must_use]
    pub fn new(credentials: &'a Credentials, region: &'a str, service: &'a str) -> Self {
        Self { credentials, region, service }
    }

    /// Sign `request` as of `now`.
    #[must_use]
    pub fn sign(&self, request: &SignableRequest<'_>, now: DateTime<Utc>) -> SignedHeaders {
        let x_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = &x_date[..8];
        let content_sha256 = sha256_hex(request.body);

        let (canonical, signed_header_names) = canonical_request(request, &x_date, &content_sha256);
        let scope = format!("{date}/{}/{}/request", self.region, self.service);
        let string_to_sign =
            format!("{ALGORITHM}\n{x_date}\n{scope}\n{}", sha256_hex(canonical.as_bytes()));

        let key = signing_key(self.credentials.secret_key(), date, self.region, self.service);
        let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes()));

        let authorization = format!(
            "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_header_names}, Signature={signature}",
            self.credentials.access_key()
        );

        SignedHeaders { x_date, content_sha256, authorization }
    }
}

/// Build the canonical request string and the `;`-joined signed header list.
fn canonical_request(
    request: &SignableRequest<'_>,
    x_date: &str,
    content_sha256: &str,
) -> (String, String) {
    let mut headers = [
        ("content-type", request.content_type.trim()),
        ("host", request.host.trim()),
        ("x-content-sha256", content_sha256),
        ("x-date", x_date),
    ];
    headers.sort_unstable_by_key(|(name, _)| *name);

    let canonical_headers: String =
        headers.iter().map(|(name, value)| format!("{name}:{value}\n")).collect();
    let signed_header_names = headers.iter().map(|(name, _)| *name).collect::<Vec<_>>().join(";");

    let path = if request.path.is_empty() { "/" } else { request.path };
    let query = canonical_query(request.query);

    let canonical = [
        request.method,
        path,
        query.as_str(),
        canonical_headers.as_str(),
        signed_header_names.as_str(),
        content_sha256,
    ]
    .join("\n");

    (canonical, signed_header_names)
}

/// Sort and percent-encode query parameters.
fn canonical_query(query: &[(&str, &str)]) -> String {
    let mut pairs: Vec<(String, String)> =
        query.iter().map(|(k, v)| (uri_encode(k), uri_encode(v))).collect();
    pairs.sort();
    pairs.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&")
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
pub fn uri_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(secret.as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"request")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac =
        HmacSha256::new_from_slice(key).expect("HMAC-SHA256 accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
