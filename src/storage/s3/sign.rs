//! AWS Signature Version 4 request signing for S3 PUTs.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

const SIGNING_ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SIGNED_HEADERS: &str = "host;x-amz-content-sha256;x-amz-date";

/// Everything the signer needs to produce an `Authorization` header for a
/// path-style S3 PUT with `host`, `x-amz-content-sha256` and `x-amz-date` as
/// the signed headers.
pub(super) struct SigningInput<'a> {
    pub(super) host: &'a str,
    pub(super) canonical_uri: &'a str,
    pub(super) region: &'a str,
    pub(super) access_key_id: &'a str,
    pub(super) secret_access_key: &'a str,
    /// `YYYYMMDDTHHMMSSZ` timestamp sent as `x-amz-date`.
    pub(super) amz_date: &'a str,
    /// Lowercase hex SHA-256 of the request payload.
    pub(super) payload_hash: &'a str,
}

/// Build the `Authorization` header value for a PUT request.
pub(super) fn authorization_header(input: &SigningInput<'_>) -> String {
    let date = &input.amz_date[..8];
    let scope = format!("{date}/{}/s3/aws4_request", input.region);

    let canonical_request = format!(
        "PUT\n{uri}\n\nhost:{host}\nx-amz-content-sha256:{hash}\nx-amz-date:{amz_date}\n\n{SIGNED_HEADERS}\n{hash}",
        uri = input.canonical_uri,
        host = input.host,
        hash = input.payload_hash,
        amz_date = input.amz_date,
    );

    let string_to_sign = format!(
        "{SIGNING_ALGORITHM}\n{amz_date}\n{scope}\n{digest}",
        amz_date = input.amz_date,
        digest = hex::encode(Sha256::digest(canonical_request.as_bytes())),
    );

    let key = signing_key(input.secret_access_key, date, input.region, "s3");
    let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes()));

    format!(
        "{SIGNING_ALGORITHM} Credential={access_key}/{scope}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
        access_key = input.access_key_id,
    )
}

/// Lowercase hex SHA-256 of a payload, sent as `x-amz-content-sha256`.
pub(super) fn payload_hash(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

/// Derive the per-day signing key: HMAC chain over date, region and service.
pub(super) fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

/// Percent-encode a key for use in the canonical URI. Unreserved characters
/// and `/` pass through; everything else becomes uppercase `%XX` escapes.
pub(super) fn uri_encode_path(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char);
            }
            _ => {
                out.push('%');
                out.push_str(&format!("{byte:02X}"));
            }
        }
    }
    out
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = match HmacSha256::new_from_slice(key) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC-SHA256 accepts keys of any length"),
    };
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}
