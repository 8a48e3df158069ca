//! OAuth 1.0a request signing (HMAC-SHA1) for the Twitter REST API

use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::Rng;
use rand::distr::Alphanumeric;
use sha1::Sha1;

use crate::config::Credentials;

/// RFC 3986 unreserved characters stay as-is, everything else is escaped
const RFC3986: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub fn percent_encode(s: &str) -> String {
    utf8_percent_encode(s, RFC3986).to_string()
}

fn generate_nonce() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Build the `Authorization` header for a request.
///
/// `params` are the request's query string and form body parameters,
/// unencoded. They take part in the signature but are not repeated in the
/// header.
pub fn authorization_header(
    method: &str,
    url: &str,
    params: &[(&str, String)],
    credentials: &Credentials,
) -> String {
    authorization_header_with(
        method,
        url,
        params,
        credentials,
        &generate_nonce(),
        Utc::now().timestamp(),
    )
}

fn authorization_header_with(
    method: &str,
    url: &str,
    params: &[(&str, String)],
    credentials: &Credentials,
    nonce: &str,
    timestamp: i64,
) -> String {
    let mut oauth_params: Vec<(&str, String)> = vec![
        ("oauth_consumer_key", credentials.consumer_key.clone()),
        ("oauth_nonce", nonce.to_string()),
        ("oauth_signature_method", "HMAC-SHA1".to_string()),
        ("oauth_timestamp", timestamp.to_string()),
        ("oauth_token", credentials.access_token.clone()),
        ("oauth_version", "1.0".to_string()),
    ];

    let signed: Vec<(&str, &str)> = params
        .iter()
        .chain(oauth_params.iter())
        .map(|(k, v)| (*k, v.as_str()))
        .collect();
    let signature = sign(
        method,
        url,
        &signed,
        &credentials.consumer_secret,
        &credentials.access_token_secret,
    );
    oauth_params.push(("oauth_signature", signature));
    oauth_params.sort_by(|a, b| a.0.cmp(b.0));

    let fields: Vec<String> = oauth_params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
        .collect();
    format!("OAuth {}", fields.join(", "))
}

/// Compute the base64 HMAC-SHA1 signature over the signature base string.
fn sign(
    method: &str,
    url: &str,
    params: &[(&str, &str)],
    consumer_secret: &str,
    token_secret: &str,
) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    let parameter_string = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let base_string = format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(url),
        percent_encode(&parameter_string)
    );
    let signing_key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );

    let mut mac = Hmac::<Sha1>::new_from_slice(signing_key.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(base_string.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}
