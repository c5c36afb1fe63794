//! AWS Signature Version 4 request signing

use super::token::CapabilityToken;
use crate::error::{Error, Result};
use crate::network::ApiRequest;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use url::Url;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Signs requests for one region/service pair
#[derive(Debug, Clone)]
pub struct SigV4Signer {
    region: String,
    service: String,
}

impl SigV4Signer {
    pub fn new(region: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            service: service.into(),
        }
    }

    /// Add `host`, `x-amz-date`, `x-amz-security-token` and `authorization` headers
    pub fn sign(
        &self,
        request: ApiRequest,
        token: &CapabilityToken,
        now: DateTime<Utc>,
    ) -> Result<ApiRequest> {
        // Sign the URL as it goes on the wire, query included
        let url = Url::parse(&request.full_url())?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(Error::Signing(format!("no host in {}", request.url))),
        };

        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();

        let mut request = request
            .header("host", host)
            .header("x-amz-date", amz_date.clone());
        if let Some(session_token) = &token.session_token {
            request = request.header("x-amz-security-token", session_token.clone());
        }

        let (canonical_headers, signed_headers) = canonical_headers(&request);
        let canonical_request = [
            request.method.as_str().to_string(),
            canonical_uri(&url),
            canonical_query(&url),
            canonical_headers,
            signed_headers.clone(),
            hex_sha256(request.body_bytes()),
        ]
        .join("\n");

        let scope = format!("{}/{}/{}/aws4_request", date, self.region, self.service);
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            amz_date,
            scope,
            hex_sha256(canonical_request.as_bytes())
        );

        let key = signing_key(&token.secret_access_key, &date, &self.region, &self.service)?;
        let signature = hex(&hmac(&key, string_to_sign.as_bytes())?);

        let authorization = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, token.access_key_id, scope, signed_headers, signature
        );
        Ok(request.header("authorization", authorization))
    }
}

/// Derive the per-day signing key
pub fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Result<Vec<u8>> {
    let k_date = hmac(format!("AWS4{}", secret).as_bytes(), date.as_bytes())?;
    let k_region = hmac(&k_date, region.as_bytes())?;
    let k_service = hmac(&k_region, service.as_bytes())?;
    hmac(&k_service, b"aws4_request")
}

fn hmac(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| Error::Signing(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn hex_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// RFC 3986 encoding with only unreserved characters left alone
fn uri_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

// Path segments arrive percent-encoded once in the URL; non-S3 services
// expect them encoded a second time.
fn canonical_uri(url: &Url) -> String {
    let path = url.path();
    if path.is_empty() || path == "/" {
        return "/".to_string();
    }
    path.split('/').map(uri_encode).collect::<Vec<_>>().join("/")
}

// The query is already percent-encoded by `ApiRequest::query_string`; pairs
// are only sorted here.
fn canonical_query(url: &Url) -> String {
    let mut pairs: Vec<(&str, &str)> = url
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

fn canonical_headers(request: &ApiRequest) -> (String, String) {
    let mut headers: Vec<(String, String)> = request
        .headers
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v.split_whitespace().collect::<Vec<_>>().join(" ")))
        .collect();
    headers.sort();

    let canonical = headers
        .iter()
        .map(|(k, v)| format!("{}:{}\n", k, v))
        .collect::<String>();
    let signed = headers
        .iter()
        .map(|(k, _)| k.as_str())
        .collect::<Vec<_>>()
        .join(";");
    (canonical, signed)
}
