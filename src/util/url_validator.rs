use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Errors produced while validating URLs from config or from upstream entries.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The URL has no host component.
    #[error("URL has no host")]
    MissingHost,
    /// The URL points to localhost or a private network address.
    #[error("Refusing to open local address: {0}")]
    LocalAddress(String),
}

fn parse_http(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str.trim())?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(url)
}

/// Validates the configured search endpoint.
///
/// Only the scheme and host are checked. Loopback hosts are accepted so a
/// local mirror (or a test server) can stand in for the public API.
pub fn validate_api_base_url(url_str: &str) -> Result<Url, UrlValidationError> {
    parse_http(url_str)
}

/// Validates a paper link before handing it to the system browser.
///
/// Links come from the upstream feed, so anything that is not plain
/// http(s) to a public host is rejected.
///
/// # Examples
///
/// ```
/// use paperstream::util::validate_link_for_open;
///
/// assert!(validate_link_for_open("http://arxiv.org/abs/1706.03762v7").is_ok());
/// assert!(validate_link_for_open("file:///etc/passwd").is_err());
/// assert!(validate_link_for_open("http://192.168.1.1/abs/1").is_err());
/// ```
pub fn validate_link_for_open(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = parse_http(url_str)?;

    if let Some(host) = url.host_str() {
        if host.eq_ignore_ascii_case("localhost") {
            return Err(UrlValidationError::LocalAddress(host.to_owned()));
        }

        let bare = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);

        if let Ok(ip) = bare.parse::<IpAddr>() {
            if is_local_ip(&ip) {
                return Err(UrlValidationError::LocalAddress(ip.to_string()));
            }
        }
    }

    Ok(url)
}

fn is_local_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_private() || v4.is_loopback() || v4.is_link_local() || v4.is_unspecified()
        }
        IpAddr::V6(v6) => {
            if v6.is_loopback() || v6.is_unspecified() {
                return true;
            }
            let first = v6.segments()[0];
            // fc00::/7 unique local, fe80::/10 link local
            (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
        }
    }
}
