//! Pool connection URL parsing.
//!
//! Device firmwares report pool endpoints in wildly inconsistent shapes:
//! missing schemes, missing ports, pubkeys smuggled into URL fragments.
//! [`parse_strict`] accepts only well-formed stratum URLs; [`resolve`]
//! wraps it with a repair pass that absorbs the known malformations
//! without loosening validation for well-formed input.

use thiserror::Error;
use url::Url;

const DEFAULT_SCHEME: &str = "stratum+tcp";
const STRATUM_DEFAULT_PORT: u16 = 4444;
const STRATUM_SSL_DEFAULT_PORT: u16 = 4443;

const KNOWN_SCHEMES: [&str; 3] = ["stratum", "stratum+tcp", "stratum+ssl"];

/// One pool connection endpoint.
///
/// A record with `host == None` marks an unparseable URL. That marker is
/// distinct from an absent record: [`resolve`] returns `None` for empty
/// input and `Some(PoolUrl::invalid())` for garbage input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolUrl {
    pub scheme: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub pubkey: Option<String>,
}

impl PoolUrl {
    /// The invalid-URL marker.
    pub fn invalid() -> Self {
        Self::default()
    }

    pub fn is_invalid(&self) -> bool {
        self.host.is_none()
    }

    /// Endpoint string (`scheme://host:port`), or `None` when there is
    /// no host to point at.
    pub fn endpoint(&self) -> Option<String> {
        let host = self.host.as_deref()?;
        let scheme = self.scheme.as_deref().unwrap_or(DEFAULT_SCHEME);
        Some(match self.port {
            Some(port) => format!("{scheme}://{host}:{port}"),
            None => format!("{scheme}://{host}"),
        })
    }
}

#[derive(Debug, Error)]
pub enum PoolUrlError {
    #[error("malformed URL: {0}")]
    Malformed(#[from] url::ParseError),

    #[error("unknown scheme {0:?}")]
    UnknownScheme(String),

    #[error("missing host")]
    MissingHost,

    #[error("missing port")]
    MissingPort,

    #[error("unexpected fragment")]
    UnexpectedFragment,
}

/// Strict pool URL parse: a known stratum scheme, a host, an explicit
/// port, no fragment. The pubkey may only appear as a `pubkey` query
/// parameter.
pub fn parse_strict(raw: &str) -> Result<PoolUrl, PoolUrlError> {
    let url = Url::parse(raw)?;

    if !KNOWN_SCHEMES.contains(&url.scheme()) {
        return Err(PoolUrlError::UnknownScheme(url.scheme().to_string()));
    }
    let host = url.host_str().ok_or(PoolUrlError::MissingHost)?.to_string();
    let port = url.port().ok_or(PoolUrlError::MissingPort)?;
    if url.fragment().is_some() {
        return Err(PoolUrlError::UnexpectedFragment);
    }

    Ok(PoolUrl {
        scheme: Some(url.scheme().to_string()),
        host: Some(host),
        port: Some(port),
        pubkey: pubkey_param(&url),
    })
}

/// Resolve a pool connection string, repairing known legacy
/// malformations when the strict parse rejects it. Never fails: empty
/// input yields `None`, hostless garbage yields the invalid marker.
pub fn resolve(raw: &str) -> Option<PoolUrl> {
    if let Ok(parsed) = parse_strict(raw) {
        return Some(parsed);
    }

    if raw.is_empty() {
        return None;
    }

    // A hostname only exists when the string carries a `//` authority
    // marker, either after a scheme or at the very start. Anything else
    // ("badstring", "host:port") has no authority and is the invalid
    // marker.
    let (explicit_scheme, parsed) = if raw.contains("://") {
        (true, Url::parse(raw).ok())
    } else if let Some(rest) = raw.strip_prefix("//") {
        (false, Url::parse(&format!("{DEFAULT_SCHEME}://{rest}")).ok())
    } else {
        (false, None)
    };

    let Some(url) = parsed else {
        return Some(PoolUrl::invalid());
    };
    let Some(host) = url.host_str() else {
        return Some(PoolUrl::invalid());
    };

    let scheme = if explicit_scheme {
        url.scheme().to_string()
    } else {
        DEFAULT_SCHEME.to_string()
    };
    let port = url.port().unwrap_or(match scheme.as_str() {
        "stratum+ssl" => STRATUM_SSL_DEFAULT_PORT,
        _ => STRATUM_DEFAULT_PORT,
    });

    // Legacy strings carry the pubkey as a fragment; fall back to the
    // query parameter the strict form uses.
    let pubkey = url
        .fragment()
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .or_else(|| pubkey_param(&url));

    Some(PoolUrl {
        scheme: Some(scheme),
        host: Some(host.to_string()),
        port: Some(port),
        pubkey,
    })
}

fn pubkey_param(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "pubkey")
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn strict_accepts_well_formed_url() {
        let parsed = parse_strict("stratum+tcp://pool.example.com:3333?pubkey=abc").unwrap();
        assert_eq!(parsed.scheme.as_deref(), Some("stratum+tcp"));
        assert_eq!(parsed.host.as_deref(), Some("pool.example.com"));
        assert_eq!(parsed.port, Some(3333));
        assert_eq!(parsed.pubkey.as_deref(), Some("abc"));
    }

    #[test_case("stratum+tcp://pool.example.com"; "missing_port")]
    #[test_case("https://pool.example.com:3333"; "unknown_scheme")]
    #[test_case("stratum+tcp://pool.example.com:3333#abc"; "fragment")]
    #[test_case("badstring"; "no_url_at_all")]
    fn strict_rejects(raw: &str) {
        assert!(parse_strict(raw).is_err());
    }

    #[test]
    fn resolve_passes_strict_result_through_unchanged() {
        let raw = "stratum+ssl://pool.example.com:443?pubkey=k";
        assert_eq!(resolve(raw).unwrap(), parse_strict(raw).unwrap());
    }

    #[test_case("//pool.example.com", "stratum+tcp", 4444; "no_scheme_defaults")]
    #[test_case("stratum://pool.example.com", "stratum", 4444; "stratum_default_port")]
    #[test_case("stratum+tcp://pool.example.com", "stratum+tcp", 4444; "stratum_tcp_default_port")]
    #[test_case("stratum+ssl://pool.example.com", "stratum+ssl", 4443; "stratum_ssl_default_port")]
    #[test_case("tcp://pool.example.com", "tcp", 4444; "other_scheme_falls_back_to_4444")]
    fn resolve_applies_defaults(raw: &str, scheme: &str, port: u16) {
        let record = resolve(raw).unwrap();
        assert_eq!(record.scheme.as_deref(), Some(scheme));
        assert_eq!(record.host.as_deref(), Some("pool.example.com"));
        assert_eq!(record.port, Some(port));
    }

    #[test]
    fn resolve_extracts_pubkey_from_fragment() {
        let record = resolve("stratum+tcp://pool.example.com:3333#abc123").unwrap();
        assert_eq!(record.scheme.as_deref(), Some("stratum+tcp"));
        assert_eq!(record.host.as_deref(), Some("pool.example.com"));
        assert_eq!(record.port, Some(3333));
        assert_eq!(record.pubkey.as_deref(), Some("abc123"));
    }

    #[test]
    fn resolve_prefers_fragment_over_query_pubkey() {
        let record = resolve("stratum+tcp://pool.example.com:3333?pubkey=query#frag").unwrap();
        assert_eq!(record.pubkey.as_deref(), Some("frag"));
    }

    #[test]
    fn resolve_extracts_pubkey_from_query_when_scheme_missing() {
        let record = resolve("//pool.example.com?pubkey=abc123").unwrap();
        assert_eq!(record.pubkey.as_deref(), Some("abc123"));
    }

    #[test]
    fn resolve_marks_hostless_string_invalid() {
        let record = resolve("badstring").unwrap();
        assert!(record.is_invalid());
        assert_eq!(record, PoolUrl::invalid());
    }

    #[test]
    fn resolve_empty_string_is_absent_not_invalid() {
        assert_eq!(resolve(""), None);
    }

    #[test]
    fn endpoint_renders_only_with_a_host() {
        let record = resolve("//pool.example.com").unwrap();
        assert_eq!(
            record.endpoint().as_deref(),
            Some("stratum+tcp://pool.example.com:4444")
        );
        assert_eq!(PoolUrl::invalid().endpoint(), None);
    }
}
