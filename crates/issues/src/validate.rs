//! Field checks applied to issues before they are stored.

use std::sync::LazyLock;

use regex::Regex;
use url::{Host, ParseError, Url};

use crate::error::ValidationError;

pub const MAX_IMG_LEN: usize = 256;

// ASCII letters and spaces, 1-64 chars.
static AUTHOR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z ]{1,64}$").expect("AUTHOR_REGEX: invalid regex pattern")
});

// ASCII letters, whitespace and . , ? !, 1-256 chars.
static TEXT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z.,?!\s]{1,256}$").expect("TEXT_REGEX: invalid regex pattern")
});

pub fn author(value: &str) -> Result<(), ValidationError> {
    if AUTHOR_REGEX.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::Author)
    }
}

pub fn text(value: &str) -> Result<(), ValidationError> {
    if TEXT_REGEX.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::Text)
    }
}

/// Accepts http, https and ftp URLs whose host is an IP address or a domain
/// with a top-level label, shorter than [`MAX_IMG_LEN`].
///
/// A value without a scheme, such as `example.com/pump.png`, is read as http.
pub fn img(value: &str) -> Result<(), ValidationError> {
    if value.len() >= MAX_IMG_LEN {
        return Err(ValidationError::Img);
    }
    let parsed = match Url::parse(value) {
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("http://{value}")).map_err(|_| ValidationError::Img)?
        }
        Err(_) => return Err(ValidationError::Img),
    };
    let scheme_ok = matches!(parsed.scheme(), "http" | "https" | "ftp");
    let host_ok = match parsed.host() {
        Some(Host::Domain(domain)) => has_tld(domain),
        Some(Host::Ipv4(_) | Host::Ipv6(_)) => true,
        None => false,
    };
    if scheme_ok && host_ok {
        Ok(())
    } else {
        Err(ValidationError::Img)
    }
}

// Last label at least two letters, e.g. `example.com` but not `localhost`.
fn has_tld(domain: &str) -> bool {
    let domain = domain.trim_end_matches('.');
    match domain.rsplit_once('.') {
        Some((name, tld)) => {
            !name.is_empty() && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
        }
        None => false,
    }
}

pub fn coordinate(axis: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::Coordinate { axis })
    }
}
