use super::{HTTP_PORT, HTTPS_PORT, MAX_HOST_LEN, MAX_PATH_LEN};
use heapless::String;

/// Where a redirect points: the host, port and path of the next request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTarget {
    /// Host name, without port.
    pub host: String<MAX_HOST_LEN>,
    /// TCP port.
    pub port: u16,
    /// Absolute path, always starting with `/`, query string included and
    /// fragment removed.
    pub path: String<MAX_PATH_LEN>,
}

impl RedirectTarget {
    /// Resolves a `Location` header value against the current host and port.
    ///
    /// Absolute URLs (`http://` or `https://`) name their own host, and port
    /// 80 or 443 unless one is given explicitly. Anything else is a path on
    /// the current host. Returns `None` for an empty or malformed value, or
    /// one that does not fit the fixed buffers.
    pub fn parse(location: &str, current_host: &str, current_port: u16) -> Option<Self> {
        let location = location.trim();
        if location.is_empty() {
            return None;
        }

        match split_scheme(location) {
            Some((scheme, rest)) => {
                let default_port = if scheme.eq_ignore_ascii_case("https") {
                    HTTPS_PORT
                } else {
                    HTTP_PORT
                };
                let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
                let (authority, path) = rest.split_at(authority_end);
                // Drop any userinfo.
                let authority = authority.rsplit('@').next().unwrap_or(authority);
                let (host, port) = match authority.rsplit_once(':') {
                    Some((host, port)) => (host, port.parse::<u16>().ok()?),
                    None => (authority, default_port),
                };
                if host.is_empty() {
                    return None;
                }
                Some(Self {
                    host: String::try_from(host).ok()?,
                    port,
                    path: rooted(path)?,
                })
            }
            None => Some(Self {
                host: String::try_from(current_host).ok()?,
                port: current_port,
                path: rooted(location)?,
            }),
        }
    }

    /// Whether following this target needs a connection to another host.
    pub fn is_cross_host(&self, current_host: &str) -> bool {
        !self.host.eq_ignore_ascii_case(current_host)
    }
}

/// The path (and query) of `url`, `/` when it has none.
///
/// A value that already is a path is returned unchanged.
pub fn endpoint_from_url(url: &str) -> &str {
    if url.starts_with('/') {
        return url;
    }
    let rest = match url.find("://") {
        Some(pos) => &url[pos + 3..],
        None => url,
    };
    match rest.find('/') {
        Some(pos) => &rest[pos..],
        None => "/",
    }
}

fn split_scheme(location: &str) -> Option<(&str, &str)> {
    let starts_with_http = location
        .get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("http"));
    if !starts_with_http {
        return None;
    }
    location.split_once("://")
}

// Rooted path with any `#fragment` dropped.
fn rooted(path: &str) -> Option<String<MAX_PATH_LEN>> {
    let path = path.split_once('#').map_or(path, |(path, _)| path);
    let mut rooted = String::new();
    if !path.starts_with('/') {
        rooted.push('/').ok()?;
    }
    rooted.push_str(path).ok()?;
    Some(rooted)
}
