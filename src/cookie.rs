//! Document cookie handling.
//!
//! The widget reads its CSRF token from a cookie the server collaborator
//! issued. [`read_cookie`] is the lookup over a `document.cookie`-style string
//! (`"a=1; csrftoken=XYZ; b=2"`); [`CookieJar`] keeps such a string current
//! from `Set-Cookie` response headers and renders the `Cookie` request header.

use percent_encoding::percent_decode_str;

/// Look up `name` in a `"k=v; k2=v2"` cookie string.
///
/// Returns the percent-decoded value of the first matching entry, or `None`
/// when the string is empty or has no such entry. Invalid UTF-8 after
/// decoding is replaced rather than rejected.
pub fn read_cookie(cookie_string: &str, name: &str) -> Option<String> {
    if cookie_string.is_empty() {
        return None;
    }

    cookie_string.split(';').find_map(|entry| {
        let value = entry.trim().strip_prefix(name)?.strip_prefix('=')?;
        Some(percent_decode_str(value).decode_utf8_lossy().into_owned())
    })
}

/// Ordered name/value store mirroring the browser's cookie string.
///
/// Values are kept exactly as the server sent them (still encoded);
/// decoding happens on lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    entries: Vec<(String, String)>,
}

impl CookieJar {
    /// Create an empty jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a jar from a `"k=v; k2=v2"` string. Entries without `=` are skipped.
    pub fn parse(cookie_string: &str) -> Self {
        let mut jar = Self::new();
        for entry in cookie_string.split(';') {
            if let Some((name, value)) = entry.trim().split_once('=') {
                let name = name.trim();
                if !name.is_empty() {
                    jar.set(name, value.trim());
                }
            }
        }
        jar
    }

    /// Decoded value of `name`, if present.
    pub fn get(&self, name: &str) -> Option<String> {
        read_cookie(&self.cookie_string(), name)
    }

    /// Insert or replace `name`, keeping the original position on replace.
    pub fn set(&mut self, name: &str, value: &str) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((name.to_string(), value.to_string())),
        }
    }

    /// Remove `name`. Returns whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(n, _)| n != name);
        before != self.entries.len()
    }

    /// Apply one `Set-Cookie` header value.
    ///
    /// Only the leading `name=value` pair and the `Max-Age` attribute are
    /// honoured; `Max-Age=0` (or negative) deletes the cookie.
    pub fn absorb_set_cookie(&mut self, header: &str) {
        let mut parts = header.split(';');
        let Some((name, value)) = parts.next().and_then(|pair| pair.trim().split_once('=')) else {
            return;
        };
        let name = name.trim();
        if name.is_empty() {
            return;
        }

        let expired = parts.any(|attr| {
            attr.trim()
                .split_once('=')
                .filter(|(key, _)| key.trim().eq_ignore_ascii_case("max-age"))
                .and_then(|(_, secs)| secs.trim().parse::<i64>().ok())
                .is_some_and(|secs| secs <= 0)
        });

        if expired {
            self.remove(name);
        } else {
            self.set(name, value.trim().trim_matches('"'));
        }
    }

    /// The jar as a `"k=v; k2=v2"` string, suitable for a `Cookie` header.
    pub fn cookie_string(&self) -> String {
        self.entries
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Number of cookies held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the jar holds no cookies.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
