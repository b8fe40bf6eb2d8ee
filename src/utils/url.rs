//! String-level url helpers.
//!
//! Resource references are kept as written in the page (relative paths,
//! query suffixes, protocol-relative cdn links), so most helpers work on
//! plain strings. The `url` crate is only used where segments must be
//! resolved (`../` collapsing and joining).

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static SERVER_ROOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^/:]+(:[0-9]+)?").unwrap());

/// Remote references: `http://`, `https://` and protocol-relative `//host/..`.
pub fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://") || url.starts_with("//")
}

/// Inline `data:` uri (never downloaded or rewritten).
pub fn is_data(url: &str) -> bool {
    url.trim_start().starts_with("data:")
}

/// Turn a protocol-relative reference into a fetchable url.
pub fn absolute(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{url}")
    } else {
        url.to_string()
    }
}

/// Cut off `?query` and `#fragment` parts.
///
/// A separator at position 0 is kept: `#id` or `?x` alone is not a path.
pub fn clear_params(url: &str) -> &str {
    let mut res = url;
    for sep in ['?', '#'] {
        if let Some(i) = res.find(sep)
            && i > 0
        {
            res = &res[..i];
        }
    }
    res
}

fn name_separator(url: &str) -> Option<usize> {
    url.rfind(['/', '\\'])
}

/// Last path segment without parameters (`https://x/a/lib.js?v=1` -> `lib.js`).
pub fn file_name(url: &str) -> &str {
    let res = clear_params(url);
    match name_separator(res) {
        Some(i) => &res[i + 1..],
        None => res,
    }
}

/// Url up to and including the last `/` (`https://x/a/lib.js` -> `https://x/a/`).
pub fn base_url(url: &str) -> Option<&str> {
    let res = clear_params(url);
    name_separator(res)
        .filter(|&i| i > 0)
        .map(|i| &res[..=i])
}

/// Scheme, host and port (`https://x:8080/a/lib.js` -> `https://x:8080`).
pub fn server_root(url: &str) -> Option<&str> {
    SERVER_ROOT.find(url).map(|m| m.as_str())
}

/// Whether the file name part ends with a short extension.
///
/// Urls without one (`https://unpkg.com/vue@2`) usually redirect to the
/// actual file. All-digit suffixes are version numbers (`vue@2.7.14`).
pub fn has_extension(url: &str) -> bool {
    let name = file_name(url);
    match name.rfind('.') {
        Some(i) if i > 0 => {
            let ext = &name[i + 1..];
            (1..=5).contains(&ext.len()) && !ext.bytes().all(|b| b.is_ascii_digit())
        }
        _ => false,
    }
}

/// Replace the file name inside a url, keeping the path and any parameters.
pub fn replace_file_name(url: &str, old: &str, new: &str) -> String {
    let path = clear_params(url);
    let params = &url[path.len()..];
    match path.rfind(old) {
        Some(i) if path.len() == i + old.len() => {
            format!("{}{new}{params}", &path[..i])
        }
        _ => url.to_string(),
    }
}

/// Collapse `.` and `..` segments. Unparseable input is returned as is.
pub fn normalize(url: &str) -> String {
    Url::parse(url).map_or_else(|_| url.to_string(), |u| u.to_string())
}

/// Resolve `reference` against `base` the way a browser would.
pub fn join(base: &str, reference: &str) -> String {
    Url::parse(base)
        .and_then(|b| b.join(reference))
        .map_or_else(|_| format!("{base}{reference}"), |u| u.to_string())
}
