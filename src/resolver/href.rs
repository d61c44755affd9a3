//! Base-relative address resolution.
//!
//! Addresses that parse as URLs (`http:`, `https:`, `file:`) are joined with
//! [`reqwest::Url::join`]. Plain paths, which is what the CLI and most tests
//! use, are joined lexically against the base's directory.

use reqwest::Url;

use crate::core::MetatreeError;

/// Resolve `target` as referenced from the document at `base`.
///
/// The fragment is dropped since it never selects a different document.
pub fn resolve_href(base: &str, target: &str) -> Result<String, MetatreeError> {
    let target = strip_fragment(target.trim());
    let invalid = || MetatreeError::InvalidAddress {
        base: base.to_string(),
        target: target.to_string(),
    };

    if target.is_empty() {
        return Err(invalid());
    }

    if has_scheme(target) {
        let mut url = Url::parse(target).map_err(|_| invalid())?;
        url.set_fragment(None);
        return Ok(url.to_string());
    }

    if let Ok(base_url) = Url::parse(base)
        && has_scheme(base)
    {
        let mut url = base_url.join(target).map_err(|_| invalid())?;
        url.set_fragment(None);
        return Ok(url.to_string());
    }

    Ok(join_paths(base, target))
}

fn strip_fragment(href: &str) -> &str {
    href.split_once('#').map_or(href, |(before, _)| before)
}

/// `scheme:` prefix per RFC 3986, excluding single-letter Windows drives.
fn has_scheme(href: &str) -> bool {
    let Some((scheme, _)) = href.split_once(':') else {
        return false;
    };
    scheme.len() > 1
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn join_paths(base: &str, target: &str) -> String {
    let joined = if target.starts_with('/') {
        target.to_string()
    } else {
        match base.rfind('/') {
            Some(slash) => format!("{}{target}", &base[..=slash]),
            None => target.to_string(),
        }
    };
    normalize(&joined)
}

/// Collapse `.` and `..` segments. Leading `..` survives on relative paths.
fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let body = segments.join("/");
    if absolute { format!("/{body}") } else { body }
}
