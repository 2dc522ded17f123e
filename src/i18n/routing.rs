//! Locale-aware path helpers shared by the gate and the storefront links.

use crate::i18n::Locale;

/// First non-empty segment of a path: `/en/products` -> `en`, `/` -> `None`.
pub fn first_segment(path: &str) -> Option<&str> {
    path.strip_prefix('/')
        .unwrap_or(path)
        .split('/')
        .next()
        .filter(|segment| !segment.is_empty())
}

/// The supported locale a path is rooted at, if any.
pub fn locale_of(path: &str) -> Option<Locale> {
    first_segment(path).and_then(|segment| Locale::from_code(segment).ok())
}

/// Whether a segment has the shape of a language tag (`xx`, `pt-BR`, `zh_tw`).
///
/// Used to tell a wrong locale (`/fr/products`) apart from an unprefixed page
/// (`/products`).
pub fn looks_like_locale(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    let is_pair = |pair: &[u8]| pair.iter().all(u8::is_ascii_alphabetic);

    match bytes.len() {
        2 => is_pair(bytes),
        5 => is_pair(&bytes[..2]) && matches!(bytes[2], b'-' | b'_') && is_pair(&bytes[3..]),
        _ => false,
    }
}

/// Rewrite `path` to the same page under `target`.
///
/// Replaces the leading locale segment when it matches `current`, otherwise
/// prepends `target`.
pub fn switch_locale(path: &str, current: Locale, target: Locale) -> String {
    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if segments.first() == Some(&current.code()) {
        segments[0] = target.code();
    } else {
        segments.insert(0, target.code());
    }

    format!("/{}", segments.join("/"))
}

/// Prefix an in-app href with the current locale.
///
/// External links, `mailto:`/`tel:` links, anchors, API and admin paths, and
/// hrefs that already carry the locale are returned unchanged.
pub fn localize_href(href: &str, locale: Locale) -> String {
    let passthrough = href.is_empty()
        || href.starts_with("http")
        || href.starts_with("//")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with('#')
        || is_under(href, "/api")
        || is_under(href, "/admin");

    if passthrough || locale_of(href) == Some(locale) {
        return href.to_string();
    }

    if href.starts_with('/') {
        format!("/{}{}", locale.code(), href)
    } else {
        format!("/{}/{}", locale.code(), href)
    }
}

/// `path` equals `root` or is a sub-path of it (`/admin`, `/admin/x`; not `/administrator`).
pub fn is_under(path: &str, root: &str) -> bool {
    match path.strip_prefix(root) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}
