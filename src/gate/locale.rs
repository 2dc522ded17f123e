//! Locale resolver: every page must be served under a supported locale.

use std::ops::ControlFlow;

use super::{Decision, StageResult};
use crate::i18n::routing::{first_segment, locale_of, looks_like_locale};
use crate::i18n::Locale;

/// Redirect pages without a supported locale prefix.
///
/// - `/` goes to `/{default}`
/// - an unsupported locale-shaped segment (`/xx/products`) goes to `/{default}`
/// - any other unprefixed path goes to `/{default}{path}`, keeping the query
pub fn resolve(path: &str, query: Option<&str>) -> StageResult {
    if locale_of(path).is_some() {
        return ControlFlow::Continue(());
    }

    let default = Locale::default_locale();

    let target = match first_segment(path) {
        _ if path == "/" => default.home_path(),
        Some(segment) if looks_like_locale(segment) => default.home_path(),
        _ => {
            let rooted = if path.starts_with('/') {
                format!("{}{}", default.home_path(), path)
            } else {
                format!("{}/{}", default.home_path(), path)
            };
            match query.filter(|q| !q.is_empty()) {
                Some(q) => format!("{}?{}", rooted, q),
                None => rooted,
            }
        }
    };

    ControlFlow::Break(Decision::Redirect(target))
}
