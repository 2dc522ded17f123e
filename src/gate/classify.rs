//! Path classification, the first stage of every request.

use std::sync::OnceLock;

use regex::Regex;

use crate::i18n::routing::{is_under, locale_of};

/// Static files the storefront serves itself
const ASSET_EXTENSIONS: &str = r"\.(?:svg|png|jpg|jpeg|gif|webp|ico|css|js|woff|woff2)$";

/// Framework internals and well-known files, matched against the start of the path
const EXCLUDED_PREFIXES: [&str; 6] = [
    "/_next/static",
    "/_next/image",
    "/favicon.ico",
    "/app-icon",
    "/robots.txt",
    "/sitemap.xml",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    ApiRoute,
    AdminRoute,
    LocaleRootedPage,
    BarePage,
    ExcludedAsset,
}

impl Classification {
    /// Pages are the only requests the locale resolver touches.
    pub fn is_page(&self) -> bool {
        matches!(
            self,
            Classification::LocaleRootedPage | Classification::BarePage
        )
    }
}

fn asset_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(ASSET_EXTENSIONS).expect("asset pattern is valid"))
}

/// Whether a path is served without any gating.
pub fn is_excluded_asset(path: &str) -> bool {
    EXCLUDED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
        || asset_pattern().is_match(path)
}

/// Classify a request path.
///
/// Admin paths win over every other rule so `/admin/export.csv` and
/// `/admin/logo.png` are still gated.
pub fn classify(path: &str) -> Classification {
    if is_under(path, "/admin") {
        Classification::AdminRoute
    } else if is_under(path, "/api") {
        Classification::ApiRoute
    } else if is_excluded_asset(path) {
        Classification::ExcludedAsset
    } else if locale_of(path).is_some() {
        Classification::LocaleRootedPage
    } else {
        Classification::BarePage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_routes() {
        assert_eq!(classify("/admin"), Classification::AdminRoute);
        assert_eq!(classify("/admin/orders"), Classification::AdminRoute);
        assert_eq!(classify("/admin/logo.png"), Classification::AdminRoute);
        assert_ne!(classify("/administrator"), Classification::AdminRoute);
    }

    #[test]
    fn test_api_routes() {
        assert_eq!(classify("/api"), Classification::ApiRoute);
        assert_eq!(classify("/api/reviews"), Classification::ApiRoute);
        assert_eq!(classify("/api/auth/callback/google"), Classification::ApiRoute);
        assert_eq!(classify("/apiary"), Classification::BarePage);
    }

    #[test]
    fn test_framework_internals() {
        assert_eq!(classify("/_next/static/chunks/main.js"), Classification::ExcludedAsset);
        assert_eq!(classify("/_next/image"), Classification::ExcludedAsset);
        assert_eq!(classify("/_next/webpack-hmr"), Classification::BarePage);
    }

    #[test]
    fn test_named_files() {
        for path in [
            "/favicon.ico",
            "/app-icon",
            "/app-icon-192",
            "/robots.txt",
            "/sitemap.xml",
        ] {
            assert_eq!(classify(path), Classification::ExcludedAsset, "path {path}");
        }
    }

    #[test]
    fn test_static_extensions() {
        for ext in [
            "svg", "png", "jpg", "jpeg", "gif", "webp", "ico", "css", "js", "woff", "woff2",
        ] {
            let path = format!("/en/images/banner.{ext}");
            assert_eq!(classify(&path), Classification::ExcludedAsset, "path {path}");
        }
    }

    #[test]
    fn test_other_extensions_are_pages() {
        assert_eq!(classify("/en/catalog.pdf"), Classification::LocaleRootedPage);
        assert_eq!(classify("/banner.PNG"), Classification::BarePage);
        assert_eq!(classify("/en/products/js"), Classification::LocaleRootedPage);
    }

    #[test]
    fn test_pages() {
        assert_eq!(classify("/en"), Classification::LocaleRootedPage);
        assert_eq!(classify("/ar/products/shirt"), Classification::LocaleRootedPage);
        assert_eq!(classify("/"), Classification::BarePage);
        assert_eq!(classify("/products"), Classification::BarePage);
        assert_eq!(classify("/xx/products"), Classification::BarePage);
    }

    #[test]
    fn test_is_page() {
        assert!(Classification::BarePage.is_page());
        assert!(Classification::LocaleRootedPage.is_page());
        assert!(!Classification::AdminRoute.is_page());
        assert!(!Classification::ApiRoute.is_page());
        assert!(!Classification::ExcludedAsset.is_page());
    }
}
