//! Internationalization (i18n) module for locale-rooted storefront routing.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for all supported locales and their metadata
//! - `locale`: Type-safe `Locale` validated against the registry
//! - `routing`: Path helpers (locale prefix detection, locale switching, link localization)
//!
//! The gate itself only needs locale detection and the registry (the health
//! endpoint reports each enabled locale with its direction). `switch_locale`,
//! `localize_href`, `Locale::dir`, `Locale::is_rtl` and `Locale::native_name`
//! are library API for code rendering storefront pages: the language switcher,
//! locale-prefixed links and the `<html dir>` attribute.
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_gate::i18n::{Locale, LocaleRegistry};
//!
//! let default = Locale::default_locale();
//! let arabic = Locale::from_code("ar")?;
//! assert!(arabic.is_rtl());
//! ```

mod locale;
mod registry;
pub mod routing;

pub use locale::Locale;
pub use registry::{LocaleConfig, LocaleRegistry, TextDirection};
