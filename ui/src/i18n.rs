//! Fluent localization for the shared UI.
//!
//! `.ftl` bundles under `i18n/<lang>/vaultkeep-ui.ftl` are embedded at compile
//! time; `en-US` is the fallback every other locale must cover. Call [`init`]
//! once at startup, then look messages up with [`t!`](crate::t).
//!
//! Messages are rendered without Unicode bidi isolation marks so that
//! interpolated counts and paths read cleanly in native dialogs.

use std::sync::Once;

use i18n_embed::fluent::FluentLanguageLoader;
use i18n_embed::I18nEmbedError;
use once_cell::sync::Lazy;
use rust_embed::Embed;
use tracing::{debug, warn};
use unic_langid::LanguageIdentifier;

pub use i18n_embed_fl::fl;

/// `t!("key")` or `t!("key", name = value, ...)`, looked up in [`LOADER`].
#[macro_export]
macro_rules! t {
    ($key:literal) => {
        $crate::i18n::fl!(&*$crate::i18n::LOADER, $key)
    };
    ($key:literal, $( $arg:ident = $value:expr ),+ $(,)?) => {
        $crate::i18n::fl!(&*$crate::i18n::LOADER, $key, $( $arg = $value ),+ )
    };
}

/// Bundle name; also the `.ftl` file stem in every locale folder.
const DOMAIN: &str = "vaultkeep-ui";

#[derive(Embed)]
#[folder = "i18n"]
struct Localizations;

pub static LOADER: Lazy<FluentLanguageLoader> = Lazy::new(|| {
    let fallback: LanguageIdentifier = "en-US".parse().expect("valid fallback language identifier");
    FluentLanguageLoader::new(DOMAIN, fallback)
});

static INIT: Once = Once::new();

/// Load bundles for the platform's preferred languages. Safe to call repeatedly.
pub fn init() {
    INIT.call_once(|| {
        if let Err(err) = select(&requested_languages()) {
            warn!("failed selecting languages ({err}); continuing with fallback");
        }
    });
}

/// Switch language at runtime. Unparseable tags are ignored.
pub fn set_language(tag: &str) -> Result<(), I18nEmbedError> {
    let Ok(lang) = tag.parse::<LanguageIdentifier>() else {
        debug!(tag, "ignoring unparseable language tag");
        return Ok(());
    };
    select(&[lang])
}

/// Language folders embedded in the binary, sorted.
pub fn available_languages() -> Vec<String> {
    let mut langs: Vec<String> = Localizations::iter()
        .filter_map(|path| path.split('/').next().map(str::to_string))
        .collect();
    langs.sort();
    langs.dedup();
    langs
}

/// `select` replaces the loader's bundles, and fresh bundles isolate
/// placeables by default, so isolation is switched off after every load.
fn select(requested: &[LanguageIdentifier]) -> Result<(), I18nEmbedError> {
    i18n_embed::select(&*LOADER, &Localizations, requested)?;
    LOADER.set_use_isolating(false);
    Ok(())
}

/// Serializes tests that depend on the global language and pins it to `en-US`.
#[cfg(test)]
pub(crate) fn pin_english() -> std::sync::MutexGuard<'static, ()> {
    static LANGUAGE: std::sync::Mutex<()> = std::sync::Mutex::new(());
    let guard = LANGUAGE.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    init();
    set_language("en-US").unwrap();
    guard
}

#[cfg(target_arch = "wasm32")]
fn requested_languages() -> Vec<LanguageIdentifier> {
    i18n_embed::WebLanguageRequester::requested_languages()
}

#[cfg(not(target_arch = "wasm32"))]
fn requested_languages() -> Vec<LanguageIdentifier> {
    i18n_embed::DesktopLanguageRequester::requested_languages()
}
