use crate::i18n::{self};
use crate::t;
use dioxus::prelude::*;
use once_cell::sync::OnceCell;
use tracing::debug;

// Shared navbar stylesheet (inlined as well for release desktop builds)
const NAVBAR_CSS: Asset = asset!("/assets/styling/navbar.css");
const NAVBAR_CSS_INLINE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/assets/styling/navbar.css"
));

/// Route links supplied by the platform crate, which owns the `Route` enum.
///
/// Each function receives the localized label and returns a `Link` that
/// contains it:
/// ```ignore
/// register_nav(NavBuilder {
///     inventory: |label| rsx!( Link { class: "navbar__link", to: Route::Inventory {}, "{label}" } ),
///     settings: |label| rsx!( Link { class: "navbar__link", to: Route::Settings {}, "{label}" } ),
/// });
/// ```
/// Without a registered builder `AppNavbar` renders its `children` instead.
pub struct NavBuilder {
    pub inventory: fn(label: &str) -> Element,
    pub settings: fn(label: &str) -> Element,
}

static NAV_BUILDER: OnceCell<NavBuilder> = OnceCell::new();

pub fn register_nav(builder: NavBuilder) {
    let _ = NAV_BUILDER.set(builder);
}

#[component]
pub fn AppNavbar(children: Element) -> Element {
    i18n::init();

    let mut current_lang = use_signal(|| "en-US".to_string());
    let langs = use_signal(i18n::available_languages);
    let show_switcher = langs().len() > 1;
    // Obtain global language code signal if the platform (web crate) provided it.
    let lang_code_ctx: Option<Signal<String>> = try_use_context::<Signal<String>>();
    // Establish a reactive dependency on the global language code (if provided)
    let lang_marker = lang_code_ctx.as_ref().map(|c| c()).unwrap_or_default();

    debug!(lang = %lang_marker, "AppNavbar render");

    let on_change = move |evt: dioxus::events::FormEvent| {
        let val = evt.value();
        if i18n::set_language(&val).is_ok() {
            current_lang.set(val.clone());
            if let Some(mut code) = lang_code_ctx {
                code.set(val);
            }
        }
    };

    // Localized route links, when the platform registered them.
    let internal_nav: Option<Element> = NAV_BUILDER.get().map(|b| {
        let inventory = (b.inventory)(&t!("nav-inventory"));
        let settings = (b.settings)(&t!("nav-settings"));

        rsx! {
            nav { class: "navbar__links",
                {inventory}
                {settings}
            }
        }
    });

    let tagline = t!("tagline");

    rsx! {
        document::Link { rel: "stylesheet", href: NAVBAR_CSS }
        if cfg!(all(not(debug_assertions), not(target_arch = "wasm32"))) {
            document::Style { "{NAVBAR_CSS_INLINE}" }
        }

        header {
            id: "navbar",
            class: "navbar",
            // Keeps a reactive read of the language signal in the tree.
            div { style: "display:none", "{lang_marker}" }
            div { class: "navbar__inner",
                div { class: "navbar__brand",
                    span { class: "navbar__brand-link",
                        span { class: "navbar__brand-spark", aria_hidden: "true" }
                        span { class: "navbar__brand-mark", "Vaultkeep" }
                    }
                    span { class: "navbar__brand-subtitle", "{tagline}" }
                }

                if let Some(nav) = internal_nav {
                    {nav}
                } else {
                    nav { class: "navbar__links", {children} }
                }

                if show_switcher {
                    div { class: "navbar__locale",
                        label {
                            class: "visually-hidden",
                            r#for: "locale-select",
                            {t!("nav-language-label")}
                        }
                        select {
                            id: "locale-select",
                            value: "{current_lang()}",
                            oninput: on_change,
                            { langs().iter().map(|code| {
                                let c = code.clone();
                                rsx!{
                                    option { key: "{c}", value: "{c}", "{c}" }
                                }
                            })}
                        }
                    }
                }
            }
        }
    }
}
