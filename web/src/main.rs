use dioxus::prelude::*;

use ui::components::app_navbar::{register_nav, NavBuilder};
use ui::components::AppNavbar;
use ui::views::{Inventory, Settings};

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(WebNavbar)]
    #[route("/")]
    Inventory {},
    #[route("/settings")]
    Settings {},
}

// Shared theme (ui/assets/theme/main.css), inlined so web and desktop never drift.
const MAIN_CSS_INLINE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../ui/assets/theme/main.css"
));

fn nav_inventory(label: &str) -> Element {
    rsx!(Link {
        class: "navbar__link",
        to: Route::Inventory {},
        "{label}"
    })
}
fn nav_settings(label: &str) -> Element {
    rsx!(Link {
        class: "navbar__link",
        to: Route::Settings {},
        "{label}"
    })
}

fn main() {
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    {
        ui::i18n::init();
        register_nav(NavBuilder {
            inventory: nav_inventory,
            settings: nav_settings,
        });
    }

    let lang_code = use_signal(|| "en-US".to_string());
    use_context_provider(|| lang_code);

    rsx! {
        document::Style { "{MAIN_CSS_INLINE}" }

        div {
            key: "{lang_code()}",
            Router::<Route> {}
        }
    }
}

/// A web-specific Router around the shared `Navbar` component
/// which allows us to use the web-specific `Route` enum.
#[component]
fn WebNavbar() -> Element {
    rsx! {
        AppNavbar { }
        Outlet::<Route> {}
    }
}
