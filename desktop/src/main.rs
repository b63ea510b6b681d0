#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

#[cfg(feature = "desktop")]
use dioxus::desktop::{tao::window::WindowBuilder, Config};
use dioxus::prelude::*;

use ui::components::app_navbar::{register_nav, NavBuilder};
use ui::components::AppNavbar;

use ui::views::{Inventory, Settings};

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(DesktopNavbar)]
    #[route("/")]
    Inventory {},
    #[route("/settings")]
    Settings {},
}

const MAIN_CSS_INLINE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../ui/assets/theme/main.css"
)); // Embedded shared theme (ui/assets/theme/main.css); no separate desktop /assets needed.

#[cfg(feature = "desktop")]
fn main() {
    LaunchBuilder::desktop()
        .with_cfg(
            Config::new().with_window(
                WindowBuilder::new()
                    .with_title(format!("Vaultkeep – v{}", env!("CARGO_PKG_VERSION")))
                    .with_maximized(true),
            ),
        )
        .launch(App);
}

#[cfg(all(feature = "server", not(feature = "desktop")))]
fn main() {
    LaunchBuilder::server().launch(App);
}

fn nav_inventory(label: &str) -> Element {
    rsx!(Link { class: "navbar__link", to: Route::Inventory {}, "{label}" })
}
fn nav_settings(label: &str) -> Element {
    rsx!(Link { class: "navbar__link", to: Route::Settings {}, "{label}" })
}

#[component]
fn App() -> Element {
    ui::i18n::init();

    // AppNavbar updates this through context when the language changes.
    let lang_code = use_signal(|| "en-US".to_string());
    use_context_provider(|| lang_code);

    register_nav(NavBuilder {
        inventory: nav_inventory,
        settings: nav_settings,
    });

    rsx! {
        document::Style { "{MAIN_CSS_INLINE}" }

        // Keyed by language so the routed subtree remounts on change.
        div {
            key: "{lang_code()}",
            Router::<Route> { }
        }
    }
}

/// A desktop-specific Router around the shared `Navbar` component
/// which allows us to use the desktop-specific `Route` enum.
#[component]
fn DesktopNavbar() -> Element {
    rsx! {
        AppNavbar { }

        Outlet::<Route> {}
    }
}
