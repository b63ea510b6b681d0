//! Shared UI crate for Vaultkeep. Components, views and storage logic used by
//! every platform live here.

pub mod core;
pub mod i18n;
pub mod storage;
pub mod views;

pub mod components {
    // Localized application navbar (components/app_navbar.rs)
    pub mod app_navbar;
    pub use app_navbar::register_nav;
    pub use app_navbar::AppNavbar;
    pub use app_navbar::NavBuilder;

    mod expandable_text_block;
    pub use expandable_text_block::ExpandableTextBlock;

    pub mod storage_settings;
    pub use storage_settings::{DialogPrompter, StorageServices, StorageSettingsPanel};
}
