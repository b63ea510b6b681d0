use dioxus::prelude::*;

use crate::components::StorageSettingsPanel;

#[component]
pub fn Settings() -> Element {
    rsx! {
        section { class: "page page-settings",
            StorageSettingsPanel {}
        }
    }
}
