use dioxus::prelude::*;
use tracing::debug;

use crate::components::ExpandableTextBlock;
use crate::t;

/// Lines an item description shows before it is expanded.
const DESCRIPTION_LINES: i64 = 2;

#[derive(Debug, Clone, PartialEq)]
struct ItemCard {
    name: String,
    description: String,
}

fn featured_items() -> Vec<ItemCard> {
    vec![
        ItemCard {
            name: t!("item-fatebringer-name"),
            description: t!("item-fatebringer-desc"),
        },
        ItemCard {
            name: t!("item-gjallarhorn-name"),
            description: t!("item-gjallarhorn-desc"),
        },
        ItemCard {
            name: t!("item-ace-name"),
            description: t!("item-ace-desc"),
        },
    ]
}

#[component]
pub fn Inventory() -> Element {
    // Subscribe to global language code (if provided) so we re-render on change.
    let lang_code: Option<Signal<String>> = try_use_context::<Signal<String>>();
    let lang_current = lang_code
        .as_ref()
        .map(|s| s())
        .unwrap_or_else(|| "en-US".to_string());
    debug!(lang = %lang_current, "Inventory render");

    let items = featured_items();

    rsx! {
        section { class: "page page-inventory",
            h1 { {t!("inventory-title")} }
            p { {t!("inventory-intro")} }

            ul { class: "inventory__items",
                for item in items.into_iter() {
                    li { key: "{item.name}", class: "item-card",
                        h2 { class: "item-card__name", "{item.name}" }
                        ExpandableTextBlock {
                            lines_when_closed: DESCRIPTION_LINES,
                            class: "item-card__description",
                            p { "{item.description}" }
                        }
                    }
                }
            }
        }
    }
}
