use std::rc::Rc;

use dioxus::prelude::*;
use tracing::{debug, warn};

use crate::core::expandable::ExpandableState;

/// Collapses its children to `lines_when_closed` lines; clicking shows all of
/// it. Opens by itself when the text already fits.
///
/// `already_open` lets a parent force it open. A non-positive line count
/// disables clamping.
#[component]
pub fn ExpandableTextBlock(
    children: Element,
    lines_when_closed: i64,
    #[props(default)] already_open: bool,
    #[props(into, default)] class: String,
) -> Element {
    let mut block = use_signal(|| ExpandableState::new(lines_when_closed, already_open));
    let mut wrapper = use_signal(|| Option::<Rc<MountedData>>::None);
    let mut content = use_signal(|| Option::<Rc<MountedData>>::None);

    // Second pass, once the closed height has been committed.
    use_effect(move || {
        if !block.read().awaiting_fit_check() {
            return;
        }
        let (Some(wrapper_node), Some(content_node)) = (wrapper(), content()) else {
            return;
        };
        spawn(async move {
            let wrapper_height = measure_height(&wrapper_node).await;
            let content_height = measure_height(&content_node).await;
            if let Some(fit) = block.write().check_fit(wrapper_height, content_height) {
                debug!(?fit, wrapper_height, content_height, "text block fit check");
            }
        });
    });

    let mut expand = move || {
        if !block.peek().is_open() {
            block.write().activate();
        }
    };

    let snapshot = block();
    let closed = !snapshot.is_open();
    let expanded = snapshot.is_open().to_string();

    rsx! {
        div {
            class: snapshot.container_class(&class),
            style: snapshot.container_style(),
            role: if closed { "button" },
            tabindex: if closed { "0" },
            aria_expanded: expanded,
            onmounted: move |evt: MountedEvent| wrapper.set(Some(evt.data())),
            onclick: move |_| expand(),
            onkeydown: move |evt| {
                let key = evt.key().to_string().to_lowercase();
                if key == "enter" || key == " " {
                    evt.prevent_default();
                    expand();
                }
            },
            div {
                style: snapshot.content_style(),
                // First pass, with clamp styling still applied.
                onmounted: move |evt: MountedEvent| {
                    let node = evt.data();
                    content.set(Some(node.clone()));
                    if block.peek().needs_measurement() {
                        spawn(async move {
                            let height = measure_height(&node).await;
                            block.write().record_closed_height(height);
                        });
                    }
                },
                {children}
            }
        }
    }
}

/// Rendered height in CSS pixels; a failed read counts as zero.
async fn measure_height(node: &MountedData) -> f64 {
    match node.get_client_rect().await {
        Ok(rect) => rect.size.height,
        Err(err) => {
            warn!("text block measurement failed: {err:?}");
            0.0
        }
    }
}
