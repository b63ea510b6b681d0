#![cfg(test)]
//! The desktop build embeds the shared theme from `ui/assets/theme/main.css`.
//! A truncated file or broken path would only degrade styling at runtime, so
//! catch it here. Keep this in sync with `MAIN_CSS_INLINE` in `desktop/src/main.rs`.

const EMBEDDED_CSS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../ui/assets/theme/main.css"
));

#[test]
fn embedded_css_file_exists_and_is_not_empty() {
    assert!(
        !EMBEDDED_CSS.trim().is_empty(),
        "Embedded CSS file appears to be empty."
    );
}

#[test]
fn embedded_css_contains_expected_tokens() {
    let required = ["--color-bg", ".text-block", "body {", ".button--primary", ".storage"];
    for token in required {
        assert!(
            EMBEDDED_CSS.contains(token),
            "Expected token `{token}` missing from embedded CSS"
        );
    }
}
