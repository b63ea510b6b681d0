//! Platform glue for handing files to the user.

use crate::storage::StorageError;

/// Where a download ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Browser download started; the browser picks the location.
    Browser,
    /// Written to this path on disk.
    Saved(String),
}

/// `YYYYMMDD_HHMMSS` in UTC, used to keep export filenames unique.
pub fn timestamp_slug() -> String {
    use time::{macros::format_description, OffsetDateTime};

    OffsetDateTime::now_utc()
        .format(&format_description!(
            "[year][month][day]_[hour][minute][second]"
        ))
        .unwrap_or_else(|_| "export".into())
}

pub fn download_bytes(filename: &str, mime: &str, bytes: Vec<u8>) -> Result<Delivery, StorageError> {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;
        use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

        let array = js_sys::Uint8Array::from(bytes.as_slice());
        let parts = js_sys::Array::new();
        parts.push(&array.buffer());

        let opts = BlobPropertyBag::new();
        opts.set_type(mime);
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &opts)
            .map_err(|_| StorageError::Backend("failed to create blob".into()))?;
        let url = Url::create_object_url_with_blob(&blob)
            .map_err(|_| StorageError::Backend("unable to create download".into()))?;

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or(StorageError::Unavailable("document"))?;
        let anchor: HtmlAnchorElement = document
            .create_element("a")
            .map_err(|_| StorageError::Backend("unable to create anchor".into()))?
            .dyn_into()
            .map_err(|_| StorageError::Backend("anchor cast failed".into()))?;
        anchor.set_href(&url);
        anchor.set_download(filename);
        anchor.style().set_property("display", "none").ok();

        document
            .body()
            .ok_or(StorageError::Unavailable("document body"))?
            .append_child(&anchor)
            .ok();
        anchor.click();
        anchor.remove();
        Url::revoke_object_url(&url).ok();

        Ok(Delivery::Browser)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = mime;
        let dir = desktop_export_dir()?;
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(filename);
        std::fs::write(&path, bytes)?;
        Ok(Delivery::Saved(path.to_string_lossy().to_string()))
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn desktop_export_dir() -> Result<std::path::PathBuf, StorageError> {
    let dirs = directories::ProjectDirs::from("com", "Vaultkeep", "Vaultkeep")
        .ok_or(StorageError::Unavailable("export directory"))?;
    Ok(dirs.data_dir().join("exports"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_is_date_and_time() {
        let slug = timestamp_slug();
        assert_eq!(slug.len(), 15);
        assert_eq!(slug.as_bytes()[8], b'_');
        assert!(slug.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }
}
