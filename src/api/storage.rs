use super::{ApiError, Backend};
use reqwest::Method;

/// Bucket holding menu item photos.
pub const MENU_IMAGES_BUCKET: &str = "menu-images";

impl Backend {
    /// Upload a binary object and return the path it was stored under.
    pub async fn upload_object(
        &self,
        token: Option<&str>,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ApiError> {
        let url = self.storage_url(bucket, path);
        self.send_ok(
            self.request(Method::POST, url, token)
                .header("Content-Type", content_type.to_string())
                .body(bytes),
        )
        .await?;
        Ok(path.to_string())
    }

    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.config().base_url,
            bucket,
            path
        )
    }
}

/// Object name for an upload: `{epoch-millis}-{random-suffix}.{extension}`.
pub fn object_path(content_type: &str, uploaded_at_ms: i64, suffix: u32) -> String {
    format!(
        "{}-{:08x}.{}",
        uploaded_at_ms,
        suffix,
        extension_for(content_type)
    )
}

/// File extension from the MIME subtype, sanitized to lowercase
/// alphanumeric. Unusable subtypes fall back to "jpeg".
pub fn extension_for(content_type: &str) -> String {
    let subtype = content_type.split('/').nth(1).unwrap_or("");
    let cleaned: String = subtype
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    if cleaned.is_empty() {
        "jpeg".to_string()
    } else {
        cleaned
    }
}
