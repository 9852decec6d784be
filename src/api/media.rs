use reqwest::multipart::{Form, Part};
use reqwest::Method;

use crate::client::ApiClient;
use crate::error::{Error, Result};
use crate::models::{Acknowledgement, MediaList, MediaUpload, UploadReceipt};

impl ApiClient {
    /// `POST /media/upload` as `multipart/form-data` (fields `file`,
    /// `site_name`, `replace`).
    ///
    /// Uploading a name that already exists without `replace` fails with a 409.
    pub async fn upload_media(&self, upload: MediaUpload) -> Result<UploadReceipt> {
        let mut file = Part::bytes(upload.bytes).file_name(upload.file_name);
        if let Some(mime_type) = upload.mime_type.as_deref() {
            file = file
                .mime_str(mime_type)
                .map_err(|e| Error::Config(format!("invalid MIME type {mime_type:?}: {e}")))?;
        }

        let form = Form::new()
            .part("file", file)
            .text("site_name", upload.site_name)
            .text("replace", upload.replace.to_string());

        let request = self.request(Method::POST, "/media/upload")?.multipart(form);
        self.send(request).await
    }

    pub async fn list_media(&self, site_name: &str) -> Result<MediaList> {
        let request = self
            .request(Method::GET, "/media/list")?
            .query(&[("site_name", site_name)]);
        self.send(request).await
    }

    pub async fn delete_media(&self, site_name: &str, filename: &str) -> Result<Acknowledgement> {
        let request = self
            .request(Method::DELETE, "/media/delete")?
            .query(&[("site_name", site_name), ("filename", filename)]);
        self.send(request).await
    }
}
