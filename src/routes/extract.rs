use std::collections::HashMap;

use axum::extract::{rejection::JsonRejection, FromRequest, Multipart};
use bytes::Bytes;

use crate::error::{Error, Result};

/// `axum::Json` whose rejections render as `{"message": ...}` 400s.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::BadRequest(rejection.body_text())
    }
}

/// Text fields and file parts of a multipart form, keyed by field name.
#[derive(Debug, Default)]
pub struct FormParts {
    texts: HashMap<String, String>,
    files: HashMap<String, Bytes>,
}

impl FormParts {
    pub async fn read(mut multipart: Multipart, file_fields: &[&str]) -> Result<Self> {
        let mut parts = FormParts::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            if file_fields.contains(&name.as_str()) {
                let data = field.bytes().await?;
                if !data.is_empty() {
                    parts.files.insert(name, data);
                }
            } else {
                let text = field.text().await?;
                parts.texts.insert(name, text);
            }
        }
        Ok(parts)
    }

    /// Trimmed, non-empty text value.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts
            .get(name)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    /// Untrimmed value, for secrets.
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.texts.get(name).map(String::as_str).filter(|s| !s.is_empty())
    }

    pub fn take_file(&mut self, name: &str) -> Option<Bytes> {
        self.files.remove(name)
    }
}
