//! Multipart payloads.
//!
//! DESIGN
//! ======
//! Payloads are kept as plain data until the moment of sending so they can
//! be inspected in tests and cloned; `reqwest::multipart::Form` is neither.
//! The boundary and `Content-Type` are generated by reqwest at send time.

#[cfg(test)]
#[path = "multipart_test.rs"]
mod tests;

use std::path::Path;

use reqwest::multipart::{Form, Part};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartValue {
    Text(String),
    File { file_name: String, bytes: Vec<u8>, mime: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartField {
    pub name: String,
    pub value: MultipartValue,
}

/// Ordered list of form fields. Repeated names are allowed (`files`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartPayload {
    fields: Vec<MultipartField>,
}

impl MultipartPayload {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_text(name, value);
        self
    }

    #[must_use]
    pub fn file(mut self, name: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = mime_for_name(&file_name).map(ToOwned::to_owned);
        self.fields.push(MultipartField {
            name: name.into(),
            value: MultipartValue::File { file_name, bytes, mime },
        });
        self
    }

    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push(MultipartField { name: name.into(), value: MultipartValue::Text(value.into()) });
    }

    /// Read `path` and append it as a file part named `name`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be read.
    pub async fn attach_path(&mut self, name: &str, path: &Path) -> std::io::Result<()> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_owned(), |n| n.to_string_lossy().into_owned());
        let mime = mime_for_name(&file_name).map(ToOwned::to_owned);
        self.fields.push(MultipartField {
            name: name.to_owned(),
            value: MultipartValue::File { file_name, bytes, mime },
        });
        Ok(())
    }

    #[must_use]
    pub fn fields(&self) -> &[MultipartField] {
        &self.fields
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Text value of the first field called `name`.
    #[must_use]
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|field| match &field.value {
            MultipartValue::Text(value) if field.name == name => Some(value.as_str()),
            _ => None,
        })
    }

    #[must_use]
    pub fn file_count(&self, name: &str) -> usize {
        self.fields
            .iter()
            .filter(|field| field.name == name && matches!(field.value, MultipartValue::File { .. }))
            .count()
    }

    pub(crate) fn into_form(self) -> Result<Form, reqwest::Error> {
        let mut form = Form::new();
        for field in self.fields {
            form = match field.value {
                MultipartValue::Text(value) => form.text(field.name, value),
                MultipartValue::File { file_name, bytes, mime } => {
                    let mut part = Part::bytes(bytes).file_name(file_name);
                    if let Some(mime) = mime {
                        part = part.mime_str(&mime)?;
                    }
                    form.part(field.name, part)
                }
            };
        }
        Ok(form)
    }
}

/// Content type for the attachment kinds the platform accepts.
fn mime_for_name(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "zip" => "application/zip",
        _ => return None,
    };
    Some(mime)
}
