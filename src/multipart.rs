//! Multipart form parsing shared by the form-posting handlers.
//!
//! Text parts become [`RawFields`] (repeated names turn into lists, `name[]`
//! is treated as `name`); parts carrying a filename are collected as
//! [`UploadedFile`]s. An empty file part, as browsers send for an untouched
//! file input, is skipped.

use actix_multipart::Multipart;
use actix_web::HttpResponse;
use futures_util::TryStreamExt;
use log::debug;
use sanitize_filename::sanitize;

use crate::documents::RawFields;
use crate::ErrorResponse;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct FormData {
    pub fields: RawFields,
    pub files: Vec<UploadedFile>,
}

impl FormData {
    /// Takes the first file submitted under `field`.
    pub fn take_file(&mut self, field: &str) -> Option<UploadedFile> {
        let index = self.files.iter().position(|f| f.field == field)?;
        Some(self.files.remove(index))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MultipartParseError {
    #[error("Multipart field error: {0}")]
    FieldError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Invalid UTF-8 data in field {0}")]
    Utf8Error(String),
    #[error("Payload exceeds {0} bytes")]
    TooLarge(usize),
}

impl From<MultipartParseError> for HttpResponse {
    fn from(error: MultipartParseError) -> Self {
        match error {
            MultipartParseError::IoError(_) => HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(&error.to_string())),
            MultipartParseError::TooLarge(_) => HttpResponse::PayloadTooLarge()
                .json(ErrorResponse::new("PayloadTooLarge", &error.to_string())),
            _ => HttpResponse::BadRequest().json(ErrorResponse::bad_request(&error.to_string())),
        }
    }
}

pub struct MultipartParser;

impl MultipartParser {
    /// Reads the whole form, failing once more than `max_bytes` were received.
    pub async fn parse_form(
        mut multipart: Multipart,
        max_bytes: usize,
    ) -> Result<FormData, MultipartParseError> {
        let mut form = FormData::default();
        let mut received = 0usize;

        while let Some(mut field) = multipart
            .try_next()
            .await
            .map_err(|e| MultipartParseError::FieldError(e.to_string()))?
        {
            let content_disposition = field.content_disposition().ok_or_else(|| {
                MultipartParseError::FieldError("Content disposition not found".to_string())
            })?;
            let name = content_disposition
                .get_name()
                .ok_or_else(|| MultipartParseError::FieldError("Field name not found".to_string()))?
                .trim_end_matches("[]")
                .to_string();
            let filename = content_disposition.get_filename().map(sanitize);

            let mut buffer = Vec::new();
            while let Some(chunk) = field
                .try_next()
                .await
                .map_err(|e| MultipartParseError::IoError(e.to_string()))?
            {
                received += chunk.len();
                if received > max_bytes {
                    return Err(MultipartParseError::TooLarge(max_bytes));
                }
                buffer.extend_from_slice(&chunk);
            }

            match filename {
                Some(filename) => {
                    if filename.is_empty() || buffer.is_empty() {
                        debug!("Skipping empty file part '{}'", name);
                        continue;
                    }
                    form.files.push(UploadedFile {
                        field: name,
                        filename,
                        bytes: buffer,
                    });
                }
                None => {
                    let value = String::from_utf8(buffer)
                        .map_err(|_| MultipartParseError::Utf8Error(name.clone()))?;
                    form.fields.push(name, value);
                }
            }
        }

        Ok(form)
    }
}
