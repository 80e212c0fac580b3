use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

/// Multipart field carrying the upload.
pub const PDF_FILE_FIELD: &str = "pdf_file";

pub const MSG_NO_FILE: &str = "No file was submitted.";
pub const MSG_NOT_A_FILE: &str =
    "The submitted data was not a file. Check the encoding type on the form.";
pub const MSG_NO_FILENAME: &str = "No filename could be determined.";
pub const MSG_EMPTY_FILE: &str = "The submitted file is empty.";
pub const MSG_NOT_PDF: &str = "File must be a PDF. Please upload a valid PDF file.";

/// The validated part of an upload: its sanitized file name.
#[derive(Debug, Validate)]
pub struct PdfUploadForm {
    #[validate(custom(function = "validate_pdf_file_name"))]
    pub pdf_file: String,
}

fn validate_pdf_file_name(name: &str) -> Result<(), ValidationError> {
    if crate::utils::has_pdf_extension(name) {
        Ok(())
    } else {
        Err(message_error("invalid_extension", MSG_NOT_PDF))
    }
}

fn message_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Field-level failure on `pdf_file` raised before validation proper, e.g.
/// when the field is missing altogether.
pub fn pdf_file_error(code: &'static str, message: &'static str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(PDF_FILE_FIELD, message_error(code, message));
    errors
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversionResponse {
    pub status: String,
    pub message: String,
    pub docx_file: String,
    pub download_url: String,
    pub pdf_file: String,
}

impl ConversionResponse {
    pub fn success(pdf_file: String, docx_file: String, download_url: String) -> Self {
        Self {
            status: "success".to_string(),
            message: "PDF converted to DOCX successfully".to_string(),
            docx_file,
            download_url,
            pdf_file,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

impl HealthResponse {
    pub fn running() -> Self {
        Self {
            status: "success".to_string(),
            message: "Service is running".to_string(),
        }
    }
}
