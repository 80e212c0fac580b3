pub mod conversion;

pub use conversion::{
    pdf_file_error, ConversionResponse, HealthResponse, PdfUploadForm, MSG_EMPTY_FILE,
    MSG_NOT_A_FILE, MSG_NO_FILE, MSG_NO_FILENAME, MSG_NOT_PDF, PDF_FILE_FIELD,
};
