pub mod filename;
pub mod url;

pub use filename::{docx_file_name, has_pdf_extension, sanitize_file_name};
pub use url::{build_download_url, request_origin};
