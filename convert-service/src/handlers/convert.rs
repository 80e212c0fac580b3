use crate::dtos::{
    pdf_file_error, ConversionResponse, PdfUploadForm, MSG_EMPTY_FILE, MSG_NOT_A_FILE,
    MSG_NO_FILE, MSG_NO_FILENAME, PDF_FILE_FIELD,
};
use crate::services::record_conversion;
use crate::startup::AppState;
use crate::utils::{build_download_url, docx_file_name, request_origin, sanitize_file_name};
use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::{HeaderMap, Uri},
    response::IntoResponse,
    Json,
};
use futures::{stream, StreamExt};
use service_core::error::AppError;
use std::time::Instant;
use validator::Validate;

/// `POST /convert/`: stores the uploaded PDF, converts it and answers with
/// a download URL for the DOCX.
pub async fn convert_pdf(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(%rejection, "Request body is not multipart");
        AppError::from(pdf_file_error("required", MSG_NO_FILE))
    })?;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some(PDF_FILE_FIELD) => {
                return convert_upload(&state, &headers, &uri, field).await;
            }
            Ok(Some(_)) => continue,
            Ok(None) => return Err(pdf_file_error("required", MSG_NO_FILE).into()),
            Err(e) => {
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "Failed to read multipart body: {}",
                    e
                )))
            }
        }
    }
}

async fn convert_upload(
    state: &AppState,
    headers: &HeaderMap,
    uri: &Uri,
    mut field: Field<'_>,
) -> Result<Json<ConversionResponse>, AppError> {
    let raw_name = field
        .file_name()
        .ok_or_else(|| AppError::from(pdf_file_error("invalid", MSG_NOT_A_FILE)))?;
    let pdf_file = sanitize_file_name(raw_name)
        .ok_or_else(|| AppError::from(pdf_file_error("no_name", MSG_NO_FILENAME)))?;

    // Nothing touches the disk until at least one byte has arrived.
    let first_chunk = loop {
        match field.chunk().await {
            Ok(Some(chunk)) if chunk.is_empty() => continue,
            Ok(chunk) => break chunk,
            Err(e) => {
                return Err(AppError::StorageError(
                    anyhow::Error::new(e).context("Failed to read upload stream"),
                ))
            }
        }
    };
    let first_chunk =
        first_chunk.ok_or_else(|| AppError::from(pdf_file_error("empty", MSG_EMPTY_FILE)))?;

    let form = PdfUploadForm { pdf_file };
    form.validate()?;

    let pdf_file = form.pdf_file;
    let docx_file = docx_file_name(&pdf_file);
    let started = Instant::now();

    tracing::info!(pdf_file = %pdf_file, docx_file = %docx_file, "PDF conversion started");

    let storage = &state.storage;
    let outcome = async {
        storage.ensure_dirs().await?;

        let pdf_path = storage.pdf_path(&pdf_file);
        let upload = stream::iter([Ok::<_, MultipartError>(first_chunk)]).chain(field);
        let size = storage.write_stream(&pdf_path, upload).await?;
        tracing::debug!(pdf_path = %pdf_path.display(), size, "Upload stored");

        let docx_path = storage.docx_path(&docx_file);
        state.converter.convert(&pdf_path, &docx_path).await
    }
    .await;

    let elapsed = started.elapsed();
    if let Err(err) = outcome {
        record_conversion(state.converter.name(), "failure", elapsed);
        tracing::error!(
            pdf_file = %pdf_file,
            elapsed_ms = elapsed.as_millis() as u64,
            error = %err,
            "PDF conversion failed"
        );
        return Err(if state.config.converter.expose_error_detail {
            err
        } else {
            err.sanitized()
        });
    }
    record_conversion(state.converter.name(), "success", elapsed);

    let origin = request_origin(headers, uri, state.config.http.trust_forwarded_headers);
    let download_url = build_download_url(&origin, &state.config.media.url, &docx_file);

    tracing::info!(
        pdf_file = %pdf_file,
        docx_file = %docx_file,
        elapsed_ms = elapsed.as_millis() as u64,
        "PDF conversion completed"
    );

    Ok(Json(ConversionResponse::success(
        pdf_file,
        docx_file,
        download_url,
    )))
}
