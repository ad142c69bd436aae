use axum::extract::multipart::{Multipart, MultipartRejection};
use imdg_utils::{
    validate_file_size, validate_file_type, validate_pdf_content, ImdgError, ImdgResult,
};

/// Form fields accepted as the PDF upload.
pub const UPLOAD_FIELDS: [&str; 2] = ["pdf", "file"];

#[derive(Debug)]
pub struct PdfUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Reads the first upload field carrying a file name.
///
/// A missing multipart body, a missing field and an empty file name are all
/// `MissingUpload`; nothing is written to disk here.
pub async fn read_pdf_upload(
    multipart: Result<Multipart, MultipartRejection>,
    max_size: usize,
) -> ImdgResult<PdfUpload> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Request carried no multipart body");
        ImdgError::MissingUpload
    })?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ImdgError::validation("multipart", e.to_string()))?
    {
        let is_upload = field
            .name()
            .map(|name| UPLOAD_FIELDS.contains(&name))
            .unwrap_or(false);
        if !is_upload {
            continue;
        }

        let file_name = match field.file_name() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => return Err(ImdgError::MissingUpload),
        };

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ImdgError::validation("multipart", e.to_string()))?;

        validate_file_type(&file_name, &["pdf"])?;
        validate_file_size(bytes.len() as u64, max_size as u64)?;
        validate_pdf_content(&bytes)?;

        return Ok(PdfUpload {
            file_name,
            bytes: bytes.to_vec(),
        });
    }

    tracing::debug!("No file part in the request");
    Err(ImdgError::MissingUpload)
}
