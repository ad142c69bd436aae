use crate::error::{ImdgError, ImdgResult};
use validator::{Validate, ValidationErrors};

const PDF_MAGIC: &[u8] = b"%PDF-";

pub fn validate_model<T: Validate>(model: &T) -> ImdgResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let error_messages = format_validation_errors(&errors);
            Err(ImdgError::validation("model", error_messages))
        }
    }
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();

    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let message = match error.code.as_ref() {
                "length" => format!("Length validation failed for field '{}'", field),
                "required" => format!("Field '{}' is required", field),
                _ => format!("Validation failed for field '{}': {}", field, error.code),
            };
            messages.push(message);
        }
    }

    messages.join(", ")
}

pub fn validate_file_type(file_name: &str, allowed_types: &[&str]) -> ImdgResult<()> {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    if !allowed_types.contains(&extension.to_lowercase().as_str()) {
        return Err(ImdgError::validation(
            "file_type",
            format!(
                "File type '{}' not allowed. Allowed types: {}",
                extension,
                allowed_types.join(", ")
            ),
        ));
    }

    Ok(())
}

pub fn validate_file_size(file_size: u64, max_size: u64) -> ImdgResult<()> {
    if file_size == 0 {
        return Err(ImdgError::validation("file_size", "Uploaded file is empty"));
    }
    if file_size > max_size {
        return Err(ImdgError::validation(
            "file_size",
            format!(
                "File size {} bytes exceeds maximum allowed size {} bytes",
                file_size, max_size
            ),
        ));
    }

    Ok(())
}

/// Checks the `%PDF-` header.
pub fn validate_pdf_content(bytes: &[u8]) -> ImdgResult<()> {
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(ImdgError::validation(
            "file_content",
            "Uploaded file is not a PDF document",
        ));
    }
    Ok(())
}

/// Reduces a client-supplied file name to a safe final path component.
///
/// Directory parts (either separator) are dropped and characters outside
/// `[A-Za-z0-9._ -]` become `_`. Names that collapse to nothing or to dots
/// are rejected.
pub fn sanitize_file_name(file_name: &str) -> ImdgResult<String> {
    let last = file_name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or("")
        .trim();

    let sanitized: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        return Err(ImdgError::validation(
            "file_name",
            format!("Invalid file name '{}'", file_name),
        ));
    }

    Ok(sanitized)
}
