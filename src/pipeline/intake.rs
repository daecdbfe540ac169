//! File intake: validate a selected file and encode it for transport.
//!
//! ## Why validate before encoding?
//!
//! The type and size checks are pure and instant; base64-encoding a file the
//! service would reject anyway wastes memory and, worse, would only fail
//! later with a confusing remote error. Rejecting locally lets the caller
//! show the unmet constraint immediately while the session stays in `Idle`.
//!
//! Base64 is used because the analysis API accepts documents as inline data
//! in the JSON request body — there is no multipart upload path. The 10 MiB
//! ceiling keeps the encoded body comfortably under typical inline-payload
//! limits (base64 inflates by ~33 %).

use crate::error::{IntakeError, ACCEPTED_MIME_TYPES, MAX_DOCUMENT_BYTES};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use tracing::debug;

/// A raw file handed in by the surrounding layer (file picker, drag-and-drop,
/// test fixture), before validation.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Display name, e.g. `policy.pdf`. Not used for validation.
    pub name: String,
    /// Reported media type. Validation trusts this declaration — content
    /// sniffing is the service's job, not ours.
    pub mime_type: String,
    /// Raw binary content.
    pub bytes: Vec<u8>,
}

/// A validated, transport-ready document.
///
/// Created only by [`intake`] / [`intake_path`]; never mutated afterwards.
/// Owned by the session until reset, then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    /// Base64 (standard alphabet, padded) of the original bytes.
    pub encoded_payload: String,
    /// `data:` URI of the original content — present iff the media type is
    /// an image, for thumbnail display. PDFs get no preview; that is not an
    /// error.
    pub preview_uri: Option<String>,
}

/// Check a declared media type and size against the intake policy.
///
/// Split out from [`intake`] so the surrounding layer can pre-validate a
/// selection (e.g. on drag-over) without holding the file bytes.
pub fn validate(mime_type: &str, size_bytes: u64) -> Result<(), IntakeError> {
    if !ACCEPTED_MIME_TYPES.contains(&mime_type) {
        return Err(IntakeError::UnsupportedType {
            mime_type: mime_type.to_string(),
        });
    }
    // Boundary is inclusive: exactly 10 MiB passes.
    if size_bytes > MAX_DOCUMENT_BYTES {
        return Err(IntakeError::FileTooLarge { size_bytes });
    }
    Ok(())
}

/// Validate an incoming file and encode it as an [`UploadedDocument`].
///
/// Pure — no I/O, no network, no shared state. The only side effect is the
/// returned value.
pub fn intake(file: IncomingFile) -> Result<UploadedDocument, IntakeError> {
    validate(&file.mime_type, file.bytes.len() as u64)?;

    let encoded_payload = STANDARD.encode(&file.bytes);
    debug!(
        file = %file.name,
        mime = %file.mime_type,
        raw_bytes = file.bytes.len(),
        encoded_bytes = encoded_payload.len(),
        "Document passed intake"
    );

    let preview_uri = if file.mime_type.starts_with("image/") {
        Some(format!("data:{};base64,{}", file.mime_type, encoded_payload))
    } else {
        None
    };

    Ok(UploadedDocument {
        size_bytes: file.bytes.len() as u64,
        encoded_payload,
        preview_uri,
        file_name: file.name,
        mime_type: file.mime_type,
    })
}

/// Read a file from disk and run it through [`intake`].
///
/// The media type is derived from the extension via `mime_guess`; an
/// unrecognised extension fails `UnsupportedType` the same as any other
/// non-accepted type. Read errors surface as `ReadFailure`.
pub async fn intake_path(path: impl AsRef<Path>) -> Result<UploadedDocument, IntakeError> {
    let path = path.as_ref();

    let mime_type = mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string();

    // Size check on metadata before reading, so a 2 GB mis-selection is
    // rejected without pulling it into memory.
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|source| IntakeError::ReadFailure { source })?;
    validate(&mime_type, meta.len())?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| IntakeError::ReadFailure { source })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());

    intake(IncomingFile {
        name,
        mime_type,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg(bytes: Vec<u8>) -> IncomingFile {
        IncomingFile {
            name: "scan.jpg".into(),
            mime_type: "image/jpeg".into(),
            bytes,
        }
    }

    #[test]
    fn rejects_unsupported_type() {
        let file = IncomingFile {
            name: "notes.txt".into(),
            mime_type: "text/plain".into(),
            bytes: b"hello".to_vec(),
        };
        let err = intake(file).unwrap_err();
        assert!(matches!(err, IntakeError::UnsupportedType { .. }));
    }

    #[test]
    fn rejects_svg_despite_being_an_image() {
        // Only the four listed types are accepted; image/* is not a wildcard.
        assert!(matches!(
            validate("image/svg+xml", 10),
            Err(IntakeError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn size_boundary_is_inclusive() {
        assert!(validate("application/pdf", MAX_DOCUMENT_BYTES).is_ok());
        assert!(matches!(
            validate("application/pdf", MAX_DOCUMENT_BYTES + 1),
            Err(IntakeError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn oversized_file_reports_its_size() {
        let err = validate("image/png", 15 * 1024 * 1024).unwrap_err();
        match err {
            IntakeError::FileTooLarge { size_bytes } => {
                assert_eq!(size_bytes, 15 * 1024 * 1024)
            }
            other => panic!("expected FileTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn image_gets_preview_data_uri() {
        let doc = intake(jpeg(vec![0xFF, 0xD8, 0xFF])).unwrap();
        let preview = doc.preview_uri.expect("image must carry a preview");
        assert!(preview.starts_with("data:image/jpeg;base64,"));
        assert!(preview.ends_with(&doc.encoded_payload));
    }

    #[test]
    fn pdf_gets_no_preview() {
        let doc = intake(IncomingFile {
            name: "policy.pdf".into(),
            mime_type: "application/pdf".into(),
            bytes: b"%PDF-1.7".to_vec(),
        })
        .unwrap();
        assert!(doc.preview_uri.is_none());
    }

    #[test]
    fn encoding_round_trips_exactly() {
        let original: Vec<u8> = (0..=255).collect();
        let doc = intake(jpeg(original.clone())).unwrap();
        let decoded = STANDARD.decode(&doc.encoded_payload).expect("valid base64");
        assert_eq!(decoded, original);
        assert_eq!(doc.size_bytes, 256);
    }

    #[test]
    fn empty_file_is_accepted() {
        // Zero bytes is within policy; the service decides what to make of it.
        let doc = intake(jpeg(Vec::new())).unwrap();
        assert_eq!(doc.encoded_payload, "");
    }

    #[tokio::test]
    async fn intake_path_missing_file_is_read_failure() {
        let err = intake_path("/nonexistent/policy.pdf").await.unwrap_err();
        assert!(matches!(err, IntakeError::ReadFailure { .. }));
    }

    #[tokio::test]
    async fn intake_path_unknown_extension_is_unsupported() {
        // Extension decides the type before any read happens.
        let dir = std::env::temp_dir();
        let path = dir.join("policylens_intake_test.txt");
        tokio::fs::write(&path, b"plain text").await.unwrap();
        let err = intake_path(&path).await.unwrap_err();
        tokio::fs::remove_file(&path).await.ok();
        assert!(matches!(err, IntakeError::UnsupportedType { .. }));
    }

    #[tokio::test]
    async fn intake_path_reads_pdf() {
        let dir = std::env::temp_dir();
        let path = dir.join("policylens_intake_test.pdf");
        tokio::fs::write(&path, b"%PDF-1.4 fake").await.unwrap();
        let doc = intake_path(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.ok();
        assert_eq!(doc.mime_type, "application/pdf");
        assert_eq!(doc.file_name, "policylens_intake_test.pdf");
        assert_eq!(
            STANDARD.decode(&doc.encoded_payload).unwrap(),
            b"%PDF-1.4 fake"
        );
    }
}
