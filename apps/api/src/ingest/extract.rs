//! Plain-text extraction from uploaded documents.
//!
//! Supported: PDF, DOCX, plain text. Anything else, or a file that parses
//! to no text at all, is rejected with `UnsupportedFormat` before any
//! record is created. Parsing runs on a blocking task under a bounded
//! timeout so a pathological PDF cannot stall unrelated requests.

use std::time::Duration;

use crate::errors::AppError;

/// Extracts and normalizes text from an uploaded document, dispatching on
/// the filename extension.
pub fn extract_document(bytes: &[u8], filename: &str) -> Result<String, AppError> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    let raw = match extension.as_str() {
        "pdf" => extract_pdf(bytes)?,
        "docx" => extract_docx(bytes)?,
        "txt" | "" => String::from_utf8_lossy(bytes).into_owned(),
        other => {
            return Err(AppError::UnsupportedFormat(format!(
                "Unsupported file type '.{other}'"
            )))
        }
    };

    let text = clean_text(&raw);
    if text.is_empty() {
        return Err(AppError::UnsupportedFormat(format!(
            "No extractable text in '{filename}'"
        )));
    }
    Ok(text)
}

/// `extract_document` off the request path: blocking task + bounded timeout.
pub async fn extract_document_with_timeout(
    bytes: Vec<u8>,
    filename: String,
    timeout_secs: u64,
) -> Result<String, AppError> {
    let parse = tokio::task::spawn_blocking(move || extract_document(&bytes, &filename));
    match tokio::time::timeout(Duration::from_secs(timeout_secs), parse).await {
        Ok(joined) => joined.map_err(|e| AppError::Internal(anyhow::anyhow!("{e}")))?,
        Err(_) => Err(AppError::Timeout(format!(
            "Document extraction exceeded {timeout_secs}s"
        ))),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, AppError> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| AppError::UnsupportedFormat(format!("Failed to parse PDF: {e}")))
}

fn extract_docx(bytes: &[u8]) -> Result<String, AppError> {
    let docx = docx_rs::read_docx(bytes)
        .map_err(|e| AppError::UnsupportedFormat(format!("Failed to parse DOCX: {e}")))?;

    let mut text = String::new();
    for child in docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
            for para_child in paragraph.children {
                if let docx_rs::ParagraphChild::Run(run) = para_child {
                    for run_child in run.children {
                        if let docx_rs::RunChild::Text(t) = run_child {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            text.push('\n');
        }
    }
    Ok(text)
}

/// Strips blank lines and per-line whitespace.
fn clean_text(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// First non-empty line, used as a role/title heuristic for explanations.
pub fn extract_role_title(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.chars().take(80).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passthrough() {
        let text = extract_document(b"Senior Engineer\n\n  5 years Python  \n", "cv.txt").unwrap();
        assert_eq!(text, "Senior Engineer\n5 years Python");
    }

    #[test]
    fn test_missing_extension_treated_as_text() {
        let text = extract_document(b"plain resume body", "resume").unwrap();
        assert_eq!(text, "plain resume body");
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let err = extract_document(b"MZ\x90\x00", "resume.exe").unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_garbage_pdf_rejected_not_crash() {
        // An .exe renamed to .pdf must fail cleanly
        let err = extract_document(b"MZ\x90\x00\x03not a pdf", "trojan.pdf").unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_empty_text_rejected() {
        let err = extract_document(b"   \n  \n", "empty.txt").unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_role_title_is_first_nonempty_line() {
        let title = extract_role_title("\n  Data Engineer\nMore text").unwrap();
        assert_eq!(title, "Data Engineer");
    }

    #[tokio::test]
    async fn test_async_extraction_plain_text() {
        let text =
            extract_document_with_timeout(b"hello resume".to_vec(), "cv.txt".to_string(), 5)
                .await
                .unwrap();
        assert_eq!(text, "hello resume");
    }
}
