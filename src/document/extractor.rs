use crate::error::LegalMindError;
use serde::Serialize;
use std::path::Path;

/// Texts shorter than this (after trimming) are rejected before analysis.
pub const MIN_TEXT_LENGTH: usize = 50;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_TEXT: &str = "text/plain";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    pub character_count: usize,
    pub word_count: usize,
    pub sentence_count: usize,
    pub paragraph_count: usize,
}

pub struct DocumentExtractor;

impl DocumentExtractor {
    /// Extracts plain text from `path` according to `mime`.
    pub fn extract(path: &Path, mime: &str) -> Result<String, LegalMindError> {
        let bytes = std::fs::read(path).map_err(|e| {
            LegalMindError::Extraction(format!("cannot read {}: {}", path.display(), e))
        })?;
        tracing::debug!("Read {} bytes from {}", bytes.len(), path.display());

        let text = Self::extract_bytes(&bytes, mime)?;
        tracing::info!(
            "Extracted {} characters from {}",
            text.chars().count(),
            path.display()
        );
        Ok(text)
    }

    pub fn extract_bytes(bytes: &[u8], mime: &str) -> Result<String, LegalMindError> {
        let text = match mime {
            MIME_TEXT => Self::extract_text(bytes),
            MIME_PDF => Self::extract_pdf(bytes)?,
            MIME_DOCX => Self::extract_docx(bytes)?,
            other => {
                return Err(LegalMindError::Extraction(format!(
                    "unsupported file format: {}",
                    other
                )))
            }
        };

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(LegalMindError::Extraction(
                "no text content found in the document".to_string(),
            ));
        }
        Ok(text)
    }

    fn extract_text(bytes: &[u8]) -> String {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) => {
                tracing::warn!("Text file is not valid UTF-8, decoding lossily");
                String::from_utf8_lossy(bytes).into_owned()
            }
        }
    }

    // pdf-extract can panic on malformed fonts; treat that as a failed extraction.
    fn extract_pdf(bytes: &[u8]) -> Result<String, LegalMindError> {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(bytes)
        })) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(LegalMindError::Extraction(format!(
                "failed to extract text from PDF: {}",
                e
            ))),
            Err(_) => Err(LegalMindError::Extraction(
                "PDF extraction panicked; the file likely contains malformed fonts".to_string(),
            )),
        }
    }

    fn extract_docx(bytes: &[u8]) -> Result<String, LegalMindError> {
        let doc = docx_rs::read_docx(bytes).map_err(|e| {
            LegalMindError::Extraction(format!("failed to parse Word document: {}", e))
        })?;

        let mut blocks = Vec::new();
        for child in &doc.document.children {
            match child {
                docx_rs::DocumentChild::Paragraph(para) => {
                    let text = paragraph_text(&para.children);
                    if !text.trim().is_empty() {
                        blocks.push(text.trim().to_string());
                    }
                }
                docx_rs::DocumentChild::Table(table) => {
                    for row in &table.rows {
                        let docx_rs::TableChild::TableRow(tr) = row;
                        let cells: Vec<String> = tr
                            .cells
                            .iter()
                            .map(|cell| {
                                let docx_rs::TableRowChild::TableCell(tc) = cell;
                                tc.children
                                    .iter()
                                    .filter_map(|content| match content {
                                        docx_rs::TableCellContent::Paragraph(p) => {
                                            Some(paragraph_text(&p.children))
                                        }
                                        _ => None,
                                    })
                                    .collect::<Vec<_>>()
                                    .join(" ")
                                    .trim()
                                    .to_string()
                            })
                            .filter(|cell| !cell.is_empty())
                            .collect();
                        if !cells.is_empty() {
                            blocks.push(cells.join(" | "));
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(blocks.join("\n\n"))
    }
}

fn paragraph_text(children: &[docx_rs::ParagraphChild]) -> String {
    let mut output = String::new();
    for child in children {
        match child {
            docx_rs::ParagraphChild::Run(run) => push_run_text(run, &mut output),
            docx_rs::ParagraphChild::Hyperlink(link) => {
                for inner in &link.children {
                    if let docx_rs::ParagraphChild::Run(run) = inner {
                        push_run_text(run, &mut output);
                    }
                }
            }
            _ => {}
        }
    }
    output
}

fn push_run_text(run: &docx_rs::Run, output: &mut String) {
    for run_child in &run.children {
        if let docx_rs::RunChild::Text(text) = run_child {
            output.push_str(&text.text);
        }
    }
}

/// MIME type from the file extension; `None` for unsupported extensions.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "pdf" => Some(MIME_PDF),
        "docx" => Some(MIME_DOCX),
        "txt" | "text" | "md" => Some(MIME_TEXT),
        _ => None,
    }
}

pub fn ensure_minimum_length(text: &str) -> Result<(), LegalMindError> {
    let length = text.trim().chars().count();
    if length < MIN_TEXT_LENGTH {
        return Err(LegalMindError::DocumentTooShort {
            length,
            minimum: MIN_TEXT_LENGTH,
        });
    }
    Ok(())
}

pub fn document_stats(text: &str) -> DocumentStats {
    DocumentStats {
        character_count: text.chars().count(),
        word_count: text.split_whitespace().count(),
        sentence_count: text.split('.').filter(|s| !s.trim().is_empty()).count(),
        paragraph_count: text.split("\n\n").filter(|p| !p.trim().is_empty()).count(),
    }
}
