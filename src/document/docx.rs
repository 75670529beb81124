//! DOCX text extraction from an in-memory byte buffer.

use super::ExtractError;
use docx_rust::DocxFile;
use docx_rust::document::{BodyContent, ParagraphContent, RunContent};
use std::io::Cursor;

/// Extract paragraph text from a DOCX archive, one line per paragraph.
pub(super) fn extract_docx_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let archive = DocxFile::from_reader(Cursor::new(bytes))
        .map_err(|err| ExtractError::Docx(format!("{err:?}")))?;
    let docx = archive
        .parse()
        .map_err(|err| ExtractError::Docx(format!("{err:?}")))?;

    let mut paragraphs = Vec::new();
    for content in &docx.document.body.content {
        if let BodyContent::Paragraph(paragraph) = content {
            let mut line = String::new();
            for item in &paragraph.content {
                if let ParagraphContent::Run(run) = item {
                    for piece in &run.content {
                        if let RunContent::Text(text) = piece {
                            line.push_str(&text.text);
                        }
                    }
                }
            }
            if !line.trim().is_empty() {
                paragraphs.push(line);
            }
        }
    }

    Ok(paragraphs.join("\n"))
}
