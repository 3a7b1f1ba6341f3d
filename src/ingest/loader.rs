//! Per-file document loading.
//!
//! Each upload resolves to a `DocumentFormat` once, by extension, and
//! loads through the matching parser. Every problem short of an empty
//! batch is a per-file `Skipped` outcome, never a batch abort.

use std::fs;
use std::io::Read;
use std::path::Path;

/// Raw text of one loaded file plus its source name.
#[derive(Debug, Clone)]
pub struct Document {
    pub text: String,
    pub source: String,
}

/// Recognized upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Text,
    Pdf,
    Word,
}

impl DocumentFormat {
    /// Resolve a format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" => Some(DocumentFormat::Text),
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Word),
            _ => None,
        }
    }
}

/// Outcome of loading one file.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(Document),
    Skipped { file: String, reason: String },
}

/// Load a single uploaded file from the upload directory.
pub fn load_file(upload_dir: &Path, file_name: &str) -> LoadOutcome {
    let path = upload_dir.join(file_name);

    if !path.exists() {
        return LoadOutcome::Skipped {
            file: file_name.to_string(),
            reason: "file does not exist".to_string(),
        };
    }

    let Some(format) = DocumentFormat::from_path(&path) else {
        return LoadOutcome::Skipped {
            file: file_name.to_string(),
            reason: "unsupported file format".to_string(),
        };
    };

    let parsed = match format {
        DocumentFormat::Text => fs::read_to_string(&path).map_err(|e| e.to_string()),
        DocumentFormat::Pdf => read_pdf(&path),
        DocumentFormat::Word => read_docx(&path),
    };

    match parsed {
        Ok(text) if !text.trim().is_empty() => LoadOutcome::Loaded(Document {
            text,
            source: file_name.to_string(),
        }),
        Ok(_) => LoadOutcome::Skipped {
            file: file_name.to_string(),
            reason: "file contained no text".to_string(),
        },
        Err(reason) => LoadOutcome::Skipped {
            file: file_name.to_string(),
            reason,
        },
    }
}

fn read_pdf(path: &Path) -> Result<String, String> {
    pdf_extract::extract_text(path).map_err(|e| format!("PDF extraction failed: {}", e))
}

/// A `.docx` is a zip container; the body text lives in
/// `word/document.xml`.
fn read_docx(path: &Path) -> Result<String, String> {
    let file = fs::File::open(path).map_err(|e| e.to_string())?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| e.to_string())?;
    let mut entry = archive
        .by_name("word/document.xml")
        .map_err(|e| format!("not a Word document: {}", e))?;

    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| e.to_string())?;

    Ok(extract_docx_text(&xml))
}

/// Pull readable text out of the document XML.
///
/// Paragraph closes become newlines; all other markup is dropped.
fn extract_docx_text(xml: &str) -> String {
    let with_breaks = xml.replace("</w:p>", "\n");

    let mut result = String::new();
    let mut in_tag = false;
    for c in with_breaks.chars() {
        if c == '<' {
            in_tag = true;
        } else if c == '>' {
            in_tag = false;
        } else if !in_tag {
            result.push(c);
        }
    }

    let decoded = decode_xml_entities(&result);

    let lines: Vec<&str> = decoded
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    lines.join("\n")
}

fn decode_xml_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
