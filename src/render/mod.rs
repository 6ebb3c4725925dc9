use crate::domain::model::RenderContext;
use crate::utils::error::{ReportError, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::io::{Read, Write};
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

static ROW_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<table:table-row[ >].*?</table:table-row>").unwrap());
static ROW_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{d\.rows\[i\]\.([A-Za-z0-9_]+)\}").unwrap());
static SCALAR_FIELD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{d\.([A-Za-z0-9_]+)\}").unwrap());

/// Merges a render context into an ODT template.
///
/// An ODT file is a zip archive; the document body lives in `content.xml`.
/// Placeholders use the `{d.<field>}` syntax: `{d.author}` and `{d.date}`
/// substitute scalars, and a table row containing `{d.rows[i].<key>}` markers
/// is repeated once per record.
#[derive(Debug, Clone, Default)]
pub struct OdtRenderer;

impl OdtRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Writes the rendered document to `output_path`. The path must end in
    /// `.odt`; that check happens before any file I/O so a rejected call
    /// leaves nothing behind.
    pub fn render(
        &self,
        template_path: &str,
        output_path: &Path,
        context: &RenderContext,
    ) -> Result<()> {
        let is_odt = output_path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("odt"))
            .unwrap_or(false);
        if !is_odt {
            return Err(ReportError::validation(format!(
                "Output path {} should include the .odt file extension",
                output_path.display()
            )));
        }

        let entries = read_template(template_path)?;

        let rendered = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            for (name, bytes) in entries {
                if name == "mimetype" {
                    // The ODF spec requires the mimetype entry to be stored
                    // uncompressed as the first archive member.
                    let stored: FileOptions<'_, ()> =
                        FileOptions::default().compression_method(CompressionMethod::Stored);
                    zip.start_file(name, stored)
                        .map_err(|e| ReportError::render("Failed to write mimetype entry", e))?;
                    zip.write_all(&bytes)
                        .map_err(|e| ReportError::render("Failed to write mimetype entry", e))?;
                } else if name == "content.xml" {
                    let xml = String::from_utf8(bytes).map_err(|e| {
                        ReportError::render("Template content.xml is not valid UTF-8", e)
                    })?;
                    let merged = merge_content(&xml, context);
                    zip.start_file::<_, ()>(name, FileOptions::default())
                        .map_err(|e| ReportError::render("Failed to write content.xml", e))?;
                    zip.write_all(merged.as_bytes())
                        .map_err(|e| ReportError::render("Failed to write content.xml", e))?;
                } else {
                    zip.start_file::<_, ()>(name, FileOptions::default())
                        .map_err(|e| ReportError::render("Failed to copy template entry", e))?;
                    zip.write_all(&bytes)
                        .map_err(|e| ReportError::render("Failed to copy template entry", e))?;
                }
            }

            let cursor = zip
                .finish()
                .map_err(|e| ReportError::render("Failed to finalize document archive", e))?;
            cursor.into_inner()
        };

        std::fs::write(output_path, rendered).map_err(|e| {
            ReportError::render(format!("Cannot write {}", output_path.display()), e)
        })?;
        tracing::debug!("Rendered document written to {}", output_path.display());
        Ok(())
    }
}

fn read_template(template_path: &str) -> Result<Vec<(String, Vec<u8>)>> {
    let file = std::fs::File::open(template_path)
        .map_err(|e| ReportError::render(format!("Cannot open template {}", template_path), e))?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| ReportError::render("Template is not a valid ODT archive", e))?;

    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| ReportError::render("Failed to read template entry", e))?;
        if entry.is_dir() {
            continue;
        }
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| ReportError::render("Failed to read template entry", e))?;
        entries.push((entry.name().to_string(), bytes));
    }
    Ok(entries)
}

fn merge_content(xml: &str, context: &RenderContext) -> String {
    // Expand repeating row blocks first so the scalar pass does not touch
    // the per-row markers.
    let expanded = ROW_BLOCK.replace_all(xml, |caps: &Captures| {
        let block = &caps[0];
        if !block.contains("{d.rows[i].") {
            return block.to_string();
        }
        context
            .rows
            .iter()
            .map(|record| {
                ROW_FIELD
                    .replace_all(block, |field: &Captures| xml_escape(record.get(&field[1])))
                    .into_owned()
            })
            .collect::<String>()
    });

    SCALAR_FIELD
        .replace_all(&expanded, |caps: &Captures| match &caps[1] {
            "author" => xml_escape(&context.author),
            "date" => xml_escape(&context.date),
            other => {
                tracing::warn!("Unknown template placeholder {{d.{}}}", other);
                String::new()
            }
        })
        .into_owned()
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
