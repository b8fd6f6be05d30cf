//! Best-effort text extraction from uploaded documents.

use lopdf::Document;
use regex::Regex;
use std::io::{Cursor, Read};
use zip::ZipArchive;

const DOCX_BODY: &str = "word/document.xml";

#[derive(Debug, PartialEq)]
pub enum Extracted {
    Text(String),
    /// Raster image; needs the assistant's OCR.
    Image,
    /// Stored as is, no local extractor.
    Unsupported,
}

pub fn is_image(extension: &str) -> bool {
    matches!(
        extension,
        "png" | "jpg" | "jpeg" | "bmp" | "tif" | "tiff" | "webp"
    )
}

pub fn extract(extension: &str, bytes: &[u8]) -> Result<Extracted, String> {
    match extension {
        "txt" => Ok(Extracted::Text(
            String::from_utf8_lossy(bytes).trim().to_string(),
        )),
        "docx" => docx_text(bytes).map(Extracted::Text),
        "pdf" => pdf_text(bytes).map(Extracted::Text),
        ext if is_image(ext) => Ok(Extracted::Image),
        _ => Ok(Extracted::Unsupported),
    }
}

/// Pulls the text runs out of a DOCX body, one line per paragraph.
fn docx_text(bytes: &[u8]) -> Result<String, String> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| format!("not a DOCX archive: {}", e))?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| format!("DOCX body missing: {}", e))?
        .read_to_string(&mut xml)
        .map_err(|e| format!("DOCX body unreadable: {}", e))?;

    let paragraph_re = Regex::new(r"(?s)<w:p[ >].*?</w:p>").map_err(|e| e.to_string())?;
    let run_re = Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>").map_err(|e| e.to_string())?;

    let lines: Vec<String> = paragraph_re
        .find_iter(&xml)
        .map(|p| {
            run_re
                .captures_iter(p.as_str())
                .filter_map(|c| c.get(1))
                .map(|m| unescape_xml(m.as_str()))
                .collect::<String>()
        })
        .collect();
    Ok(lines.join("\n").trim().to_string())
}

/// Text of every page in order, one block per page. Scanned PDFs without a
/// text layer come out empty.
fn pdf_text(bytes: &[u8]) -> Result<String, String> {
    let document = Document::load_mem(bytes).map_err(|e| format!("not a PDF document: {}", e))?;
    let mut pages = Vec::new();
    for number in document.get_pages().into_keys() {
        let text = document
            .extract_text(&[number])
            .map_err(|e| format!("PDF page {} unreadable: {}", number, e))?;
        pages.push(text.trim().to_string());
    }
    Ok(pages.join("\n").trim().to_string())
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn docx_with_body(body: &str) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut buf);
            zip.start_file(DOCX_BODY, FileOptions::default())
                .expect("start entry");
            zip.write_all(body.as_bytes()).expect("write entry");
            zip.finish().expect("finish");
        }
        buf.into_inner()
    }

    #[test]
    fn docx_paragraphs_become_lines() {
        let body = r#"<w:document><w:body>
            <w:p><w:r><w:t>Photosynthesis</w:t></w:r><w:r><w:t xml:space="preserve"> &amp; light</w:t></w:r></w:p>
            <w:p><w:pPr/><w:r><w:t>Second line</w:t></w:r></w:p>
        </w:body></w:document>"#;
        let text = extract("docx", &docx_with_body(body)).expect("extract");
        assert_eq!(
            text,
            Extracted::Text("Photosynthesis & light\nSecond line".to_string())
        );
    }

    #[test]
    fn broken_docx_is_an_error() {
        assert!(extract("docx", b"plain bytes").is_err());
    }

    fn pdf_with_line(line: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(line)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut buf = Vec::new();
        doc.save_to(&mut buf).expect("save pdf");
        buf
    }

    #[test]
    fn pdf_text_layer_is_extracted() {
        let bytes = pdf_with_line("Cells divide by mitosis");
        match extract("pdf", &bytes).expect("extract") {
            Extracted::Text(text) => assert!(text.contains("Cells divide by mitosis"), "{}", text),
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn broken_pdf_is_an_error() {
        assert!(extract("pdf", b"not a pdf at all").is_err());
    }

    #[test]
    fn images_are_flagged_and_text_is_trimmed() {
        assert_eq!(extract("jpeg", b"..").expect("image"), Extracted::Image);
        assert_eq!(extract("odt", b"..").expect("other"), Extracted::Unsupported);
        assert_eq!(
            extract("txt", b"  my homework \n").expect("txt"),
            Extracted::Text("my homework".to_string())
        );
    }
}
