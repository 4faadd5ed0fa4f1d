// src/knowledge/extraction.rs
// Content-type dispatch for turning fetched bytes into plain text
// (spec §4.5 "extract" stage).

use encoding_rs::Encoding;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{DomainError, DomainResult};

pub fn extract_text(content_type: &str, bytes: &[u8]) -> DomainResult<String> {
    let mime = content_type.split(';').next().unwrap_or(content_type).trim().to_lowercase();

    match mime.as_str() {
        "application/pdf" => extract_pdf(bytes),
        "text/html" | "application/xhtml+xml" => Ok(extract_html(&decode_bytes(bytes))),
        _ => Ok(decode_bytes(bytes)),
    }
}

/// Guesses a content type from a URL path when the server omits one.
pub fn guess_content_type(url: &str) -> String {
    mime_guess::from_path(url).first_or_octet_stream().to_string()
}

fn decode_bytes(bytes: &[u8]) -> String {
    let (text, _, had_errors) = Encoding::for_label(b"utf-8").unwrap().decode(bytes);
    if had_errors {
        tracing::debug!("non-utf8 bytes encountered during text decode, lossy-converted");
    }
    text.into_owned()
}

fn extract_pdf(bytes: &[u8]) -> DomainResult<String> {
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| DomainError::ContentExtractionFailed(format!("pdf parse error: {e}")))?;
    let mut out = String::new();
    for (page_num, _) in doc.get_pages() {
        if let Ok(text) = doc.extract_text(&[page_num]) {
            out.push_str(&text);
            out.push('\n');
        }
    }
    Ok(out)
}

/// Strips HTML tags, keeping element text content; `<script>`/`<style>`
/// subtrees are dropped entirely.
fn extract_html(html: &str) -> String {
    let mut reader = Reader::from_str(html);
    reader.config_mut().trim_text(false);

    let mut out = String::with_capacity(html.len());
    let mut skip_depth = 0u32;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.name();
                let local = String::from_utf8_lossy(name.as_ref()).to_lowercase();
                if skip_depth > 0 {
                    skip_depth += 1;
                } else if local == "script" || local == "style" {
                    skip_depth = 1;
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                let local = String::from_utf8_lossy(name.as_ref()).to_lowercase();
                let _ = local;
                if skip_depth > 0 {
                    skip_depth -= 1;
                }
            }
            Ok(Event::Text(t)) if skip_depth == 0 => {
                if let Ok(decoded) = t.decode() {
                    out.push_str(&decoded);
                    out.push(' ');
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            // Malformed HTML is common in the wild; keep accumulated text
            // rather than failing the whole extraction.
            Err(_) => break,
        }
        buf.clear();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        let text = extract_text("text/plain", b"hello world").unwrap();
        assert_eq!(text, "hello world");
    }

    #[test]
    fn html_strips_tags_and_script_content() {
        let html = "<html><body><p>Hello</p><script>evil()</script><p>World</p></body></html>";
        let text = extract_text("text/html; charset=utf-8", html.as_bytes()).unwrap();
        assert!(text.contains("Hello"));
        assert!(text.contains("World"));
        assert!(!text.contains("evil()"));
    }

    #[test]
    fn guess_content_type_from_extension() {
        assert_eq!(guess_content_type("https://example.com/doc.pdf"), "application/pdf");
    }
}
