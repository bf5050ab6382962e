use std::io::Write;
use std::path::Path;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

pub const BODY: &str = "word/document.xml";

/// Word-style body XML with one run per paragraph
pub fn body(paragraphs: &[&str]) -> String {
    let runs = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{p}</w:t></w:r></w:p>"))
        .collect::<String>();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{runs}</w:body></w:document>"#
    )
}

pub fn styles() -> String {
    r#"<?xml version="1.0" encoding="UTF-8"?><w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:styleId="Normal"/></w:styles>"#
        .to_string()
}

/// Writes a docx-style archive; the compression method changes the file
/// bytes and size without touching member contents.
pub fn write_docx(path: &Path, members: &[(&str, String)], compression: CompressionMethod) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("Failed to create directory {:?}: {}", parent, e));
    }

    let file = std::fs::File::create(path)
        .unwrap_or_else(|e| panic!("Failed to create archive {:?}: {}", path, e));
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(compression);

    for (name, content) in members {
        writer
            .start_file(*name, options)
            .unwrap_or_else(|e| panic!("Failed to start member {}: {}", name, e));
        writer
            .write_all(content.as_bytes())
            .unwrap_or_else(|e| panic!("Failed to write member {}: {}", name, e));
    }

    writer
        .finish()
        .unwrap_or_else(|e| panic!("Failed to finish archive {:?}: {}", path, e));
}

pub fn write_document(path: &Path, paragraphs: &[&str], compression: CompressionMethod) {
    write_docx(
        path,
        &[(BODY, body(paragraphs)), ("word/styles.xml", styles())],
        compression,
    );
}
