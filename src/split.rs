//! Page splitter: decomposes a multi-page PDF into single-page documents.
//!
//! Pages are written to a scratch subdirectory inside the staging area and
//! renamed into place only after every page has been written, so a failed
//! split publishes nothing. Output names are a pure function of
//! (prefix, parent base name, page index): re-splitting the same source
//! overwrites its previous units instead of duplicating them.

use lopdf::Document;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::models::PageUnit;

#[derive(Debug, Error)]
pub enum SplitError {
    #[error("failed to parse PDF: {0}")]
    Parse(String),
    #[error("failed to write page {page}: {reason}")]
    Page { page: u32, reason: String },
    #[error("staging I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Derived output filename for one page of a parent document.
pub fn page_file_name(prefix: &str, base_name: &str, page: u32) -> String {
    format!("{}{}_pg_{}.pdf", prefix, base_name, page)
}

/// Splits `input` into one single-page PDF per page, in page order, under
/// `staging_dir`. Returns exactly the units it produced; a zero-page
/// document yields an empty set without error. The input file is not
/// deleted.
///
/// Blocking: callers on the async path should run this under
/// `spawn_blocking`.
pub fn split_document(
    input: &Path,
    staging_dir: &Path,
    prefix: &str,
) -> Result<Vec<PageUnit>, SplitError> {
    let base_name = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| SplitError::Parse("input path has no file name".to_string()))?;

    let doc = Document::load(input).map_err(|e| SplitError::Parse(e.to_string()))?;
    let pages = doc.get_pages();
    info!(
        "Splitting {} ({} pages) into {}",
        input.display(),
        pages.len(),
        staging_dir.display()
    );

    // Scratch dir keeps partially split documents invisible to readers of
    // the staging directory until every page has been written.
    let scratch = staging_dir.join(format!(".split-{}", Uuid::new_v4()));
    fs::create_dir_all(&scratch)?;

    let written = match write_pages(&doc, &scratch, prefix, &base_name) {
        Ok(written) => written,
        Err(e) => {
            let _ = fs::remove_dir_all(&scratch);
            error!("Split of {} failed: {}", input.display(), e);
            return Err(e);
        }
    };

    let mut units = Vec::with_capacity(written.len());
    for (page, file_name, scratch_path) in written {
        let published = staging_dir.join(&file_name);
        if let Err(e) = fs::rename(&scratch_path, &published) {
            let _ = fs::remove_dir_all(&scratch);
            return Err(SplitError::Io(e));
        }
        info!("Saved split page: {}", file_name);
        units.push(PageUnit {
            parent: base_name.clone(),
            page,
            path: published,
        });
    }
    let _ = fs::remove_dir_all(&scratch);

    Ok(units)
}

fn write_pages(
    doc: &Document,
    scratch: &Path,
    prefix: &str,
    base_name: &str,
) -> Result<Vec<(u32, String, PathBuf)>, SplitError> {
    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    let mut written = Vec::with_capacity(page_numbers.len());

    for &page in &page_numbers {
        let mut single = doc.clone();
        let others: Vec<u32> = page_numbers.iter().copied().filter(|&p| p != page).collect();
        single.delete_pages(&others);
        single.prune_objects();

        let file_name = page_file_name(prefix, base_name, page);
        let path = scratch.join(&file_name);
        single.save(&path).map_err(|e| SplitError::Page {
            page,
            reason: e.to_string(),
        })?;
        written.push((page, file_name, path));
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Document, Object, Stream};
    use tempfile::TempDir;

    fn build_pdf(page_texts: &[&str]) -> Document {
        use lopdf::content::{Content, Operation};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in page_texts {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![100.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    fn save_pdf(doc: &mut Document, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        doc.save(&path).unwrap();
        path
    }

    #[test]
    fn three_pages_split_into_three_named_units() {
        let tmp = TempDir::new().unwrap();
        let staging = tmp.path().join("staging");
        fs::create_dir_all(&staging).unwrap();
        let input = save_pdf(
            &mut build_pdf(&["page one", "page two", "page three"]),
            tmp.path(),
            "manual.pdf",
        );

        let units = split_document(&input, &staging, "uploaded_").unwrap();

        assert_eq!(units.len(), 3);
        for (i, unit) in units.iter().enumerate() {
            let expected = format!("uploaded_manual_pg_{}.pdf", i + 1);
            assert_eq!(unit.file_name(), expected);
            assert!(unit.path.exists());
        }
        // The input is left in place.
        assert!(input.exists());
    }

    #[test]
    fn resplitting_overwrites_instead_of_duplicating() {
        let tmp = TempDir::new().unwrap();
        let staging = tmp.path().join("staging");
        fs::create_dir_all(&staging).unwrap();
        let input = save_pdf(&mut build_pdf(&["a", "b"]), tmp.path(), "guide.pdf");

        let first = split_document(&input, &staging, "uploaded_").unwrap();
        let second = split_document(&input, &staging, "uploaded_").unwrap();

        let first_names: Vec<_> = first.iter().map(|u| u.file_name()).collect();
        let second_names: Vec<_> = second.iter().map(|u| u.file_name()).collect();
        assert_eq!(first_names, second_names);

        let on_disk: Vec<_> = fs::read_dir(&staging)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .collect();
        assert_eq!(on_disk.len(), 2);
    }

    #[test]
    fn zero_page_document_yields_no_units() {
        let tmp = TempDir::new().unwrap();
        let staging = tmp.path().join("staging");
        fs::create_dir_all(&staging).unwrap();
        let input = save_pdf(&mut build_pdf(&[]), tmp.path(), "empty.pdf");

        let units = split_document(&input, &staging, "uploaded_").unwrap();
        assert!(units.is_empty());
    }

    #[test]
    fn corrupt_input_fails_and_publishes_nothing() {
        let tmp = TempDir::new().unwrap();
        let staging = tmp.path().join("staging");
        fs::create_dir_all(&staging).unwrap();
        let input = tmp.path().join("bad.pdf");
        fs::write(&input, b"not a pdf at all").unwrap();

        let err = split_document(&input, &staging, "uploaded_").unwrap_err();
        assert!(matches!(err, SplitError::Parse(_)));
        assert_eq!(fs::read_dir(&staging).unwrap().count(), 0);
    }

    #[test]
    fn page_file_name_is_deterministic() {
        assert_eq!(
            page_file_name("uploaded_", "fridge-manual", 7),
            "uploaded_fridge-manual_pg_7.pdf"
        );
    }
}
