//! Booklet merger.
//!
//! Concatenates the compiled program with each presenter's source document,
//! in global presentation order. A missing or unparseable source is skipped
//! and reported; the program itself must parse.

use log::{info, warn};
use lopdf::{dictionary, Document, Object, ObjectId};
use serde::Serialize;

use crate::error::{ProgramError, ProgramResult};
use crate::models::{ProgramDocument, SubmissionId};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Bound on page-tree depth when resolving inherited attributes.
const MAX_TREE_DEPTH: usize = 64;

/// One presenter's source document, tagged with its place in the program.
#[derive(Debug, Clone)]
pub struct BookletSource {
    pub global_order: u32,
    pub submission_id: SubmissionId,
    pub document: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    Missing,
    Unreadable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSource {
    pub global_order: u32,
    pub submission_id: SubmissionId,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// What went into a booklet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookletReport {
    /// Global orders whose pages were appended, ascending.
    pub included: Vec<u32>,
    pub skipped: Vec<SkippedSource>,
}

#[derive(Debug, Clone)]
pub struct Booklet {
    pub document: ProgramDocument,
    pub report: BookletReport,
}

/// Merge `program_pdf` followed by every readable source into one booklet.
///
/// Sources are placed by ascending `global_order` whatever order they are
/// passed in.
pub fn merge_booklet(
    program_pdf: &[u8],
    mut sources: Vec<BookletSource>,
    title: &str,
) -> ProgramResult<Booklet> {
    let program = Document::load_mem(program_pdf)
        .map_err(|e| ProgramError::document(format!("program PDF is unreadable: {}", e)))?;

    sources.sort_by_key(|s| s.global_order);

    let mut report = BookletReport::default();
    let mut parts = vec![program];

    for source in sources {
        let reason = match source.document.as_deref() {
            None => SkipReason::Missing,
            Some(bytes) => match Document::load_mem(bytes) {
                Ok(doc) => {
                    report.included.push(source.global_order);
                    parts.push(doc);
                    continue;
                }
                Err(e) => SkipReason::Unreadable(e.to_string()),
            },
        };
        warn!(
            "Skipping booklet entry {} ({}): {:?}",
            source.global_order,
            source.submission_id,
            reason
        );
        report.skipped.push(SkippedSource {
            global_order: source.global_order,
            submission_id: source.submission_id,
            reason,
        });
    }

    let bytes = concatenate(parts)?;
    info!(
        "Merged booklet '{}': {} sources included, {} skipped, {} bytes",
        title,
        report.included.len(),
        report.skipped.len(),
        bytes.len()
    );

    Ok(Booklet {
        document: ProgramDocument::booklet(bytes, title),
        report,
    })
}

/// Append the pages of every document, in order, under a fresh page tree.
pub fn concatenate(documents: Vec<Document>) -> ProgramResult<Vec<u8>> {
    let mut merged = Document::with_version("1.5");
    let mut next_id = 1;
    let mut page_ids: Vec<ObjectId> = Vec::new();

    for mut doc in documents {
        doc.renumber_objects_with(next_id);
        next_id = doc.max_id + 1;

        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        for &page_id in &pages {
            flatten_inherited(&mut doc, page_id);
        }
        page_ids.extend(pages);

        for (id, object) in doc.objects {
            if !is_tree_node(&object) {
                merged.objects.insert(id, object);
            }
        }
    }

    merged.max_id = next_id;
    let pages_id = merged.new_object_id();

    for id in &page_ids {
        if let Some(Object::Dictionary(page)) = merged.objects.get_mut(id) {
            page.set("Parent", pages_id);
        }
    }

    let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();
    merged.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_ids.len() as i64,
        }),
    );
    let catalog_id = merged.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    merged.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    merged
        .save_to(&mut out)
        .map_err(|e| ProgramError::document(format!("failed to write booklet: {}", e)))?;
    Ok(out)
}

fn type_name(object: &Object) -> Option<&[u8]> {
    object
        .as_dict()
        .ok()
        .and_then(|d| d.get(b"Type").ok())
        .and_then(|t| t.as_name().ok())
}

fn is_tree_node(object: &Object) -> bool {
    matches!(type_name(object), Some(b"Catalog") | Some(b"Pages"))
}

fn parent_of(doc: &Document, id: ObjectId) -> Option<ObjectId> {
    doc.get_dictionary(id)
        .ok()
        .and_then(|d| d.get(b"Parent").ok())
        .and_then(|p| p.as_reference().ok())
}

/// Copy attributes the page inherits from its old ancestors onto the page.
fn flatten_inherited(doc: &mut Document, page_id: ObjectId) {
    let mut inherited: Vec<(&[u8], Object)> = Vec::new();
    let mut ancestor = parent_of(doc, page_id);

    for _ in 0..MAX_TREE_DEPTH {
        let Some(id) = ancestor else { break };
        let Ok(node) = doc.get_dictionary(id) else { break };
        for key in INHERITABLE_KEYS {
            if inherited.iter().all(|(k, _)| *k != key) {
                if let Ok(value) = node.get(key) {
                    inherited.push((key, value.clone()));
                }
            }
        }
        ancestor = parent_of(doc, id);
    }

    if let Ok(page) = doc.get_object_mut(page_id).and_then(Object::as_dict_mut) {
        for (key, value) in inherited {
            if !page.has(key) {
                page.set(key, value);
            }
        }
    }
}
