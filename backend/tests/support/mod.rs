#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

use program_builder::api::{
    DocumentCompiler, EventId, LaboratoryId, LocalSubmissionStore, Presentation, ProgramBuilder,
    ProgramConfig, ProgramError, ProgramMetadata, ProgramResult, TimeWindow,
};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// =========================================================
// Fixtures
// =========================================================

pub fn presentation(lab: i64, key: &str) -> Presentation {
    Presentation::new(
        LaboratoryId::new(lab),
        key,
        format!("Student {}", key),
        format!("Research topic {}", key),
    )
    .with_laboratory(format!("Laboratory {}", lab))
}

pub fn metadata() -> ProgramMetadata {
    ProgramMetadata {
        course_name: "Graduate School of Informatics".to_string(),
        event_name: "Midterm Presentations".to_string(),
        event_theme: "Research progress".to_string(),
        date_time: "2026-11-02 09:00".to_string(),
        venue: "Hall A".to_string(),
    }
}

/// Two one-hour sessions around a fifteen-minute break.
pub fn morning_windows() -> Vec<TimeWindow> {
    vec![
        TimeWindow::session("09:00", "10:00"),
        TimeWindow::break_window("10:00", "10:15"),
        TimeWindow::session("10:15", "11:15"),
    ]
}

/// Store holding `presentations` under a fresh event, each with a one-page
/// source document labeled by its ordering key unless listed in `without_documents`.
pub fn seeded_store(
    presentations: Vec<Presentation>,
    without_documents: &[&str],
) -> (Arc<LocalSubmissionStore>, EventId) {
    let store = Arc::new(LocalSubmissionStore::new());
    let event = EventId::generate();
    store.create_event(event);
    for p in presentations {
        let key = p.ordering_key.to_string();
        let document = if without_documents.contains(&key.as_str()) {
            None
        } else {
            Some(labeled_pdf(&[&format!("source-{}", key)]))
        };
        store.insert_submission(event, p, document);
    }
    (store, event)
}

pub fn config() -> ProgramConfig {
    ProgramConfig::default()
}

/// Builder over `store` whose compiler returns a program with `labels` pages.
pub fn builder(store: Arc<LocalSubmissionStore>, labels: &[&str]) -> ProgramBuilder {
    ProgramBuilder::new(store, Arc::new(StaticCompiler::new(labels)), config())
}

// =========================================================
// PDF helpers
// =========================================================

/// In-memory PDF with one page per label; each page carries its label under
/// a `Label` key so page order can be checked after a merge.
pub fn labeled_pdf(labels: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Stream::new(dictionary! {}, b"q Q".to_vec()));
    let kids: Vec<Object> = labels
        .iter()
        .map(|label| {
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(595),
                    Object::Integer(842),
                ],
                "Label" => Object::String(label.as_bytes().to_vec(), StringFormat::Literal),
            })
            .into()
        })
        .collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => labels.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

/// Page labels of `bytes`, in page order.
pub fn page_labels(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .into_values()
        .map(|id| match doc.get_dictionary(id).unwrap().get(b"Label") {
            Ok(Object::String(raw, _)) => String::from_utf8_lossy(raw).into_owned(),
            other => panic!("page without label: {:?}", other),
        })
        .collect()
}

// =========================================================
// Compiler stubs
// =========================================================

/// Returns a fixed program PDF and records every markup it was given.
pub struct StaticCompiler {
    pdf: Vec<u8>,
    calls: AtomicUsize,
    last_markup: Mutex<Option<String>>,
}

impl StaticCompiler {
    pub fn new(labels: &[&str]) -> Self {
        Self {
            pdf: labeled_pdf(labels),
            calls: AtomicUsize::new(0),
            last_markup: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_markup(&self) -> Option<String> {
        self.last_markup.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentCompiler for StaticCompiler {
    async fn compile(&self, markup: &str) -> ProgramResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_markup.lock().unwrap() = Some(markup.to_string());
        Ok(self.pdf.clone())
    }
}

/// Always fails with a compilation failure.
pub struct FailingCompiler;

#[async_trait]
impl DocumentCompiler for FailingCompiler {
    async fn compile(&self, _markup: &str) -> ProgramResult<Vec<u8>> {
        Err(ProgramError::CompilationFailure {
            stage: "platex".to_string(),
            diagnostics: "! Undefined control sequence.".to_string(),
        })
    }
}
