//! In-memory submission store.
//!
//! Used by the command-line driver and by tests. Can be seeded from a JSON
//! manifest:
//!
//! ```json
//! {
//!   "event": "6f1c3c0e-0d0a-4b8e-9a59-3f1d2f1f2a10",
//!   "submissions": [
//!     {
//!       "student_number": "20231042",
//!       "student_name": "Aoki Haruto",
//!       "laboratory": "Systems Lab",
//!       "laboratory_id": 1,
//!       "title": "Scheduling under uncertainty",
//!       "pdf_path": "pdfs/20231042.pdf"
//!     }
//!   ]
//! }
//! ```
//!
//! `pdf_path` is resolved relative to the manifest's directory. A path that
//! cannot be read leaves the submission without a source document.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use log::{info, warn};
use parking_lot::RwLock;
use serde::Deserialize;
use uuid::Uuid;

use super::store::SubmissionStore;
use crate::error::{ProgramError, ProgramResult};
use crate::models::{EventId, LaboratoryId, Presentation, SubmissionId};

#[derive(Debug, Deserialize)]
struct Manifest {
    event: Uuid,
    #[serde(default)]
    submissions: Vec<ManifestRecord>,
}

#[derive(Debug, Deserialize)]
struct ManifestRecord {
    #[serde(default)]
    id: Option<Uuid>,
    student_number: String,
    student_name: String,
    #[serde(default)]
    laboratory: String,
    laboratory_id: i64,
    title: String,
    #[serde(default)]
    pdf_path: Option<PathBuf>,
}

#[derive(Debug, Default)]
struct StoreData {
    events: HashMap<EventId, Vec<SubmissionId>>,
    presentations: HashMap<SubmissionId, Presentation>,
    documents: HashMap<SubmissionId, Vec<u8>>,
}

/// Submission store kept entirely in memory.
#[derive(Clone, Default)]
pub struct LocalSubmissionStore {
    data: Arc<RwLock<StoreData>>,
}

impl LocalSubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event with no submissions yet.
    pub fn create_event(&self, event: EventId) {
        self.data.write().events.entry(event).or_default();
    }

    /// Append a submission to `event`, creating the event if needed.
    pub fn insert_submission(
        &self,
        event: EventId,
        presentation: Presentation,
        document: Option<Vec<u8>>,
    ) -> SubmissionId {
        let id = presentation.id;
        let mut data = self.data.write();
        data.events.entry(event).or_default().push(id);
        data.presentations.insert(id, presentation);
        match document {
            Some(bytes) => {
                data.documents.insert(id, bytes);
            }
            None => {
                data.documents.remove(&id);
            }
        }
        id
    }

    /// Load a JSON manifest into this store and return its event.
    pub fn load_manifest<P: AsRef<Path>>(&self, path: P) -> ProgramResult<EventId> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ProgramError::configuration(format!(
                "Failed to read manifest {}: {}",
                path.display(),
                e
            ))
        })?;
        let manifest: Manifest = serde_json::from_str(&content).map_err(|e| {
            ProgramError::configuration(format!(
                "Failed to parse manifest {}: {}",
                path.display(),
                e
            ))
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let event = EventId::new(manifest.event);
        self.create_event(event);

        for record in manifest.submissions {
            let document = record
                .pdf_path
                .as_ref()
                .and_then(|rel| read_document(&base.join(rel)));
            let id = record
                .id
                .map(SubmissionId::new)
                .unwrap_or_else(SubmissionId::generate);
            let presentation = Presentation::new(
                LaboratoryId::new(record.laboratory_id),
                record.student_number,
                record.student_name,
                record.title,
            )
            .with_id(id)
            .with_laboratory(record.laboratory);
            self.insert_submission(event, presentation, document);
        }

        info!(
            "Loaded manifest {} for event {} ({} submissions)",
            path.display(),
            event,
            self.data.read().events.get(&event).map_or(0, Vec::len)
        );
        Ok(event)
    }

    /// New store seeded from a manifest file.
    pub fn from_manifest_file<P: AsRef<Path>>(path: P) -> ProgramResult<(Self, EventId)> {
        let store = Self::new();
        let event = store.load_manifest(path)?;
        Ok((store, event))
    }
}

fn read_document(path: &Path) -> Option<Vec<u8>> {
    match fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warn!("Source document {} is unavailable: {}", path.display(), e);
            None
        }
    }
}

#[async_trait]
impl SubmissionStore for LocalSubmissionStore {
    async fn list_presentations(&self, event: EventId) -> ProgramResult<Vec<Presentation>> {
        let data = self.data.read();
        let ids = data
            .events
            .get(&event)
            .ok_or_else(|| ProgramError::not_found(format!("event {}", event)))?;
        ids.iter()
            .map(|id| {
                data.presentations
                    .get(id)
                    .cloned()
                    .ok_or_else(|| ProgramError::internal(format!("dangling submission {}", id)))
            })
            .collect()
    }

    async fn fetch_source_document(
        &self,
        submission: SubmissionId,
    ) -> ProgramResult<Option<Vec<u8>>> {
        Ok(self.data.read().documents.get(&submission).cloned())
    }
}
