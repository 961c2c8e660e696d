//! Compiled documents returned by the pipeline.

use serde::{Deserialize, Serialize};

/// Media type of every compiled artifact the pipeline produces.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// File name given to a compiled program.
pub const PROGRAM_FILENAME: &str = "program.pdf";

/// A compiled binary document handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramDocument {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub media_type: String,
    pub filename: String,
}

impl ProgramDocument {
    pub fn pdf(bytes: Vec<u8>, filename: impl Into<String>) -> Self {
        Self {
            bytes,
            media_type: PDF_MEDIA_TYPE.to_string(),
            filename: filename.into(),
        }
    }

    /// Compiled program named `program.pdf`.
    pub fn program(bytes: Vec<u8>) -> Self {
        Self::pdf(bytes, PROGRAM_FILENAME)
    }

    /// Merged booklet named after the program title.
    ///
    /// The title is reduced to a single path component, so the name is safe
    /// to join onto an output directory.
    pub fn booklet(bytes: Vec<u8>, title: &str) -> Self {
        Self::pdf(bytes, format!("{}-booklet.pdf", file_stem(title)))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Replace path separators and control characters with `_`.
fn file_stem(title: &str) -> String {
    title
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
