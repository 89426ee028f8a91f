//! Gesture corpus on disk: base exemplars and the samples to classify.

use crate::error::EngineError;
use crate::models::{Batch, Label, ReadingError, Sample};
use crate::reference::BaseExemplars;
use crate::silhouette::{ExtractRequest, SilhouetteExtractor};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Image extensions picked up from corpus directories
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

fn is_supported(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusEntry {
    /// File stem, e.g. `rock_3`
    pub identifier: String,
    pub path: PathBuf,
}

impl CorpusEntry {
    pub fn truth(&self) -> Label {
        Label::from_identifier(&self.identifier)
    }
}

/// A directory of gesture images, ordered by file name
#[derive(Debug, Clone)]
pub struct Corpus {
    entries: Vec<CorpusEntry>,
}

impl Corpus {
    /// List the images of a directory. A missing or unreadable directory is fatal.
    pub fn open(root: &Path) -> Result<Self, EngineError> {
        let unavailable = |source: Option<std::io::Error>| EngineError::CorpusUnavailable {
            path: root.to_path_buf(),
            source,
        };

        if !root.is_dir() {
            return Err(unavailable(None));
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(root).map_err(|e| unavailable(Some(e)))? {
            let path = entry.map_err(|e| unavailable(Some(e)))?.path();
            if !path.is_file() || !is_supported(&path) {
                debug!("Ignoring {}", path.display());
                continue;
            }
            let Some(stem) = path.file_stem() else {
                continue;
            };
            entries.push(CorpusEntry {
                identifier: stem.to_string_lossy().to_string(),
                path,
            });
        }
        entries.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));

        info!("Found {} images in {}", entries.len(), root.display());
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    /// Extract every entry. Failures become reading errors and are left out of the batch.
    pub fn load<E: SilhouetteExtractor>(&self, extractor: &E, resize: bool) -> Batch<E::Outline> {
        let mut samples = Vec::with_capacity(self.entries.len());
        let mut reading_errors = Vec::new();

        for entry in &self.entries {
            let request = ExtractRequest {
                identifier: &entry.identifier,
                path: &entry.path,
                resize,
            };
            match extractor.extract(&request) {
                Ok(outline) => samples.push(Sample::new(entry.identifier.clone(), outline)),
                Err(source) => {
                    let reason = source.to_string();
                    let err = EngineError::SampleDecodeFailure {
                        identifier: entry.identifier.clone(),
                        source,
                    };
                    warn!("{:#}", anyhow::Error::from(err));
                    reading_errors.push(ReadingError {
                        identifier: entry.identifier.clone(),
                        reason,
                    });
                }
            }
        }

        Batch {
            samples,
            reading_errors,
        }
    }
}

/// Find `<dir>/<label>.<ext>` for a gesture label, ignoring case
///
/// `Ok(None)` when the directory has no such image; an unreadable directory is an error.
pub fn find_base_image(dir: &Path, label: Label) -> std::io::Result<Option<PathBuf>> {
    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let matches_label = path
            .file_stem()
            .is_some_and(|stem| stem.to_string_lossy().eq_ignore_ascii_case(label.name()));
        if matches_label && path.is_file() && is_supported(&path) {
            candidates.push(path);
        }
    }
    candidates.sort();
    Ok(candidates.into_iter().next())
}

/// Extract the Paper, Rock and Scissors base exemplars. Any failure is fatal.
pub fn load_base_exemplars<E: SilhouetteExtractor>(
    dir: &Path,
    extractor: &E,
    resize: bool,
) -> Result<BaseExemplars<E::Outline>, EngineError> {
    let load = |label: Label| -> Result<E::Outline, EngineError> {
        let found = find_base_image(dir, label).map_err(|source| EngineError::BaseDirUnavailable {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = found.ok_or_else(|| EngineError::BaseExemplarUnavailable {
            label,
            path: dir.join(label.name()),
            source: None,
        })?;

        let tag = format!("base_{}", label.name());
        let request = ExtractRequest {
            identifier: &tag,
            path: &path,
            resize,
        };
        let outline = extractor
            .extract(&request)
            .map_err(|source| EngineError::BaseExemplarUnavailable {
                label,
                path: path.clone(),
                source: Some(source),
            })?;

        info!("Loaded base exemplar {} from {}", label, path.display());
        Ok(outline)
    };

    Ok(BaseExemplars {
        paper: load(Label::Paper)?,
        rock: load(Label::Rock)?,
        scissors: load(Label::Scissors)?,
    })
}
