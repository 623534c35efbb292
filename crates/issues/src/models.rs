//! Discovery of facility model files in an object bucket.
//!
//! Model files follow the naming scheme `<facility>-<area>-<type>.nwd`, for
//! example `montreal-02-mep.nwd`. Each facility's files are grouped by area
//! and keyed by type, mapping to the URN a viewer loads the model with.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use base64::Engine as _;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::facility::Facility;
use crate::store::BoxFuture;

static MODEL_KEY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_]+)-([0-9]+)-([A-Za-z0-9_]+)\.nwd$")
        .expect("MODEL_KEY_REGEX: invalid regex pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub object_key: String,
    pub object_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingError {
    #[error("object listing unavailable: {0}")]
    Unavailable(String),
}

/// Area number -> model type -> URN.
pub type ModelAreas = BTreeMap<String, BTreeMap<String, String>>;

/// Read-only view of the bucket holding model files.
pub trait ObjectListing: Send + Sync {
    fn objects(&self) -> BoxFuture<'_, Result<Vec<StoredObject>, ListingError>>;
}

/// Lists the files of a local directory as if it were a bucket.
pub struct DirectoryListing {
    root: PathBuf,
    bucket: String,
}

impl DirectoryListing {
    pub fn new(root: impl Into<PathBuf>, bucket: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            bucket: bucket.into(),
        }
    }

    fn object_id(&self, key: &str) -> String {
        format!("urn:adsk.objects:os.object:{}/{}", self.bucket, key)
    }
}

impl ObjectListing for DirectoryListing {
    fn objects(&self) -> BoxFuture<'_, Result<Vec<StoredObject>, ListingError>> {
        Box::pin(async move {
            let mut dir = tokio::fs::read_dir(&self.root)
                .await
                .map_err(|e| ListingError::Unavailable(e.to_string()))?;

            let mut out = Vec::new();
            while let Some(entry) = dir
                .next_entry()
                .await
                .map_err(|e| ListingError::Unavailable(e.to_string()))?
            {
                let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
                if !is_file {
                    continue;
                }
                let Some(key) = entry.file_name().to_str().map(str::to_string) else {
                    continue;
                };
                out.push(StoredObject {
                    object_id: self.object_id(&key),
                    object_key: key,
                });
            }
            out.sort_by(|a, b| a.object_key.cmp(&b.object_key));
            debug!(root = %self.root.display(), count = out.len(), "listed model objects");
            Ok(out)
        })
    }
}

/// URN form of an object id: base64 with the padding removed.
pub fn id_to_urn(id: &str) -> String {
    base64::engine::general_purpose::STANDARD
        .encode(id.as_bytes())
        .trim_end_matches('=')
        .to_string()
}

/// Groups the model files of `facility` by area. Other files are ignored.
pub fn group_model_areas(objects: &[StoredObject], facility: Facility) -> ModelAreas {
    let mut areas = ModelAreas::new();
    for object in objects {
        let Some(caps) = MODEL_KEY_REGEX.captures(&object.object_key) else {
            continue;
        };
        if caps[1].to_lowercase() != facility.as_str() {
            continue;
        }
        let area = caps[2].to_string();
        let kind = caps[3].to_lowercase();
        areas
            .entry(area)
            .or_default()
            .insert(kind, id_to_urn(&object.object_id));
    }
    areas
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn obj(key: &str) -> StoredObject {
        StoredObject {
            object_key: key.into(),
            object_id: format!("urn:adsk.objects:os.object:bucket/{key}"),
        }
    }

    #[test]
    fn urn_strips_base64_padding() {
        assert_eq!(id_to_urn("ab"), "YWI");
        assert_eq!(id_to_urn("abc"), "YWJj");
    }

    #[test]
    fn groups_files_of_one_facility_by_area_and_type() {
        let objects = vec![
            obj("Montreal-01-Arch.nwd"),
            obj("montreal-01-mep.nwd"),
            obj("montreal-02-arch.nwd"),
            obj("el-01-arch.nwd"),
            obj("montreal-notes.txt"),
            obj("montreal-xx-arch.nwd"),
        ];
        let areas = group_model_areas(&objects, Facility::Montreal);

        assert_eq!(
            areas.keys().cloned().collect::<Vec<_>>(),
            vec!["01".to_string(), "02".to_string()]
        );
        assert_eq!(
            areas["01"]["arch"],
            id_to_urn("urn:adsk.objects:os.object:bucket/Montreal-01-Arch.nwd")
        );
        assert!(areas["01"].contains_key("mep"));
        assert_eq!(areas["02"].len(), 1);
    }

    #[tokio::test]
    async fn directory_listing_reports_files_only() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("el-03-arch.nwd"), b"")
            .await
            .unwrap();
        tokio::fs::create_dir(dir.path().join("nested")).await.unwrap();

        let listing = DirectoryListing::new(dir.path(), "facility-models");
        let objects = listing.objects().await.unwrap();
        assert_eq!(
            objects,
            vec![StoredObject {
                object_key: "el-03-arch.nwd".into(),
                object_id: "urn:adsk.objects:os.object:facility-models/el-03-arch.nwd".into(),
            }]
        );

        let areas = group_model_areas(&objects, Facility::El);
        assert!(areas["03"].contains_key("arch"));
    }

    #[tokio::test]
    async fn missing_directory_is_unavailable() {
        let listing = DirectoryListing::new("/definitely/not/here", "b");
        assert!(matches!(
            listing.objects().await,
            Err(ListingError::Unavailable(_))
        ));
    }
}
