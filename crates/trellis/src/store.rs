//! Persistence of diagram nodes.
//!
//! A [`NodeStore`] keeps one collection of [`NodeRecord`]s per
//! [`DiagramKind`]. Connections are stored inside their source record, so a
//! connection edit is a patch of one record's `connections` field.
//!
//! Two stores are provided:
//!
//! - [`MemoryStore`] keeps records in process.
//! - [`FileStore`] keeps records in a TOML document, rewritten atomically
//!   after every write.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use trellis_core::geometry::Point;

use crate::{
    error::TrellisError,
    model::{ConnectionRecord, DiagramKind, NodeId, NodeRecord, StaffProfile},
};

/// Partial update of a [`NodeRecord`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub profile: Option<StaffProfile>,
    pub position: Option<Point>,
    pub connections: Option<Vec<ConnectionRecord>>,
}

impl NodePatch {
    pub fn profile(profile: StaffProfile) -> Self {
        Self {
            profile: Some(profile),
            ..Self::default()
        }
    }

    pub fn position(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn connections(connections: Vec<ConnectionRecord>) -> Self {
        Self {
            connections: Some(connections),
            ..Self::default()
        }
    }

    /// Writes the present fields into `record`.
    pub fn apply_to(&self, record: &mut NodeRecord) {
        if let Some(profile) = &self.profile {
            record.profile = profile.clone();
        }
        if let Some(position) = self.position {
            record.position = position;
        }
        if let Some(connections) = &self.connections {
            record.connections = connections.clone();
        }
    }
}

/// Storage backend for diagram nodes.
///
/// Writes are last-write-wins; a store does not check records against each
/// other, so connections to missing targets are stored as given.
pub trait NodeStore {
    /// Returns every record of `kind`, in insertion order.
    fn fetch_all(&self, kind: DiagramKind) -> Result<Vec<NodeRecord>, TrellisError>;

    /// Stores a new record.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::Store`] if a record with the same id exists.
    fn create(&mut self, kind: DiagramKind, record: NodeRecord) -> Result<(), TrellisError>;

    /// Applies `patch` to an existing record.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::NotFound`] for an unknown id.
    fn patch(
        &mut self,
        kind: DiagramKind,
        id: NodeId,
        patch: &NodePatch,
    ) -> Result<(), TrellisError>;

    /// Deletes a record.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::NotFound`] for an unknown id.
    fn delete(&mut self, kind: DiagramKind, id: NodeId) -> Result<(), TrellisError>;
}

type Collection = IndexMap<NodeId, NodeRecord>;

fn create_in(collection: &mut Collection, record: NodeRecord) -> Result<(), TrellisError> {
    if collection.contains_key(&record.id) {
        return Err(TrellisError::Store(format!(
            "record `{}` already exists",
            record.id
        )));
    }
    collection.insert(record.id, record);
    Ok(())
}

fn patch_in(collection: &mut Collection, id: NodeId, patch: &NodePatch) -> Result<(), TrellisError> {
    let record = collection.get_mut(&id).ok_or(TrellisError::NotFound(id))?;
    patch.apply_to(record);
    Ok(())
}

fn delete_in(collection: &mut Collection, id: NodeId) -> Result<(), TrellisError> {
    collection
        .shift_remove(&id)
        .map(|_| ())
        .ok_or(TrellisError::NotFound(id))
}

/// An in-process [`NodeStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: IndexMap<DiagramKind, Collection>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `records` under `kind`.
    pub fn with_records(kind: DiagramKind, records: impl IntoIterator<Item = NodeRecord>) -> Self {
        let mut store = Self::new();
        store
            .collections
            .insert(kind, records.into_iter().map(|r| (r.id, r)).collect());
        store
    }

    /// Returns the stored record with `id`, if any.
    pub fn record(&self, kind: DiagramKind, id: NodeId) -> Option<&NodeRecord> {
        self.collections.get(&kind)?.get(&id)
    }

    fn collection_mut(&mut self, kind: DiagramKind) -> &mut Collection {
        self.collections.entry(kind).or_default()
    }
}

impl NodeStore for MemoryStore {
    fn fetch_all(&self, kind: DiagramKind) -> Result<Vec<NodeRecord>, TrellisError> {
        Ok(self
            .collections
            .get(&kind)
            .map(|collection| collection.values().cloned().collect())
            .unwrap_or_default())
    }

    fn create(&mut self, kind: DiagramKind, record: NodeRecord) -> Result<(), TrellisError> {
        create_in(self.collection_mut(kind), record)
    }

    fn patch(
        &mut self,
        kind: DiagramKind,
        id: NodeId,
        patch: &NodePatch,
    ) -> Result<(), TrellisError> {
        patch_in(self.collection_mut(kind), id, patch)
    }

    fn delete(&mut self, kind: DiagramKind, id: NodeId) -> Result<(), TrellisError> {
        delete_in(self.collection_mut(kind), id)
    }
}

/// On-disk layout of a [`FileStore`].
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    collaboration: Vec<NodeRecord>,
    #[serde(default, rename = "division-structure", skip_serializing_if = "Vec::is_empty")]
    division_structure: Vec<NodeRecord>,
}

impl StoreDocument {
    fn records_mut(&mut self, kind: DiagramKind) -> &mut Vec<NodeRecord> {
        match kind {
            DiagramKind::Collaboration => &mut self.collaboration,
            DiagramKind::DivisionStructure => &mut self.division_structure,
        }
    }

    fn into_records(self, kind: DiagramKind) -> Vec<NodeRecord> {
        match kind {
            DiagramKind::Collaboration => self.collaboration,
            DiagramKind::DivisionStructure => self.division_structure,
        }
    }
}

/// A [`NodeStore`] backed by a TOML file.
///
/// A missing file reads as an empty store. Every write reads the whole
/// document, edits it and replaces the file through a temporary file in the
/// same directory, so readers never observe a half-written document.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<StoreDocument, TrellisError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path:? = self.path; "Store file missing, starting empty");
                Ok(StoreDocument::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn write_document(&self, document: &StoreDocument) -> Result<(), TrellisError> {
        let content = toml::to_string(document)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(content.as_bytes())?;
        file.persist(&self.path).map_err(|err| err.error)?;

        info!(path:? = self.path; "Store file written");
        Ok(())
    }

    /// Runs `edit` on the collection of `kind` and writes the result back.
    fn update(
        &self,
        kind: DiagramKind,
        edit: impl FnOnce(&mut Collection) -> Result<(), TrellisError>,
    ) -> Result<(), TrellisError> {
        let mut document = self.read_document()?;
        let records = document.records_mut(kind);

        let mut collection: Collection = records.drain(..).map(|r| (r.id, r)).collect();
        edit(&mut collection)?;
        records.extend(collection.into_values());

        self.write_document(&document)
    }
}

impl NodeStore for FileStore {
    fn fetch_all(&self, kind: DiagramKind) -> Result<Vec<NodeRecord>, TrellisError> {
        Ok(self.read_document()?.into_records(kind))
    }

    fn create(&mut self, kind: DiagramKind, record: NodeRecord) -> Result<(), TrellisError> {
        self.update(kind, |collection| create_in(collection, record))
    }

    fn patch(
        &mut self,
        kind: DiagramKind,
        id: NodeId,
        patch: &NodePatch,
    ) -> Result<(), TrellisError> {
        self.update(kind, |collection| patch_in(collection, id, patch))
    }

    fn delete(&mut self, kind: DiagramKind, id: NodeId) -> Result<(), TrellisError> {
        self.update(kind, |collection| delete_in(collection, id))
    }
}
