//! Staff nodes, their editable profile and the persisted node record.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use trellis_core::geometry::Point;

use super::{Connection, ConnectionRecord, NodeId};
use crate::error::TrellisError;

/// Which staff diagram a node belongs to.
///
/// Both diagrams share the same shape; only the collaboration diagram
/// records job descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagramKind {
    #[default]
    Collaboration,
    DivisionStructure,
}

impl DiagramKind {
    /// Returns true if nodes of this diagram may carry job descriptions.
    pub fn allows_job_descriptions(self) -> bool {
        matches!(self, Self::Collaboration)
    }

    /// Name of the backing collection in a document store.
    pub fn collection(self) -> &'static str {
        match self {
            Self::Collaboration => "collaboration",
            Self::DivisionStructure => "division-structure",
        }
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

/// Editable attributes of a staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffProfile {
    name: String,
    job_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    job_descriptions: Vec<String>,
    #[serde(default = "default_active")]
    active: bool,
}

fn default_active() -> bool {
    true
}

impl StaffProfile {
    /// Creates an active profile with the given display name and job title.
    pub fn new(name: impl Into<String>, job_title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            job_title: job_title.into(),
            photo: None,
            notes: None,
            job_descriptions: Vec::new(),
            active: true,
        }
    }

    pub fn with_photo(mut self, photo: impl Into<String>) -> Self {
        self.photo = Some(photo.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_job_descriptions(mut self, descriptions: Vec<String>) -> Self {
        self.job_descriptions = descriptions;
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn job_title(&self) -> &str {
        &self.job_title
    }

    pub fn photo(&self) -> Option<&str> {
        self.photo.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn job_descriptions(&self) -> &[String] {
        &self.job_descriptions
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Checks the profile before it is saved into a diagram of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::Validation`] when the name or job title is blank,
    /// when a job description is blank, or when job descriptions are given for
    /// a diagram that does not record them.
    pub fn validate(&self, kind: DiagramKind) -> Result<(), TrellisError> {
        if self.name.trim().is_empty() {
            return Err(TrellisError::validation("name must not be empty"));
        }
        if self.job_title.trim().is_empty() {
            return Err(TrellisError::validation("job title must not be empty"));
        }
        if !self.job_descriptions.is_empty() && !kind.allows_job_descriptions() {
            return Err(TrellisError::validation(format!(
                "{kind} diagrams do not record job descriptions"
            )));
        }
        if self.job_descriptions.iter().any(|d| d.trim().is_empty()) {
            return Err(TrellisError::validation(
                "job descriptions must not be empty",
            ));
        }
        Ok(())
    }
}

/// A staff card on the canvas. Its position is the card's center.
#[derive(Debug, Clone, PartialEq)]
pub struct StaffNode {
    id: NodeId,
    profile: StaffProfile,
    position: Point,
    connections: IndexMap<NodeId, Connection>,
}

impl StaffNode {
    pub fn new(id: NodeId, profile: StaffProfile, position: Point) -> Self {
        Self {
            id,
            profile,
            position,
            connections: IndexMap::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn profile(&self) -> &StaffProfile {
        &self.profile
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Returns the outgoing connections in insertion order.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Returns the outgoing connection to `target`, if any.
    pub fn connection_to(&self, target: NodeId) -> Option<&Connection> {
        self.connections.get(&target)
    }

    pub(crate) fn set_profile(&mut self, profile: StaffProfile) {
        self.profile = profile;
    }

    pub(crate) fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    /// Inserts or replaces the connection keyed by its target.
    pub(crate) fn put_connection(&mut self, connection: Connection) -> Option<Connection> {
        self.connections.insert(connection.target(), connection)
    }

    pub(crate) fn take_connection(&mut self, target: NodeId) -> Option<Connection> {
        self.connections.shift_remove(&target)
    }

    /// Converts the node and the connections it owns into a persisted record.
    pub fn to_record(&self) -> NodeRecord {
        NodeRecord {
            id: self.id,
            profile: self.profile.clone(),
            position: self.position,
            connections: self.connections_record(),
        }
    }

    /// Returns the persisted form of the outgoing connections.
    pub fn connections_record(&self) -> Vec<ConnectionRecord> {
        self.connections().map(Connection::to_record).collect()
    }
}

impl From<NodeRecord> for StaffNode {
    fn from(record: NodeRecord) -> Self {
        let mut node = Self::new(record.id, record.profile, record.position);
        for connection in record.connections {
            // Later duplicates win, as an overwrite would.
            node.put_connection(connection.into());
        }
        node
    }
}

/// Persisted form of a [`StaffNode`], with its connections embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    #[serde(flatten)]
    pub profile: StaffProfile,
    #[serde(default)]
    pub position: Point,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connections: Vec<ConnectionRecord>,
}
