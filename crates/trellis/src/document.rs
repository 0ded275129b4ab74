//! Standalone diagram documents.
//!
//! A document holds one diagram in the persisted record format:
//!
//! ```toml
//! kind = "collaboration"
//!
//! [[nodes]]
//! id = "director"
//! name = "Ayu Lestari"
//! job_title = "Managing Director"
//! position = { x = 0, y = 0 }
//!
//! [[nodes.connections]]
//! target = "auditor"
//! routing = "org-chart"
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    diagram::Diagram,
    error::TrellisError,
    model::{DiagramKind, NodeRecord},
};

/// One diagram, as read from or written to a TOML document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagramDocument {
    #[serde(default)]
    pub kind: DiagramKind,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
}

impl DiagramDocument {
    /// Parses a document from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::Store`] if the text is not a valid document.
    pub fn from_toml(source: &str) -> Result<Self, TrellisError> {
        Ok(toml::from_str(source)?)
    }

    /// Serializes the document to TOML text.
    pub fn to_toml(&self) -> Result<String, TrellisError> {
        Ok(toml::to_string(self)?)
    }

    /// Snapshots `diagram` into a document.
    pub fn from_diagram(diagram: &Diagram) -> Self {
        Self {
            kind: diagram.kind(),
            nodes: diagram.nodes().map(|node| node.to_record()).collect(),
        }
    }

    /// Builds the diagram described by this document.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::Validation`] for duplicate ids or invalid
    /// profiles.
    pub fn into_diagram(self) -> Result<Diagram, TrellisError> {
        Diagram::from_records(self.kind, self.nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConnectionStyle, Routing, StaffProfile};
    use trellis_core::geometry::Point;

    #[test]
    fn test_parse_document() {
        let document = DiagramDocument::from_toml(
            r#"
            kind = "division-structure"

            [[nodes]]
            id = "head"
            name = "Dian"
            job_title = "Head of Division"

            [[nodes]]
            id = "staff"
            name = "Eko"
            job_title = "Auditor"
            active = false
            position = { x = 0, y = 200 }

            [[nodes.connections]]
            target = "head"
            label = "reporting"
            routing = "orgchart"
            "#,
        )
        .unwrap();

        assert_eq!(document.kind, DiagramKind::DivisionStructure);
        let diagram = document.into_diagram().unwrap();
        assert_eq!(diagram.len(), 2);
        assert_eq!(diagram.connections().count(), 1);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let document = DiagramDocument::from_toml(
            r#"
            [[nodes]]
            id = "a"
            name = "A"
            job_title = "Lead"

            [[nodes]]
            id = "a"
            name = "B"
            job_title = "Lead"
            "#,
        )
        .unwrap();

        assert!(matches!(
            document.into_diagram(),
            Err(TrellisError::Validation(_))
        ));
    }

    #[test]
    fn test_snapshot_survives_toml() {
        let mut diagram = Diagram::new(DiagramKind::Collaboration);
        let a = diagram
            .create_node_at(
                StaffProfile::new("Ani", "Director")
                    .with_job_descriptions(vec!["Sign-off".to_string()]),
                Point::new(0.0, 0.0),
            )
            .unwrap();
        let b = diagram
            .create_node_at(StaffProfile::new("Bayu", "Auditor"), Point::new(250.0, 180.0))
            .unwrap();
        diagram
            .upsert_connection(
                a,
                b,
                ConnectionStyle::new().with_routing(Routing::Custom {
                    control_points: vec![Point::new(120.0, -30.0)],
                }),
            )
            .unwrap();

        let text = DiagramDocument::from_diagram(&diagram).to_toml().unwrap();
        let restored = DiagramDocument::from_toml(&text)
            .unwrap()
            .into_diagram()
            .unwrap();

        assert_eq!(restored.len(), 2);
        assert_eq!(
            restored.connection(a, b).map(|c| c.style().routing().clone()),
            Some(Routing::Custom {
                control_points: vec![Point::new(120.0, -30.0)]
            })
        );
        assert_eq!(restored.node(b).unwrap().position(), Point::new(250.0, 180.0));
    }
}
