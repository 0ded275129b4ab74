//! A [`Diagram`] kept in step with a [`NodeStore`].
//!
//! Each mutation is applied in memory first and then written to the store as
//! one write per affected record. If a write fails the in-memory diagram is
//! rolled back, so the board never shows an edit the store refused.

use log::{debug, error, warn};

use trellis_core::geometry::Point;

use crate::{
    diagram::{Diagram, RemovedNode},
    error::TrellisError,
    model::{Connection, ConnectionStyle, DiagramKind, NodeId, StaffProfile},
    placement::Placement,
    store::{NodePatch, NodeStore},
};

/// An editable diagram backed by a store.
#[derive(Debug)]
pub struct Board<S: NodeStore> {
    store: S,
    diagram: Diagram,
    placement: Placement,
}

impl<S: NodeStore> Board<S> {
    /// Fetches every node of `kind` from `store` and builds the diagram.
    ///
    /// # Errors
    ///
    /// Propagates store failures and rejects invalid stored records.
    pub fn load(store: S, kind: DiagramKind, placement: Placement) -> Result<Self, TrellisError> {
        let records = store.fetch_all(kind)?;
        let diagram = Diagram::from_records(kind, records)?;
        Ok(Self {
            store,
            diagram,
            placement,
        })
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the board, returning its store.
    pub fn into_store(self) -> S {
        self.store
    }

    fn kind(&self) -> DiagramKind {
        self.diagram.kind()
    }

    /// Applies `edit` to the diagram, then `sync` to the store. Restores the
    /// previous diagram if either step fails.
    fn transact<T>(
        &mut self,
        edit: impl FnOnce(&mut Diagram, &mut Placement) -> Result<T, TrellisError>,
        sync: impl FnOnce(&mut S, &Diagram, &T) -> Result<(), TrellisError>,
    ) -> Result<T, TrellisError> {
        let snapshot = self.diagram.clone();
        let result = edit(&mut self.diagram, &mut self.placement).and_then(|value| {
            sync(&mut self.store, &self.diagram, &value).map(|()| value)
        });

        if let Err(err) = &result {
            if matches!(err, TrellisError::NotFound(_) | TrellisError::Validation(_)) {
                debug!(err:%; "Edit rejected");
            } else {
                error!(err:%; "Store write failed, rolling back");
            }
            self.diagram = snapshot;
        }
        result
    }

    /// Creates a node at a jittered grid position and stores it.
    pub fn create_node(&mut self, profile: StaffProfile) -> Result<NodeId, TrellisError> {
        let kind = self.kind();
        self.transact(
            |diagram, placement| diagram.create_node(profile, placement),
            |store, diagram, id| store.create(kind, node_record(diagram, *id)?),
        )
    }

    /// Replaces a node's profile and stores it.
    pub fn update_profile(&mut self, id: NodeId, profile: StaffProfile) -> Result<(), TrellisError> {
        let kind = self.kind();
        let patch = NodePatch::profile(profile.clone());
        self.transact(
            |diagram, _| diagram.update_profile(id, profile),
            |store, _, ()| store.patch(kind, id, &patch),
        )
    }

    /// Moves a node and stores its new position.
    ///
    /// Meant to be called once a drag ends, not on every pointer move.
    pub fn commit_position(&mut self, id: NodeId, x: f32, y: f32) -> Result<(), TrellisError> {
        let kind = self.kind();
        self.transact(
            |diagram, _| diagram.set_node_position(id, x, y),
            |store, _, ()| store.patch(kind, id, &NodePatch::position(Point::new(x, y))),
        )
    }

    /// Saves the connection from `from` to `to` and stores the source's
    /// connection list.
    pub fn upsert_connection(
        &mut self,
        from: NodeId,
        to: NodeId,
        style: ConnectionStyle,
    ) -> Result<Option<ConnectionStyle>, TrellisError> {
        let kind = self.kind();
        self.transact(
            |diagram, _| diagram.upsert_connection(from, to, style),
            |store, diagram, _| sync_connections(store, kind, diagram, from),
        )
    }

    /// Removes the connection from `from` to `to`. Nothing is written if
    /// there was no such connection.
    pub fn remove_connection(
        &mut self,
        from: NodeId,
        to: NodeId,
    ) -> Result<Option<Connection>, TrellisError> {
        let kind = self.kind();
        self.transact(
            |diagram, _| diagram.remove_connection(from, to),
            |store, diagram, removed| match removed {
                Some(_) => sync_connections(store, kind, diagram, from),
                None => Ok(()),
            },
        )
    }

    /// Removes a node. Pruned sources are patched before the node record is
    /// deleted.
    ///
    /// A failure part way leaves earlier writes in the store; the board
    /// itself is rolled back.
    pub fn remove_node(&mut self, id: NodeId) -> Result<RemovedNode, TrellisError> {
        let kind = self.kind();
        self.transact(
            |diagram, _| diagram.remove_node(id),
            |store, diagram, removed| {
                for (done, source) in removed.pruned_sources.iter().enumerate() {
                    if let Err(err) = sync_connections(store, kind, diagram, *source) {
                        if done > 0 {
                            warn!(id:% = id, patched = done; "Node removal partially stored");
                        }
                        return Err(err);
                    }
                }
                store.delete(kind, id)
            },
        )
    }
}

fn node_record(
    diagram: &Diagram,
    id: NodeId,
) -> Result<crate::model::NodeRecord, TrellisError> {
    diagram
        .node(id)
        .map(|node| node.to_record())
        .ok_or(TrellisError::NotFound(id))
}

fn sync_connections<S: NodeStore>(
    store: &mut S,
    kind: DiagramKind,
    diagram: &Diagram,
    source: NodeId,
) -> Result<(), TrellisError> {
    let node = diagram.node(source).ok_or(TrellisError::NotFound(source))?;
    store.patch(kind, source, &NodePatch::connections(node.connections_record()))
}

#[cfg(test)]
mod tests {
    use trellis_core::draw::LineType;

    use super::*;
    use crate::{
        config::PlacementConfig,
        model::{NodeRecord, Routing},
        store::MemoryStore,
    };

    /// Wraps a [`MemoryStore`] and fails every write once armed.
    #[derive(Debug, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        failing: bool,
    }

    impl FlakyStore {
        fn check(&self) -> Result<(), TrellisError> {
            if self.failing {
                Err(TrellisError::Store("backend unavailable".to_string()))
            } else {
                Ok(())
            }
        }
    }

    impl NodeStore for FlakyStore {
        fn fetch_all(&self, kind: DiagramKind) -> Result<Vec<NodeRecord>, TrellisError> {
            self.inner.fetch_all(kind)
        }

        fn create(&mut self, kind: DiagramKind, record: NodeRecord) -> Result<(), TrellisError> {
            self.check()?;
            self.inner.create(kind, record)
        }

        fn patch(
            &mut self,
            kind: DiagramKind,
            id: NodeId,
            patch: &NodePatch,
        ) -> Result<(), TrellisError> {
            self.check()?;
            self.inner.patch(kind, id, patch)
        }

        fn delete(&mut self, kind: DiagramKind, id: NodeId) -> Result<(), TrellisError> {
            self.check()?;
            self.inner.delete(kind, id)
        }
    }

    fn board<S: NodeStore>(store: S) -> Board<S> {
        let placement = Placement::seeded(PlacementConfig::default(), 1);
        Board::load(store, DiagramKind::Collaboration, placement).unwrap()
    }

    #[test]
    fn test_mutations_reach_the_store() {
        let mut board = board(MemoryStore::new());
        let a = board.create_node(StaffProfile::new("Ani", "Director")).unwrap();
        let b = board.create_node(StaffProfile::new("Bayu", "Auditor")).unwrap();

        board
            .upsert_connection(a, b, ConnectionStyle::new().with_routing(Routing::Orthogonal))
            .unwrap();
        board.commit_position(b, 640.0, 320.0).unwrap();

        let store = board.store();
        let kind = DiagramKind::Collaboration;
        let stored_a = store.record(kind, a).unwrap();
        assert_eq!(stored_a.connections.len(), 1);
        assert_eq!(stored_a.connections[0].routing.as_deref(), Some("orthogonal"));
        assert_eq!(store.record(kind, b).unwrap().position, Point::new(640.0, 320.0));
    }

    #[test]
    fn test_remove_node_patches_pruned_sources() {
        let mut board = board(MemoryStore::new());
        let a = board.create_node(StaffProfile::new("Ani", "Director")).unwrap();
        let b = board.create_node(StaffProfile::new("Bayu", "Auditor")).unwrap();
        board.upsert_connection(b, a, ConnectionStyle::new()).unwrap();

        let removed = board.remove_node(a).unwrap();

        assert_eq!(removed.pruned_sources, vec![b]);
        let store = board.store();
        assert!(store.record(DiagramKind::Collaboration, a).is_none());
        assert!(
            store
                .record(DiagramKind::Collaboration, b)
                .unwrap()
                .connections
                .is_empty()
        );
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let mut board = board(FlakyStore::default());
        let a = board.create_node(StaffProfile::new("Ani", "Director")).unwrap();
        let b = board.create_node(StaffProfile::new("Bayu", "Auditor")).unwrap();
        board.upsert_connection(a, b, ConnectionStyle::new()).unwrap();
        board.store.failing = true;

        let dashed = ConnectionStyle::new().with_line_type(LineType::Dashed);
        assert!(board.upsert_connection(a, b, dashed).is_err());
        assert!(board.remove_node(b).is_err());
        assert!(board.create_node(StaffProfile::new("Citra", "Analyst")).is_err());

        let diagram = board.diagram();
        assert_eq!(diagram.len(), 2);
        assert_eq!(
            diagram.connection(a, b).unwrap().style().line_type(),
            LineType::Solid
        );
    }

    #[test]
    fn test_rejected_edit_writes_nothing() {
        let mut board = board(MemoryStore::new());
        let a = board.create_node(StaffProfile::new("Ani", "Director")).unwrap();

        assert!(matches!(
            board.upsert_connection(a, NodeId::new("ghost"), ConnectionStyle::new()),
            Err(TrellisError::NotFound(_))
        ));
        assert!(board.remove_connection(a, NodeId::new("ghost")).unwrap().is_none());
        assert!(
            board
                .store()
                .record(DiagramKind::Collaboration, a)
                .unwrap()
                .connections
                .is_empty()
        );
    }

    #[test]
    fn test_load_existing_records() {
        let records = vec![
            crate::model::StaffNode::new(
                NodeId::new("lead"),
                StaffProfile::new("Lead", "Manager"),
                Point::new(0.0, 0.0),
            )
            .to_record(),
        ];
        let store = MemoryStore::with_records(DiagramKind::Collaboration, records);

        let mut board = board(store);
        let created = board.create_node(StaffProfile::new("New", "Intern")).unwrap();

        assert_eq!(board.diagram().len(), 2);
        assert_ne!(created, NodeId::new("lead"));
    }
}
