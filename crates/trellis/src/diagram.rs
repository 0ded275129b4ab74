//! The staff diagram: a set of cards and the connections they own.
//!
//! [`Diagram`] validates every id it is handed before mutating anything.
//! Removing a node prunes every connection that points at it, so listings
//! and routing never see a dangling target produced by this type. Nodes
//! loaded through [`Diagram::insert_node`] may still carry connections to
//! targets that were never loaded; readers skip those.

use indexmap::IndexMap;
use log::{debug, info, trace, warn};

use trellis_core::geometry::{Bounds, Point};

use crate::{
    error::TrellisError,
    model::{
        Connection, ConnectionStyle, DiagramKind, NodeId, NodeRecord, StaffNode, StaffProfile,
    },
    path::PathGeometry,
    placement::Placement,
    routing::Router,
};

/// Result of [`Diagram::remove_node`].
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedNode {
    /// The removed node, including its outgoing connections.
    pub node: StaffNode,
    /// Nodes that lost a connection to the removed node, in diagram order.
    pub pruned_sources: Vec<NodeId>,
}

/// A connection together with both of its endpoint nodes.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionView<'a> {
    pub source: &'a StaffNode,
    pub connection: &'a Connection,
    pub target: &'a StaffNode,
}

/// A connection and the path it currently takes.
#[derive(Debug, Clone)]
pub struct RoutedConnection<'a> {
    pub view: ConnectionView<'a>,
    pub path: PathGeometry,
}

/// A staff diagram of one [`DiagramKind`].
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    kind: DiagramKind,
    nodes: IndexMap<NodeId, StaffNode>,
    next_sequence: usize,
    /// Placement cells handed out so far; never decreases, so removing a
    /// node does not free a cell that a later card would share.
    placed: usize,
}

impl Diagram {
    /// Creates an empty diagram.
    pub fn new(kind: DiagramKind) -> Self {
        Self {
            kind,
            nodes: IndexMap::new(),
            next_sequence: 0,
            placed: 0,
        }
    }

    /// Builds a diagram from persisted records.
    ///
    /// # Errors
    ///
    /// Fails on the first record that [`Diagram::insert_node`] rejects.
    pub fn from_records(
        kind: DiagramKind,
        records: impl IntoIterator<Item = NodeRecord>,
    ) -> Result<Self, TrellisError> {
        let mut diagram = Self::new(kind);
        for record in records {
            diagram.insert_node(record.into())?;
        }

        let dangling = diagram.dangling_connections();
        if dangling > 0 {
            warn!(kind:% = kind, dangling; "Loaded connections with missing targets");
        }
        info!(kind:% = kind, nodes = diagram.len(); "Diagram loaded");
        Ok(diagram)
    }

    pub fn kind(&self) -> DiagramKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&StaffNode> {
        self.nodes.get(&id)
    }

    /// Returns all nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &StaffNode> {
        self.nodes.values()
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut StaffNode, TrellisError> {
        self.nodes.get_mut(&id).ok_or(TrellisError::NotFound(id))
    }

    fn fresh_id(&mut self) -> NodeId {
        loop {
            let id = NodeId::from_sequence(self.next_sequence);
            self.next_sequence += 1;
            if !self.nodes.contains_key(&id) {
                return id;
            }
        }
    }

    /// Creates a node at the next position handed out by `placement`.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::Validation`] if the profile is invalid.
    pub fn create_node(
        &mut self,
        profile: StaffProfile,
        placement: &mut Placement,
    ) -> Result<NodeId, TrellisError> {
        profile.validate(self.kind)?;
        let position = placement.next_position(self.placed);
        self.create_node_at(profile, position)
    }

    /// Creates a node at an explicit position.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::Validation`] if the profile is invalid.
    pub fn create_node_at(
        &mut self,
        profile: StaffProfile,
        position: Point,
    ) -> Result<NodeId, TrellisError> {
        profile.validate(self.kind)?;
        let id = self.fresh_id();
        debug!(id:% = id, name = profile.name(); "Creating node");
        self.nodes.insert(id, StaffNode::new(id, profile, position));
        self.placed += 1;
        Ok(id)
    }

    /// Adds an existing node, e.g. one fetched from a store.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::Validation`] if the id is already taken or
    /// the profile is invalid.
    pub fn insert_node(&mut self, node: StaffNode) -> Result<(), TrellisError> {
        if self.nodes.contains_key(&node.id()) {
            return Err(TrellisError::validation(format!(
                "duplicate node id `{}`",
                node.id()
            )));
        }
        node.profile().validate(self.kind)?;
        trace!(id:% = node.id(); "Inserting node");
        self.nodes.insert(node.id(), node);
        self.placed += 1;
        Ok(())
    }

    /// Replaces the profile of a node.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::NotFound`] for an unknown id and
    /// [`TrellisError::Validation`] for an invalid profile.
    pub fn update_profile(
        &mut self,
        id: NodeId,
        profile: StaffProfile,
    ) -> Result<(), TrellisError> {
        let kind = self.kind;
        let node = self.node_mut(id)?;
        profile.validate(kind)?;
        node.set_profile(profile);
        Ok(())
    }

    /// Moves a node. Any coordinates are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::NotFound`] for an unknown id.
    pub fn set_node_position(&mut self, id: NodeId, x: f32, y: f32) -> Result<(), TrellisError> {
        let node = self.node_mut(id)?;
        node.set_position(Point::new(x, y));
        trace!(id:% = id, x, y; "Node moved");
        Ok(())
    }

    /// Creates or replaces the connection from `from` to `to`.
    ///
    /// Returns the style that was replaced, if any. At most one connection
    /// exists per ordered pair.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::NotFound`] if either node is unknown and
    /// [`TrellisError::Validation`] if `from` and `to` are the same node.
    pub fn upsert_connection(
        &mut self,
        from: NodeId,
        to: NodeId,
        style: ConnectionStyle,
    ) -> Result<Option<ConnectionStyle>, TrellisError> {
        if !self.contains(to) {
            return Err(TrellisError::NotFound(to));
        }
        if from == to {
            return Err(TrellisError::validation(
                "a node cannot be connected to itself",
            ));
        }
        let source = self.node_mut(from)?;

        let previous = source
            .put_connection(Connection::new(to, style))
            .map(|old| old.style().clone());
        debug!(from:% = from, to:% = to, replaced = previous.is_some(); "Connection saved");
        Ok(previous)
    }

    /// Removes the connection from `from` to `to`, if there is one.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::NotFound`] if `from` is unknown. A missing
    /// connection is not an error.
    pub fn remove_connection(
        &mut self,
        from: NodeId,
        to: NodeId,
    ) -> Result<Option<Connection>, TrellisError> {
        let removed = self.node_mut(from)?.take_connection(to);
        debug!(from:% = from, to:% = to, removed = removed.is_some(); "Connection removed");
        Ok(removed)
    }

    /// Removes a node, its outgoing connections and every connection
    /// pointing at it.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::NotFound`] for an unknown id.
    pub fn remove_node(&mut self, id: NodeId) -> Result<RemovedNode, TrellisError> {
        let node = self
            .nodes
            .shift_remove(&id)
            .ok_or(TrellisError::NotFound(id))?;

        let pruned_sources: Vec<NodeId> = self
            .nodes
            .values_mut()
            .filter_map(|other| other.take_connection(id).map(|_| other.id()))
            .collect();

        info!(id:% = id, pruned = pruned_sources.len(); "Node removed");
        Ok(RemovedNode {
            node,
            pruned_sources,
        })
    }

    /// Returns the connection from `from` to `to`, if both nodes exist.
    pub fn connection(&self, from: NodeId, to: NodeId) -> Option<&Connection> {
        if !self.contains(to) {
            return None;
        }
        self.node(from)?.connection_to(to)
    }

    /// Returns every connection whose target exists, grouped by source in
    /// diagram order.
    pub fn connections(&self) -> impl Iterator<Item = ConnectionView<'_>> {
        self.nodes.values().flat_map(move |source| {
            source.connections().filter_map(move |connection| {
                self.node(connection.target()).map(|target| ConnectionView {
                    source,
                    connection,
                    target,
                })
            })
        })
    }

    /// Returns every connection that starts or ends at `id`.
    pub fn connections_touching(&self, id: NodeId) -> Vec<ConnectionView<'_>> {
        self.connections()
            .filter(|view| view.source.id() == id || view.target.id() == id)
            .collect()
    }

    /// Routes every connection with `router`.
    pub fn routed_connections(&self, router: &Router) -> Vec<RoutedConnection<'_>> {
        self.connections()
            .map(|view| RoutedConnection {
                path: router.compute_path(view.connection, view.source, view.target),
                view,
            })
            .collect()
    }

    /// Returns the bounds covering all cards and routed paths.
    pub fn bounds(&self, router: &Router) -> Option<Bounds> {
        let cards = self.nodes().map(|node| router.card_bounds(node));
        let paths = self
            .routed_connections(router)
            .into_iter()
            .filter_map(|routed| Bounds::from_points(path_points(&routed.path)));

        cards.chain(paths).reduce(|acc, bounds| acc.merge(&bounds))
    }

    fn dangling_connections(&self) -> usize {
        self.nodes
            .values()
            .flat_map(StaffNode::connections)
            .filter(|connection| !self.contains(connection.target()))
            .count()
    }
}

/// Returns all points of a path, including curve control points.
fn path_points(path: &PathGeometry) -> Vec<Point> {
    let mut points = path.vertices();
    points.extend(path.segments().iter().filter_map(|segment| match segment {
        crate::path::PathSegment::Quadratic { control, .. } => Some(*control),
        crate::path::PathSegment::Line { .. } => None,
    }));
    points
}
