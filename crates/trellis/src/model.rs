//! Diagram records: staff nodes and the connections they own.
//!
//! A [`StaffNode`] owns its outgoing [`Connection`]s, keyed by target id.
//! There is no global edge table; the [`Diagram`](crate::Diagram) scans node
//! connection lists whenever it needs cross-node information.
//!
//! The persistence shape of both types lives next to them as [`NodeRecord`]
//! and [`ConnectionRecord`]. Records are flat, mirroring the hosted document
//! schema, while the in-memory types keep routing geometry in a tagged union.

mod connection;
mod node;

pub use connection::{
    Connection, ConnectionLabel, ConnectionRecord, ConnectionStyle, Routing, RoutingMode,
};
pub use node::{DiagramKind, NodeRecord, StaffNode, StaffProfile};

/// Identifier of a staff node.
pub type NodeId = trellis_core::identifier::Id;
