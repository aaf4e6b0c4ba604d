//! Graph document to nested, positioned visual nodes and resolved edges.
//!
//! Everything here is plain data and pure functions; the canvas component only
//! calls into [`GraphSession`] and draws what it exposes.

pub mod document;
pub mod edges;
pub mod error;
pub mod expansion;
pub mod extraction;
mod hierarchy;
pub mod layout;
pub mod model;
pub mod palette;
pub mod parser;
pub mod session;
pub mod visual;

pub use document::{GraphDocument, RawEdge, RawNode, RawSection};
pub use edges::{Endpoint, EndpointKind, Side};
pub use error::GraphError;
pub use layout::LayoutConfig;
pub use model::{EdgeOrigin, FlowEdge, GraphNode, Relationship, Section};
pub use palette::NodeType;
pub use session::{Connection, GraphSession};
pub use visual::{FolderData, Position, VisualKind, VisualNode};
