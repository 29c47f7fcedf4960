// Answer graph
// petgraph-backed state graph driving a question to a final RagState

pub mod builder;
pub mod node;
pub mod runtime;
pub mod state;

pub mod nodes;

pub use builder::{build_rag_graph, GraphDeps, RagGraph};
pub use node::{GraphError, Node, NodeContext, NodeOutput};
pub use runtime::{GraphBuilder, GraphRuntime};
pub use state::RagState;
