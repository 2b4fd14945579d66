//! adjutant-tools: the tool-invocation protocol: retry client, transports,
//! and the server-side registry (calendar + docs search).

pub mod calendar;
pub mod client;
pub mod docs;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod transport;

pub use calendar::{CalendarStore, EventRecord, SlotProposal};
pub use client::{RetryPolicy, ToolClient, Transport, describe_call};
pub use docs::{DocsClient, DocsConfig};
pub use error::ToolError;
pub use registry::{
    OP_CREATE_EVENT, OP_LIST_TODAY, OP_PROPOSE_SLOTS, OP_SEARCH_DOCS, ToolRegistry,
};
pub use server::serve_stdio;
pub use transport::{DirectTransport, StdioTransport, ToolTransport};
