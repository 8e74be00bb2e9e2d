// Session flow: the Input → Edit → Results → Template page machine,
// the in-memory session store, and the HTTP handlers that drive them.

pub mod flow;
pub mod handlers;
pub mod store;

pub use flow::{Event, FlowError, Page, Session};
pub use store::SessionStore;
