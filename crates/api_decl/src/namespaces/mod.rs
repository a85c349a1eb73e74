pub mod dag;
pub mod eth;
pub mod net;

pub use dag::DagNamespaceServer;
pub use eth::EthNamespaceServer;
pub use net::NetNamespaceServer;
