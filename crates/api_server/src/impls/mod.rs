mod dag;
mod eth;
mod net;

pub use dag::DagNamespace;
pub use eth::EthNamespace;
pub use net::NetNamespace;
