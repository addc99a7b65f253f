pub mod chain;
pub mod context;
pub mod guards;

pub use chain::GuardChain;
pub use context::RequestContext;
pub use guards::Guard;
