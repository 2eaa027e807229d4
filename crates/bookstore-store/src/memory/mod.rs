mod compare;
mod explain;
mod expression;
mod filter;
mod pipeline;
mod projection;
mod store;
mod update;

pub use store::MemoryStore;
