mod store;

pub use store::MongoStore;
