pub mod appointment;
pub mod block;
pub mod mapper;
pub mod migrations;
pub mod pattern;
pub mod quota;
pub mod repo;

pub use repo::SeaOrmSchedulingStore;
