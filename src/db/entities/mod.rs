//! SeaORM entities mapping to database tables.

pub mod subscription;
