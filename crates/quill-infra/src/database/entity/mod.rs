//! SeaORM entities. Array columns hold the reference lists of the document
//! model; comments are embedded as JSONB.

pub mod category;
pub mod post;
pub mod user;
