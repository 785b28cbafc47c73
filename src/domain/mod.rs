//! Domain layer: aggregates, value objects, events and the pure catalog and
//! reporting functions that read them.
pub mod aggregates;
pub mod value_objects;
pub mod events;
pub mod catalog;
pub mod reporting;
