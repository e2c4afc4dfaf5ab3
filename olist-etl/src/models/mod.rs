//! Typed records flowing through the pipeline

pub mod fact;
pub mod location;
pub mod raw;
pub mod summary;

pub use fact::{DeliveryKpis, OrderItemFact};
pub use location::{
    LocationDimension, LocationDimensionRow, LocationId, LocationKey, LocationRecord,
};
pub use raw::*;
pub use summary::RunSummary;
