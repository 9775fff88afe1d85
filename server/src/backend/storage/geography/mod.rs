pub mod bundled;
pub mod remote;

pub use bundled::BundledGeography;
pub use remote::{BrasilApiMunicipalitiesSource, IbgeStatesSource};
