pub mod geography;
pub mod memory;
pub mod photo_store;
pub mod traits;

pub use memory::MemoryPhotoStore;
pub use photo_store::FsPhotoStore;
pub use traits::{BlobStore, GeographySource, StoredPhoto};
pub use geography::{BrasilApiMunicipalitiesSource, BundledGeography, IbgeStatesSource};
