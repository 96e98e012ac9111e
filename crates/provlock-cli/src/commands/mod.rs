pub mod hashes;
pub mod latest;
pub mod version;
