pub mod buckets;
pub mod objects;
pub mod remote;
