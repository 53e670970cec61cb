pub mod cluster;

pub use cluster::{ClusterGroup, GridClusterer, GridClustererConfig};
