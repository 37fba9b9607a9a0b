//! Uniswap V3 adapter.

/// Known deployments and pair routing.
pub mod addresses;
/// Position manager client.
pub mod client;
/// `sol!` bindings.
pub mod contracts;

pub use addresses::{Deployment, TokenPair, deployment, route_pair};
pub use client::{ClientOptions, UniswapV3Client};
