pub mod forecast;
pub mod position;
pub mod request;

// Re-export for easier access
pub use forecast::ForecastResult;
pub use position::{NftId, Position};
pub use request::RebalanceRequest;
