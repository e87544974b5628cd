pub mod allocation;
pub mod engine;
pub mod pipeline;
pub mod psx;

pub use crate::domain::model::{MarketData, PlanReport};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
