pub mod aggregate;
pub mod catalog;
pub mod metrics;
pub mod parser;

pub use crate::domain::model::{NameEntity, RankSet, Series, Sex, YearlyCount};
pub use crate::domain::ports::{ConfigProvider, Storage};
pub use crate::utils::error::Result;
