pub mod criteria;
pub mod settings;

pub use criteria::Criteria;
pub use settings::{Channel, Settings};
