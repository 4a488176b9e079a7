pub mod params;

pub use params::{ParamSource, StaticParams};
