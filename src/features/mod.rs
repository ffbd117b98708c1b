pub mod builder;
pub mod error;
pub mod forecast;
pub mod scaler;
pub mod schema;
pub mod split;
