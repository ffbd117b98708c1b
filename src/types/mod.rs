pub mod category_encoder;
pub mod feature_column;
pub mod observation;
pub mod observation_table;
