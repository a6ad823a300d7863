pub mod currency;
pub mod time_bucket;
pub mod time_converter;
pub mod weather;
pub mod zones;
