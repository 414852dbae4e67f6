pub mod data_key;
pub mod price_bar;

pub use data_key::DataKey;
pub use price_bar::{Ohlc, PriceBar};
