pub mod price;
pub mod range;
