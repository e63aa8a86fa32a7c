pub mod company;
pub mod stock;
