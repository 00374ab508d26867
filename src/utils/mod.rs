pub mod fields;
pub mod jwt;
pub mod pricing;
pub mod timestamp;
