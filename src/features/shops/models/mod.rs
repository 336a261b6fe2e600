mod shop;

pub use shop::*;
