mod shop_dto;

pub use shop_dto::*;
