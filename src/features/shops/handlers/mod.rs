pub mod shop_handler;

pub use shop_handler::{
    __path_create_shop, __path_delete_shop, __path_get_shop, __path_list_shop_mechanics,
    __path_list_shops, __path_update_shop, create_shop, delete_shop, get_shop,
    list_shop_mechanics, list_shops, update_shop,
};
