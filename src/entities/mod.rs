pub mod inventory_item;
pub mod patient;
pub mod return_line;
pub mod sale;
pub mod sale_line;
pub mod sale_return;
