pub mod inventory;
pub mod patients;
pub mod returns;
pub mod sales;
