pub mod customer;
pub mod matching;
pub mod table;
