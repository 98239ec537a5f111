pub mod core_api;
pub mod dat;
pub mod layout;
pub mod reader;
pub mod writer;
