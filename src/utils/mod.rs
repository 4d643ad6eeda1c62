pub mod csv;
pub mod phone;
pub mod status;
pub mod time;
pub mod validation;
