pub mod campaign;
pub mod session;
pub mod statistics;
pub mod template;
