pub mod kinds;
pub mod remove;
pub mod scan;
