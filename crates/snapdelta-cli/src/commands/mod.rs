pub mod common;
pub mod compare;
pub mod counts;
pub mod import;
pub mod novel;
