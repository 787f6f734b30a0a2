//! Repository modules

pub mod booking;
pub mod catalog;

pub use booking::BookingRepo;
pub use catalog::CatalogRepo;
