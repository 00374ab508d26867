//! Operations behind the HTTP handlers. Every function takes the document
//! store by reference, so tests run them against [`crate::store::MemoryStore`].

pub mod bookings;
pub mod trips;
