//! Campus Credits API service
//!
//! Tracks extracurricular-activity participation and credit awards. The two
//! write-side engines are the enrollment service (capacity-limited
//! registration) and the review service (one-shot application review with
//! the exactly-once balance mutation); everything else is read-mostly
//! request glue over the same PostgreSQL store.

pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;
