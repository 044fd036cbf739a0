//! Write-side engines and read-only reporting

pub mod enrollment;
pub mod reporting;
pub mod review;

// Re-export for convenience
pub use enrollment::EnrollmentService;
pub use reporting::ReportingService;
pub use review::CreditReviewService;
