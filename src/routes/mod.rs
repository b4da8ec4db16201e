pub mod assessments;
pub mod auth;
pub mod complaints;
pub mod conflicts;

pub use assessments::configure_assessment_routes;
pub use auth::configure_auth_routes;
pub use complaints::configure_complaint_routes;
pub use conflicts::configure_conflict_routes;
