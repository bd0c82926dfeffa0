pub mod api;
pub mod domain;
pub mod infrastructure;
pub mod jobs;
pub mod router;
pub mod use_cases;
