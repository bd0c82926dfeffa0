use serde::Serialize;
use utoipa::ToSchema;

/// Uniform envelope every successful response body is wrapped in, matching
/// the shape the teacher's `ApiResponse<T>` used.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
