mod into_response;
pub use into_response::IntoResponse;
pub(crate) use into_response::with_content_type;
