use crate::error::{Error, ServerErrorKind};
use crate::into::{with_content_type, IntoResponse};
use crate::{Body, Response};

use serde::Serialize;

const JSON: &str = "application/json; charset=utf-8";

/// Serializes the inner value as a json response.
///
/// ## Example
/// ```
/// # use fire_router::{Router, json::Json};
/// # use serde::Serialize;
/// #[derive(Serialize)]
/// struct Message {
/// 	message: String,
/// }
///
/// let router = Router::new();
/// router.get("/", |_, _| async {
/// 	Json(Message { message: "hi".into() })
/// }).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Json<T>(pub T);

impl<T> IntoResponse for Json<T>
where
	T: Serialize,
{
	fn into_response(self) -> Response {
		match serialize_to_response(&self.0) {
			Ok(resp) => resp,
			Err(e) => {
				tracing::error!("could not serialize json response: {e}");
				e.status_code().into_response()
			}
		}
	}
}

pub fn serialize_to_response<T: ?Sized>(data: &T) -> crate::Result<Response>
where
	T: Serialize,
{
	let body = Body::serialize(data)
		.map_err(|e| Error::new(ServerErrorKind::InternalServerError, e))?;

	Ok(with_content_type(JSON, body))
}
