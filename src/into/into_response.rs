use crate::header::{HeaderValue, StatusCode, CONTENT_LENGTH, CONTENT_TYPE};
use crate::{Body, Response};

use bytes::Bytes;

const TEXT: &str = "text/plain; charset=utf-8";
const BINARY: &str = "application/octet-stream";

/// Converts a value into a `Response`.
pub trait IntoResponse {
	fn into_response(self) -> Response;
}

macro_rules! into_response {
	($self:ident: $type:ty $b:block) => (
		impl IntoResponse for $type {
			fn into_response($self) -> Response { $b }
		}
	)
}

into_response!(self: Response { self });

into_response!(self: StatusCode {
	let mut resp = Response::new(Body::new());
	*resp.status_mut() = self;
	resp
});

into_response!(self: Body { Response::new(self) });

into_response!(self: &'static str { with_content_type(TEXT, self.into()) });
into_response!(self: String { with_content_type(TEXT, self.into()) });
into_response!(self: Vec<u8> { with_content_type(BINARY, self.into()) });
into_response!(self: Bytes { with_content_type(BINARY, self.into()) });

into_response!(self: () { Response::new(Body::new()) });

/// Builds a 200 response, the content-length is set if the body length is
/// known.
pub(crate) fn with_content_type(
	content_type: &'static str,
	body: Body,
) -> Response {
	let mut resp = Response::new(body);
	let headers = resp.headers_mut();
	headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
	if let Some(len) = resp.body().len() {
		resp.headers_mut().insert(CONTENT_LENGTH, HeaderValue::from(len));
	}

	resp
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn text_response() {
		let resp = "hey".into_response();
		assert_eq!(resp.status(), StatusCode::OK);
		assert_eq!(resp.headers()[CONTENT_TYPE], TEXT);
		assert_eq!(resp.headers()[CONTENT_LENGTH], "3");
	}

	#[test]
	fn status_response() {
		let resp = StatusCode::NOT_FOUND.into_response();
		assert_eq!(resp.status(), StatusCode::NOT_FOUND);
		assert!(resp.body().is_empty());
	}
}
