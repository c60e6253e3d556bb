use crate::header::{Method, Uri, HOST};

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

pub struct PinnedFuture<'a, O> {
	inner: Pin<Box<dyn Future<Output = O> + Send + 'a>>,
}

impl<'a, O> PinnedFuture<'a, O> {
	pub fn new<F>(future: F) -> Self
	where
		F: Future<Output = O> + Send + 'a,
	{
		Self {
			inner: Box::pin(future),
		}
	}
}

impl<O> Future for PinnedFuture<'_, O> {
	type Output = O;
	fn poll(self: Pin<&mut Self>, cx: &mut Context) -> Poll<Self::Output> {
		self.get_mut().inner.as_mut().poll(cx)
	}
}

/// Returns the method with an uppercase name.
///
/// The standard methods are always uppercase, extension methods like `get`
/// are converted so they compare equal to their standard counterpart.
///
/// ## Example
/// ```
/// # use fire_router::util::normalize_method;
/// # use fire_router::header::Method;
/// let method = Method::from_bytes(b"get").unwrap();
/// assert_eq!(normalize_method(&method), Method::GET);
/// ```
pub fn normalize_method(method: &Method) -> Method {
	let s = method.as_str();
	if !s.bytes().any(|b| b.is_ascii_lowercase()) {
		return method.clone();
	}

	// uppercasing a valid token keeps it a valid token
	Method::from_bytes(s.to_ascii_uppercase().as_bytes())
		.unwrap_or_else(|_| method.clone())
}

/// Makes an origin-form request uri absolute with the `Host` header.
///
/// Requests without a usable host are left untouched and resolve against the
/// base of the router.
pub(crate) fn set_absolute_uri<B>(req: &mut hyper::Request<B>) {
	if req.uri().authority().is_some() {
		return;
	}

	let Some(host) = req.headers().get(HOST).and_then(|h| h.to_str().ok())
	else {
		return;
	};

	let path = req
		.uri()
		.path_and_query()
		.map(|p| p.as_str())
		.unwrap_or("/");

	let uri = Uri::builder()
		.scheme("http")
		.authority(host)
		.path_and_query(path)
		.build();

	if let Ok(uri) = uri {
		*req.uri_mut() = uri;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn request(uri: &str, host: Option<&str>) -> hyper::Request<()> {
		let mut builder = hyper::Request::builder().uri(uri);
		if let Some(host) = host {
			builder = builder.header(HOST, host);
		}
		builder.body(()).unwrap()
	}

	#[test]
	fn host_header_makes_uri_absolute() {
		let mut req = request("/users/1?page=2", Some("api.local:8080"));
		set_absolute_uri(&mut req);
		assert_eq!(req.uri(), "http://api.local:8080/users/1?page=2");
	}

	#[test]
	fn absolute_uri_is_kept() {
		let mut req = request("http://a.local/x", Some("b.local"));
		set_absolute_uri(&mut req);
		assert_eq!(req.uri(), "http://a.local/x");
	}

	#[test]
	fn missing_or_invalid_host_is_ignored() {
		let mut req = request("/x", None);
		set_absolute_uri(&mut req);
		assert_eq!(req.uri(), "/x");

		let mut req = request("/x", Some("bad host"));
		set_absolute_uri(&mut req);
		assert_eq!(req.uri(), "/x");
	}

	#[test]
	fn standard_methods_untouched() {
		assert_eq!(normalize_method(&Method::POST), Method::POST);
		assert_eq!(normalize_method(&Method::OPTIONS), Method::OPTIONS);
	}

	#[test]
	fn extension_methods_uppercased() {
		let m = Method::from_bytes(b"Patch").unwrap();
		assert_eq!(normalize_method(&m), Method::PATCH);

		let m = Method::from_bytes(b"purge").unwrap();
		assert_eq!(normalize_method(&m).as_str(), "PURGE");
	}
}
