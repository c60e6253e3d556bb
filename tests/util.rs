#![allow(dead_code, unused_macros)]

use fire_router as router;

use router::{Body, Request};

use std::io;

macro_rules! spawn_server {
	(|$builder:ident| $block:block) => {{
		use std::net::{Ipv4Addr, SocketAddr};

		let socket_addr = SocketAddr::new(Ipv4Addr::LOCALHOST.into(), 0);
		let mut $builder = router::build(socket_addr).await.unwrap();
		$builder.hide_startup_message();
		let _ = $block;
		let server = $builder.build().await.unwrap();
		let addr = server.local_addr().unwrap();
		tokio::task::spawn(server.serve());

		addr
	}};
}

macro_rules! other_err {
	($e:expr) => {
		io::Error::new(io::ErrorKind::Other, $e)
	};
}

pub async fn send_request(
	req: hyper::Request<Body>,
) -> io::Result<hyper::Response<Body>> {
	let client = hyper_util::client::legacy::Client::builder(
		hyper_util::rt::TokioExecutor::new(),
	)
	.build_http();

	client
		.request(req)
		.await
		.map(|resp| resp.map(Body::from_hyper))
		.map_err(|e| other_err!(e))
}

macro_rules! make_request {
	(
		$method:expr, $srv_addr:expr, $uri:expr,
		|$builder:ident| $block:block
	) => {
		async {
			let addr = $srv_addr.to_string();
			let uri = format!("http://{addr}{}", $uri);
			let $builder = hyper::Request::builder()
				.method($method)
				.uri(uri)
				.header("host", &addr);
			let resp = util::send_request($block)
				.await
				.expect("failed to send request");

			util::TestResponse::new(resp)
		}
	};
	($method:expr, $srv_addr:expr, $uri:expr, $body:expr) => {
		make_request!($method, $srv_addr, $uri, |builder| {
			builder
				.body(router::Body::from($body))
				.expect("could not build request")
		})
	};
	($method:expr, $srv_addr:expr, $uri:expr) => {
		make_request!($method, $srv_addr, $uri, router::Body::new())
	};
}

/// Builds a request for dispatching without a server.
pub fn request(method: &str, uri: &str) -> Request {
	request_with_body(method, uri, Body::new())
}

pub fn request_with_body(
	method: &str,
	uri: &str,
	body: impl Into<Body>,
) -> Request {
	hyper::Request::builder()
		.method(method)
		.uri(uri)
		.body(body.into())
		.expect("could not build request")
}

#[derive(Debug)]
pub struct TestResponse {
	inner: hyper::Response<Body>,
}

impl TestResponse {
	pub fn new(inner: hyper::Response<Body>) -> Self {
		Self { inner }
	}

	pub fn assert_status(self, other: u16) -> Self {
		assert_eq!(
			self.inner.status().as_u16(),
			other,
			"status code doens't match"
		);
		self
	}

	pub fn assert_header(self, key: &str, value: impl AsRef<str>) -> Self {
		let v = self
			.inner
			.headers()
			.get(key)
			.unwrap_or_else(|| panic!("header with key {:?} not found", key))
			.to_str()
			.expect("header does not only contain visible ASCII chars");
		assert_eq!(v, value.as_ref(), "value does not match");
		self
	}

	pub fn header(&self, key: &str) -> Option<&str> {
		self.inner.headers().get(key).and_then(|v| v.to_str().ok())
	}

	pub async fn body_string(mut self) -> String {
		self.inner
			.body_mut()
			.take()
			.into_string()
			.await
			.expect("could not convert response body to string")
	}

	pub async fn assert_body_str(mut self, value: &str) -> Self {
		let body = self
			.inner
			.body_mut()
			.take()
			.into_string()
			.await
			.expect("could not convert response body to string");
		assert_eq!(body, value, "body does not match value");
		self
	}
}
