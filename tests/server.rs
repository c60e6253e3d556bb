use fire_router as router;

use router::error::ServerErrorKind;
use router::header::StatusCode;
use router::pattern::PatternSpec;
use router::routes::sync;
use router::util::PinnedFuture;
use router::{DispatchError, Error, Fallback, Request, Response};

use std::time::Duration;

use router::into::IntoResponse;

#[macro_use]
mod util;

#[tokio::test]
async fn hello_world() {
	const BODY: &str = "Hello, World!";

	let addr = spawn_server!(|builder| {
		builder.router().get("/", sync(|_, _| BODY)).unwrap();
	});

	make_request!("GET", addr, "/")
		.await
		.assert_status(200)
		.assert_header("content-type", "text/plain; charset=utf-8")
		.assert_header("content-length", BODY.len().to_string())
		.assert_body_str(BODY)
		.await;
}

#[tokio::test]
async fn params_over_the_wire() {
	let addr = spawn_server!(|builder| {
		builder
			.router()
			.get("/hello/:name", |_, matched| async move {
				format!("Hello, {}!", matched.param("name").unwrap())
			})
			.unwrap();
	});

	make_request!("GET", addr, "/hello/name")
		.await
		.assert_status(200)
		.assert_body_str("Hello, name!")
		.await;
}

#[tokio::test]
async fn post_body_is_echoed() {
	const BODY: &str = "Hello, World!";

	let addr = spawn_server!(|builder| {
		builder
			.router()
			.post("/", |req: Request, _| async move {
				req.into_body().into_string().await.map_err(Error::from)
			})
			.unwrap();
	});

	make_request!("POST", addr, "/", BODY)
		.await
		.assert_status(200)
		.assert_body_str(BODY)
		.await;
}

#[tokio::test]
async fn unmatched_is_not_found() {
	let addr = spawn_server!(|builder| {
		builder.router().get("/", sync(|_, _| "ok")).unwrap();
	});

	make_request!("GET", addr, "/abc")
		.await
		.assert_status(404)
		.assert_body_str("")
		.await;
}

#[tokio::test]
async fn handler_error_uses_status_code() {
	let addr = spawn_server!(|builder| {
		builder
			.router()
			.get("/", sync(|_, _| {
				Err::<(), _>(Error::empty(ServerErrorKind::ServiceUnavailable))
			}))
			.unwrap();
	});

	make_request!("GET", addr, "/").await.assert_status(503);
}

#[tokio::test]
async fn body_size_limit() {
	let addr = spawn_server!(|builder| {
		builder.request_size_limit(8);
		builder
			.router()
			.post("/", |req: Request, _| async move {
				req.into_body().into_bytes().await.map_err(Error::from)
			})
			.unwrap();
	});

	make_request!("POST", addr, "/", "way more than eight bytes")
		.await
		.assert_status(413);

	make_request!("POST", addr, "/", "short")
		.await
		.assert_status(200)
		.assert_body_str("short")
		.await;
}

#[tokio::test]
async fn slow_handler_times_out() {
	let addr = spawn_server!(|builder| {
		builder.request_timeout(Duration::from_millis(50));
		builder
			.router()
			.get("/", |_, _| async {
				tokio::time::sleep(Duration::from_secs(5)).await;
				"too late"
			})
			.unwrap();
	});

	make_request!("GET", addr, "/").await.assert_status(504);
}

#[tokio::test]
async fn custom_fallback() {
	const BODY: &str = "Body not Found";

	struct NotFound;

	impl Fallback for NotFound {
		fn call<'a>(
			&'a self,
			error: DispatchError,
		) -> PinnedFuture<'a, Response> {
			PinnedFuture::new(async move {
				match error {
					DispatchError::Unmatched(_) => {
						let mut resp = BODY.into_response();
						*resp.status_mut() = StatusCode::NOT_FOUND;
						resp
					}
					DispatchError::Handler(e) => e.status_code().into_response(),
				}
			})
		}
	}

	let addr = spawn_server!(|builder| {
		builder.fallback(NotFound);
	});

	make_request!("GET", addr, "/")
		.await
		.assert_status(404)
		.assert_header("content-type", "text/plain; charset=utf-8")
		.assert_header("content-length", BODY.len().to_string())
		.assert_body_str(BODY)
		.await;
}

#[tokio::test]
async fn trailing_wildcard_answers_everything() {
	let addr = spawn_server!(|builder| {
		builder
			.router()
			.get("/", sync(|_, _| "root"))
			.unwrap()
			.all("*", sync(|_, _| "fallback"))
			.unwrap();
	});

	make_request!("DELETE", addr, "/anything/else")
		.await
		.assert_status(200)
		.assert_body_str("fallback")
		.await;
}

#[tokio::test]
async fn host_header_reaches_patterns() {
	let addr = spawn_server!(|builder| {
		builder
			.router()
			.get(
				PatternSpec::new().hostname("other.local").pathname("/"),
				sync(|_, _| "other"),
			)
			.unwrap()
			.get(
				PatternSpec::new()
					.hostname("127.0.0.1")
					.port(":port(\\d+)")
					.pathname("/"),
				|_, matched| async move {
					let host = matched.hostname().input();
					format!("{host}:{}", matched.port().get("port").unwrap())
				},
			)
			.unwrap();
	});

	make_request!("GET", addr, "/")
		.await
		.assert_status(200)
		.assert_body_str(&addr.to_string())
		.await;
}

#[tokio::test]
async fn router_as_hyper_service() {
	use hyper::server::conn::http1;
	use hyper_util::rt::TokioIo;
	use std::sync::Arc;
	use tokio::net::TcpListener;

	let r = Arc::new(router::Router::new());
	r.get("/", sync(|_, _| "service")).unwrap();

	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	let service = r.service();

	tokio::task::spawn(async move {
		let (stream, _) = listener.accept().await.unwrap();
		let _ = http1::Builder::new()
			.serve_connection(TokioIo::new(stream), service)
			.await;
	});

	make_request!("GET", addr, "/")
		.await
		.assert_status(200)
		.assert_body_str("service")
		.await;
}
