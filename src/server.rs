use crate::error::{DispatchError, Error};
use crate::header::StatusCode;
use crate::into::IntoResponse;
use crate::util::{set_absolute_uri, PinnedFuture};
use crate::{Body, Response, Router};

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, ToSocketAddrs};
use tracing::{error, info, info_span, warn, Instrument};

pub type HyperRequest = hyper::Request<Incoming>;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
// same as page size
const DEFAULT_REQUEST_SIZE_LIMIT: usize = 4096; // 4kb

#[derive(Debug, Clone)]
pub(crate) struct RequestConfigs {
	pub timeout: Duration,
	// in bytes
	pub size_limit: usize,
}

impl RequestConfigs {
	pub fn new() -> Self {
		Self {
			timeout: DEFAULT_REQUEST_TIMEOUT,
			size_limit: DEFAULT_REQUEST_SIZE_LIMIT,
		}
	}
}

/// Turns a failed dispatch into a response.
///
/// The router itself never creates a response for a failure, this is the
/// servers job.
pub trait Fallback: Send + Sync {
	fn call<'a>(&'a self, error: DispatchError) -> PinnedFuture<'a, Response>;
}

/// Responds with `404 Not Found` if no route matched and with the status code
/// of the error if the handler failed.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusFallback;

impl Fallback for StatusFallback {
	fn call<'a>(&'a self, error: DispatchError) -> PinnedFuture<'a, Response> {
		PinnedFuture::new(async move {
			match error {
				DispatchError::Unmatched(e) => {
					warn!("{e}");
					StatusCode::NOT_FOUND.into_response()
				}
				DispatchError::Handler(error) => {
					error!(?error, "handler error");
					error.status_code().into_response()
				}
			}
		})
	}
}

/// Prepares a server listening on `addr`.
pub async fn build(addr: impl ToSocketAddrs) -> crate::Result<ServerBuilder> {
	ServerBuilder::new(addr).await
}

/// `ServerBuilder` gathers the router and the configuration before binding.
pub struct ServerBuilder {
	addr: SocketAddr,
	router: Arc<Router>,
	configs: RequestConfigs,
	fallback: Box<dyn Fallback>,
	show_startup_msg: bool,
}

impl ServerBuilder {
	pub(crate) async fn new<A>(addr: A) -> crate::Result<Self>
	where
		A: ToSocketAddrs,
	{
		let addr = tokio::net::lookup_host(addr)
			.await
			.map_err(Error::from_server_error)?
			.next()
			.ok_or_else(|| Error::from_server_error("address not resolved"))?;

		Ok(Self {
			addr,
			router: Arc::new(Router::new()),
			configs: RequestConfigs::new(),
			fallback: Box::new(StatusFallback),
			show_startup_msg: true,
		})
	}

	/// Returns the router routes can be registered on.
	pub fn router(&self) -> &Arc<Router> {
		&self.router
	}

	/// Replaces the router.
	pub fn set_router(&mut self, router: Arc<Router>) {
		self.router = router;
	}

	/// Sets how failed dispatches are answered. The default is
	/// [`StatusFallback`].
	pub fn fallback<F>(&mut self, fallback: F)
	where
		F: Fallback + 'static,
	{
		self.fallback = Box::new(fallback);
	}

	/// Sets the request body size limit. The default is 4 kilobytes.
	///
	/// ## Panics
	/// If the size is zero.
	pub fn request_size_limit(&mut self, size_limit: usize) {
		assert!(size_limit > 0, "size limit needs to be bigger than zero");
		self.configs.size_limit = size_limit;
	}

	/// Sets the request timeout. The default is 60 seconds.
	///
	/// A request whose handler does not finish in time is answered with
	/// `504 Gateway Timeout`.
	pub fn request_timeout(&mut self, timeout: Duration) {
		self.configs.timeout = timeout;
	}

	/// Prevents the server from showing a message when it get's started.
	pub fn hide_startup_message(&mut self) {
		self.show_startup_msg = false;
	}

	/// Binds to the address.
	///
	/// You need to call serve on the `Server` so that it starts handling
	/// requests.
	pub async fn build(self) -> crate::Result<Server> {
		let listener = TcpListener::bind(self.addr)
			.await
			.map_err(Error::from_server_error)?;

		Ok(Server {
			listener,
			shared: Arc::new(Shared {
				router: self.router,
				configs: self.configs,
				fallback: self.fallback,
			}),
			show_startup_msg: self.show_startup_msg,
		})
	}

	/// Binds and serves requests.
	///
	/// ## Note
	/// Under normal conditions this function should run forever.
	pub async fn serve(self) -> crate::Result<()> {
		let server = self.build().await?;
		server.serve().await
	}
}

struct Shared {
	router: Arc<Router>,
	configs: RequestConfigs,
	fallback: Box<dyn Fallback>,
}

/// A bound server which is ready to serve requests.
pub struct Server {
	listener: TcpListener,
	shared: Arc<Shared>,
	show_startup_msg: bool,
}

impl Server {
	pub fn local_addr(&self) -> Option<SocketAddr> {
		self.listener.local_addr().ok()
	}

	pub fn router(&self) -> &Arc<Router> {
		&self.shared.router
	}

	/// Accepts connections until accepting fails. Every connection get's its
	/// own task.
	pub async fn serve(self) -> crate::Result<()> {
		let Server {
			listener,
			shared,
			show_startup_msg,
		} = self;

		if show_startup_msg {
			if let Ok(addr) = listener.local_addr() {
				eprintln!("Running server on addr: {addr}");
			}
		}

		loop {
			let (stream, address) =
				listener.accept().await.map_err(Error::from_server_error)?;
			let service = ServerService {
				shared: shared.clone(),
				address,
			};

			tokio::task::spawn(async move {
				let r = http1::Builder::new()
					.keep_alive(true)
					.serve_connection(TokioIo::new(stream), service)
					.await;
				if let Err(e) = r {
					error!("Error while serving HTTP connection: {e}");
				}
			});
		}
	}
}

struct ServerService {
	shared: Arc<Shared>,
	address: SocketAddr,
}

impl Service<HyperRequest> for ServerService {
	type Response = hyper::Response<Body>;
	type Error = Infallible;
	type Future = PinnedFuture<'static, Result<Self::Response, Self::Error>>;

	fn call(&self, req: HyperRequest) -> Self::Future {
		let shared = self.shared.clone();
		let address = self.address;

		PinnedFuture::new(async move {
			let span = info_span!(
				"req",
				method = ?req.method(),
				uri = ?req.uri(),
				%address,
			);

			Ok(handle_logged(&shared, req).instrument(span).await)
		})
	}
}

async fn handle_logged(shared: &Shared, req: HyperRequest) -> Response {
	let method = req.method().clone();
	let uri = req.uri().clone();
	info!(?method, ?uri, "req");

	let resp = handle(shared, req).await;
	let status_code = resp.status();

	if status_code.is_server_error() {
		error!(?status_code, "{method} {uri} | {status_code}");
	} else if status_code.is_client_error() {
		warn!(?status_code, "{method} {uri} | {status_code}");
	} else {
		info!(?status_code, "{method} {uri} | {status_code}");
	}

	resp
}

async fn handle(shared: &Shared, req: HyperRequest) -> Response {
	let configs = &shared.configs;

	let mut req = req.map(Body::from_hyper);
	set_absolute_uri(&mut req);
	req.body_mut().set_size_limit(Some(configs.size_limit));
	req.body_mut().set_timeout(Some(configs.timeout));

	let r = tokio::time::timeout(configs.timeout, shared.router.dispatch(req))
		.await;

	match r {
		Ok(Ok(resp)) => resp,
		Ok(Err(e)) => shared.fallback.call(e).await,
		Err(_) => {
			warn!("request timed out");
			StatusCode::GATEWAY_TIMEOUT.into_response()
		}
	}
}
