use crate::error::DispatchError;
use crate::util::{set_absolute_uri, PinnedFuture};
use crate::{Body, Response, Router};

use std::sync::Arc;

use hyper::body::Incoming;
use hyper::service::Service;

/// A hyper `Service` which dispatches every request to a router.
///
/// Failures are returned as is, hyper closes the connection if a service
/// returns an error, use [`Server`](crate::Server) to map them to responses.
#[derive(Debug, Clone)]
pub struct RouterService {
	router: Arc<Router>,
}

impl RouterService {
	pub fn new(router: Arc<Router>) -> Self {
		Self { router }
	}

	pub fn router(&self) -> &Arc<Router> {
		&self.router
	}
}

impl Service<hyper::Request<Incoming>> for RouterService {
	type Response = Response;
	type Error = DispatchError;
	type Future = PinnedFuture<'static, Result<Response, DispatchError>>;

	fn call(&self, req: hyper::Request<Incoming>) -> Self::Future {
		let router = self.router.clone();
		PinnedFuture::new(async move {
			let mut req = req.map(Body::from_hyper);
			set_absolute_uri(&mut req);
			router.dispatch(req).await
		})
	}
}
