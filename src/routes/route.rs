use crate::into::IntoResponse;
use crate::pattern::{Pattern, RouteMatch};
use crate::util::PinnedFuture;
use crate::{Request, Response};

use super::MethodFilter;

use std::fmt;
use std::future::{self, Future};

/// What a handler resolves to.
///
/// A plain response is a success, an `Err` is passed to the caller of
/// dispatch as [`DispatchError::Handler`](crate::DispatchError::Handler).
pub trait IntoHandlerResult {
	fn into_handler_result(self) -> crate::Result<Response>;
}

impl<R, E> IntoHandlerResult for Result<R, E>
where
	R: IntoResponse,
	E: Into<crate::Error>,
{
	fn into_handler_result(self) -> crate::Result<Response> {
		match self {
			Ok(r) => Ok(r.into_response()),
			Err(e) => Err(e.into()),
		}
	}
}

impl<R> IntoHandlerResult for R
where
	R: IntoResponse,
{
	fn into_handler_result(self) -> crate::Result<Response> {
		Ok(self.into_response())
	}
}

/// A request handler.
///
/// Implemented for every `Fn(Request, RouteMatch) -> impl Future` where the
/// future resolves to something that implements `IntoHandlerResult`.
///
/// Implement it manually if your handler needs to be a named type.
pub trait Handler: Send + Sync {
	fn call(
		&self,
		req: Request,
		matched: RouteMatch,
	) -> PinnedFuture<'static, crate::Result<Response>>;
}

impl<H, F, R> Handler for H
where
	H: Fn(Request, RouteMatch) -> F + Send + Sync,
	F: Future<Output = R> + Send + 'static,
	R: IntoHandlerResult,
{
	fn call(
		&self,
		req: Request,
		matched: RouteMatch,
	) -> PinnedFuture<'static, crate::Result<Response>> {
		let fut = self(req, matched);
		PinnedFuture::new(async move { fut.await.into_handler_result() })
	}
}

pub(crate) type BoxedHandler = Box<dyn Handler>;

/// Wraps a synchronous function so it can be registered as a handler.
///
/// ## Example
/// ```
/// # use fire_router::{Router, routes::sync};
/// let router = Router::new();
/// router.get("/", sync(|_, _| "Hello, World!")).unwrap();
/// ```
pub fn sync<F, R>(
	f: F,
) -> impl Fn(Request, RouteMatch) -> future::Ready<R> + Send + Sync + 'static
where
	F: Fn(Request, RouteMatch) -> R + Send + Sync + 'static,
	R: IntoHandlerResult + Send + 'static,
{
	move |req, matched| future::ready(f(req, matched))
}

/// A single entry in the route table.
pub struct Route {
	method: MethodFilter,
	pattern: Pattern,
	handler: BoxedHandler,
}

impl Route {
	pub(crate) fn new(
		method: MethodFilter,
		pattern: Pattern,
		handler: BoxedHandler,
	) -> Self {
		Self {
			method,
			pattern,
			handler,
		}
	}

	pub fn method(&self) -> MethodFilter {
		self.method
	}

	pub fn pattern(&self) -> &Pattern {
		&self.pattern
	}

	pub(crate) fn handler(&self) -> &dyn Handler {
		&*self.handler
	}
}

impl fmt::Debug for Route {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Route")
			.field("method", &self.method)
			.field("pattern", self.pattern.spec())
			.finish_non_exhaustive()
	}
}
