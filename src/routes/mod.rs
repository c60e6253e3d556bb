//! The route table.
//!
//! Routes are tried in the order they where registered, the first route whose
//! method and pattern both match handles the request. Routes registered with
//! [`Router::all`] are ordinary entries, so a wildcard added early shadows
//! every route after it.

mod route;
pub use route::{sync, Handler, IntoHandlerResult, Route};

mod method;
pub use method::{MethodFilter, MethodMap, UnknownMethod};

mod service;
pub use service::RouterService;

use crate::error::{DispatchError, Unmatched};
use crate::header::{Method, Uri};
use crate::pattern::{Pattern, PatternError, PatternSpec, RouteMatch};
use crate::util::{normalize_method, PinnedFuture};
use crate::{Request, Response};

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::trace;
use url::Url;

/// The origin relative request urls get resolved against.
pub const DEFAULT_BASE: &str = "http://example.com";

type Table = Vec<Arc<Route>>;

macro_rules! method_fn {
	($($name:ident => $method:ident),*) => ($(
		#[doc = concat!("Registers a `", stringify!($method), "` route.")]
		pub fn $name<P, H, F, R>(
			&self,
			pattern: P,
			handler: H,
		) -> Result<&Self, PatternError>
		where
			P: Into<PatternSpec>,
			H: Fn(Request, RouteMatch) -> F + Send + Sync + 'static,
			F: Future<Output = R> + Send + 'static,
			R: IntoHandlerResult,
		{
			self.route(MethodFilter::$method, pattern, handler)
		}
	)*)
}

/// An ordered list of routes.
///
/// Registering takes `&self`, a route is visible to every dispatch which
/// starts after the registration returned.
///
/// ## Example
/// ```
/// # use fire_router::Router;
/// # use fire_router::routes::sync;
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let router = Router::new();
/// router
/// 	.get("/users/:id", |_req, matched| async move {
/// 		format!("user {}", matched.param("id").unwrap_or_default())
/// 	})?
/// 	.all("*", sync(|_, _| "fallback"))?;
/// # Ok(())
/// # }
/// ```
pub struct Router {
	routes: ArcSwap<Table>,
	base: Url,
}

impl Router {
	pub fn new() -> Self {
		let base = Url::parse(DEFAULT_BASE).expect("DEFAULT_BASE is valid");
		Self::with_base(base)
	}

	/// Creates a router which resolves relative request urls against `base`.
	pub fn with_base(base: Url) -> Self {
		Self {
			routes: ArcSwap::from_pointee(vec![]),
			base,
		}
	}

	pub fn base(&self) -> &Url {
		&self.base
	}

	/// Compiles the pattern and appends a route.
	///
	/// If the pattern fails to compile nothing get's added.
	pub fn route<P, H>(
		&self,
		method: MethodFilter,
		pattern: P,
		handler: H,
	) -> Result<&Self, PatternError>
	where
		P: Into<PatternSpec>,
		H: Handler + 'static,
	{
		let pattern = Pattern::new(pattern)?;
		let route = Route::new(method, pattern, Box::new(handler));
		self.push(vec![Arc::new(route)]);

		Ok(self)
	}

	/// Registers a route for the given method, the generic form of
	/// [`get`](Self::get), [`post`](Self::post), ...
	pub fn on<P, H, F, R>(
		&self,
		method: MethodFilter,
		pattern: P,
		handler: H,
	) -> Result<&Self, PatternError>
	where
		P: Into<PatternSpec>,
		H: Fn(Request, RouteMatch) -> F + Send + Sync + 'static,
		F: Future<Output = R> + Send + 'static,
		R: IntoHandlerResult,
	{
		self.route(method, pattern, handler)
	}

	method_fn!(
		get => Get,
		post => Post,
		put => Put,
		patch => Patch,
		delete => Delete,
		options => Options,
		head => Head
	);

	/// Registers a route which matches every method.
	pub fn all<P, H, F, R>(
		&self,
		pattern: P,
		handler: H,
	) -> Result<&Self, PatternError>
	where
		P: Into<PatternSpec>,
		H: Fn(Request, RouteMatch) -> F + Send + Sync + 'static,
		F: Future<Output = R> + Send + 'static,
		R: IntoHandlerResult,
	{
		self.route(MethodFilter::All, pattern, handler)
	}

	/// Registers one route per entry of the map, in the order of the map.
	///
	/// The pattern get's compiled for every entry. If it fails to compile no
	/// route is added.
	pub fn all_methods<P>(
		&self,
		pattern: P,
		map: MethodMap,
	) -> Result<&Self, PatternError>
	where
		P: Into<PatternSpec>,
	{
		let spec = pattern.into();

		let routes = map
			.entries
			.into_iter()
			.map(|(method, handler)| {
				let pattern = Pattern::new(spec.clone())?;
				Ok(Arc::new(Route::new(method, pattern, handler)))
			})
			.collect::<Result<Table, PatternError>>()?;

		self.push(routes);

		Ok(self)
	}

	fn push(&self, new: Table) {
		self.routes.rcu(|routes| {
			let mut routes = Table::clone(routes);
			routes.extend(new.iter().cloned());
			routes
		});
	}

	/// Returns the amount of registered routes.
	pub fn len(&self) -> usize {
		self.routes.load().len()
	}

	pub fn is_empty(&self) -> bool {
		self.routes.load().is_empty()
	}

	/// Returns a snapshot of the route table.
	pub fn routes(&self) -> Arc<Vec<Arc<Route>>> {
		self.routes.load_full()
	}

	/// Resolves the request to a route and returns its result.
	///
	/// Fails with [`DispatchError::Unmatched`] if no route matches, handler
	/// errors are returned unmodified as [`DispatchError::Handler`].
	pub async fn dispatch(&self, req: Request) -> Result<Response, DispatchError> {
		let method = normalize_method(req.method());

		let Some((route, matched)) = self.find(&method, req.uri()) else {
			return Err(Unmatched {
				method,
				uri: req.uri().clone(),
			}
			.into());
		};

		route
			.handler()
			.call(req, matched)
			.await
			.map_err(DispatchError::Handler)
	}

	/// Returns the first route matching the method and the url.
	pub fn find(
		&self,
		method: &Method,
		uri: &Uri,
	) -> Option<(Arc<Route>, RouteMatch)> {
		let routes = self.routes.load();

		// only resolve the url once a method matched
		let mut url = None;

		for (i, route) in routes.iter().enumerate() {
			if !route.method().allows(method) {
				continue;
			}

			if url.is_none() {
				url = Some(self.resolve(uri)?);
			}
			let url = url.as_ref()?;

			trace!(index = i, "testing route pattern");
			if let Some(matched) = route.pattern().exec(url) {
				trace!(index = i, method = %route.method(), "route matched");
				return Some((route.clone(), matched));
			}
		}

		None
	}

	/// Returns `None` if the uri cannot be parsed.
	fn resolve(&self, uri: &Uri) -> Option<Url> {
		Url::options()
			.base_url(Some(&self.base))
			.parse(&uri.to_string())
			.ok()
	}

	/// Returns a function which dispatches to this router.
	///
	/// Can be passed wherever a request callback is expected.
	pub fn handler(
		self: &Arc<Self>,
	) -> impl Fn(Request) -> PinnedFuture<'static, Result<Response, DispatchError>>
	       + Clone
	       + Send
	       + Sync
	       + 'static {
		let router = self.clone();
		move |req| {
			let router = router.clone();
			PinnedFuture::new(async move { router.dispatch(req).await })
		}
	}

	/// Returns a hyper service which dispatches to this router.
	pub fn service(self: &Arc<Self>) -> RouterService {
		RouterService::new(self.clone())
	}
}

impl Default for Router {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for Router {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Router")
			.field("routes", &**self.routes.load())
			.field("base", &self.base.as_str())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use crate::Body;

	fn request(method: &str, uri: &str) -> Request {
		hyper::Request::builder()
			.method(method)
			.uri(uri)
			.body(Body::new())
			.unwrap()
	}

	#[test]
	fn failed_compile_adds_nothing() {
		let router = Router::new();
		router.get("/", sync(|_, _| "ok")).unwrap();

		assert!(router.get("/:", sync(|_, _| "ok")).is_err());
		assert_eq!(router.len(), 1);

		let map = MethodMap::new()
			.get(sync(|_, _| "a"))
			.post(sync(|_, _| "b"));
		assert!(router.all_methods("/{x", map).is_err());
		assert_eq!(router.len(), 1);
	}

	#[test]
	fn find_respects_method_filter() {
		let router = Router::new();
		router.post("/", sync(|_, _| "ok")).unwrap();

		let uri = Uri::from_static("/");
		assert!(router.find(&Method::GET, &uri).is_none());
		assert!(router.find(&Method::POST, &uri).is_some());
	}

	#[test]
	fn absolute_uri_keeps_host() {
		let router = Router::new();
		router
			.route(
				MethodFilter::Get,
				PatternSpec::new().hostname("api.local"),
				sync(|_, _| "api"),
			)
			.unwrap();

		let uri = Uri::from_static("http://api.local/x");
		assert!(router.find(&Method::GET, &uri).is_some());

		// relative urls use the placeholder origin
		let uri = Uri::from_static("/x");
		assert!(router.find(&Method::GET, &uri).is_none());
	}

	#[tokio::test]
	async fn dispatch_lowercase_request_method() {
		let router = Router::new();
		router.get("/", sync(|_, _| "ok")).unwrap();

		let resp = router.dispatch(request("get", "/")).await.unwrap();
		assert_eq!(resp.into_body().into_string().await.unwrap(), "ok");
	}
}
