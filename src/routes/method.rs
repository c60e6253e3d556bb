use crate::header::Method;
use crate::pattern::RouteMatch;
use crate::Request;

use super::route::{BoxedHandler, Handler, IntoHandlerResult};

use std::fmt;
use std::future::Future;
use std::str::FromStr;

/// Which request methods a route accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodFilter {
	/// Matches any method.
	All,
	Get,
	Post,
	Put,
	Patch,
	Delete,
	Options,
	Head,
}

impl MethodFilter {
	/// The method needs to be uppercase, see
	/// [`normalize_method`](crate::util::normalize_method).
	pub fn allows(&self, method: &Method) -> bool {
		match self.method() {
			Some(m) => m == *method,
			None => true,
		}
	}

	/// Returns `None` for `All`.
	pub fn method(&self) -> Option<Method> {
		let m = match self {
			Self::All => return None,
			Self::Get => Method::GET,
			Self::Post => Method::POST,
			Self::Put => Method::PUT,
			Self::Patch => Method::PATCH,
			Self::Delete => Method::DELETE,
			Self::Options => Method::OPTIONS,
			Self::Head => Method::HEAD,
		};
		Some(m)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::All => "ALL",
			Self::Get => "GET",
			Self::Post => "POST",
			Self::Put => "PUT",
			Self::Patch => "PATCH",
			Self::Delete => "DELETE",
			Self::Options => "OPTIONS",
			Self::Head => "HEAD",
		}
	}
}

impl fmt::Display for MethodFilter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The method name is not one a route can be registered for.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown method {0:?}")]
pub struct UnknownMethod(pub String);

/// Parses a method name case insensitively, `*` is the same as `all`.
impl FromStr for MethodFilter {
	type Err = UnknownMethod;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let m = match s.to_ascii_uppercase().as_str() {
			"ALL" | "*" => Self::All,
			"GET" => Self::Get,
			"POST" => Self::Post,
			"PUT" => Self::Put,
			"PATCH" => Self::Patch,
			"DELETE" => Self::Delete,
			"OPTIONS" => Self::Options,
			"HEAD" => Self::Head,
			_ => return Err(UnknownMethod(s.to_string())),
		};
		Ok(m)
	}
}

impl TryFrom<&Method> for MethodFilter {
	type Error = UnknownMethod;

	fn try_from(method: &Method) -> Result<Self, Self::Error> {
		method.as_str().parse()
	}
}

/// An ordered list of handlers which share a pattern, registered with
/// [`Router::all_methods`](crate::Router::all_methods).
///
/// ## Example
/// ```
/// # use fire_router::{Router, routes::{MethodMap, sync}};
/// let router = Router::new();
/// router.all_methods(
/// 	"/users/:id",
/// 	MethodMap::new()
/// 		.get(sync(|_, _| "read"))
/// 		.put(sync(|_, _| "write")),
/// ).unwrap();
/// assert_eq!(router.len(), 2);
/// ```
#[derive(Default)]
pub struct MethodMap {
	pub(super) entries: Vec<(MethodFilter, BoxedHandler)>,
}

macro_rules! map_method {
	($($name:ident => $method:ident),*) => ($(
		#[doc = concat!("Adds a `", stringify!($method), "` handler.")]
		pub fn $name<H, F, R>(self, handler: H) -> Self
		where
			H: Fn(Request, RouteMatch) -> F + Send + Sync + 'static,
			F: Future<Output = R> + Send + 'static,
			R: IntoHandlerResult,
		{
			self.insert(MethodFilter::$method, handler)
		}
	)*)
}

impl MethodMap {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a handler, entries keep their insertion order.
	pub fn insert<H>(mut self, method: MethodFilter, handler: H) -> Self
	where
		H: Handler + 'static,
	{
		self.entries.push((method, Box::new(handler)));
		self
	}

	map_method!(
		get => Get,
		post => Post,
		put => Put,
		patch => Patch,
		delete => Delete,
		options => Options,
		head => Head
	);

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl fmt::Debug for MethodMap {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list()
			.entries(self.entries.iter().map(|(m, _)| m))
			.finish()
	}
}
