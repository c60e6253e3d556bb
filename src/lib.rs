#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod body;
pub use body::Body;

pub mod pattern;

pub mod routes;
pub use routes::Router;

pub mod into;

pub mod error;
pub use error::{DispatchError, Error, Result, Unmatched};

pub mod util;

mod server;
pub use server::{
	build, Fallback, HyperRequest, Server, ServerBuilder, StatusFallback,
};

#[cfg(feature = "json")]
#[cfg_attr(docsrs, doc(cfg(feature = "json")))]
pub mod json;

pub mod header {
	//! Reexports of the http header types.

	pub use hyper::header::*;
	pub use hyper::{Method, StatusCode, Uri};
}

pub use url::Url;

/// The request a handler receives.
pub type Request = hyper::Request<Body>;

/// The response a handler returns.
pub type Response = hyper::Response<Body>;
