use crate::header::{Method, StatusCode, Uri};

use std::error::Error as StdError;
use std::{fmt, io};

pub type Result<T> = std::result::Result<T, Error>;

/// The error a handler can return.
///
/// An error is either associated with the client or the server. The router
/// never inspects it, it get's returned unmodified from
/// [`Router::dispatch`](crate::Router::dispatch).
#[derive(Debug)]
pub struct Error {
	kind: ErrorKind,
	source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
	/// Creates a new error.
	pub fn new<K, E>(kind: K, error: E) -> Self
	where
		K: Into<ErrorKind>,
		E: Into<Box<dyn StdError + Send + Sync>>,
	{
		Self {
			kind: kind.into(),
			source: Some(error.into()),
		}
	}

	/// Creates a new error without a source.
	pub fn empty<K>(kind: K) -> Self
	where
		K: Into<ErrorKind>,
	{
		Self {
			kind: kind.into(),
			source: None,
		}
	}

	pub fn kind(&self) -> &ErrorKind {
		&self.kind
	}

	/// Returns the `StatusCode` corresponding to the `ErrorKind`.
	pub fn status_code(&self) -> StatusCode {
		match self.kind {
			ErrorKind::Client(c) => c.into(),
			ErrorKind::Server(s) => s.into(),
		}
	}

	/// Returns a new error from an io::Error originating from the client.
	pub fn from_client_io(error: io::Error) -> Self {
		Self::new(ClientErrorKind::from_io(&error), error)
	}

	/// Returns a new error originating from the server.
	pub fn from_server_error<E>(error: E) -> Self
	where
		E: Into<Box<dyn StdError + Send + Sync>>,
	{
		Self::new(ServerErrorKind::InternalServerError, error)
	}
}

impl<T> From<T> for Error
where
	T: Into<ErrorKind>,
{
	fn from(e: T) -> Self {
		Self::empty(e)
	}
}

impl From<io::Error> for Error {
	fn from(e: io::Error) -> Self {
		Self::from_client_io(e)
	}
}

#[cfg(feature = "json")]
impl From<serde_json::Error> for Error {
	fn from(e: serde_json::Error) -> Self {
		Self::new(ClientErrorKind::BadRequest, e)
	}
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.source {
			Some(source) => write!(f, "{:?}: {}", self.kind, source),
			None => write!(f, "{:?}", self.kind),
		}
	}
}

impl StdError for Error {
	fn source(&self) -> Option<&(dyn StdError + 'static)> {
		self.source.as_ref().map(|e| &**e as &(dyn StdError + 'static))
	}
}

/// An error can either come from the client or the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	Client(ClientErrorKind),
	Server(ServerErrorKind),
}

impl From<ClientErrorKind> for ErrorKind {
	fn from(k: ClientErrorKind) -> Self {
		Self::Client(k)
	}
}

impl From<ServerErrorKind> for ErrorKind {
	fn from(k: ServerErrorKind) -> Self {
		Self::Server(k)
	}
}

macro_rules! error_kind {
	($name:ident, $($kind:ident => $status:ident),*) => (
		#[derive(Debug, Clone, Copy, PartialEq, Eq)]
		pub enum $name {
			$($kind),*
		}

		impl From<$name> for StatusCode {
			fn from(k: $name) -> Self {
				match k {
					$($name::$kind => Self::$status),*
				}
			}
		}
	)
}

error_kind!( ClientErrorKind,
	BadRequest => BAD_REQUEST,
	Unauthorized => UNAUTHORIZED,
	Forbidden => FORBIDDEN,
	NotFound => NOT_FOUND,
	MethodNotAllowed => METHOD_NOT_ALLOWED,
	RequestTimeout => REQUEST_TIMEOUT,
	Conflict => CONFLICT,
	RequestEntityTooLarge => PAYLOAD_TOO_LARGE,
	UnsupportedMediaType => UNSUPPORTED_MEDIA_TYPE,
	ExpectationFailed => EXPECTATION_FAILED
);

impl ClientErrorKind {
	/// Converts an io::Error into the appropriate kind.
	pub fn from_io(error: &io::Error) -> Self {
		use io::ErrorKind::*;
		match error.kind() {
			NotFound => Self::NotFound,
			PermissionDenied => Self::Unauthorized,
			AlreadyExists => Self::Conflict,
			// the body reached its size limit
			UnexpectedEof => Self::RequestEntityTooLarge,
			InvalidInput | InvalidData | Other => Self::BadRequest,
			TimedOut => Self::RequestTimeout,
			_ => Self::ExpectationFailed,
		}
	}
}

error_kind!( ServerErrorKind,
	InternalServerError => INTERNAL_SERVER_ERROR,
	NotImplemented => NOT_IMPLEMENTED,
	BadGateway => BAD_GATEWAY,
	ServiceUnavailable => SERVICE_UNAVAILABLE,
	GatewayTimeout => GATEWAY_TIMEOUT
);

/// No route in the table matched the request.
#[derive(Debug, Clone, thiserror::Error)]
#[error("no route matched {method} {uri}")]
pub struct Unmatched {
	pub method: Method,
	pub uri: Uri,
}

/// The failure of a single dispatch.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
	#[error(transparent)]
	Unmatched(#[from] Unmatched),
	#[error("handler failed: {0}")]
	Handler(#[from] Error),
}

impl DispatchError {
	pub fn is_unmatched(&self) -> bool {
		matches!(self, Self::Unmatched(_))
	}

	/// Returns the handler error if there is one.
	pub fn into_handler_error(self) -> Option<Error> {
		match self {
			Self::Handler(e) => Some(e),
			Self::Unmatched(_) => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn io_error_kinds() {
		let e = Error::from(io::Error::new(io::ErrorKind::TimedOut, "slow"));
		assert_eq!(e.status_code(), StatusCode::REQUEST_TIMEOUT);

		let e = Error::from(io::Error::new(io::ErrorKind::UnexpectedEof, "big"));
		assert_eq!(e.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
	}

	#[test]
	fn unmatched_is_distinguishable() {
		let e: DispatchError = Unmatched {
			method: Method::GET,
			uri: Uri::from_static("/abc"),
		}
		.into();
		assert!(e.is_unmatched());
		assert_eq!(e.to_string(), "no route matched GET /abc");
		assert!(e.into_handler_error().is_none());

		let e: DispatchError = Error::empty(ServerErrorKind::BadGateway).into();
		assert!(!e.is_unmatched());
		assert_eq!(
			e.into_handler_error().unwrap().status_code(),
			StatusCode::BAD_GATEWAY
		);
	}
}
