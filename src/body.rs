use std::future::poll_fn;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use std::{fmt, io, mem};

use bytes::{Bytes, BytesMut};
use hyper::body::{Body as HyperBody, Frame, Incoming, SizeHint};

enum Inner {
	Empty,
	// Bytes will never be empty
	Bytes(Bytes),
	Incoming(Incoming),
}

impl fmt::Debug for Inner {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Empty => f.write_str("Empty"),
			Self::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
			Self::Incoming(_) => f.write_str("Incoming"),
		}
	}
}

impl Default for Inner {
	fn default() -> Self {
		Self::Empty
	}
}

#[derive(Debug, Clone, Default)]
struct Constraints {
	timeout: Option<Duration>,
	size: Option<usize>,
}

/// The body of a request or a response.
///
/// Either already in memory or still streaming from the connection.
#[derive(Debug, Default)]
pub struct Body {
	inner: Inner,
	constraints: Constraints,
}

impl Body {
	fn new_inner(inner: Inner) -> Self {
		Self {
			inner,
			constraints: Constraints::default(),
		}
	}

	/// Creates a new empty `Body`.
	pub fn new() -> Self {
		Self::new_inner(Inner::Empty)
	}

	/// Creates a new `Body` from the given bytes.
	pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
		let bytes = bytes.into();
		if !bytes.is_empty() {
			Self::new_inner(Inner::Bytes(bytes))
		} else {
			Self::new()
		}
	}

	/// Creates a new Body from a `hyper::body::Incoming`.
	pub fn from_hyper(body: Incoming) -> Self {
		Self::new_inner(Inner::Incoming(body))
	}

	/// Creates a new Body from a serializeable object.
	#[cfg(feature = "json")]
	#[cfg_attr(docsrs, doc(cfg(feature = "json")))]
	pub fn serialize<S>(value: &S) -> Result<Self, serde_json::Error>
	where
		S: serde::Serialize + ?Sized,
	{
		serde_json::to_vec(value).map(|v| v.into())
	}

	/// Returns true if we know the body is empty, the body still might be empty
	/// but we just don't know it yet
	pub fn is_empty(&self) -> bool {
		matches!(self.inner, Inner::Empty)
	}

	/// Returns a length if it is already known.
	pub fn len(&self) -> Option<usize> {
		match &self.inner {
			Inner::Empty => Some(0),
			Inner::Bytes(b) => Some(b.len()),
			Inner::Incoming(_) => None,
		}
	}

	/// Sets a read size limit.
	pub fn set_size_limit(&mut self, size: Option<usize>) {
		self.constraints.size = size;
	}

	/// Sets a read timeout, the timer starts counting after you call into_*
	pub fn set_timeout(&mut self, timeout: Option<Duration>) {
		self.constraints.timeout = timeout;
	}

	/// Takes the body and replaces it with an empty one.
	pub fn take(&mut self) -> Self {
		mem::take(self)
	}

	/// Converts the Body into Bytes.
	///
	/// Fails with `UnexpectedEof` if the size limit is reached and with
	/// `TimedOut` if the timeout elapsed.
	pub async fn into_bytes(self) -> io::Result<Bytes> {
		let Constraints { timeout, size } = self.constraints;

		match self.inner {
			Inner::Empty => Ok(Bytes::new()),
			Inner::Bytes(b) => {
				if matches!(size, Some(limit) if b.len() > limit) {
					return Err(size_limit_reached("Bytes to big"));
				}
				Ok(b)
			}
			Inner::Incoming(incoming) => {
				let read = read_incoming(incoming, size);
				match timeout {
					Some(timeout) => tokio::time::timeout(timeout, read)
						.await
						.map_err(|_| timed_out("Body read timed out"))?,
					None => read.await,
				}
			}
		}
	}

	/// Converts the Body into a string.
	pub async fn into_string(self) -> io::Result<String> {
		let bytes = self.into_bytes().await?;
		String::from_utf8(bytes.into())
			.map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
	}

	/// Converts the Body into a deserializeable type.
	#[cfg(feature = "json")]
	#[cfg_attr(docsrs, doc(cfg(feature = "json")))]
	pub async fn deserialize<D>(self) -> crate::Result<D>
	where
		D: serde::de::DeserializeOwned,
	{
		let bytes = self.into_bytes().await?;
		serde_json::from_slice(&bytes).map_err(Into::into)
	}
}

async fn read_incoming(
	mut incoming: Incoming,
	size_limit: Option<usize>,
) -> io::Result<Bytes> {
	let mut buf = BytesMut::new();

	while let Some(frame) =
		poll_fn(|cx| Pin::new(&mut incoming).poll_frame(cx)).await
	{
		let frame =
			frame.map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
		// trailers are ignored
		let Ok(data) = frame.into_data() else {
			continue;
		};

		if matches!(size_limit, Some(limit) if buf.len() + data.len() > limit)
		{
			return Err(size_limit_reached("Body to big"));
		}

		buf.extend_from_slice(&data);
	}

	Ok(buf.freeze())
}

impl HyperBody for Body {
	type Data = Bytes;
	type Error = io::Error;

	fn poll_frame(
		self: Pin<&mut Self>,
		cx: &mut Context,
	) -> Poll<Option<io::Result<Frame<Bytes>>>> {
		let me = self.get_mut();
		match mem::take(&mut me.inner) {
			Inner::Empty => Poll::Ready(None),
			// a bytes body is a single frame
			Inner::Bytes(b) => Poll::Ready(Some(Ok(Frame::data(b)))),
			Inner::Incoming(mut i) => {
				let r = Pin::new(&mut i)
					.poll_frame(cx)
					.map_err(|e| io::Error::new(io::ErrorKind::Other, e));
				me.inner = Inner::Incoming(i);
				r
			}
		}
	}

	fn is_end_stream(&self) -> bool {
		match &self.inner {
			Inner::Empty => true,
			Inner::Bytes(_) => false,
			Inner::Incoming(i) => i.is_end_stream(),
		}
	}

	fn size_hint(&self) -> SizeHint {
		match &self.inner {
			Inner::Empty => SizeHint::with_exact(0),
			Inner::Bytes(b) => SizeHint::with_exact(b.len() as u64),
			Inner::Incoming(i) => i.size_hint(),
		}
	}
}

impl From<Incoming> for Body {
	fn from(i: Incoming) -> Self {
		Self::from_hyper(i)
	}
}

impl From<Bytes> for Body {
	fn from(b: Bytes) -> Self {
		Self::from_bytes(b)
	}
}

impl From<Vec<u8>> for Body {
	fn from(b: Vec<u8>) -> Self {
		Self::from_bytes(b)
	}
}

impl From<String> for Body {
	fn from(s: String) -> Self {
		Self::from_bytes(s)
	}
}

impl From<&'static str> for Body {
	fn from(s: &'static str) -> Self {
		Self::from_bytes(s)
	}
}

impl From<()> for Body {
	fn from(_: ()) -> Self {
		Self::new()
	}
}

fn size_limit_reached(msg: &'static str) -> io::Error {
	io::Error::new(io::ErrorKind::UnexpectedEof, msg)
}

fn timed_out(msg: &'static str) -> io::Error {
	io::Error::new(io::ErrorKind::TimedOut, msg)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn bytes_body() {
		let body = Body::from("hello");
		assert_eq!(body.len(), Some(5));
		assert_eq!(body.into_string().await.unwrap(), "hello");

		assert!(Body::from(Vec::new()).is_empty());
	}

	#[tokio::test]
	async fn size_limit() {
		let mut body = Body::from("to many bytes");
		body.set_size_limit(Some(4));
		let e = body.into_bytes().await.unwrap_err();
		assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof);
	}

	#[tokio::test]
	async fn take_leaves_empty() {
		let mut body = Body::from("data");
		let taken = body.take();
		assert!(body.is_empty());
		assert_eq!(taken.into_bytes().await.unwrap(), "data");
	}
}
