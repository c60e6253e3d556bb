//! Url patterns with named groups.
//!
//! A [`Pattern`] is compiled once from a [`PatternSpec`] and can then be
//! tested against any number of urls.
//!
//! Every url component (protocol, hostname, pathname, ...) has its own
//! pattern, written in the following syntax:
//!
//! - `:name` a named group, matches one or more characters up to the next
//!   segment delimiter (`/` in the pathname, `.` in the hostname)
//! - `:name(regex)` a named group with a custom regex
//! - `(regex)` an unnamed group
//! - `*` an unnamed group which matches anything, including nothing
//! - `{...}` groups literals and groups without capturing
//! - `?`, `*` or `+` after a group make it optional or repeatable
//! - `\` escapes the next character
//!
//! Unnamed groups are reported by their index: `"0"`, `"1"`, ...
//!
//! ## Example
//! ```
//! # use fire_router::pattern::Pattern;
//! # use url::Url;
//! let pattern = Pattern::new("/users/:id").unwrap();
//!
//! let url = Url::parse("http://example.com/users/42").unwrap();
//! let matched = pattern.exec(&url).unwrap();
//! assert_eq!(matched.param("id"), Some("42"));
//!
//! let url = Url::parse("http://example.com/users").unwrap();
//! assert!(pattern.exec(&url).is_none());
//! ```

mod parser;

mod route_match;
pub use route_match::{ComponentMatch, Params, RouteMatch};

use std::fmt;

use regex::Regex;
use url::Url;

/// A part of an url which get's matched separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
	Protocol,
	Username,
	Password,
	Hostname,
	Port,
	Pathname,
	Search,
	Hash,
}

impl Component {
	pub const ALL: [Component; 8] = [
		Self::Protocol,
		Self::Username,
		Self::Password,
		Self::Hostname,
		Self::Port,
		Self::Pathname,
		Self::Search,
		Self::Hash,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Protocol => "protocol",
			Self::Username => "username",
			Self::Password => "password",
			Self::Hostname => "hostname",
			Self::Port => "port",
			Self::Pathname => "pathname",
			Self::Search => "search",
			Self::Hash => "hash",
		}
	}

	/// What a named group without a custom regex matches.
	fn segment_regex(&self) -> &'static str {
		match self {
			Self::Pathname => "[^/]+?",
			Self::Hostname => "[^.]+?",
			_ => ".+?",
		}
	}

	fn index(&self) -> usize {
		*self as usize
	}

	/// Returns the part of the url this component matches against.
	///
	/// The port is empty if it is the default port of the scheme, search and
	/// hash don't contain their leading `?` or `#`.
	pub fn input<'a>(&self, url: &'a Url) -> std::borrow::Cow<'a, str> {
		match self {
			Self::Protocol => url.scheme().into(),
			Self::Username => url.username().into(),
			Self::Password => url.password().unwrap_or("").into(),
			Self::Hostname => url.host_str().unwrap_or("").into(),
			Self::Port => url
				.port()
				.map(|p| p.to_string().into())
				.unwrap_or_else(|| "".into()),
			Self::Pathname => url.path().into(),
			Self::Search => url.query().unwrap_or("").into(),
			Self::Hash => url.fragment().unwrap_or("").into(),
		}
	}
}

impl fmt::Display for Component {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A pattern could not be compiled.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PatternError {
	#[error("{component}: expected a group name at {pos}")]
	InvalidName { component: Component, pos: usize },
	#[error("{component}: duplicate group name {name:?}")]
	DuplicateName { component: Component, name: String },
	#[error("{component}: unbalanced {{ }}")]
	UnbalancedGroup { component: Component },
	#[error("{component}: unclosed regex group at {pos}")]
	UnbalancedRegex { component: Component, pos: usize },
	#[error("{component}: empty regex group at {pos}")]
	EmptyRegex { component: Component, pos: usize },
	#[error("{component}: modifier without a group at {pos}")]
	DanglingModifier { component: Component, pos: usize },
	#[error("{component}: nested {{ at {pos}")]
	NestedGroup { component: Component, pos: usize },
	#[error("{component}: pattern ends with an escape")]
	TrailingEscape { component: Component },
	#[error("{component}: invalid regex")]
	Regex {
		component: Component,
		#[source]
		source: regex::Error,
	},
}

/// The input from which a [`Pattern`] get's compiled.
///
/// A string is a pathname template, every other component is a wildcard.
/// Components which are not set are wildcards.
///
/// ## Example
/// ```
/// # use fire_router::pattern::PatternSpec;
/// let spec = PatternSpec::new()
/// 	.protocol("http{s}?")
/// 	.hostname(":sub.example.com")
/// 	.pathname("/api/*");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSpec {
	components: [Option<String>; 8],
}

macro_rules! spec_setter {
	($($name:ident => $comp:ident),*) => ($(
		pub fn $name(mut self, pattern: impl Into<String>) -> Self {
			self.components[Component::$comp.index()] = Some(pattern.into());
			self
		}
	)*)
}

impl PatternSpec {
	/// Creates a spec where every component is a wildcard.
	pub fn new() -> Self {
		Self::default()
	}

	spec_setter!(
		protocol => Protocol,
		username => Username,
		password => Password,
		hostname => Hostname,
		port => Port,
		pathname => Pathname,
		search => Search,
		hash => Hash
	);

	/// Returns the pattern of the component, `None` is a wildcard.
	pub fn get(&self, component: Component) -> Option<&str> {
		self.components[component.index()].as_deref()
	}
}

impl From<&str> for PatternSpec {
	fn from(s: &str) -> Self {
		Self::new().pathname(s)
	}
}

impl From<String> for PatternSpec {
	fn from(s: String) -> Self {
		Self::new().pathname(s)
	}
}

impl From<&String> for PatternSpec {
	fn from(s: &String) -> Self {
		Self::new().pathname(s.as_str())
	}
}

#[derive(Debug, Clone)]
struct CompiledComponent {
	// None if the component is a wildcard
	regex: Option<Regex>,
	names: Vec<String>,
}

impl CompiledComponent {
	fn wildcard() -> Self {
		Self {
			regex: None,
			names: vec!["0".into()],
		}
	}

	fn compile(
		component: Component,
		pattern: &str,
	) -> Result<Self, PatternError> {
		if pattern == "*" {
			return Ok(Self::wildcard());
		}

		let compiled = parser::compile(component, pattern)?;
		let regex = Regex::new(&compiled.regex)
			.map_err(|source| PatternError::Regex { component, source })?;

		Ok(Self {
			regex: Some(regex),
			names: compiled.names,
		})
	}

	fn exec(&self, input: &str) -> Option<ComponentMatch> {
		let Some(regex) = &self.regex else {
			let mut groups = Params::new();
			groups.insert("0", input);
			return Some(ComponentMatch::new(input, groups));
		};

		let caps = regex.captures(input)?;

		let mut groups = Params::new();
		for (i, name) in self.names.iter().enumerate() {
			// optional groups which did not participate are left out
			if let Some(m) = caps.name(&format!("g{i}")) {
				groups.insert(name, m.as_str());
			}
		}

		Some(ComponentMatch::new(input, groups))
	}
}

/// A compiled url pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
	spec: PatternSpec,
	components: Box<[CompiledComponent]>,
}

impl Pattern {
	/// Compiles the spec, either every component compiles or an error is
	/// returned.
	pub fn new(spec: impl Into<PatternSpec>) -> Result<Self, PatternError> {
		let spec = spec.into();

		let components = Component::ALL
			.iter()
			.map(|&c| match spec.get(c) {
				Some(pattern) => CompiledComponent::compile(c, pattern),
				None => Ok(CompiledComponent::wildcard()),
			})
			.collect::<Result<Box<[_]>, _>>()?;

		Ok(Self { spec, components })
	}

	pub fn spec(&self) -> &PatternSpec {
		&self.spec
	}

	/// Matches the url against every component.
	///
	/// Returns `None` if any component does not match.
	pub fn exec(&self, url: &Url) -> Option<RouteMatch> {
		// the pathname is the most likely to differ
		let pathname = Component::Pathname;
		let path_match = self.components[pathname.index()]
			.exec(&pathname.input(url))?;

		let mut matches = Vec::with_capacity(Component::ALL.len());
		for c in Component::ALL {
			if c == pathname {
				matches.push(path_match.clone());
				continue;
			}

			matches.push(self.components[c.index()].exec(&c.input(url))?);
		}

		Some(RouteMatch::new(matches))
	}

	/// Returns true if the url matches.
	pub fn test(&self, url: &Url) -> bool {
		self.exec(url).is_some()
	}
}
