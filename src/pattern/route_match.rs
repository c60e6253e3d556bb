use super::Component;

use std::collections::HashMap;

/// Captured groups by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
	inner: HashMap<String, String>,
}

impl Params {
	pub fn new() -> Self {
		Self::default()
	}

	pub(crate) fn insert(
		&mut self,
		key: impl Into<String>,
		value: impl Into<String>,
	) {
		self.inner.insert(key.into(), value.into());
	}

	pub fn exists(&self, key: impl AsRef<str>) -> bool {
		self.inner.contains_key(key.as_ref())
	}

	pub fn get(&self, key: impl AsRef<str>) -> Option<&str> {
		self.inner.get(key.as_ref()).map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}
}

/// The result of matching a single url component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentMatch {
	input: String,
	groups: Params,
}

impl ComponentMatch {
	pub(super) fn new(input: impl Into<String>, groups: Params) -> Self {
		Self {
			input: input.into(),
			groups,
		}
	}

	/// The part of the url which was matched.
	pub fn input(&self) -> &str {
		&self.input
	}

	pub fn groups(&self) -> &Params {
		&self.groups
	}

	pub fn get(&self, key: impl AsRef<str>) -> Option<&str> {
		self.groups.get(key)
	}
}

/// What a route pattern captured from the request url.
///
/// Get's created for every dispatch and is handed to the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
	// indexed by Component
	components: Vec<ComponentMatch>,
}

macro_rules! component_getter {
	($($name:ident => $comp:ident),*) => ($(
		pub fn $name(&self) -> &ComponentMatch {
			self.component(Component::$comp)
		}
	)*)
}

impl RouteMatch {
	pub(super) fn new(components: Vec<ComponentMatch>) -> Self {
		debug_assert_eq!(components.len(), Component::ALL.len());
		Self { components }
	}

	pub fn component(&self, component: Component) -> &ComponentMatch {
		&self.components[component as usize]
	}

	component_getter!(
		protocol => Protocol,
		username => Username,
		password => Password,
		hostname => Hostname,
		port => Port,
		pathname => Pathname,
		search => Search,
		hash => Hash
	);

	/// Returns the path parameters.
	pub fn params(&self) -> &Params {
		self.pathname().groups()
	}

	/// Returns a path parameter.
	pub fn param(&self, key: impl AsRef<str>) -> Option<&str> {
		self.pathname().get(key)
	}
}
