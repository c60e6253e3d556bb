use super::{Component, PatternError};

use std::iter::Peekable;
use std::str::CharIndices;

/// How often a group may appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Modifier {
	None,
	Optional,
	ZeroOrMore,
	OneOrMore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Item {
	Literal(String),
	Capture {
		// None for wildcards and bare regex groups
		name: Option<String>,
		regex: String,
		modifier: Modifier,
	},
	Group {
		items: Vec<Item>,
		modifier: Modifier,
	},
}

/// The regex source for a component and the names of its groups in order.
///
/// The groups are named `g0`, `g1`, ... inside the regex, the returned names
/// are what the user sees.
#[derive(Debug, Clone)]
pub(super) struct Compiled {
	pub regex: String,
	pub names: Vec<String>,
}

pub(super) fn compile(
	component: Component,
	pattern: &str,
) -> Result<Compiled, PatternError> {
	let items = Parser::new(component, pattern).parse()?;

	let mut regex = String::with_capacity(pattern.len() * 2 + 8);
	regex.push_str("(?s)^");

	let mut names = vec![];
	let mut unnamed = 0usize;
	write_items(component, &items, &mut regex, &mut names, &mut unnamed)?;

	regex.push('$');

	Ok(Compiled { regex, names })
}

fn write_items(
	component: Component,
	items: &[Item],
	regex: &mut String,
	names: &mut Vec<String>,
	unnamed: &mut usize,
) -> Result<(), PatternError> {
	let mut i = 0;
	while i < items.len() {
		match &items[i] {
			Item::Literal(lit) => {
				// in the pathname a slash directly before a modified capture
				// belongs to the capture, `/books/:id?` should match `/books`
				if let Some(Item::Capture {
					name,
					regex: body,
					modifier,
				}) = items.get(i + 1)
				{
					if component == Component::Pathname
						&& *modifier != Modifier::None
						&& lit.ends_with('/')
					{
						regex.push_str(&regex::escape(&lit[..lit.len() - 1]));
						let group = group_name(component, name, names, unnamed)?;
						write_capture(regex, "/", &group, body, *modifier);
						i += 2;
						continue;
					}
				}

				regex.push_str(&regex::escape(lit));
			}
			Item::Capture {
				name,
				regex: body,
				modifier,
			} => {
				let group = group_name(component, name, names, unnamed)?;
				write_capture(regex, "", &group, body, *modifier);
			}
			Item::Group { items, modifier } => {
				regex.push_str("(?:");
				write_items(component, items, regex, names, unnamed)?;
				regex.push(')');
				regex.push_str(match modifier {
					Modifier::None => "",
					Modifier::Optional => "?",
					Modifier::ZeroOrMore => "*",
					Modifier::OneOrMore => "+",
				});
			}
		}

		i += 1;
	}

	Ok(())
}

/// Registers the user visible name and returns the regex group name.
fn group_name(
	component: Component,
	name: &Option<String>,
	names: &mut Vec<String>,
	unnamed: &mut usize,
) -> Result<String, PatternError> {
	let visible = match name {
		Some(name) => {
			if names.iter().any(|n| n == name) {
				return Err(PatternError::DuplicateName {
					component,
					name: name.clone(),
				});
			}
			name.clone()
		}
		None => {
			let n = unnamed.to_string();
			*unnamed += 1;
			n
		}
	};

	let group = format!("g{}", names.len());
	names.push(visible);

	Ok(group)
}

fn write_capture(
	regex: &mut String,
	prefix: &str,
	group: &str,
	body: &str,
	modifier: Modifier,
) {
	let prefix = regex::escape(prefix);
	let s = match modifier {
		Modifier::None => format!("{prefix}(?P<{group}>{body})"),
		Modifier::Optional => format!("(?:{prefix}(?P<{group}>{body}))?"),
		Modifier::OneOrMore => format!(
			"{prefix}(?P<{group}>(?:{body})(?:{prefix}(?:{body}))*)"
		),
		Modifier::ZeroOrMore => format!(
			"(?:{prefix}(?P<{group}>(?:{body})(?:{prefix}(?:{body}))*))?"
		),
	};
	regex.push_str(&s);
}

struct Parser<'a> {
	component: Component,
	chars: Peekable<CharIndices<'a>>,
}

impl<'a> Parser<'a> {
	fn new(component: Component, pattern: &'a str) -> Self {
		Self {
			component,
			chars: pattern.char_indices().peekable(),
		}
	}

	fn parse(mut self) -> Result<Vec<Item>, PatternError> {
		let items = self.parse_items(false)?;
		Ok(items)
	}

	/// Parses until the end of the pattern or the closing `}` if `in_group`.
	fn parse_items(&mut self, in_group: bool) -> Result<Vec<Item>, PatternError> {
		let mut items = vec![];
		let mut literal = String::new();

		macro_rules! flush {
			() => {
				if !literal.is_empty() {
					items.push(Item::Literal(std::mem::take(&mut literal)));
				}
			};
		}

		while let Some((pos, c)) = self.chars.next() {
			match c {
				'\\' => {
					let Some((_, escaped)) = self.chars.next() else {
						return Err(PatternError::TrailingEscape {
							component: self.component,
						});
					};
					literal.push(escaped);
				}
				':' => {
					flush!();
					let name = self.parse_name(pos)?;
					let regex = match self.chars.peek() {
						Some(&(pos, '(')) => {
							self.chars.next();
							self.parse_regex(pos)?
						}
						_ => self.component.segment_regex().to_string(),
					};
					let modifier = self.parse_modifier();
					items.push(Item::Capture {
						name: Some(name),
						regex,
						modifier,
					});
				}
				'(' => {
					flush!();
					let regex = self.parse_regex(pos)?;
					let modifier = self.parse_modifier();
					items.push(Item::Capture {
						name: None,
						regex,
						modifier,
					});
				}
				'*' => {
					flush!();
					let modifier = self.parse_modifier();
					items.push(Item::Capture {
						name: None,
						regex: ".*".into(),
						modifier,
					});
				}
				'{' => {
					if in_group {
						return Err(PatternError::NestedGroup {
							component: self.component,
							pos,
						});
					}
					flush!();
					let inner = self.parse_items(true)?;
					let modifier = self.parse_modifier();
					items.push(Item::Group {
						items: inner,
						modifier,
					});
				}
				'}' => {
					if !in_group {
						return Err(PatternError::UnbalancedGroup {
							component: self.component,
						});
					}
					flush!();
					return Ok(items);
				}
				'?' | '+' => {
					return Err(PatternError::DanglingModifier {
						component: self.component,
						pos,
					});
				}
				c => literal.push(c),
			}
		}

		if in_group {
			return Err(PatternError::UnbalancedGroup {
				component: self.component,
			});
		}

		flush!();
		Ok(items)
	}

	/// Parses the name after a `:`.
	fn parse_name(&mut self, pos: usize) -> Result<String, PatternError> {
		let mut name = String::new();

		while let Some(&(_, c)) = self.chars.peek() {
			let valid = if name.is_empty() {
				c.is_ascii_alphabetic() || c == '_'
			} else {
				c.is_ascii_alphanumeric() || c == '_'
			};
			if !valid {
				break;
			}
			name.push(c);
			self.chars.next();
		}

		if name.is_empty() {
			return Err(PatternError::InvalidName {
				component: self.component,
				pos,
			});
		}

		Ok(name)
	}

	/// Parses a regex group body, the opening `(` was already consumed.
	fn parse_regex(&mut self, pos: usize) -> Result<String, PatternError> {
		let mut regex = String::new();
		let mut depth = 0usize;

		loop {
			let Some((_, c)) = self.chars.next() else {
				return Err(PatternError::UnbalancedRegex {
					component: self.component,
					pos,
				});
			};

			match c {
				'\\' => {
					let Some((_, escaped)) = self.chars.next() else {
						return Err(PatternError::TrailingEscape {
							component: self.component,
						});
					};
					regex.push('\\');
					regex.push(escaped);
				}
				'(' => {
					depth += 1;
					regex.push(c);
				}
				')' if depth == 0 => break,
				')' => {
					depth -= 1;
					regex.push(c);
				}
				c => regex.push(c),
			}
		}

		if regex.is_empty() {
			return Err(PatternError::EmptyRegex {
				component: self.component,
				pos,
			});
		}

		Ok(regex)
	}

	fn parse_modifier(&mut self) -> Modifier {
		let modifier = match self.chars.peek() {
			Some((_, '?')) => Modifier::Optional,
			Some((_, '*')) => Modifier::ZeroOrMore,
			Some((_, '+')) => Modifier::OneOrMore,
			_ => return Modifier::None,
		};
		self.chars.next();
		modifier
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn items(s: &str) -> Vec<Item> {
		Parser::new(Component::Pathname, s).parse().unwrap()
	}

	#[test]
	fn parse_named() {
		assert_eq!(
			items("/users/:id"),
			vec![
				Item::Literal("/users/".into()),
				Item::Capture {
					name: Some("id".into()),
					regex: "[^/]+?".into(),
					modifier: Modifier::None,
				},
			]
		);
	}

	#[test]
	fn parse_custom_regex() {
		assert_eq!(
			items(":id(\\d+)+"),
			vec![Item::Capture {
				name: Some("id".into()),
				regex: "\\d+".into(),
				modifier: Modifier::OneOrMore,
			}]
		);
	}

	#[test]
	fn parse_escapes_and_groups() {
		assert_eq!(
			items("/a\\:b{/c}?"),
			vec![
				Item::Literal("/a:b".into()),
				Item::Group {
					items: vec![Item::Literal("/c".into())],
					modifier: Modifier::Optional,
				},
			]
		);
	}

	#[test]
	fn compile_names_in_order() {
		let c = compile(Component::Pathname, "/:a/*/(\\d+)/:b").unwrap();
		assert_eq!(c.names, ["a", "0", "1", "b"]);
	}

	#[test]
	fn compile_errors() {
		let err = |s| compile(Component::Pathname, s).unwrap_err();

		assert!(matches!(err("/:"), PatternError::InvalidName { pos: 1, .. }));
		assert!(matches!(err("/:a/:a"), PatternError::DuplicateName { .. }));
		assert!(matches!(err("/{a"), PatternError::UnbalancedGroup { .. }));
		assert!(matches!(err("/a}"), PatternError::UnbalancedGroup { .. }));
		assert!(matches!(err("/(a"), PatternError::UnbalancedRegex { .. }));
		assert!(matches!(err("/()"), PatternError::EmptyRegex { .. }));
		assert!(matches!(err("/?"), PatternError::DanglingModifier { .. }));
		assert!(matches!(err("/{{a}}"), PatternError::NestedGroup { .. }));
		assert!(matches!(err("/a\\"), PatternError::TrailingEscape { .. }));
	}
}
