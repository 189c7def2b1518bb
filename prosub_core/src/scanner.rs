use regex::Regex;
use regex::RegexBuilder;

use crate::ProsubResult;
use crate::config::ReplaceConfig;

/// Character class for the name between property delimiters: letters,
/// digits, underscore, dot, and hyphen.
const PROPERTY_NAME: &str = r"[a-zA-Z0-9_.\-]+";

/// What pattern-mode substitution searches for. The variant is chosen
/// explicitly by the caller instead of inferring it from the argument shape.
#[derive(Debug, Clone)]
pub enum Target {
	/// Exact text, every character matched verbatim.
	Literal(String),
	/// A caller-supplied regular expression.
	Regex(Regex),
}

impl Target {
	pub fn literal(text: impl Into<String>) -> Self {
		Self::Literal(text.into())
	}

	/// Compile a regular expression target, surfacing invalid patterns
	/// eagerly.
	pub fn regex(pattern: &str) -> ProsubResult<Self> {
		Ok(Self::Regex(Regex::new(pattern)?))
	}

	/// An empty literal matches nothing and short-circuits the engine.
	pub fn is_empty(&self) -> bool {
		matches!(self, Self::Literal(text) if text.is_empty())
	}
}

/// A single match over the remaining text.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TokenMatch {
	/// Byte offset of the match within the scanned text.
	pub start: usize,
	/// Byte offset one past the end of the match.
	pub end: usize,
	/// The captured property name (property mode only).
	pub captured: Option<String>,
}

impl TokenMatch {
	pub fn len(&self) -> usize {
		self.end - self.start
	}

	pub fn is_empty(&self) -> bool {
		self.start == self.end
	}
}

/// Finds successive substitution tokens in text.
///
/// The compiled pattern carries no scan cursor, so a scanner can be shared
/// across concurrently processed units; every [`TokenScanner::next_match`]
/// call searches the slice it is given from the start.
#[derive(Debug, Clone)]
pub struct TokenScanner {
	pattern: Regex,
	captures_name: bool,
}

impl TokenScanner {
	/// Property mode: the configured delimiter pair bracketing a property
	/// name.
	pub fn properties(config: &ReplaceConfig) -> ProsubResult<Self> {
		Ok(Self {
			pattern: property_pattern(config)?,
			captures_name: true,
		})
	}

	/// Pattern mode: a literal string (escaped so all characters match
	/// verbatim) or a caller-supplied regular expression. When matching is
	/// configured case-insensitive the compiled pattern gains that flag.
	pub fn target(target: &Target, config: &ReplaceConfig) -> ProsubResult<Self> {
		let source = match target {
			Target::Literal(text) => regex::escape(text),
			Target::Regex(pattern) => pattern.as_str().to_string(),
		};

		Ok(Self {
			pattern: compile(&source, config)?,
			captures_name: false,
		})
	}

	/// The leftmost match in `remaining`, if any.
	pub fn next_match(&self, remaining: &str) -> Option<TokenMatch> {
		if self.captures_name {
			let captures = self.pattern.captures(remaining)?;
			let all = captures.get(0)?;
			Some(TokenMatch {
				start: all.start(),
				end: all.end(),
				captured: captures.get(1).map(|name| name.as_str().to_string()),
			})
		} else {
			let found = self.pattern.find(remaining)?;
			Some(TokenMatch {
				start: found.start(),
				end: found.end(),
				captured: None,
			})
		}
	}
}

/// The property token pattern: escaped start delimiter, captured name,
/// escaped end delimiter. Also used while resolving cross-references inside
/// property values.
pub(crate) fn property_pattern(config: &ReplaceConfig) -> ProsubResult<Regex> {
	let source = format!(
		"{}({}){}",
		regex::escape(&config.start_delimiter),
		PROPERTY_NAME,
		regex::escape(&config.end_delimiter)
	);
	compile(&source, config)
}

fn compile(source: &str, config: &ReplaceConfig) -> ProsubResult<Regex> {
	RegexBuilder::new(source)
		.case_insensitive(!config.case_sensitive)
		.build()
		.map_err(Into::into)
}
