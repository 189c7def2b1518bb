use std::ops::Range;

use crate::ProsubError;
use crate::ProsubResult;
use crate::config::ReplaceConfig;
use crate::diagnostics::DiagnosticSink;
use crate::position::MappingBuilder;
use crate::position::SourceMap;
use crate::scanner::TokenScanner;

/// A contiguous range of the original text and the text it produced.
///
/// Spans come out in text order, non-overlapping, and together cover every
/// input byte exactly once.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Span {
	/// Half-open byte range over the original input.
	pub range: Range<usize>,
	/// Replacement text, or `None` when the range passes through unchanged.
	pub replacement: Option<String>,
}

impl Span {
	pub fn literal(range: Range<usize>) -> Self {
		Self {
			range,
			replacement: None,
		}
	}

	pub fn replaced(range: Range<usize>, replacement: impl Into<String>) -> Self {
		Self {
			range,
			replacement: Some(replacement.into()),
		}
	}
}

/// Output of one substitution pass.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Substituted {
	/// The reconstructed output text.
	pub text: String,
	/// The ordered span pairs the output was assembled from.
	pub spans: Vec<Span>,
	/// Mapping from output positions back to source positions.
	pub map: SourceMap,
}

/// Drives the scan/replace loop over one text buffer.
pub struct SubstitutionEngine<'a> {
	scanner: &'a TokenScanner,
	config: &'a ReplaceConfig,
	sink: &'a dyn DiagnosticSink,
}

impl<'a> SubstitutionEngine<'a> {
	pub fn new(
		scanner: &'a TokenScanner,
		config: &'a ReplaceConfig,
		sink: &'a dyn DiagnosticSink,
	) -> Self {
		Self {
			scanner,
			config,
			sink,
		}
	}

	/// Walk `text`, replacing every token the resolver has a value for and
	/// passing unresolved property tokens through unchanged.
	///
	/// `resolve` maps a match to its replacement text, or `None` when the
	/// token has no value. A `None` from pattern mode cannot happen (every
	/// pattern match substitutes); in property mode it triggers the
	/// missing-property policy: abort when `failOnMissingProperties` is set,
	/// otherwise warn and carry the raw token (delimiters included) into the
	/// surrounding literal run.
	pub fn substitute<R>(&self, file: &str, text: &str, resolve: R) -> ProsubResult<Substituted>
	where
		R: Fn(&str) -> Option<String>,
	{
		let mut builder = MappingBuilder::new(file);
		let mut spans = Vec::new();
		let mut buffer = String::new();
		// Original-text offset where the pending literal run began.
		let mut buffer_start = 0;
		// Absolute offset of `remaining` within `text`.
		let mut cursor = 0;
		let mut remaining = text;

		loop {
			let Some(found) = self.scanner.next_match(remaining) else {
				buffer.push_str(remaining);
				if !buffer.is_empty() {
					builder.record(&buffer);
					spans.push(Span::literal(buffer_start..text.len()));
				}
				break;
			};

			// A zero-width match would stall the loop; treat the rest as
			// literal instead.
			if found.is_empty() {
				buffer.push_str(remaining);
				if !buffer.is_empty() {
					builder.record(&buffer);
					spans.push(Span::literal(buffer_start..text.len()));
				}
				break;
			}

			let matched = &remaining[found.start..found.end];
			buffer.push_str(&remaining[..found.start]);

			match resolve(found.captured.as_deref().unwrap_or(matched)) {
				Some(value) => {
					if !buffer.is_empty() {
						builder.record(&buffer);
						spans.push(Span::literal(buffer_start..cursor + found.start));
						buffer.clear();
					}

					let origin = builder.source_position();
					builder.record_at(&value, origin);
					builder.skip(matched);
					spans.push(Span::replaced(
						cursor + found.start..cursor + found.end,
						value,
					));
					buffer_start = cursor + found.end;
				}
				None => {
					let name = found.captured.as_deref().unwrap_or(matched);
					if self.config.fail_on_missing_properties {
						return Err(ProsubError::MissingProperty {
							name: name.to_string(),
						});
					}
					self.sink.warning(&format!(
						"property `{name}` could not be resolved; token passed through"
					));
					buffer.push_str(matched);
				}
			}

			remaining = &remaining[found.end..];
			cursor += found.end;
		}

		let (output, map) = builder.finish();
		Ok(Substituted {
			text: output,
			spans,
			map,
		})
	}
}
