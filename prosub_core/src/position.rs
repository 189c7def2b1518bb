use serde::Deserialize;
use serde::Serialize;

/// A cursor into a text buffer. Lines are 1-based, columns are 0-based byte
/// offsets within the line.
#[derive(Debug, Clone, Copy, Deserialize, Eq, PartialEq, Serialize)]
pub struct Point {
	pub line: usize,
	pub column: usize,
}

impl Default for Point {
	fn default() -> Self {
		Self { line: 1, column: 0 }
	}
}

impl Point {
	pub fn new(line: usize, column: usize) -> Self {
		Self { line, column }
	}

	/// Advance the cursor over `text`. A text with embedded newlines moves
	/// the line forward by the newline count and sets the column to the
	/// length of the trailing segment; a text without newlines only grows
	/// the column.
	pub fn advance_str(&mut self, text: &str) {
		match text.rfind('\n') {
			Some(last) => {
				self.line += text.bytes().filter(|byte| *byte == b'\n').count();
				self.column = text.len() - last - 1;
			}
			None => self.column += text.len(),
		}
	}
}

/// One generated-to-source correspondence. Every newline-delimited chunk of
/// output gets its own mapping so each output line can be attributed
/// independently.
#[derive(Debug, Clone, Deserialize, Eq, PartialEq, Serialize)]
pub struct Mapping {
	/// 1-based line in the generated output.
	pub generated_line: usize,
	/// 0-based column in the generated output.
	pub generated_column: usize,
	/// Identifier of the source file this chunk came from.
	pub source: String,
	/// 1-based line in the source.
	pub source_line: usize,
	/// 0-based column in the source.
	pub source_column: usize,
}

/// A position mapping from generated output back to original source.
///
/// The format is a plain ordered segment list serialized with serde; it
/// supports nearest-segment lookup and composition with a mapping produced
/// by an earlier pipeline stage.
#[derive(Debug, Clone, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct SourceMap {
	/// Identifier of the generated file.
	pub file: String,
	/// Segments ordered by generated position.
	pub mappings: Vec<Mapping>,
}

impl SourceMap {
	pub fn is_empty(&self) -> bool {
		self.mappings.is_empty()
	}

	/// Resolve a generated position to the nearest recorded segment on the
	/// same line at or before `column`.
	pub fn lookup(&self, line: usize, column: usize) -> Option<&Mapping> {
		self.mappings
			.iter()
			.filter(|mapping| mapping.generated_line == line && mapping.generated_column <= column)
			.next_back()
	}

	/// Compose this map with the map of an earlier stage: every source
	/// position of `self` is looked up in `input` and replaced by the
	/// position `input` attributes it to. Segments `input` knows nothing
	/// about are kept as-is.
	pub fn compose(&self, input: &SourceMap) -> SourceMap {
		let mappings = self
			.mappings
			.iter()
			.map(|mapping| {
				match input.lookup(mapping.source_line, mapping.source_column) {
					Some(previous) => {
						Mapping {
							generated_line: mapping.generated_line,
							generated_column: mapping.generated_column,
							source: previous.source.clone(),
							source_line: previous.source_line,
							source_column: previous.source_column,
						}
					}
					None => mapping.clone(),
				}
			})
			.collect();

		SourceMap {
			file: self.file.clone(),
			mappings,
		}
	}
}

/// Accumulates output text while attributing every newline-delimited chunk
/// to a source position.
///
/// Literal text advances the source cursor in step with the generated
/// cursor. Replacement text is recorded against a fixed origin point — the
/// source position of the matched token — so replacement text of any length
/// (including multi-line) maps back to the single point where the
/// substitution occurred.
#[derive(Debug)]
pub struct MappingBuilder {
	file: String,
	output: String,
	generated: Point,
	source: Point,
	mappings: Vec<Mapping>,
}

impl MappingBuilder {
	pub fn new(file: impl Into<String>) -> Self {
		Self {
			file: file.into(),
			output: String::new(),
			generated: Point::default(),
			source: Point::default(),
			mappings: Vec::new(),
		}
	}

	/// The current source-side cursor.
	pub fn source_position(&self) -> Point {
		self.source
	}

	/// Append literal text carried over from the source unchanged.
	pub fn record(&mut self, text: &str) {
		self.record_chunks(text, None);
	}

	/// Append replacement text attributed to `origin`. The source cursor is
	/// not advanced; the caller advances it over the matched token with
	/// [`MappingBuilder::skip`].
	pub fn record_at(&mut self, text: &str, origin: Point) {
		self.record_chunks(text, Some(origin));
	}

	/// Advance the source cursor over consumed input that produced no
	/// literal output (the matched token a replacement stands in for).
	pub fn skip(&mut self, text: &str) {
		self.source.advance_str(text);
	}

	fn record_chunks(&mut self, text: &str, origin: Option<Point>) {
		let mut rest = text;

		while !rest.is_empty() {
			let split = rest.find('\n').map_or(rest.len(), |index| index + 1);
			let (chunk, tail) = rest.split_at(split);
			let source = origin.unwrap_or(self.source);

			self.mappings.push(Mapping {
				generated_line: self.generated.line,
				generated_column: self.generated.column,
				source: self.file.clone(),
				source_line: source.line,
				source_column: source.column,
			});
			self.output.push_str(chunk);
			self.generated.advance_str(chunk);
			if origin.is_none() {
				self.source.advance_str(chunk);
			}

			rest = tail;
		}
	}

	/// Flatten into the output text and its position mapping.
	pub fn finish(self) -> (String, SourceMap) {
		let map = SourceMap {
			file: self.file,
			mappings: self.mappings,
		};
		(self.output, map)
	}
}
