use std::path::PathBuf;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use serde_json::Value;

use crate::ProsubError;
use crate::ProsubResult;
use crate::config::ReplaceConfig;
use crate::diagnostics::DiagnosticSink;
use crate::diagnostics::TracingSink;
use crate::engine::SubstitutionEngine;
use crate::position::SourceMap;
use crate::properties::PropertyTable;
use crate::properties::PropertyValue;
use crate::scanner::Target;
use crate::scanner::TokenScanner;

/// A file-like unit flowing through the pipeline: a path identifier, a text
/// buffer, and an optional position mapping produced by an earlier stage.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TextUnit {
	pub path: PathBuf,
	pub contents: String,
	/// Mapping from a previous stage. When present, the mapping produced
	/// here is composed with it rather than overwriting it.
	pub source_map: Option<SourceMap>,
}

impl TextUnit {
	pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			contents: contents.into(),
			source_map: None,
		}
	}

	pub fn with_source_map(mut self, map: SourceMap) -> Self {
		self.source_map = Some(map);
		self
	}
}

/// Outcome of one unit's transformation in a batch run. A failing unit is
/// passed through with its error attached rather than dropped.
#[derive(Debug)]
pub struct UnitOutcome {
	pub unit: TextUnit,
	pub error: Option<ProsubError>,
}

enum Mode {
	Properties { table: PropertyTable, active: bool },
	Pattern { replacement: String, active: bool },
}

impl Mode {
	fn active(&self) -> bool {
		match self {
			Self::Properties { active, .. } | Self::Pattern { active, .. } => *active,
		}
	}
}

/// A configured substitution, reusable across units.
///
/// Built once per run: the property table and the compiled scanner are
/// read-only afterwards, and the success/failure counters are atomic, so a
/// `Substitution` can be shared by concurrently processed units.
pub struct Substitution {
	config: ReplaceConfig,
	scanner: TokenScanner,
	mode: Mode,
	sink: Box<dyn DiagnosticSink + Send + Sync>,
	processed: AtomicUsize,
	failed: AtomicUsize,
}

impl std::fmt::Debug for Substitution {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Substitution").finish_non_exhaustive()
	}
}

impl Substitution {
	/// Property substitution: flatten and resolve `raw` once, then replace
	/// every delimited property token each transformed unit contains.
	pub fn properties(raw: &Value, config: ReplaceConfig) -> ProsubResult<Self> {
		let sink = TracingSink::new(config.log_level);
		Self::properties_with_sink(raw, config, Box::new(sink))
	}

	/// Property substitution with an explicit diagnostics sink.
	pub fn properties_with_sink(
		raw: &Value,
		config: ReplaceConfig,
		sink: Box<dyn DiagnosticSink + Send + Sync>,
	) -> ProsubResult<Self> {
		config.validate()?;
		let value = PropertyValue::from(raw);
		// No properties supplied means there is nothing to substitute, even
		// though the built-ins exist.
		let active = !value.is_empty();
		let table = PropertyTable::build(&value, &config, sink.as_ref())?;
		let scanner = TokenScanner::properties(&config)?;

		Ok(Self {
			config,
			scanner,
			mode: Mode::Properties { table, active },
			sink,
			processed: AtomicUsize::new(0),
			failed: AtomicUsize::new(0),
		})
	}

	/// Pattern substitution: replace every occurrence of `target` with the
	/// fixed replacement text.
	pub fn pattern(
		target: &Target,
		replacement: impl Into<String>,
		config: ReplaceConfig,
	) -> ProsubResult<Self> {
		let sink = TracingSink::new(config.log_level);
		Self::pattern_with_sink(target, replacement, config, Box::new(sink))
	}

	/// Pattern substitution with an explicit diagnostics sink.
	pub fn pattern_with_sink(
		target: &Target,
		replacement: impl Into<String>,
		config: ReplaceConfig,
		sink: Box<dyn DiagnosticSink + Send + Sync>,
	) -> ProsubResult<Self> {
		config.validate()?;
		let active = !target.is_empty();
		let scanner = TokenScanner::target(target, &config)?;

		Ok(Self {
			config,
			scanner,
			mode: Mode::Pattern {
				replacement: replacement.into(),
				active,
			},
			sink,
			processed: AtomicUsize::new(0),
			failed: AtomicUsize::new(0),
		})
	}

	/// Transform one unit: one buffer in, one buffer plus mapping out.
	///
	/// A failure is isolated to this unit and never corrupts the shared
	/// table or counters of other units. The no-op paths (disabled, empty
	/// buffer, nothing to substitute) return the unit byte-for-byte
	/// unchanged.
	pub fn transform(&self, unit: TextUnit) -> ProsubResult<TextUnit> {
		if !self.config.enabled || !self.mode.active() || unit.contents.is_empty() {
			self.sink.debug("nothing to do");
			return Ok(unit);
		}

		self.sink
			.info(&format!("replacing content at `{}`", unit.path.display()));

		let result = self.substitute_unit(&unit);
		match result {
			Ok((text, map)) => {
				self.processed.fetch_add(1, Ordering::Relaxed);
				let map = match &unit.source_map {
					Some(previous) => map.compose(previous),
					None => map,
				};
				Ok(TextUnit {
					path: unit.path,
					contents: text,
					source_map: Some(map),
				})
			}
			Err(error) => {
				self.failed.fetch_add(1, Ordering::Relaxed);
				Err(error)
			}
		}
	}

	fn substitute_unit(&self, unit: &TextUnit) -> ProsubResult<(String, SourceMap)> {
		let file = unit.path.display().to_string();
		let engine = SubstitutionEngine::new(&self.scanner, &self.config, self.sink.as_ref());

		let substituted = match &self.mode {
			Mode::Properties { table, .. } => {
				engine.substitute(&file, &unit.contents, |name| {
					table.get(name).map(str::to_string)
				})?
			}
			Mode::Pattern { replacement, .. } => {
				engine.substitute(&file, &unit.contents, |_| Some(replacement.clone()))?
			}
		};

		Ok((substituted.text, substituted.map))
	}

	/// Process a batch of units, isolating per-unit errors. Errors that the
	/// configured policies mark fatal (missing or cyclic properties) stop
	/// the batch; any other per-unit failure only skips that unit. Ends with
	/// the per-run summary.
	pub fn run(&self, units: impl IntoIterator<Item = TextUnit>) -> Vec<UnitOutcome> {
		let mut outcomes = Vec::new();

		for unit in units {
			let original = unit.clone();
			match self.transform(unit) {
				Ok(unit) => {
					outcomes.push(UnitOutcome { unit, error: None });
				}
				Err(error) => {
					let fatal = matches!(
						error,
						ProsubError::MissingProperty { .. } | ProsubError::CyclicReference { .. }
					);
					outcomes.push(UnitOutcome {
						unit: original,
						error: Some(error),
					});
					if fatal {
						break;
					}
				}
			}
		}

		self.summary();
		outcomes
	}

	/// Number of units transformed successfully so far.
	pub fn processed(&self) -> usize {
		self.processed.load(Ordering::Relaxed)
	}

	/// Number of units that failed so far.
	pub fn failed(&self) -> usize {
		self.failed.load(Ordering::Relaxed)
	}

	/// Emit the per-run summary of processed and failed unit counts.
	pub fn summary(&self) {
		let processed = self.processed();
		if processed > 0 {
			self.sink
				.success(&format!("{processed} unit(s) processed"));
		}

		let failed = self.failed();
		if failed > 0 {
			self.sink.warning(&format!("{failed} unit(s) failed"));
		}
	}
}
