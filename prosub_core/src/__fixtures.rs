use std::sync::Arc;
use std::sync::Mutex;

use chrono::DateTime;
use chrono::Local;
use chrono::TimeZone;
use serde_json::Value;
use serde_json::json;

use crate::LogLevel;
use crate::PropertyTable;
use crate::PropertyValue;
use crate::ProsubResult;
use crate::ReplaceConfig;
use crate::Substituted;
use crate::SubstitutionEngine;
use crate::Target;
use crate::TokenScanner;
use crate::diagnostics::DiagnosticSink;

/// Sink that records every message for later assertions.
#[derive(Clone, Default)]
pub(crate) struct CollectSink {
	messages: Arc<Mutex<Vec<(LogLevel, String)>>>,
}

impl CollectSink {
	pub(crate) fn messages(&self) -> Vec<(LogLevel, String)> {
		self.messages.lock().expect("sink poisoned").clone()
	}

	pub(crate) fn count(&self, level: LogLevel) -> usize {
		self
			.messages()
			.iter()
			.filter(|(recorded, _)| *recorded == level)
			.count()
	}
}

impl DiagnosticSink for CollectSink {
	fn emit(&self, level: LogLevel, message: &str) {
		self
			.messages
			.lock()
			.expect("sink poisoned")
			.push((level, message.to_string()));
	}
}

/// 2024-03-05 14:07:09 local time, a Tuesday.
pub(crate) fn fixed_now() -> DateTime<Local> {
	Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap()
}

pub(crate) fn insensitive_config() -> ReplaceConfig {
	ReplaceConfig {
		case_sensitive: false,
		..ReplaceConfig::default()
	}
}

pub(crate) fn sample_properties() -> Value {
	json!({ "user1": "Java", "user2": "PHP" })
}

pub(crate) fn build_table(
	raw: &Value,
	config: &ReplaceConfig,
	sink: &CollectSink,
) -> ProsubResult<PropertyTable> {
	PropertyTable::build_at(&PropertyValue::from(raw), config, sink, fixed_now())
}

/// Run one property-mode substitution pass directly against the engine.
pub(crate) fn substitute_properties(
	text: &str,
	raw: &Value,
	config: &ReplaceConfig,
	sink: &CollectSink,
) -> ProsubResult<Substituted> {
	let table = build_table(raw, config, sink)?;
	let scanner = TokenScanner::properties(config)?;
	let engine = SubstitutionEngine::new(&scanner, config, sink);
	engine.substitute("input.txt", text, |name| table.get(name).map(str::to_string))
}

/// Run one pattern-mode substitution pass directly against the engine.
pub(crate) fn substitute_target(
	text: &str,
	target: &Target,
	replacement: &str,
	config: &ReplaceConfig,
	sink: &CollectSink,
) -> ProsubResult<Substituted> {
	let scanner = TokenScanner::target(target, config)?;
	let engine = SubstitutionEngine::new(&scanner, config, sink);
	engine.substitute("input.txt", text, |_| Some(replacement.to_string()))
}

/// Every span must start where the previous one ended, the spans together
/// must cover the input exactly, and their contents concatenated must
/// reconstruct the output.
pub(crate) fn assert_span_coverage(input: &str, result: &Substituted) {
	let mut reconstructed = String::new();
	let mut cursor = 0;

	for span in &result.spans {
		assert_eq!(span.range.start, cursor, "span gap or overlap at {cursor}");
		match &span.replacement {
			Some(replacement) => reconstructed.push_str(replacement),
			None => reconstructed.push_str(&input[span.range.clone()]),
		}
		cursor = span.range.end;
	}

	assert_eq!(cursor, input.len(), "spans do not cover the whole input");
	assert_eq!(reconstructed, result.text);
}

/// Every mapping must point at a valid (line, column) inside the original
/// input.
pub(crate) fn assert_map_within_bounds(input: &str, result: &Substituted) {
	let lines: Vec<&str> = input.split('\n').collect();

	for mapping in &result.map.mappings {
		assert!(mapping.source_line >= 1, "source lines are 1-based");
		let line = lines
			.get(mapping.source_line - 1)
			.unwrap_or_else(|| panic!("source line {} out of bounds", mapping.source_line));
		assert!(
			mapping.source_column <= line.len(),
			"source column {} out of bounds on line {}",
			mapping.source_column,
			mapping.source_line
		);
	}
}
