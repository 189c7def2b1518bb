use std::collections::BTreeMap;

use chrono::DateTime;
use chrono::Datelike;
use chrono::Local;
use regex::Regex;
use serde_json::Value;

use crate::ProsubError;
use crate::ProsubResult;
use crate::config::ReplaceConfig;
use crate::diagnostics::DiagnosticSink;
use crate::scanner::property_pattern;
use crate::timefmt::format_instant;

/// Raw property input: either a scalar leaf or a nested mapping.
///
/// Flattening walks this union explicitly, so dynamic type inspection never
/// decides what a value is.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum PropertyValue {
	Scalar(String),
	Mapping(BTreeMap<String, PropertyValue>),
}

impl PropertyValue {
	/// Whether the value holds no usable properties: a scalar at the top
	/// level or an empty mapping.
	pub fn is_empty(&self) -> bool {
		match self {
			Self::Scalar(_) => true,
			Self::Mapping(entries) => entries.is_empty(),
		}
	}
}

impl From<&Value> for PropertyValue {
	fn from(value: &Value) -> Self {
		match value {
			Value::Object(entries) => {
				Self::Mapping(
					entries
						.iter()
						.map(|(name, value)| (name.clone(), Self::from(value)))
						.collect(),
				)
			}
			other => Self::Scalar(scalar_string(other)),
		}
	}
}

impl From<Value> for PropertyValue {
	fn from(value: Value) -> Self {
		Self::from(&value)
	}
}

/// Stringify a non-mapping JSON leaf the way JavaScript coerces it:
/// arrays join their stringified elements with commas, null becomes
/// `"null"`, and strings keep their content without quotes.
fn scalar_string(value: &Value) -> String {
	match value {
		Value::String(text) => text.clone(),
		Value::Array(items) => {
			items
				.iter()
				.map(scalar_string)
				.collect::<Vec<_>>()
				.join(",")
		}
		Value::Object(_) => "[object Object]".to_string(),
		other => other.to_string(),
	}
}

/// Flattened, resolved property table.
///
/// Built once per run and read-only afterwards, so it can be shared across
/// concurrently processed units without locking.
#[derive(Debug, Clone, Default)]
pub struct PropertyTable {
	entries: BTreeMap<String, String>,
	case_sensitive: bool,
}

impl PropertyTable {
	/// Build the table from raw properties: flatten, inject built-ins,
	/// resolve cross-references, and apply the case-folding policy.
	pub fn build(
		raw: &PropertyValue,
		config: &ReplaceConfig,
		sink: &dyn DiagnosticSink,
	) -> ProsubResult<Self> {
		Self::build_at(raw, config, sink, Local::now())
	}

	/// Build against an explicit clock instant. The time-derived built-ins
	/// are deterministic for a fixed `now`.
	pub fn build_at(
		raw: &PropertyValue,
		config: &ReplaceConfig,
		sink: &dyn DiagnosticSink,
		now: DateTime<Local>,
	) -> ProsubResult<Self> {
		let mut entries = builtin_properties(config, &now);
		flatten_into(raw, "", &mut entries);

		if config.resolve_properties {
			resolve_all(&mut entries, config, sink)?;
		}

		if !config.case_sensitive {
			// Folding can collide keys that differ only by case; the later
			// key in iteration order wins.
			entries = entries
				.into_iter()
				.map(|(key, value)| (key.to_lowercase(), value))
				.collect();
		}

		sink.debug(&format!("properties in use: {entries:?}"));

		Ok(Self {
			entries,
			case_sensitive: config.case_sensitive,
		})
	}

	/// Look up a property, folding the name to lowercase when matching is
	/// case-insensitive.
	pub fn get(&self, name: &str) -> Option<&str> {
		if self.case_sensitive {
			self.entries.get(name).map(String::as_str)
		} else {
			self.entries.get(&name.to_lowercase()).map(String::as_str)
		}
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.entries
			.iter()
			.map(|(key, value)| (key.as_str(), value.as_str()))
	}
}

/// The time-derived built-ins, injected before user properties so user data
/// can override any of them. `current.month` is the zero-based month number.
fn builtin_properties(config: &ReplaceConfig, now: &DateTime<Local>) -> BTreeMap<String, String> {
	BTreeMap::from([
		(
			"current.date".to_string(),
			format_instant(now, &config.date_format),
		),
		(
			"current.time".to_string(),
			format_instant(now, &config.time_format),
		),
		(
			"current.datetime".to_string(),
			format_instant(now, &config.datetime_format),
		),
		(
			"current.timestamp".to_string(),
			format_instant(now, &config.timestamp_format),
		),
		("current.month".to_string(), now.month0().to_string()),
		("current.monthname".to_string(), format_instant(now, "mmmm")),
		("current.year".to_string(), now.year().to_string()),
	])
}

/// Walk the value union, joining nested mapping names with dots. A scalar at
/// the top level contributes nothing, so non-mapping input yields only the
/// built-ins.
fn flatten_into(value: &PropertyValue, prefix: &str, out: &mut BTreeMap<String, String>) {
	let PropertyValue::Mapping(entries) = value else {
		return;
	};

	for (name, value) in entries {
		let path = if prefix.is_empty() {
			name.clone()
		} else {
			format!("{prefix}.{name}")
		};

		match value {
			PropertyValue::Scalar(text) => {
				out.insert(path, text.clone());
			}
			PropertyValue::Mapping(_) => flatten_into(value, &path, out),
		}
	}
}

/// Resolve cross-references in every property value. A cyclic chain is
/// recoverable by default: the top-level property keeps its original
/// unresolved value and a warning is surfaced.
fn resolve_all(
	entries: &mut BTreeMap<String, String>,
	config: &ReplaceConfig,
	sink: &dyn DiagnosticSink,
) -> ProsubResult<()> {
	let pattern = property_pattern(config)?;
	let keys: Vec<String> = entries.keys().cloned().collect();

	for key in keys {
		let chain = vec![key.clone()];
		match resolve_value(&key, entries, &pattern, config, sink, &chain) {
			Ok(resolved) => {
				entries.insert(key, resolved);
			}
			Err(error @ ProsubError::CyclicReference { .. }) => {
				if config.fail_on_cyclic_properties {
					return Err(error);
				}
				sink.warning(&format!("{error}; resolution of property `{key}` ignored"));
			}
			Err(error) => return Err(error),
		}
	}

	Ok(())
}

fn resolve_value(
	key: &str,
	entries: &BTreeMap<String, String>,
	pattern: &Regex,
	config: &ReplaceConfig,
	sink: &dyn DiagnosticSink,
	chain: &[String],
) -> ProsubResult<String> {
	let mut done = String::new();
	let mut remain = entries.get(key).cloned().unwrap_or_default();

	loop {
		let Some(captures) = pattern.captures(&remain) else {
			done.push_str(&remain);
			return Ok(done);
		};
		let Some(matched) = captures.get(0) else {
			done.push_str(&remain);
			return Ok(done);
		};

		let target = captures.get(1).map_or("", |name| name.as_str()).to_string();
		if chain.iter().any(|seen| *seen == target) {
			let mut full = chain.to_vec();
			full.push(target);
			return Err(ProsubError::CyclicReference { chain: full });
		}

		done.push_str(&remain[..matched.start()]);
		let token = matched.as_str().to_string();
		let rest = remain[matched.end()..].to_string();

		if entries.contains_key(&target) {
			let mut next = chain.to_vec();
			next.push(target.clone());
			done.push_str(&resolve_value(&target, entries, pattern, config, sink, &next)?);
		} else if config.fail_on_missing_properties {
			return Err(ProsubError::MissingProperty { name: target });
		} else {
			sink.warning(&format!(
				"referenced property `{target}` could not be resolved; resolving skipped"
			));
			done.push_str(&token);
		}

		remain = rest;
	}
}
