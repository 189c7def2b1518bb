use serde::Deserialize;

use crate::ProsubError;
use crate::ProsubResult;

/// Default marker opening a property token.
pub const DEFAULT_START_DELIMITER: &str = "#[[";
/// Default marker closing a property token.
pub const DEFAULT_END_DELIMITER: &str = "]]";
/// Default format for the `current.date` built-in.
pub const DEFAULT_DATE_FORMAT: &str = "dd/mm/yyyy";
/// Default format for the `current.time` built-in.
pub const DEFAULT_TIME_FORMAT: &str = "hh:MM:ss";
/// Default format for the `current.datetime` built-in.
pub const DEFAULT_DATETIME_FORMAT: &str = "dd/mm/yyyy hh:MM:ss";
/// Default format for the `current.timestamp` built-in.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "yyyy_mm_dd-hh_MM_ss";

/// Ordered diagnostic gating levels.
///
/// A sink configured at some level reports every message at that level or
/// below it in the ordering, so `Info` includes `Severe` and `Warning`, and
/// `All` reports everything.
#[derive(Debug, Clone, Copy, Default, Deserialize, Eq, Ord, PartialEq, PartialOrd)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
	None,
	Severe,
	Warning,
	#[default]
	Info,
	Success,
	Fine,
	Debug,
	All,
}

impl LogLevel {
	/// Whether a message at `level` passes this gate.
	pub fn allows(self, level: LogLevel) -> bool {
		self >= level
	}
}

/// Substitution configuration.
///
/// All fields are optional when deserialized; missing fields take the
/// documented defaults. Field names deserialize from camelCase:
///
/// ```json
/// {
/// 	"startDelimiter": "${",
/// 	"endDelimiter": "}",
/// 	"caseSensitive": false,
/// 	"failOnMissingProperties": true
/// }
/// ```
///
/// The cyclic-failure flag additionally accepts the historical spelling
/// `failOnCiclicProperties`.
#[derive(Debug, Clone, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplaceConfig {
	/// When false, every transformation is a no-op.
	pub enabled: bool,
	/// Marker opening a property token, e.g. `#[[` in `#[[user.name]]`.
	pub start_delimiter: String,
	/// Marker closing a property token, e.g. `]]` in `#[[user.name]]`.
	pub end_delimiter: String,
	/// When false, property keys fold to lowercase and pattern matching is
	/// case-insensitive.
	pub case_sensitive: bool,
	/// Format for the `current.date` built-in property.
	pub date_format: String,
	/// Format for the `current.time` built-in property.
	pub time_format: String,
	/// Format for the `current.datetime` built-in property.
	pub datetime_format: String,
	/// Format for the `current.timestamp` built-in property.
	pub timestamp_format: String,
	/// Diagnostic gate for the default sink.
	pub log_level: LogLevel,
	/// When true, property values may reference other properties and are
	/// resolved while the table is built.
	pub resolve_properties: bool,
	/// When true, an unresolvable property reference aborts the run instead
	/// of passing the token through with a warning.
	pub fail_on_missing_properties: bool,
	/// When true, a cyclic property reference aborts the run instead of
	/// keeping the original unresolved value with a warning.
	#[serde(alias = "failOnCiclicProperties")]
	pub fail_on_cyclic_properties: bool,
}

impl Default for ReplaceConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			start_delimiter: DEFAULT_START_DELIMITER.to_string(),
			end_delimiter: DEFAULT_END_DELIMITER.to_string(),
			case_sensitive: true,
			date_format: DEFAULT_DATE_FORMAT.to_string(),
			time_format: DEFAULT_TIME_FORMAT.to_string(),
			datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
			timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
			log_level: LogLevel::Info,
			resolve_properties: true,
			fail_on_missing_properties: false,
			fail_on_cyclic_properties: false,
		}
	}
}

impl ReplaceConfig {
	/// Validate required fields, failing fast on the first empty one.
	/// Validation happens before any unit is touched.
	pub fn validate(&self) -> ProsubResult<()> {
		let required = [
			("startDelimiter", &self.start_delimiter),
			("endDelimiter", &self.end_delimiter),
			("dateFormat", &self.date_format),
			("timeFormat", &self.time_format),
			("datetimeFormat", &self.datetime_format),
			("timestampFormat", &self.timestamp_format),
		];

		for (field, value) in required {
			if value.is_empty() {
				return Err(ProsubError::Config { field });
			}
		}

		Ok(())
	}
}
