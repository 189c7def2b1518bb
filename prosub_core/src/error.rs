use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum ProsubError {
	#[error(transparent)]
	#[diagnostic(code(prosub::io_error))]
	Io(#[from] std::io::Error),

	#[error("configuration field `{field}` must not be empty")]
	#[diagnostic(
		code(prosub::config),
		help("set `{field}` to a non-empty value, or remove the override to use the default")
	)]
	Config { field: &'static str },

	#[error("cyclic reference found: [ '{}' ]", .chain.join("' -> '"))]
	#[diagnostic(
		code(prosub::cyclic_reference),
		help("break the reference cycle, or leave `failOnCyclicProperties` disabled to keep the original value")
	)]
	CyclicReference { chain: Vec<String> },

	#[error("referenced property `{name}` could not be resolved")]
	#[diagnostic(
		code(prosub::missing_property),
		help("define the property, or leave `failOnMissingProperties` disabled to pass the token through")
	)]
	MissingProperty { name: String },

	#[error("invalid replacement pattern: {0}")]
	#[diagnostic(code(prosub::invalid_pattern))]
	InvalidPattern(#[from] regex::Error),

	#[error("failed to transform `{path}`: {reason}")]
	#[diagnostic(code(prosub::transform))]
	Transform { path: String, reason: String },
}

pub type ProsubResult<T> = Result<T, ProsubError>;
