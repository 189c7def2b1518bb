use crate::config::LogLevel;

/// A leveled diagnostics sink.
///
/// Diagnostics are purely observational: nothing in the engine changes
/// behavior based on whether a message was reported. The sink is passed
/// explicitly wherever messages can be emitted, so there is no global
/// logging state to configure.
pub trait DiagnosticSink {
	/// Report a message at the given level.
	fn emit(&self, level: LogLevel, message: &str);

	fn severe(&self, message: &str) {
		self.emit(LogLevel::Severe, message);
	}

	fn warning(&self, message: &str) {
		self.emit(LogLevel::Warning, message);
	}

	fn info(&self, message: &str) {
		self.emit(LogLevel::Info, message);
	}

	fn success(&self, message: &str) {
		self.emit(LogLevel::Success, message);
	}

	fn fine(&self, message: &str) {
		self.emit(LogLevel::Fine, message);
	}

	fn debug(&self, message: &str) {
		self.emit(LogLevel::Debug, message);
	}
}

/// Sink that forwards messages to [`tracing`], gated by a configured level.
#[derive(Debug, Clone, Copy)]
pub struct TracingSink {
	gate: LogLevel,
}

impl TracingSink {
	pub fn new(gate: LogLevel) -> Self {
		Self { gate }
	}
}

impl Default for TracingSink {
	fn default() -> Self {
		Self::new(LogLevel::Info)
	}
}

impl DiagnosticSink for TracingSink {
	fn emit(&self, level: LogLevel, message: &str) {
		if !self.gate.allows(level) || level == LogLevel::None {
			return;
		}

		match level {
			LogLevel::Severe => tracing::error!("{message}"),
			LogLevel::Warning => tracing::warn!("{message}"),
			LogLevel::Info | LogLevel::Success => tracing::info!("{message}"),
			LogLevel::Fine => tracing::debug!("{message}"),
			LogLevel::None | LogLevel::Debug | LogLevel::All => tracing::trace!("{message}"),
		}
	}
}
