//! Pieces shared by every govrag binary: version string, help styling and log setup.

use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects},
};
use tracing_subscriber::EnvFilter;

pub const VERSION: &str = concat!(
	env!("CARGO_PKG_VERSION"),
	"-",
	env!("VERGEN_GIT_SHA"),
	"-",
	env!("VERGEN_CARGO_TARGET_TRIPLE"),
);

const FALLBACK_LOG_DIRECTIVE: &str = "info";

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.literal(AnsiColor::Blue.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
}

/// Builds the log filter from a configured directive, falling back to `info` when it does not
/// parse.
pub fn log_filter(directive: &str) -> EnvFilter {
	EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(FALLBACK_LOG_DIRECTIVE))
}

/// Installs the global fmt subscriber. Logs go to stderr so they never interleave with
/// command output on stdout.
pub fn init_tracing(directive: &str) {
	tracing_subscriber::fmt()
		.with_env_filter(log_filter(directive))
		.with_writer(std::io::stderr)
		.init();
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn invalid_directive_falls_back_to_info() {
		let filter = log_filter("govrag=loud");

		assert_eq!(filter.to_string(), EnvFilter::new(FALLBACK_LOG_DIRECTIVE).to_string());
	}

	#[test]
	fn version_starts_with_package_version() {
		assert!(VERSION.starts_with(env!("CARGO_PKG_VERSION")));
	}
}
