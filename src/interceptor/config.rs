//! Interceptor configuration.

// self
use crate::{_prelude::*, error::ConfigError, interceptor::RecoveryBudget};

/// Tunables for [`Interceptor`](crate::interceptor::Interceptor).
///
/// Missing fields fall back to their defaults when deserializing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterceptorConfig {
	/// Endpoint fetched with `GET` to obtain a fresh token message.
	pub refresh_endpoint: String,
	/// Recoveries allowed before a 401 is surfaced.
	pub max_recovery_attempts: u32,
}
impl InterceptorConfig {
	/// Default refresh endpoint.
	pub const DEFAULT_REFRESH_ENDPOINT: &'static str = "/assets/token.json";

	/// Overrides the refresh endpoint.
	pub fn with_refresh_endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.refresh_endpoint = endpoint.into();

		self
	}

	/// Overrides the recovery limit.
	pub fn with_max_recovery_attempts(mut self, attempts: u32) -> Self {
		self.max_recovery_attempts = attempts;

		self
	}

	/// Validates the configuration.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.refresh_endpoint.trim().is_empty() {
			return Err(ConfigError::EmptyRefreshEndpoint);
		}

		Ok(())
	}
}
impl Default for InterceptorConfig {
	fn default() -> Self {
		Self {
			refresh_endpoint: Self::DEFAULT_REFRESH_ENDPOINT.into(),
			max_recovery_attempts: RecoveryBudget::DEFAULT_LIMIT,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn partial_json_uses_defaults() {
		let config: InterceptorConfig = serde_json::from_str("{\"max_recovery_attempts\":2}")
			.expect("Partial config should deserialize.");

		assert_eq!(config.refresh_endpoint, "/assets/token.json");
		assert_eq!(config.max_recovery_attempts, 2);
	}

	#[test]
	fn empty_refresh_endpoint_is_rejected() {
		let err = InterceptorConfig::default()
			.with_refresh_endpoint("  ")
			.validate()
			.expect_err("Blank refresh endpoint must be rejected.");

		assert!(matches!(err, ConfigError::EmptyRefreshEndpoint));
	}
}
