use std::sync::Arc;

use crate::config::config_spec::ConfigSpec;
use crate::config::env_provider::{SharedEnvironment, SystemEnvironment};
use crate::config::errors::ApplicationError;
use crate::types::internal::group_policy::GroupPolicy;

/// Group layout and retry budget for the enrollment service
#[derive(Debug, Clone)]
pub struct EnrollmentSettings {
    group_policy: GroupPolicy,
    max_attempts: u32,
}

impl EnrollmentSettings {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

    pub fn new(group_policy: GroupPolicy, max_attempts: u32) -> Self {
        Self {
            group_policy,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn from_env_provider(env_provider: SharedEnvironment) -> Result<Self, ApplicationError> {
        let groups = ConfigSpec::new(env_provider.clone())
            .env_override("ENROLLMENT_GROUPS")
            .default_value("A,B,C,D")
            .min_length(1)
            .load()?;

        let capacity = ConfigSpec::new(env_provider.clone())
            .env_override("ENROLLMENT_GROUP_CAPACITY")
            .default_value("60")
            .validator(|value| ConfigSpec::validate_integer_range(value, 1, 10_000))
            .load()?;

        let attempts = ConfigSpec::new(env_provider)
            .env_override("ENROLLMENT_MAX_ATTEMPTS")
            .default_value("5")
            .validator(|value| ConfigSpec::validate_integer_range(value, 1, 50))
            .load()?;

        let labels = ConfigSpec::parse_list(&groups)
            .into_iter()
            .map(|label| label.to_uppercase())
            .collect();
        // Range validators above keep both values positive and small
        let capacity = ConfigSpec::parse_integer(&capacity, "ENROLLMENT_GROUP_CAPACITY")? as u32;
        let max_attempts = ConfigSpec::parse_integer(&attempts, "ENROLLMENT_MAX_ATTEMPTS")? as u32;

        Ok(Self::new(GroupPolicy::new(labels, capacity)?, max_attempts))
    }

    pub fn from_env() -> Result<Self, ApplicationError> {
        Self::from_env_provider(Arc::new(SystemEnvironment))
    }

    pub fn group_policy(&self) -> &GroupPolicy {
        &self.group_policy
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Default for EnrollmentSettings {
    fn default() -> Self {
        Self::new(GroupPolicy::default(), Self::DEFAULT_MAX_ATTEMPTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MockEnvironment;

    #[test]
    fn test_defaults() {
        let settings = EnrollmentSettings::from_env_provider(MockEnvironment::empty().shared()).unwrap();

        assert_eq!(settings.group_policy(), &GroupPolicy::default());
        assert_eq!(settings.max_attempts(), 5);
    }

    #[test]
    fn test_custom_groups_are_upper_cased_in_order() {
        let env = MockEnvironment::empty()
            .with_vars(&[
                ("ENROLLMENT_GROUPS", "x, y ,z"),
                ("ENROLLMENT_GROUP_CAPACITY", "30"),
                ("ENROLLMENT_MAX_ATTEMPTS", "3"),
            ])
            .shared();

        let settings = EnrollmentSettings::from_env_provider(env).unwrap();

        assert_eq!(settings.group_policy().labels(), &["X", "Y", "Z"]);
        assert_eq!(settings.group_policy().capacity(), 30);
        assert_eq!(settings.max_attempts(), 3);
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let env = MockEnvironment::empty()
            .with_var("ENROLLMENT_GROUP_CAPACITY", "0")
            .shared();

        match EnrollmentSettings::from_env_provider(env) {
            Err(ApplicationError::InvalidSetting { setting_name, .. }) => {
                assert_eq!(setting_name, "ENROLLMENT_GROUP_CAPACITY")
            }
            other => panic!("Expected InvalidSetting, got: {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_group_labels_are_rejected() {
        let env = MockEnvironment::empty()
            .with_var("ENROLLMENT_GROUPS", "A,b,B")
            .shared();

        assert!(EnrollmentSettings::from_env_provider(env).is_err());
    }

    #[test]
    fn test_separator_only_group_list_is_rejected() {
        let env = MockEnvironment::empty().with_var("ENROLLMENT_GROUPS", ",,").shared();
        assert!(EnrollmentSettings::from_env_provider(env).is_err());
    }
}
