//! Config-backed implementations of the policy ports. Every provider and
//! course in the deployment shares the values from [`SchedulingConfig`];
//! installations that store per-provider policy swap these out.

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::SchedulingConfig;
use crate::domain::error::DomainError;
use crate::domain::ports::{CourseConfigPort, ProviderConfigPort, ProviderSettings};

#[derive(Debug, Clone)]
pub struct StaticProviderConfig {
    settings: ProviderSettings,
}

impl StaticProviderConfig {
    pub fn new(config: &SchedulingConfig) -> Self {
        Self {
            settings: ProviderSettings {
                minimum_lead_minutes: config.minimum_lead_minutes,
                auto_confirm: config.auto_confirm,
                default_slot_duration_minutes: config.default_slot_duration_minutes,
            },
        }
    }
}

#[async_trait]
impl ProviderConfigPort for StaticProviderConfig {
    async fn provider_settings(
        &self,
        _tenant_id: Uuid,
        _provider_id: Uuid,
    ) -> Result<ProviderSettings, DomainError> {
        Ok(self.settings)
    }
}

#[derive(Debug, Clone)]
pub struct StaticCourseConfig {
    monthly_allowance: i32,
}

impl StaticCourseConfig {
    pub fn new(config: &SchedulingConfig) -> Self {
        Self {
            monthly_allowance: config.default_monthly_allowance,
        }
    }
}

#[async_trait]
impl CourseConfigPort for StaticCourseConfig {
    async fn monthly_allowance(
        &self,
        _tenant_id: Uuid,
        _course_id: Uuid,
    ) -> Result<i32, DomainError> {
        Ok(self.monthly_allowance)
    }
}
