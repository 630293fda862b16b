use crate::{
    error::{CapacityError, CapacityResult},
    profile::{Role, WorkingHours},
};
use serde::{Deserialize, Serialize};

/// Quota and schedule handed to newly seeded reps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultProfileConfig {
    pub max_items_per_week: u32,
    pub working_days: Vec<String>,
    pub working_hours: WorkingHours,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Utilization (percent) at which a member becomes `moderate`.
    pub moderate_threshold_pct: u32,
    /// Utilization (percent) at which a member becomes `full` / `overloaded`.
    pub full_threshold_pct: u32,
    /// Roles that participate in capacity tracking.
    pub eligible_roles: Vec<Role>,
    pub default_profile: DefaultProfileConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct EngineConfigFile {
    thresholds: ThresholdsFile,
    eligible_roles: Vec<Role>,
    default_profile: DefaultProfileConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct ThresholdsFile {
    moderate_pct: u32,
    full_pct: u32,
}

impl EngineConfig {
    /// Load from the data/ directory.
    /// In tests, use EngineConfig::default().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/capacity/engine_config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let file: EngineConfigFile = serde_json::from_str(&content)?;

        let config = Self {
            moderate_threshold_pct: file.thresholds.moderate_pct,
            full_threshold_pct: file.thresholds.full_pct,
            eligible_roles: file.eligible_roles,
            default_profile: file.default_profile,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CapacityResult<()> {
        if self.moderate_threshold_pct == 0 {
            return Err(CapacityError::InvalidConfig(
                "moderate_threshold_pct must be positive".into(),
            ));
        }
        if self.moderate_threshold_pct >= self.full_threshold_pct {
            return Err(CapacityError::InvalidConfig(format!(
                "moderate_threshold_pct ({}) must be below full_threshold_pct ({})",
                self.moderate_threshold_pct, self.full_threshold_pct
            )));
        }
        if self.full_threshold_pct > 100 {
            return Err(CapacityError::InvalidConfig(format!(
                "full_threshold_pct ({}) must not exceed 100",
                self.full_threshold_pct
            )));
        }
        if self.eligible_roles.is_empty() {
            return Err(CapacityError::InvalidConfig(
                "eligible_roles must name at least one role".into(),
            ));
        }
        Ok(())
    }

    pub fn is_eligible(&self, role: &Role) -> bool {
        self.eligible_roles.contains(role)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            moderate_threshold_pct: 75,
            full_threshold_pct: 100,
            eligible_roles: vec![Role::SalesRep],
            default_profile: DefaultProfileConfig {
                max_items_per_week: 10,
                working_days: ["mon", "tue", "wed", "thu", "fri"]
                    .iter()
                    .map(|d| d.to_string())
                    .collect(),
                working_hours: WorkingHours::default(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.is_eligible(&Role::SalesRep));
        assert!(!config.is_eligible(&Role::TeamLead));
    }

    #[test]
    fn inverted_thresholds_rejected() {
        let config = EngineConfig {
            moderate_threshold_pct: 100,
            full_threshold_pct: 75,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(CapacityError::InvalidConfig(_))));
    }

    #[test]
    fn full_threshold_above_100_rejected() {
        let config = EngineConfig {
            full_threshold_pct: 120,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(CapacityError::InvalidConfig(_))));
    }

    #[test]
    fn loads_from_data_dir() {
        let dir = std::env::temp_dir().join(format!("capacity-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(dir.join("capacity")).unwrap();
        std::fs::write(
            dir.join("capacity/engine_config.json"),
            r#"{
                "thresholds": { "moderate_pct": 80, "full_pct": 100 },
                "eligible_roles": ["sales_rep", "team_lead"],
                "default_profile": {
                    "max_items_per_week": 12,
                    "working_days": ["mon", "tue", "wed"],
                    "working_hours": { "start_hour": 8, "end_hour": 16 }
                }
            }"#,
        )
        .unwrap();

        let config = EngineConfig::load(dir.to_str().unwrap()).unwrap();
        assert_eq!(config.moderate_threshold_pct, 80);
        assert!(config.is_eligible(&Role::TeamLead));
        assert_eq!(config.default_profile.max_items_per_week, 12);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_is_reported() {
        let err = EngineConfig::load("/nonexistent/capacity-data").unwrap_err();
        assert!(err.to_string().contains("engine_config.json"));
    }
}
