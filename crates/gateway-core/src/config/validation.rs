//! Config validation, matching the richer "errors + warnings" report style
//! of `kairos-rs::config::validation::ConfigValidator` rather than a single
//! bail-on-first-problem string.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{Config, StrategyMode};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct ConfigValidator;

impl ConfigValidator {
    /// Runs every invariant from spec §3 and returns a structured report
    /// instead of failing fast, so callers can surface every problem at
    /// once (the CLI's `config validate` subcommand relies on this).
    pub fn validate(config: &Config) -> ValidationReport {
        let mut report = ValidationReport::default();

        if config.targets.is_empty() {
            report
                .errors
                .push("targets must contain at least one entry".to_string());
        }

        let mut seen_keys = HashSet::new();
        for target in &config.targets {
            if target.virtual_key.trim().is_empty() {
                report.errors.push("target virtual_key must not be empty".to_string());
            }
            if !seen_keys.insert(target.virtual_key.clone()) {
                report
                    .errors
                    .push(format!("duplicate target virtual_key: {}", target.virtual_key));
            }
            if target.weight < 0.0 {
                report.errors.push(format!(
                    "target '{}' has a negative weight ({})",
                    target.virtual_key, target.weight
                ));
            }
            if target.weight == 0.0 {
                report.warnings.push(format!(
                    "target '{}' has a zero weight and will never be selected by load_balance",
                    target.virtual_key
                ));
            }
        }

        match config.strategy.mode {
            StrategyMode::Conditional => {
                if config.strategy.conditions.is_empty() {
                    report.errors.push(
                        "conditional strategy requires at least one condition".to_string(),
                    );
                }
                for condition in &config.strategy.conditions {
                    if !seen_keys.contains(&condition.target) {
                        report.errors.push(format!(
                            "condition targets unknown virtual_key '{}'",
                            condition.target
                        ));
                    }
                }
            }
            StrategyMode::LoadBalance => {
                let total_weight: f64 = config.targets.iter().map(|t| t.weight.max(0.0)).sum();
                if total_weight <= 0.0 {
                    report.errors.push(
                        "load_balance strategy requires a positive total target weight".to_string(),
                    );
                }
            }
            StrategyMode::Single | StrategyMode::Fallback => {}
        }

        Self::validate_aliases(config, &seen_keys, &mut report);

        for plugin in &config.plugins {
            if plugin.name.trim().is_empty() {
                report.errors.push("plugin entries must name a plugin".to_string());
            }
        }

        report
    }

    /// Aliases are one level deep only (spec §3): an alias target must not
    /// itself be an alias key, and must resolve to either a known target or
    /// a model name a provider might legitimately serve.
    fn validate_aliases(
        config: &Config,
        target_keys: &HashSet<String>,
        report: &mut ValidationReport,
    ) {
        let alias_keys: HashSet<&String> = config.aliases.keys().collect();
        for (alias, resolved) in &config.aliases {
            if alias == resolved {
                report
                    .errors
                    .push(format!("alias '{alias}' resolves to itself"));
                continue;
            }
            if alias_keys.contains(resolved) {
                report.errors.push(format!(
                    "alias '{alias}' resolves to '{resolved}', which is itself an alias key (aliases are one level deep)"
                ));
            }
        }
        let _ = target_keys;
    }

    /// Convenience wrapper used at process start (`gateway-server::main`
    /// and `Gateway::new`): a `Config` with any validation error is treated
    /// as a fatal, process-start misconfiguration per spec §7.
    pub fn validate_comprehensive(config: &Config) -> Result<(), crate::error::GatewayError> {
        let report = Self::validate(config);
        for warning in &report.warnings {
            log::warn!("config warning: {warning}");
        }
        if report.is_valid() {
            Ok(())
        } else {
            Err(crate::error::GatewayError::Config(report.errors.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CircuitBreakerSpec, StrategyConfig, Target};

    fn base_config(mode: StrategyMode) -> Config {
        Config {
            strategy: StrategyConfig { mode, conditions: vec![] },
            targets: vec![Target {
                virtual_key: "primary".into(),
                weight: 1.0,
                retry: None,
                circuit_breaker: None,
            }],
            plugins: vec![],
            aliases: HashMap::new(),
        }
    }

    #[test]
    fn empty_targets_is_invalid() {
        let mut config = base_config(StrategyMode::Single);
        config.targets.clear();
        let report = ConfigValidator::validate(&config);
        assert!(!report.is_valid());
    }

    #[test]
    fn conditional_without_conditions_is_invalid() {
        let config = base_config(StrategyMode::Conditional);
        let report = ConfigValidator::validate(&config);
        assert!(!report.is_valid());
    }

    #[test]
    fn load_balance_with_zero_weights_is_invalid() {
        let mut config = base_config(StrategyMode::LoadBalance);
        config.targets[0].weight = 0.0;
        let report = ConfigValidator::validate(&config);
        assert!(!report.is_valid());
    }

    #[test]
    fn two_level_alias_is_rejected() {
        let mut config = base_config(StrategyMode::Single);
        config.aliases.insert("a".into(), "b".into());
        config.aliases.insert("b".into(), "primary".into());
        let report = ConfigValidator::validate(&config);
        assert!(!report.is_valid());
    }

    #[test]
    fn negative_weight_is_invalid_but_zero_is_only_a_warning_outside_load_balance() {
        let mut config = base_config(StrategyMode::Single);
        config.targets[0].weight = -1.0;
        let report = ConfigValidator::validate(&config);
        assert!(!report.is_valid());
    }

    #[test]
    fn breaker_spec_is_carried_through() {
        let mut config = base_config(StrategyMode::Single);
        config.targets[0].circuit_breaker = Some(CircuitBreakerSpec {
            failure_threshold: Some(3),
            success_threshold: Some(1),
            open_timeout_secs: Some(10),
        });
        let report = ConfigValidator::validate(&config);
        assert!(report.is_valid());
    }
}
