use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::ClockConfig;
use crate::graph::ScatterConfig;
use crate::interaction::ViewportConfig;
use crate::physics::ForceConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("layout config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("`{field}` is {value}, expected {expected}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },
}

/// Every tunable of the layout engine. Missing JSON fields fall back to defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub forces: ForceConfig,
    pub clock: ClockConfig,
    pub viewport: ViewportConfig,
    pub scatter: ScatterConfig,
}

impl LayoutConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let clock = &self.clock;
        check("clock.alphaMin", clock.alpha_min, "in (0, 1)", |v| {
            v > 0.0 && v < 1.0
        })?;
        check("clock.alphaDecay", clock.alpha_decay, "in (0, 1)", |v| {
            v > 0.0 && v < 1.0
        })?;
        check("clock.dragAlpha", clock.drag_alpha, "in [0, 1]", |v| {
            (0.0..=1.0).contains(&v)
        })?;

        let forces = &self.forces;
        check(
            "forces.velocityDecay",
            forces.velocity_decay.into(),
            "in [0, 1)",
            |v| (0.0..1.0).contains(&v),
        )?;
        if let Some(max_velocity) = forces.max_velocity {
            check("forces.maxVelocity", max_velocity.into(), "> 0", positive)?;
        }
        if let Some(link) = &forces.link {
            check("forces.link.distance", link.distance.into(), ">= 0", non_negative)?;
        }
        if let Some(charge) = &forces.charge {
            check("forces.charge.strength", charge.strength.into(), "finite", f64::is_finite)?;
            check("forces.charge.minDistance", charge.min_distance.into(), "> 0", positive)?;
            check("forces.charge.theta", charge.theta.into(), "> 0", positive)?;
        }
        if let Some(center) = &forces.center {
            check("forces.center.x", center.x.into(), "finite", f64::is_finite)?;
            check("forces.center.y", center.y.into(), "finite", f64::is_finite)?;
            check("forces.center.strength", center.strength.into(), ">= 0", non_negative)?;
        }
        if let Some(collision) = &forces.collision {
            check(
                "forces.collision.radiusFactor",
                collision.radius_factor.into(),
                ">= 0",
                non_negative,
            )?;
            check(
                "forces.collision.strength",
                collision.strength.into(),
                ">= 0",
                non_negative,
            )?;
        }

        let viewport = &self.viewport;
        check("viewport.minScale", viewport.min_scale.into(), "> 0", positive)?;
        check(
            "viewport.maxScale",
            viewport.max_scale.into(),
            ">= viewport.minScale",
            |v| v.is_finite() && v >= f64::from(viewport.min_scale),
        )?;

        check("scatter.radius", self.scatter.radius.into(), ">= 0", non_negative)?;
        check("scatter.jitter", self.scatter.jitter.into(), ">= 0", non_negative)?;
        Ok(())
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn check(
    field: &'static str,
    value: f64,
    expected: &'static str,
    accept: impl Fn(f64) -> bool,
) -> Result<(), ConfigError> {
    if accept(value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            expected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_is_default() {
        assert_eq!(LayoutConfig::from_json("{}").unwrap(), LayoutConfig::default());
        assert!(LayoutConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = LayoutConfig::from_json(
            r#"{
                "forces": {"link": {"distance": 60}, "collision": null},
                "clock": {"alphaDecay": 0.05}
            }"#,
        )
        .unwrap();

        assert_eq!(config.forces.link.as_ref().unwrap().distance, 60.0);
        assert!(!config.forces.link.as_ref().unwrap().scale_by_weight);
        assert!(config.forces.collision.is_none());
        assert!(config.forces.charge.is_some());
        assert_eq!(config.clock.alpha_decay, 0.05);
        assert_eq!(config.clock.alpha_min, 0.001);
    }

    #[test]
    fn out_of_range_values_name_the_field() {
        let err = LayoutConfig::from_json(r#"{"clock": {"alphaDecay": 1.5}}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "clock.alphaDecay",
                ..
            }
        ));

        let err =
            LayoutConfig::from_json(r#"{"viewport": {"minScale": 2, "maxScale": 1}}"#).unwrap_err();
        assert!(err.to_string().contains("viewport.maxScale"));
    }

    #[test]
    fn velocity_cap_can_be_lifted_but_not_zeroed() {
        let config = LayoutConfig::from_json(r#"{"forces": {"maxVelocity": null}}"#).unwrap();
        assert_eq!(config.forces.max_velocity, None);

        let err = LayoutConfig::from_json(r#"{"forces": {"maxVelocity": 0}}"#).unwrap_err();
        assert!(err.to_string().contains("forces.maxVelocity"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = LayoutConfig::from_json("{\"forces\": ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
