//! Drop weak buses and zero out low profile values.

use profgen_core::config::TechnologyConfig;
use profgen_core::{BusProfile, Diagnostics};
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilterSettings {
    pub min_p_max_pu: f64,
    pub min_p_nom_max: f64,
    pub clip_p_max_pu: Option<f64>,
}

impl From<&TechnologyConfig> for FilterSettings {
    fn from(config: &TechnologyConfig) -> Self {
        Self {
            min_p_max_pu: config.min_p_max_pu,
            min_p_nom_max: config.min_p_nom_max,
            clip_p_max_pu: config.clip_p_max_pu,
        }
    }
}

/// Keep buses whose mean profile exceeds `min_p_max_pu` and whose
/// `p_nom_max` exceeds `min_p_nom_max`, then clip the survivors' profiles.
pub fn filter_and_clip(
    buses: Vec<BusProfile>,
    settings: FilterSettings,
    diagnostics: &mut Diagnostics,
) -> Vec<BusProfile> {
    let mut kept = Vec::with_capacity(buses.len());
    for mut bus in buses {
        let mean = bus.mean_profile();
        if !(mean > settings.min_p_max_pu && bus.p_nom_max > settings.min_p_nom_max) {
            info!(
                bus = %bus.bus,
                mean_p_max_pu = mean,
                p_nom_max = bus.p_nom_max,
                "Dropping bus below thresholds"
            );
            diagnostics.add_warning_with_entity(
                "filter",
                &format!(
                    "dropped: mean p_max_pu {:.4} (min {}), p_nom_max {:.4} MW (min {})",
                    mean, settings.min_p_max_pu, bus.p_nom_max, settings.min_p_nom_max
                ),
                &bus.bus,
            );
            continue;
        }
        if let Some(clip) = settings.clip_p_max_pu {
            for v in bus.profile.iter_mut() {
                if *v < clip {
                    *v = 0.0;
                }
            }
        }
        kept.push(bus);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bus(name: &str, profile: Vec<f64>, p_nom_max: f64) -> BusProfile {
        BusProfile {
            bus: name.into(),
            profile,
            weight: 1.0,
            p_nom_max,
            average_distance: 0.0,
            centre_of_mass: (0.0, 0.0),
            underwater_fraction: None,
        }
    }

    #[test]
    fn thresholds_are_strict() {
        let settings = FilterSettings {
            min_p_max_pu: 0.1,
            min_p_nom_max: 5.0,
            clip_p_max_pu: None,
        };
        let mut diagnostics = Diagnostics::new();
        let kept = filter_and_clip(
            vec![
                bus("ok", vec![0.2, 0.4], 10.0),
                bus("weak", vec![0.1, 0.1], 10.0),
                bus("small", vec![0.5, 0.5], 5.0),
            ],
            settings,
            &mut diagnostics,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].bus, "ok");
        assert_eq!(diagnostics.warning_count(), 2);
        assert_eq!(diagnostics.issues_by_category("filter").count(), 2);
    }

    #[test]
    fn clip_zeroes_values_below_threshold() {
        let settings = FilterSettings {
            clip_p_max_pu: Some(0.01),
            ..FilterSettings::default()
        };
        let mut diagnostics = Diagnostics::new();
        let kept = filter_and_clip(
            vec![bus("b", vec![0.005, 0.01, 0.5], 1.0)],
            settings,
            &mut diagnostics,
        );
        assert_eq!(kept[0].profile, vec![0.0, 0.01, 0.5]);
        assert!(!diagnostics.has_warnings());
    }
}
