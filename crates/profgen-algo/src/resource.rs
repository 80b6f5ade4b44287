//! Conversion of cutout weather variables into per-cell time series.
//!
//! Wind and PV models yield capacity factors in [0, 1]; the runoff model
//! passes the cutout runoff through for the hydro branch.

use ndarray::{Array2, Zip};
use profgen_core::config::{PanelParameters, PanelSpec, PowerCurve, ResourceConfig, TurbineSpec};
use profgen_core::{Cutout, ProfgenError, ProfgenResult};

/// Reference height of the `wnd100m` variable in metres.
const WIND_REFERENCE_HEIGHT: f64 = 100.0;
/// Surface roughness used where the cutout has none (m).
const DEFAULT_ROUGHNESS: f64 = 0.03;
const KELVIN: f64 = 273.15;
/// Irradiance at standard test conditions (W/m²)
const STC_IRRADIANCE: f64 = 1000.0;

pub trait ResourceModel: Send + Sync {
    fn name(&self) -> &str;

    /// `time × cell` series derived from the cutout.
    fn convert(&self, cutout: &Cutout) -> ProfgenResult<Array2<f64>>;
}

/// Build the model selected by a technology's `resource` block.
pub fn resource_model(config: &ResourceConfig) -> ProfgenResult<Box<dyn ResourceModel>> {
    Ok(match config {
        ResourceConfig::Wind { turbine } => Box::new(WindTurbine::from_spec(turbine)?),
        ResourceConfig::Pv { panel } => Box::new(SolarPanel::from_spec(panel)?),
        ResourceConfig::Hydro(_) => Box::new(Runoff),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindTurbine {
    pub name: String,
    pub hub_height: f64,
    speeds: Vec<f64>,
    /// Output per unit of rated power at each speed
    output: Vec<f64>,
}

impl WindTurbine {
    pub fn from_spec(spec: &TurbineSpec) -> ProfgenResult<Self> {
        match spec {
            TurbineSpec::Preset(name) => Self::preset(name),
            TurbineSpec::Curve(curve) => Self::from_curve("custom", curve),
        }
    }

    pub fn preset(name: &str) -> ProfgenResult<Self> {
        let (hub_height, speeds, power): (f64, &[f64], &[f64]) = match name {
            "Vestas_V112_3MW" => (
                80.0,
                &[0.0, 2.5, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 25.0, 25.5],
                &[0.0, 0.0, 0.023, 0.115, 0.26, 0.46, 0.74, 1.12, 1.6, 2.1, 2.6, 2.94, 3.0, 3.0, 0.0],
            ),
            "Vestas_V80_2MW_gridstreamer" => (
                80.0,
                &[0.0, 3.5, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 25.0, 25.5],
                &[0.0, 0.0, 0.044, 0.135, 0.261, 0.437, 0.669, 0.957, 1.279, 1.59, 1.823, 1.945, 2.0, 2.0, 0.0],
            ),
            "NREL_ReferenceTurbine_5MW_offshore" => (
                90.0,
                &[0.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 11.4, 25.0, 25.5],
                &[0.0, 0.0, 0.17, 0.39, 0.74, 1.17, 1.72, 2.41, 3.27, 4.35, 5.0, 5.0, 0.0],
            ),
            other => {
                return Err(ProfgenError::Config(format!(
                    "unknown turbine '{other}' (known: Vestas_V112_3MW, Vestas_V80_2MW_gridstreamer, NREL_ReferenceTurbine_5MW_offshore)"
                )))
            }
        };
        Self::from_curve(
            name,
            &PowerCurve {
                hub_height,
                speeds: speeds.to_vec(),
                power: power.to_vec(),
                rated: None,
            },
        )
    }

    pub fn from_curve(name: &str, curve: &PowerCurve) -> ProfgenResult<Self> {
        if curve.speeds.len() != curve.power.len() || curve.speeds.len() < 2 {
            return Err(ProfgenError::Config(format!(
                "turbine '{name}': power curve needs matching V and POW with at least two points"
            )));
        }
        if curve.speeds.windows(2).any(|w| w[1] < w[0]) {
            return Err(ProfgenError::Config(format!(
                "turbine '{name}': wind speeds must be ascending"
            )));
        }
        if !(curve.hub_height > 0.0) {
            return Err(ProfgenError::Config(format!(
                "turbine '{name}': hub height must be positive"
            )));
        }
        let rated = curve
            .rated
            .unwrap_or_else(|| curve.power.iter().copied().fold(0.0, f64::max));
        if !(rated > 0.0) {
            return Err(ProfgenError::Config(format!(
                "turbine '{name}': rated power must be positive"
            )));
        }
        Ok(Self {
            name: name.to_string(),
            hub_height: curve.hub_height,
            speeds: curve.speeds.clone(),
            output: curve.power.iter().map(|p| p / rated).collect(),
        })
    }

    /// Per-unit output at hub-height wind speed `v`; zero outside the curve.
    pub fn output_at(&self, v: f64) -> f64 {
        let n = self.speeds.len();
        if !(v >= self.speeds[0]) || v > self.speeds[n - 1] {
            return 0.0;
        }
        let i = self.speeds.partition_point(|&s| s <= v);
        if i >= n {
            return self.output[n - 1];
        }
        let (v0, v1) = (self.speeds[i - 1], self.speeds[i]);
        let (p0, p1) = (self.output[i - 1], self.output[i]);
        if v1 == v0 {
            return p1;
        }
        p0 + (p1 - p0) * (v - v0) / (v1 - v0)
    }

    /// Log-law extrapolation from the 100 m reference height.
    pub fn hub_speed(&self, v_ref: f64, roughness: f64) -> f64 {
        let z0 = if roughness > 0.0 { roughness } else { DEFAULT_ROUGHNESS };
        v_ref * (self.hub_height / z0).ln() / (WIND_REFERENCE_HEIGHT / z0).ln()
    }
}

impl ResourceModel for WindTurbine {
    fn name(&self) -> &str {
        &self.name
    }

    fn convert(&self, cutout: &Cutout) -> ProfgenResult<Array2<f64>> {
        let wind = cutout.variable("wnd100m")?;
        let mut cf = Array2::zeros(wind.dim());
        match cutout.optional_variable("roughness") {
            Some(roughness) => Zip::from(&mut cf)
                .and(wind)
                .and(roughness)
                .for_each(|out, &v, &z0| *out = self.output_at(self.hub_speed(v, z0)).clamp(0.0, 1.0)),
            None => Zip::from(&mut cf).and(wind).for_each(|out, &v| {
                *out = self
                    .output_at(self.hub_speed(v, DEFAULT_ROUGHNESS))
                    .clamp(0.0, 1.0)
            }),
        }
        Ok(cf)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolarPanel {
    pub name: String,
    pub parameters: PanelParameters,
}

impl SolarPanel {
    pub fn from_spec(spec: &PanelSpec) -> ProfgenResult<Self> {
        let (name, parameters) = match spec {
            PanelSpec::Preset(name) => match name.as_str() {
                "CSi" => (
                    name.clone(),
                    PanelParameters { temp_coefficient: -0.0044, noct: 45.0 },
                ),
                "CdTe" => (
                    name.clone(),
                    PanelParameters { temp_coefficient: -0.0025, noct: 45.0 },
                ),
                other => {
                    return Err(ProfgenError::Config(format!(
                        "unknown panel '{other}' (known: CSi, CdTe)"
                    )))
                }
            },
            PanelSpec::Custom(parameters) => ("custom".to_string(), *parameters),
        };
        Ok(Self { name, parameters })
    }

    /// Capacity factor for irradiance `g` (W/m²) and air temperature in K.
    pub fn capacity_factor(&self, g: f64, air_temperature: f64) -> f64 {
        if !(g > 0.0) {
            return 0.0;
        }
        let PanelParameters { temp_coefficient, noct } = self.parameters;
        let cell = air_temperature - KELVIN + (noct - 20.0) / 800.0 * g;
        (g / STC_IRRADIANCE * (1.0 + temp_coefficient * (cell - 25.0))).clamp(0.0, 1.0)
    }
}

impl ResourceModel for SolarPanel {
    fn name(&self) -> &str {
        &self.name
    }

    fn convert(&self, cutout: &Cutout) -> ProfgenResult<Array2<f64>> {
        let influx = cutout.variable("influx")?;
        let temperature = cutout.variable("temperature")?;
        let mut cf = Array2::zeros(influx.dim());
        Zip::from(&mut cf)
            .and(influx)
            .and(temperature)
            .for_each(|out, &g, &t| *out = self.capacity_factor(g, t));
        Ok(cf)
    }
}

/// Surface runoff passed through unchanged.
pub struct Runoff;

impl ResourceModel for Runoff {
    fn name(&self) -> &str {
        "runoff"
    }

    fn convert(&self, cutout: &Cutout) -> ProfgenResult<Array2<f64>> {
        Ok(cutout.variable("runoff")?.mapv(|v| v.max(0.0)))
    }
}
