//! Run configuration: countries, worker settings and per-technology
//! `renewable.<tech>` blocks.
//!
//! The file is YAML or JSON, chosen by extension with a YAML-then-JSON
//! fallback for anything else.

use crate::error::{ProfgenError, ProfgenResult};
use crate::units::{CapacityDensity, Metres};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// ISO2 codes of the modelled countries
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub atlite: WorkerConfig,
    #[serde(default)]
    pub cluster_options: ClusterOptions,
    #[serde(default)]
    pub renewable: BTreeMap<String, TechnologyConfig>,
}

/// Worker pool and progress reporting for the availability computation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkerConfig {
    /// Worker threads; `None` or 0 uses every core
    #[serde(default)]
    pub nprocesses: Option<usize>,
    #[serde(default)]
    pub show_progress: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClusterOptions {
    #[serde(default)]
    pub alternative_clustering: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TechnologyConfig {
    /// Cutout directory; overridable from the command line
    #[serde(default)]
    pub cutout: Option<PathBuf>,
    pub resource: ResourceConfig,
    #[serde(default)]
    pub capacity_per_sqkm: Option<CapacityDensity>,
    #[serde(default = "default_one")]
    pub correction_factor: f64,
    #[serde(default)]
    pub copernicus: Option<CopernicusConfig>,
    #[serde(default)]
    pub natura: bool,
    /// Maximum water depth in metres
    #[serde(default)]
    pub max_depth: Option<f64>,
    #[serde(default)]
    pub min_shore_distance: Option<Metres>,
    #[serde(default)]
    pub max_shore_distance: Option<Metres>,
    #[serde(default)]
    pub potential: CapacityPolicy,
    #[serde(default)]
    pub min_p_max_pu: f64,
    #[serde(default)]
    pub min_p_nom_max: f64,
    #[serde(default)]
    pub clip_p_max_pu: Option<f64>,
    #[serde(default = "default_samples")]
    pub samples_per_cell: usize,
    #[serde(default)]
    pub extendable: bool,
    #[serde(default = "default_one")]
    pub normalization_multiplier: f64,
    #[serde(default)]
    pub clip_min_inflow: Option<f64>,
}

fn default_one() -> f64 {
    1.0
}

fn default_samples() -> usize {
    10
}

/// Weather-to-capacity-factor conversion, selected by `method`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum ResourceConfig {
    Wind { turbine: TurbineSpec },
    Pv { panel: PanelSpec },
    Hydro(HydroResourceConfig),
}

impl ResourceConfig {
    pub fn method(&self) -> &'static str {
        match self {
            ResourceConfig::Wind { .. } => "wind",
            ResourceConfig::Pv { .. } => "pv",
            ResourceConfig::Hydro(_) => "hydro",
        }
    }
}

/// Turbine preset name or an explicit power curve.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TurbineSpec {
    Preset(String),
    Curve(PowerCurve),
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PowerCurve {
    /// Hub height in metres
    pub hub_height: f64,
    /// Wind speeds (m/s), ascending
    #[serde(rename = "V")]
    pub speeds: Vec<f64>,
    /// Power output (MW) at each speed
    #[serde(rename = "POW")]
    pub power: Vec<f64>,
    /// Rated power (MW); defaults to the curve maximum
    #[serde(rename = "P", default)]
    pub rated: Option<f64>,
}

/// Panel preset name or explicit thermal coefficients.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PanelSpec {
    Preset(String),
    Custom(PanelParameters),
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct PanelParameters {
    /// Relative efficiency change per °C above 25 °C
    pub temp_coefficient: f64,
    /// Nominal operating cell temperature (°C)
    pub noct: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HydroResourceConfig {
    pub hydrobasins: PathBuf,
    /// River flow speed in m/s for the upstream routing delay
    #[serde(default = "default_one")]
    pub flowspeed: f64,
    #[serde(default)]
    pub normalization: Normalization,
    #[serde(default = "default_year_start")]
    pub year_start: i32,
    #[serde(default = "default_year_end")]
    pub year_end: i32,
}

fn default_year_start() -> i32 {
    2000
}

fn default_year_end() -> i32 {
    2020
}

/// Source of the annual generation statistics used to rescale inflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizationSource {
    HydroCapacities,
    Eia,
}

impl FromStr for NormalizationSource {
    type Err = ProfgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hydro_capacities" => Ok(Self::HydroCapacities),
            "eia" => Ok(Self::Eia),
            other => Err(ProfgenError::Config(format!(
                "hydro normalization should be one of \"hydro_capacities\", \"eia\" or false, not \"{other}\""
            ))),
        }
    }
}

impl fmt::Display for NormalizationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::HydroCapacities => "hydro_capacities",
            Self::Eia => "eia",
        })
    }
}

/// `normalization: false` or a source name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Normalization(pub Option<NormalizationSource>);

impl<'de> Deserialize<'de> for Normalization {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Flag(false) => Ok(Normalization(None)),
            Raw::Flag(true) => Err(serde::de::Error::custom(
                "hydro normalization: true needs a source name (\"hydro_capacities\" or \"eia\")",
            )),
            Raw::Name(name) => name
                .parse()
                .map(|source| Normalization(Some(source)))
                .map_err(serde::de::Error::custom),
        }
    }
}

/// Policy deciding the per-bus ceiling on installable capacity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum CapacityPolicy {
    Simple,
    #[default]
    Conservative,
}

impl FromStr for CapacityPolicy {
    type Err = ProfgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(Self::Simple),
            "conservative" => Ok(Self::Conservative),
            other => Err(ProfgenError::Config(format!(
                "config key `potential` should be one of \"simple\" or \"conservative\", not \"{other}\""
            ))),
        }
    }
}

impl TryFrom<String> for CapacityPolicy {
    type Error = ProfgenError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for CapacityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Simple => "simple",
            Self::Conservative => "conservative",
        })
    }
}

/// Land-cover exclusion settings. A bare list of grid codes is shorthand
/// for `{grid_codes: [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "CopernicusRaw")]
pub struct CopernicusConfig {
    /// Codes where installation is allowed
    pub grid_codes: Vec<i64>,
    /// Buffer width around `distance_grid_codes`; zero disables the band
    pub distance: Metres,
    pub distance_grid_codes: Vec<i64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CopernicusRaw {
    Codes(Vec<i64>),
    Table {
        #[serde(default)]
        grid_codes: Vec<i64>,
        #[serde(default)]
        distance: Metres,
        #[serde(default)]
        distance_grid_codes: Vec<i64>,
    },
}

impl From<CopernicusRaw> for CopernicusConfig {
    fn from(raw: CopernicusRaw) -> Self {
        match raw {
            CopernicusRaw::Codes(grid_codes) => Self {
                grid_codes,
                ..Self::default()
            },
            CopernicusRaw::Table {
                grid_codes,
                distance,
                distance_grid_codes,
            } => Self {
                grid_codes,
                distance,
                distance_grid_codes,
            },
        }
    }
}

/// Which branch of the pipeline a technology runs through, from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TechnologyKind {
    Hydro,
    Offshore,
    Land,
}

impl TechnologyKind {
    pub fn from_name(name: &str) -> Self {
        if name.starts_with("hydro") {
            Self::Hydro
        } else if name.starts_with("offwind") {
            Self::Offshore
        } else {
            Self::Land
        }
    }
}

impl Config {
    /// Settings for `technology`, checked against its pipeline branch.
    pub fn technology(&self, technology: &str) -> ProfgenResult<&TechnologyConfig> {
        let tech = self.renewable.get(technology).ok_or_else(|| {
            ProfgenError::Config(format!(
                "technology '{}' is not configured under `renewable` (configured: {})",
                technology,
                self.renewable.keys().cloned().collect::<Vec<_>>().join(", ")
            ))
        })?;
        tech.validate(technology)?;
        Ok(tech)
    }

    /// Worker threads to use; 0 means one per core.
    pub fn worker_threads(&self) -> usize {
        self.atlite.nprocesses.unwrap_or(0)
    }
}

impl TechnologyConfig {
    pub fn validate(&self, technology: &str) -> ProfgenResult<()> {
        let kind = TechnologyKind::from_name(technology);
        let is_hydro_resource = matches!(self.resource, ResourceConfig::Hydro(_));
        if (kind == TechnologyKind::Hydro) != is_hydro_resource {
            return Err(ProfgenError::Config(format!(
                "technology '{}' cannot use resource method '{}'",
                technology,
                self.resource.method()
            )));
        }
        if kind != TechnologyKind::Hydro {
            match self.capacity_per_sqkm {
                None => {
                    return Err(ProfgenError::Config(format!(
                        "technology '{technology}' requires `capacity_per_sqkm`"
                    )))
                }
                Some(d) if !d.is_finite() || d.value() < 0.0 => {
                    return Err(ProfgenError::Config(format!(
                        "technology '{technology}': `capacity_per_sqkm` must be non-negative, got {}",
                        d.value()
                    )))
                }
                Some(_) => {}
            }
        }
        if self.samples_per_cell == 0 {
            return Err(ProfgenError::Config(format!(
                "technology '{technology}': `samples_per_cell` must be at least 1"
            )));
        }
        if !self.correction_factor.is_finite() {
            return Err(ProfgenError::Config(format!(
                "technology '{technology}': `correction_factor` must be finite"
            )));
        }
        if let ResourceConfig::Hydro(hydro) = &self.resource {
            if !(hydro.flowspeed > 0.0) {
                return Err(ProfgenError::Config(format!(
                    "technology '{technology}': `flowspeed` must be positive, got {}",
                    hydro.flowspeed
                )));
            }
            if hydro.year_end < hydro.year_start {
                return Err(ProfgenError::Config(format!(
                    "technology '{technology}': year_end {} precedes year_start {}",
                    hydro.year_end, hydro.year_start
                )));
            }
        }
        Ok(())
    }
}

pub fn parse_config(data: &str, format: Option<&str>) -> ProfgenResult<Config> {
    match format {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            Ok(serde_yaml::from_str(data)?)
        }
        Some(ext) if ext.eq_ignore_ascii_case("json") => serde_json::from_str(data)
            .map_err(|err| ProfgenError::Config(err.to_string())),
        _ => serde_yaml::from_str(data)
            .or_else(|_| serde_json::from_str(data))
            .map_err(|err| ProfgenError::Config(err.to_string())),
    }
}

pub fn load_config_from_path(path: &Path) -> ProfgenResult<Config> {
    let data = fs::read_to_string(path).map_err(|err| {
        ProfgenError::Config(format!("reading config '{}': {}", path.display(), err))
    })?;
    parse_config(&data, path.extension().and_then(|ext| ext.to_str()))
        .map_err(|err| ProfgenError::Config(format!("parsing '{}': {}", path.display(), err)))
}
