use crate::datasources::synthetic::DEFAULT_SEED;
use crate::datasources::weatherapi::MAX_FORECAST_DAYS;
use crate::error::{CropWaterError, Result};
use crate::logic::{CropFallback, StrategyKind};
use crate::models::{AreaUnit, FarmArea, IrrigationMethod, Location, ScheduleRequest};
use crate::tables::TableOverrides;
use dialoguer::{Input, Password};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    pub farm: FarmConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub reports: ReportsConfig,
    #[serde(default, skip_serializing_if = "TableOverrides::is_empty")]
    pub tables: TableOverrides,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FarmConfig {
    pub name: String,
    pub soil_type: String,
    pub crop: String,
    #[serde(default)]
    pub growth_stage: u8,
    pub area: f64,
    #[serde(default)]
    pub area_unit: AreaUnit,
    #[serde(default)]
    pub irrigation_method: IrrigationMethod,
    #[serde(default)]
    pub location: Location,
}

impl FarmConfig {
    pub fn to_request(&self) -> ScheduleRequest {
        ScheduleRequest {
            farm_name: self.name.clone(),
            soil_type: self.soil_type.clone(),
            crop: self.crop.clone(),
            growth_stage: self.growth_stage,
            area: FarmArea {
                value: self.area,
                unit: self.area_unit,
            },
            irrigation_method: self.irrigation_method,
            location: self.location.clone(),
        }
    }
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            name: "Main Farm".into(),
            soil_type: "Loam".into(),
            crop: "Tomato".into(),
            growth_stage: 1,
            area: 1.0,
            area_unit: AreaUnit::Hectares,
            irrigation_method: IrrigationMethod::Drip,
            location: Location::coordinates(27.1311, 72.3643),
        }
    }
}

#[derive(Clone, Deserialize, Serialize)]
pub struct WeatherConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_forecast_days", deserialize_with = "deserialize_days")]
    pub forecast_days: u32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_seed")]
    pub fallback_seed: u64,
}

fn default_forecast_days() -> u32 {
    MAX_FORECAST_DAYS
}

fn default_enabled() -> bool {
    true
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn deserialize_days<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value = u32::deserialize(deserializer)?;
    if (1..=MAX_FORECAST_DAYS).contains(&value) {
        Ok(value)
    } else {
        Err(D::Error::custom(format!(
            "forecast_days must be between 1 and {}, got {}",
            MAX_FORECAST_DAYS, value
        )))
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            forecast_days: default_forecast_days(),
            enabled: true,
            fallback_seed: DEFAULT_SEED,
        }
    }
}

impl std::fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("api_key", &"[REDACTED]")
            .field("forecast_days", &self.forecast_days)
            .field("enabled", &self.enabled)
            .field("fallback_seed", &self.fallback_seed)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub crop_fallback: CropFallback,
    #[serde(default)]
    pub strategy: StrategyKind,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct ReportsConfig {
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

fn default_retention_days() -> u32 {
    30
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
        }
    }
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(CropWaterError::Config(format!(
                "Config file not found at {:?}. Run `cropwater init` to set up.",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| CropWaterError::Config(format!("Failed to read config: {}", e)))?;

        Self::parse(&config_str)
    }

    /// Parse YAML after substituting `${VAR}` placeholders.
    pub fn parse(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content);
        serde_yaml::from_str(&content)
            .map_err(|e| CropWaterError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("cropwater").join("config.yaml");
            if xdg_config.exists() {
                return Ok(xdg_config);
            }
        }

        Self::default_config_path()
    }

    /// Returns true if a config file can be found in any standard location.
    pub fn exists(config_override: Option<&PathBuf>) -> bool {
        match config_override {
            Some(p) => p.exists(),
            None => Self::find_config_path()
                .map(|p| p.exists())
                .unwrap_or(false),
        }
    }

    /// Default path for writing new config files (~/.config/cropwater/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CropWaterError::Config("Cannot determine config directory".into()))?
            .join("cropwater");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the loaded Config and the path it was written to.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        let input_err = |e: dialoguer::Error| CropWaterError::Config(format!("Input error: {}", e));

        println!();
        println!("Let's set up CropWater!");
        println!();

        println!("Farm");
        let name: String = Input::new()
            .with_prompt("  Farm name")
            .default("Main Farm".into())
            .interact_text()
            .map_err(input_err)?;

        let soil_type: String = Input::new()
            .with_prompt("  Soil type (Sandy, Sandy Loam, Loam, Clay)")
            .default("Loam".into())
            .interact_text()
            .map_err(input_err)?;

        let crop: String = Input::new()
            .with_prompt("  Crop (Tomato, Rice, Wheat, ...)")
            .default("Tomato".into())
            .interact_text()
            .map_err(input_err)?;

        let growth_stage: u8 = Input::new()
            .with_prompt("  Growth stage (0 initial, 1 development, 2 mid, 3 late)")
            .default(1)
            .interact_text()
            .map_err(input_err)?;

        let area: f64 = Input::new()
            .with_prompt("  Area (hectares)")
            .default(1.0)
            .interact_text()
            .map_err(input_err)?;

        let method: String = Input::new()
            .with_prompt("  Irrigation method (drip, sprinkler, flood, furrow)")
            .default("drip".into())
            .interact_text()
            .map_err(input_err)?;

        let location: String = Input::new()
            .with_prompt("  Location (place name or \"lat,lon\")")
            .default("27.1311,72.3643".into())
            .interact_text()
            .map_err(input_err)?;

        println!();

        println!("WeatherAPI (leave blank to use synthetic forecasts)");
        let api_key: String = Password::new()
            .with_prompt("  API key")
            .allow_empty_password(true)
            .interact()
            .map_err(input_err)?;

        println!();

        let config = Config {
            farm: FarmConfig {
                name,
                soil_type,
                crop,
                growth_stage,
                area,
                area_unit: AreaUnit::Hectares,
                irrigation_method: IrrigationMethod::from_str(&method).unwrap_or_default(),
                location: Location::parse(&location),
            },
            weather: WeatherConfig {
                enabled: !api_key.is_empty(),
                api_key,
                ..Default::default()
            },
            ..Default::default()
        };

        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| CropWaterError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# CropWater Configuration\n# Generated by `cropwater init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        let Ok(re) = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") else {
            return result;
        };

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }

    pub fn data_dir(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = data_dir_override {
            std::fs::create_dir_all(dir)?;
            return Ok(dir.clone());
        }

        if let Ok(dir) = std::env::var("CROPWATER_DATA_DIR") {
            let p = PathBuf::from(dir);
            std::fs::create_dir_all(&p)?;
            return Ok(p);
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| CropWaterError::Config("Cannot determine data directory".into()))?
            .join("cropwater");

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn db_path(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        Ok(Self::data_dir(data_dir_override)?.join("cropwater.db"))
    }
}
