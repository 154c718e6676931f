use anyhow::Context;
use ned_io::{Format, HomePolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub log: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub format: Format,
    #[serde(default)]
    pub home_policy: HomePolicy,
    #[serde(default)]
    pub strict: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("ned-out")
}

impl RunConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading run config {}", path_ref.display()))?;
        let config: RunConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing run config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_log(log: PathBuf) -> Self {
        Self {
            log,
            output_dir: default_output_dir(),
            format: Format::default(),
            home_policy: HomePolicy::default(),
            strict: false,
        }
    }
}
