use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Functional form of the harmonic bond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BondPotential {
    /// `0.5 k r²`: a Gaussian spring with zero rest length.
    Ideal,
    /// `0.5 k (r - l0)²`.
    FiniteRestLength,
}

/// Bonded interaction parameters, in thermal units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ForcefieldParams {
    pub bond_potential: BondPotential,
    pub bond_length: f64,
    pub k_bond: f64,
    pub k_angle: f64,
}

#[derive(Debug, Error)]
pub enum ParamLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid forcefield parameter '{name}': {value}")]
    Invalid { name: &'static str, value: f64 },
}

impl ForcefieldParams {
    pub fn load(path: &Path) -> Result<Self, ParamLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ParamLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let params: Self = toml::from_str(&content).map_err(|e| ParamLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ParamLoadError> {
        let checks = [
            ("bond_length", self.bond_length),
            ("k_bond", self.k_bond),
            ("k_angle", self.k_angle),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(ParamLoadError::Invalid { name, value });
            }
        }
        Ok(())
    }

    /// Rest length entering the bond energy: zero for the ideal form.
    #[inline]
    pub fn rest_length(&self) -> f64 {
        match self.bond_potential {
            BondPotential::Ideal => 0.0,
            BondPotential::FiniteRestLength => self.bond_length,
        }
    }
}
