use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unit a volume is displayed in. Volumes are always stored in mm³, this only
/// changes how they are rendered.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VolumeUnit {
    #[default]
    Mm,
    Cm,
    M,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown volume unit `{0}`, expected mm, cm or m")]
pub struct UnknownUnit(pub String);

/// Formats a volume given in cubic millimeters.
///
/// - `mm` leaves the value as is
/// - `cm` converts to cm³ with two decimal places
/// - `m` converts to m³ in scientific notation with two decimal places
pub fn format_volume(volume_mm3: f64, unit: VolumeUnit) -> String {
    match unit {
        VolumeUnit::Mm => format!("{volume_mm3}"),
        VolumeUnit::Cm => format!("{:.2}", volume_mm3 / 1000.0),
        VolumeUnit::M => format!("{:.2e}", volume_mm3 * 1e-9),
    }
}

impl VolumeUnit {
    pub fn suffix(&self) -> &'static str {
        match self {
            VolumeUnit::Mm => "mm³",
            VolumeUnit::Cm => "cm³",
            VolumeUnit::M => "m³",
        }
    }
}

impl FromStr for VolumeUnit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "mm" => VolumeUnit::Mm,
            "cm" => VolumeUnit::Cm,
            "m" => VolumeUnit::M,
            _ => return Err(UnknownUnit(s.into())),
        })
    }
}

impl fmt::Display for VolumeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VolumeUnit::Mm => "mm",
            VolumeUnit::Cm => "cm",
            VolumeUnit::M => "m",
        })
    }
}
