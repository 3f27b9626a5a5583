use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Material every new model starts out with.
pub const BASELINE_MATERIAL: &str = "pla";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Printer {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    pub bed_size: BedSize,
    #[serde(default)]
    pub supported_materials: Vec<String>,
}

/// Printable volume of a printer in mm.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct BedSize {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Material {
    pub id: String,
    pub name: String,
    /// Solid density in g/cm³.
    pub density: f64,
}

impl Printer {
    pub fn supports(&self, material: &str) -> bool {
        self.supported_materials
            .iter()
            .any(|x| x.eq_ignore_ascii_case(material))
    }

    /// Checks if something with the given extent (in mm) fits on the bed
    /// without being reoriented.
    pub fn fits(&self, extent: &Vector3<f64>) -> bool {
        let bed = self.bed_size.as_vector();
        extent.x <= bed.x && extent.y <= bed.y && extent.z <= bed.z
    }
}

impl BedSize {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x as f64, self.y as f64, self.z as f64)
    }
}

impl Material {
    pub fn new(id: &str, name: &str, density: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            density,
        }
    }
}

pub fn find_printer<'a>(printers: &'a [Printer], id: &str) -> Option<&'a Printer> {
    printers.iter().find(|x| x.id == id)
}

pub fn find_material<'a>(materials: &'a [Material], id: &str) -> Option<&'a Material> {
    materials.iter().find(|x| x.id.eq_ignore_ascii_case(id))
}

pub fn default_printers() -> Vec<Printer> {
    let printer = |id: &str, name: &str, series: &str, bed: BedSize, materials: &[&str]| Printer {
        id: id.into(),
        name: name.into(),
        series: Some(series.into()),
        bed_size: bed,
        supported_materials: materials.iter().map(|x| x.to_string()).collect(),
    };

    vec![
        printer(
            "ender3",
            "Creality Ender 3",
            "Ender",
            BedSize::new(220.0, 220.0, 250.0),
            &["pla", "petg", "abs"],
        ),
        printer(
            "bambu_x1c",
            "Bambu Lab X1C",
            "X1",
            BedSize::new(256.0, 256.0, 256.0),
            &["pla", "petg", "abs", "asa", "pa", "pc"],
        ),
        printer(
            "prusa_mk4",
            "Prusa MK4",
            "MK",
            BedSize::new(250.0, 210.0, 220.0),
            &["pla", "petg", "abs", "asa", "pa", "pc"],
        ),
        printer(
            "neptune4",
            "Elegoo Neptune 4",
            "Neptune",
            BedSize::new(225.0, 225.0, 265.0),
            &["pla", "petg", "abs", "tpu"],
        ),
    ]
}

pub fn default_materials() -> Vec<Material> {
    vec![
        Material::new("pla", "PLA", 1.24),
        Material::new("petg", "PETG", 1.27),
        Material::new("abs", "ABS", 1.04),
        Material::new("asa", "ASA", 1.07),
        Material::new("pa", "Nylon (PA)", 1.14),
        Material::new("pc", "Polycarbonate", 1.20),
        Material::new("tpu", "TPU", 1.21),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_material_is_in_catalog() {
        let materials = default_materials();
        assert!(find_material(&materials, BASELINE_MATERIAL).is_some());
    }

    #[test]
    fn printer_bed_fit() {
        let printers = default_printers();
        let prusa = find_printer(&printers, "prusa_mk4").unwrap();

        assert!(prusa.fits(&Vector3::new(200.0, 200.0, 200.0)));
        assert!(!prusa.fits(&Vector3::new(200.0, 240.0, 200.0)));
        assert!(prusa.supports("PETG"));
        assert!(!prusa.supports("tpu"));
    }

    #[test]
    fn printer_wire_names() {
        let printers = default_printers();
        let toml = toml::to_string(&printers[0]).unwrap();
        assert!(toml.contains("bedSize"));
        assert!(toml.contains("supportedMaterials"));
    }
}
