// Unit registry - physical unit per plant tag
use std::collections::HashMap;

/// Units for the tags shown on the biogas plant display.
const PLANT_TAG_UNITS: &[(&str, &str)] = &[
    ("STAT6.111LME_A01_SCALE.F_CV", "%"),
    ("STAT6.111TME_A01_SCALE.F_CV", "°C"),
    ("STAT6.151PME_A05_SCALE.F_CV", "%"),
    ("STAT6.141PME_A04_SCALE.F_CV", "%"),
    ("STAT6.141PME_C01_SCALE.F_CV", "bar"),
    ("STAT6.121PML_A02_SCALE.F_CV", "bar"),
    ("STAT6.121TME_B01_SCALE.F_CV", "°C"),
    ("STAT6.131PME_A01_SCALE.F_CV", "%"),
    ("STAT6.131TME_C01_SCALE.F_CV", "°C"),
    ("STAT6.131TME_C02_SCALE.F_CV", "°C"),
    ("STAT6.132PME_A02_SCALE.F_CV", "%"),
    ("STAT6.132TME_C03_SCALE.F_CV", "°C"),
    ("STAT6.132TME_C04_SCALE.F_CV", "°C"),
    ("STAT6.133PME_A03_SCALE.F_CV", "%"),
    ("STAT6.133TME_C05_SCALE.F_CV", "°C"),
    ("STAT6.133TME_C06_SCALE.F_CV", "°C"),
    ("STAT6.141PCI_B01_HZIST_SCALE.F_CV", "Hz"),
    ("STAT6.141PCI_B01_STROMIST_SCALE.F_CV", "A"),
    ("STAT6.141PFD_C01_HZIST_SCALE.F_CV", "Hz"),
    ("STAT6.141PFD_C01_STROMIST_SCALE.F_CV", "A"),
    ("STAT6.141PFD_D01_HZIST_SCALE.F_CV", "Hz"),
    ("STAT6.141PFD_D01_STROMIST_SCALE.F_CV", "A"),
    ("STAT6.141COS_A01_HZIST_SCALE.F_CV", "Hz"),
    ("STAT6.141COS_A01_STROMIST_SCALE.F_CV", "A"),
    ("STAT6.121PFD_B01_HZIST_SCALE.F_CV", "Hz"),
    ("STAT6.121PFD_B01_STROMIST_SCALE.F_CV", "A"),
    ("STAT6.165PME_B01_SCALE.F_CV", "%"),
    ("STAT6.165TME_E01_SCALE.F_CV", "°C"),
    ("STAT6.166PME_B02_SCALE.F_CV", "%"),
    ("STAT6.166TME_E02_SCALE.F_CV", "°C"),
    ("STAT6.161PME_A06_SCALE.F_CV", "%"),
    ("STAT6.161TME_D01_SCALE.F_CV", "°C"),
    ("STAT6.162PME_A07_SCALE.F_CV", "%"),
    ("STAT6.162TME_D02_SCALE.F_CV", "°C"),
    ("STAT6.163PME_A08_SCALE.F_CV", "%"),
    ("STAT6.163TME_D03_SCALE.F_CV", "°C"),
    ("STAT6.164PME_A09_SCALE.F_CV", "%"),
    ("STAT6.164TME_D04_SCALE.F_CV", "°C"),
    ("STAT6.T_MENGE_DEKANTER_SCALE.F_CV", "m³"),
    ("STAT6.T_MENGE_ABWASS_ROWATA_SCALE.F_CV", "m³"),
    ("STAT6.T_MENGE_ABWASS_ABWATA_SCALE.F_CV", "m³"),
    ("STAT6.T_MENGE_BRAUCHWASSER_SCALE.F_CV", "m³"),
    ("STAT6.141FME_A01_SCALE.F_CV", "m³/h"),
    ("STAT6.FLOW_BRAUCHWASSER_SCALE.F_CV", "m³/h"),
];

#[derive(Debug, Clone, Default)]
pub struct UnitRegistry {
    units: HashMap<String, String>,
}

impl UnitRegistry {
    /// Registry preloaded with the plant's instrument tags.
    pub fn plant_default() -> Self {
        Self::from_pairs(
            PLANT_TAG_UNITS
                .iter()
                .map(|(tag, unit)| (tag.to_string(), unit.to_string())),
        )
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            units: pairs.into_iter().collect(),
        }
    }

    /// Add or replace units, e.g. from configuration overrides
    pub fn extend<I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.units.extend(pairs);
    }

    /// Unit for a tag; unknown tags have no unit.
    pub fn unit_for(&self, tag: &str) -> &str {
        self.units.get(tag).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }
}
