use anyhow::{bail, Result};
use std::collections::BTreeSet;

/// Stars above this mass (in solar masses) follow the high-mass branch.
pub const HIGH_MASS_THRESHOLD: f32 = 8.0;
/// Brown dwarf limit.
pub const MIN_STELLAR_MASS: f32 = 0.08;
/// Eddington limit.
pub const MAX_STELLAR_MASS: f32 = 150.0;

/// One authored point along an evolutionary path.
#[derive(Debug, Clone, PartialEq)]
pub struct StageDefinition {
    pub id: &'static str,
    pub label: &'static str,
    /// Folder-style locator; several stages may share one, which is the cache dedup key.
    pub locator: &'static str,
    pub description: &'static str,
    pub duration_years: f64,
    pub camera_distance: f32,
    /// 0xRRGGBB
    pub light_color: u32,
    pub light_intensity: f32,
    pub ambient_intensity: f32,
    pub display_size: f32,
}

const NEBULA: StageDefinition = StageDefinition {
    id: "nebula",
    label: "Nebula",
    locator: "3d_models/Nebula",
    description: "A vast cloud of gas and dust, the birthplace of stars.",
    duration_years: 10_000_000.0,
    camera_distance: 8.0,
    light_color: 0x8866ff,
    light_intensity: 1.5,
    ambient_intensity: 0.25,
    display_size: 4.0,
};

const PROTOSTAR: StageDefinition = StageDefinition {
    id: "protostar",
    label: "Protostar",
    locator: "3d_models/Protostar2",
    description: "Gravity collapses the cloud. A hot, dense core ignites.",
    duration_years: 100_000.0,
    camera_distance: 8.0,
    light_color: 0xff6633,
    light_intensity: 1.5,
    ambient_intensity: 0.25,
    display_size: 1.5,
};

/// Low/medium mass branch (0.08 to 8 solar masses).
pub static LOW_MASS_STAGES: [StageDefinition; 5] = [
    NEBULA,
    PROTOSTAR,
    StageDefinition {
        id: "main_sequence",
        label: "Main Sequence",
        locator: "3d_models/MainSequence",
        description: "Hydrogen fusion sustains the star for billions of years.",
        duration_years: 10_000_000_000.0,
        camera_distance: 8.0,
        light_color: 0xffffaa,
        light_intensity: 1.5,
        ambient_intensity: 0.25,
        display_size: 1.5,
    },
    StageDefinition {
        id: "red_giant",
        label: "Red Giant",
        locator: "3d_models/RedGiant",
        description: "Hydrogen exhausted, the outer layers expand enormously.",
        duration_years: 1_000_000_000.0,
        camera_distance: 8.0,
        light_color: 0xff3300,
        light_intensity: 1.5,
        ambient_intensity: 0.25,
        display_size: 1.5,
    },
    StageDefinition {
        id: "white_dwarf",
        label: "White Dwarf",
        locator: "3d_models/WhiteDwarf",
        description: "The stellar remnant slowly cools over trillions of years.",
        duration_years: 1_000_000_000_000.0,
        camera_distance: 8.0,
        light_color: 0xaaddff,
        light_intensity: 1.5,
        ambient_intensity: 0.25,
        display_size: 1.5,
    },
];

/// High mass branch (above 8 solar masses).
pub static HIGH_MASS_STAGES: [StageDefinition; 5] = [
    NEBULA,
    PROTOSTAR,
    StageDefinition {
        id: "main_sequence2",
        label: "Main Sequence",
        locator: "3d_models/MainSequence2",
        description: "A massive star burns hydrogen at a furious rate. Its life is brief but brilliant.",
        duration_years: 10_000_000.0,
        camera_distance: 8.0,
        light_color: 0xaaddff,
        light_intensity: 1.5,
        ambient_intensity: 0.25,
        display_size: 1.5,
    },
    StageDefinition {
        id: "red_supergiant",
        label: "Red Supergiant",
        locator: "3d_models/RedSupergaint",
        description: "The core exhausts its fuel and the star swells into a colossal red supergiant.",
        duration_years: 100_000.0,
        camera_distance: 8.0,
        light_color: 0xff2200,
        light_intensity: 1.5,
        ambient_intensity: 0.25,
        display_size: 1.5,
    },
    StageDefinition {
        id: "supernova",
        label: "Supernova",
        locator: "3d_models/Supernova",
        description: "The core collapses in an instant and a colossal explosion tears the star apart.",
        duration_years: 1_000_000_000_000.0,
        camera_distance: 8.0,
        light_color: 0xffffff,
        light_intensity: 1.5,
        ambient_intensity: 0.25,
        display_size: 1.5,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StellarPath {
    #[default]
    LowMass,
    HighMass,
}

impl StellarPath {
    pub const ALL: [StellarPath; 2] = [StellarPath::LowMass, StellarPath::HighMass];

    pub fn for_mass(mass: f32) -> Self {
        if mass > HIGH_MASS_THRESHOLD {
            StellarPath::HighMass
        } else {
            StellarPath::LowMass
        }
    }

    pub fn stages(self) -> &'static [StageDefinition] {
        match self {
            StellarPath::LowMass => &LOW_MASS_STAGES,
            StellarPath::HighMass => &HIGH_MASS_STAGES,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StellarPath::LowMass => "Low/Medium Mass",
            StellarPath::HighMass => "High Mass",
        }
    }

    pub(crate) fn slot(self) -> usize {
        match self {
            StellarPath::LowMass => 0,
            StellarPath::HighMass => 1,
        }
    }
}

pub fn stages_of(path: StellarPath) -> &'static [StageDefinition] {
    path.stages()
}

/// Candidate source URIs for a locator, in the order they should be tried.
pub fn resolve_candidates(locator: &str) -> Vec<String> {
    let folder = locator.trim_end_matches('/');
    let name = folder.rsplit('/').next().unwrap_or(folder);
    vec![
        format!("{folder}/{name}.gltf"),
        format!("{folder}/scene.gltf"),
        format!("{folder}/model.gltf"),
        format!("{folder}/model.glb"),
    ]
}

/// Locators referenced by more than one path.
pub fn shared_locators() -> BTreeSet<&'static str> {
    let low: BTreeSet<_> = LOW_MASS_STAGES.iter().map(|stage| stage.locator).collect();
    HIGH_MASS_STAGES.iter().map(|stage| stage.locator).filter(|locator| low.contains(locator)).collect()
}

pub fn unique_locator_count() -> usize {
    StellarPath::ALL
        .iter()
        .flat_map(|path| path.stages().iter().map(|stage| stage.locator))
        .collect::<BTreeSet<_>>()
        .len()
}

pub fn validate_mass(mass: f32) -> Result<f32> {
    if !mass.is_finite() {
        bail!("Stellar mass must be a finite number.");
    }
    if mass < MIN_STELLAR_MASS {
        bail!("Minimum stellar mass is {MIN_STELLAR_MASS} M☉ (brown dwarf limit).");
    }
    if mass > MAX_STELLAR_MASS {
        bail!("Maximum stellar mass is {MAX_STELLAR_MASS} M☉ (Eddington limit).");
    }
    Ok(mass)
}

pub fn format_duration_years(years: f64) -> String {
    const UNITS: [(f64, &str); 4] =
        [(1e12, "trillion"), (1e9, "billion"), (1e6, "million"), (1e3, "thousand")];
    for (scale, unit) in UNITS {
        if years >= scale {
            return format!("{:.0} {unit} yrs", years / scale);
        }
    }
    format!("{years} yrs")
}

/// Colour used for the generated sphere when every source for a stage fails.
pub fn placeholder_color(stage_id: &str) -> u32 {
    match stage_id {
        "nebula" => 0x8844cc,
        "protostar" => 0xff6622,
        "main_sequence" => 0xffffaa,
        "main_sequence2" => 0x88ccff,
        "red_giant" => 0xff2200,
        "red_supergiant" => 0xff1100,
        "white_dwarf" => 0xaaccff,
        "supernova" => 0xffffff,
        _ => 0xffffff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mass_threshold_selects_branch() {
        assert_eq!(StellarPath::for_mass(0.5), StellarPath::LowMass);
        assert_eq!(StellarPath::for_mass(8.0), StellarPath::LowMass);
        assert_eq!(StellarPath::for_mass(8.01), StellarPath::HighMass);
        assert_eq!(StellarPath::for_mass(40.0), StellarPath::HighMass);
    }

    #[test]
    fn stage_ids_are_unique_within_each_path() {
        for path in StellarPath::ALL {
            let ids: BTreeSet<_> = path.stages().iter().map(|stage| stage.id).collect();
            assert_eq!(ids.len(), path.stages().len(), "{path:?} has duplicate ids");
        }
    }

    #[test]
    fn first_two_stages_share_locators() {
        let shared = shared_locators();
        assert_eq!(shared.len(), 2);
        for index in 0..2 {
            assert_eq!(LOW_MASS_STAGES[index].locator, HIGH_MASS_STAGES[index].locator);
            assert!(shared.contains(LOW_MASS_STAGES[index].locator));
        }
        assert_eq!(unique_locator_count(), LOW_MASS_STAGES.len() + HIGH_MASS_STAGES.len() - shared.len());
    }

    #[test]
    fn candidates_follow_folder_name_then_fallbacks() {
        let candidates = resolve_candidates("3d_models/RedGiant/");
        assert_eq!(
            candidates,
            vec![
                "3d_models/RedGiant/RedGiant.gltf",
                "3d_models/RedGiant/scene.gltf",
                "3d_models/RedGiant/model.gltf",
                "3d_models/RedGiant/model.glb",
            ]
        );
    }

    #[test]
    fn mass_validation_enforces_physical_limits() {
        assert!(validate_mass(1.0).is_ok());
        let low = validate_mass(0.01).unwrap_err();
        assert!(low.to_string().contains("brown dwarf"));
        let high = validate_mass(151.0).unwrap_err();
        assert!(high.to_string().contains("Eddington"));
        assert!(validate_mass(f32::NAN).is_err());
    }

    #[test]
    fn durations_format_with_largest_unit() {
        assert_eq!(format_duration_years(10_000_000.0), "10 million yrs");
        assert_eq!(format_duration_years(100_000.0), "100 thousand yrs");
        assert_eq!(format_duration_years(1_000_000_000_000.0), "1 trillion yrs");
        assert_eq!(format_duration_years(10_000_000_000.0), "10 billion yrs");
        assert_eq!(format_duration_years(500.0), "500 yrs");
    }
}
