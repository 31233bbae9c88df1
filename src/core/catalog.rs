//! Fixed lookup tables the story templates are built from.

use crate::core::state::{Lens, LensShot, ShotSize};

pub const SETTINGS: [&str; 8] = [
    "a remote desert weigh-station",
    "an eerie, underfunded hospital basement",
    "a sprawling, automated warehouse on the outskirts of town",
    "a forgotten subway maintenance tunnel",
    "a high-voltage power substation in a desolate area",
    "a clinical, sterile research lab after hours",
    "a run-down motel on a lonely highway",
    "a small town's empty library at midnight",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleProfile {
    pub role: &'static str,
    pub job_title: &'static str,
    pub wardrobe: &'static str,
}

/// One profile per entry of [`SETTINGS`], in the same order.
pub const ROLE_PROFILES: [(&str, RoleProfile); 8] = [
    (
        "a remote desert weigh-station",
        RoleProfile {
            role: "night-shift weigh station operator",
            job_title: "Operator",
            wardrobe: "a worn field jacket over a uniform shirt",
        },
    ),
    (
        "an eerie, underfunded hospital basement",
        RoleProfile {
            role: "late-night morgue attendant",
            job_title: "Attendant",
            wardrobe: "standard-issue medical scrubs",
        },
    ),
    (
        "a sprawling, automated warehouse on the outskirts of town",
        RoleProfile {
            role: "lone overnight inventory technician",
            job_title: "Technician",
            wardrobe: "a high-visibility safety vest over a work uniform",
        },
    ),
    (
        "a forgotten subway maintenance tunnel",
        RoleProfile {
            role: "solitary track maintenance worker",
            job_title: "Worker",
            wardrobe: "heavy-duty coveralls and a hard hat",
        },
    ),
    (
        "a high-voltage power substation in a desolate area",
        RoleProfile {
            role: "night-shift substation technician",
            job_title: "Technician",
            wardrobe: "a flame-retardant utility uniform",
        },
    ),
    (
        "a clinical, sterile research lab after hours",
        RoleProfile {
            role: "junior lab assistant on cleanup duty",
            job_title: "Assistant",
            wardrobe: "a pristine white lab coat",
        },
    ),
    (
        "a run-down motel on a lonely highway",
        RoleProfile {
            role: "night manager of a secluded motel",
            job_title: "Manager",
            wardrobe: "a slightly frayed blazer over a collared shirt",
        },
    ),
    (
        "a small town's empty library at midnight",
        RoleProfile {
            role: "overnight security guard at the municipal archive",
            job_title: "Guard",
            wardrobe: "a crisp security guard uniform",
        },
    ),
];

/// Exact-match lookup of the profile for a setting.
pub fn role_profile(setting: &str) -> Option<&'static RoleProfile> {
    ROLE_PROFILES
        .iter()
        .find(|(s, _)| *s == setting)
        .map(|(_, profile)| profile)
}

pub const LENS_PATTERN: [LensShot; 4] = [
    LensShot { lens: Lens::Wide24, shot_size: ShotSize::Wide },
    LensShot { lens: Lens::Normal35, shot_size: ShotSize::Medium },
    LensShot { lens: Lens::Portrait85, shot_size: ShotSize::CloseUp },
    LensShot { lens: Lens::Macro100, shot_size: ShotSize::Macro },
];

pub const NEGATIVE_PROMPTS: &str = "cartoon, overexposed, saturated colors, text overlay, harsh shadows, flat lighting, fantasy armor, anime lines, smiling faces, cluttered background, out-of-frame composition, low-res, motion blur, double exposure, watermark, logo, text artifacts, mutated hands, extra fingers, deformed limbs, duplicate face.";
