//! Archetype-specific soldier profiles.

use firefight_core::components::SoldierProfile;
use firefight_core::enums::SoldierArchetype;

/// Get the profile for a given archetype.
pub fn get_profile(archetype: SoldierArchetype) -> SoldierProfile {
    match archetype {
        SoldierArchetype::Rifleman => SoldierProfile::default(),
        SoldierArchetype::Recruit => SoldierProfile {
            aggression: 0.4,
            discipline: 0.25,
            marksmanship: 0.3,
            composure: 0.2,
            experience: 0.0,
            fieldcraft: 0.3,
        },
        SoldierArchetype::Veteran => SoldierProfile {
            aggression: 0.6,
            discipline: 0.8,
            marksmanship: 0.7,
            composure: 0.8,
            experience: 0.9,
            fieldcraft: 0.8,
        },
        SoldierArchetype::Marksman => SoldierProfile {
            aggression: 0.35,
            discipline: 0.85,
            marksmanship: 0.95,
            composure: 0.7,
            experience: 0.6,
            fieldcraft: 0.7,
        },
        // Suppressive role: eager trigger, loose groups.
        SoldierArchetype::Gunner => SoldierProfile {
            aggression: 0.75,
            discipline: 0.5,
            marksmanship: 0.4,
            composure: 0.6,
            experience: 0.4,
            fieldcraft: 0.4,
        },
    }
}
