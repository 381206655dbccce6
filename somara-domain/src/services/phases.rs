//! Phase editing on a class document.
//!
//! Introduction and integration phases bracket every class: they are created
//! with the class, cannot be added twice, deleted or moved, and every other
//! phase stays between them.

use uuid::Uuid;

use crate::entities::class::{BreathworkClass, BreathworkPhase, PhaseChanges, PhaseType};
use crate::entities::rhythm::BreathingRhythm;
use super::timeline::TimelineError;

/// Minutes given to the opening phase of a new class
pub const INTRODUCTION_MINUTES: u32 = 3;
/// Minutes given to the closing phase of a new class
pub const INTEGRATION_MINUTES: u32 = 5;
/// Minutes given to any phase added by the user
pub const NEW_PHASE_MINUTES: u32 = 5;

fn new_phase(phase_type: PhaseType, duration: u32) -> BreathworkPhase {
    BreathworkPhase {
        id: Uuid::new_v4().to_string(),
        phase_type,
        name: phase_type.default_name().to_string(),
        duration,
        breathing_rhythm: None,
        breath_hold_duration: None,
        custom_type_name: None,
        grounding_instructions: None,
        tracks: None,
    }
}

/// Give an empty class its introduction and integration phases.
///
/// Returns whether phases were added.
pub fn ensure_default_phases(class: &mut BreathworkClass) -> bool {
    let added = class.phases.is_empty();
    if added {
        class.phases = vec![
            new_phase(PhaseType::Introduction, INTRODUCTION_MINUTES),
            new_phase(PhaseType::Integration, INTEGRATION_MINUTES),
        ];
    }
    recompute_total_duration(class);
    added
}

/// Sum of phase durations in minutes
pub fn total_duration(phases: &[BreathworkPhase]) -> u32 {
    phases.iter().map(|p| p.duration).sum()
}

pub fn recompute_total_duration(class: &mut BreathworkClass) {
    class.total_duration = total_duration(&class.phases);
}

/// Rename breathing phases to "Breathing Round N" in class order
pub fn renumber_breathing_phases(phases: &mut [BreathworkPhase]) {
    phases
        .iter_mut()
        .filter(|p| p.phase_type == PhaseType::Breathing)
        .enumerate()
        .for_each(|(i, phase)| phase.name = format!("Breathing Round {}", i + 1));
}

fn index_of(class: &BreathworkClass, id: &str) -> Result<usize, TimelineError> {
    class
        .phases
        .iter()
        .position(|p| p.id == id)
        .ok_or_else(|| TimelineError::PhaseNotFound(id.to_string()))
}

fn index_of_type(class: &BreathworkClass, phase_type: PhaseType) -> Option<usize> {
    class.phases.iter().position(|p| p.phase_type == phase_type)
}

fn finish_edit(class: &mut BreathworkClass) {
    renumber_breathing_phases(&mut class.phases);
    recompute_total_duration(class);
}

/// Add a phase just before the integration phase
pub fn add_phase(class: &mut BreathworkClass, phase_type: PhaseType) -> Result<BreathworkPhase, TimelineError> {
    if phase_type.is_fixed() {
        return Err(TimelineError::FixedPhase("added"));
    }

    let mut phase = new_phase(phase_type, NEW_PHASE_MINUTES);
    if phase_type == PhaseType::Breathing {
        phase.breathing_rhythm = Some(BreathingRhythm::default());
    }
    let id = phase.id.clone();

    match index_of_type(class, PhaseType::Integration) {
        Some(index) => class.phases.insert(index, phase),
        None => class.phases.push(phase),
    }
    finish_edit(class);

    let index = index_of(class, &id)?;
    Ok(class.phases[index].clone())
}

/// Merge edits into a phase
pub fn update_phase(class: &mut BreathworkClass, id: &str, changes: PhaseChanges) -> Result<BreathworkPhase, TimelineError> {
    let index = index_of(class, id)?;
    {
        let phase = &mut class.phases[index];
        if let Some(name) = changes.name {
            phase.name = name;
        }
        if let Some(duration) = changes.duration {
            phase.duration = duration;
        }
        if let Some(rhythm) = changes.breathing_rhythm {
            phase.breathing_rhythm = Some(rhythm);
        }
        if let Some(hold) = changes.breath_hold_duration {
            phase.breath_hold_duration = Some(hold);
        }
        if let Some(custom) = changes.custom_type_name {
            phase.custom_type_name = Some(custom);
        }
        if let Some(instructions) = changes.grounding_instructions {
            phase.grounding_instructions = Some(instructions);
        }
    }
    finish_edit(class);
    Ok(class.phases[index].clone())
}

/// Remove a phase that is not introduction or integration
pub fn delete_phase(class: &mut BreathworkClass, id: &str) -> Result<(), TimelineError> {
    let index = index_of(class, id)?;
    if class.phases[index].phase_type.is_fixed() {
        return Err(TimelineError::FixedPhase("deleted"));
    }
    class.phases.remove(index);
    finish_edit(class);
    Ok(())
}

/// Move `active_id` to the position of `over_id`, keeping it between the
/// introduction and integration phases
pub fn reorder_phase(class: &mut BreathworkClass, active_id: &str, over_id: &str) -> Result<(), TimelineError> {
    let active_index = index_of(class, active_id)?;
    let over_index = index_of(class, over_id)?;

    if class.phases[active_index].phase_type.is_fixed() || class.phases[over_index].phase_type.is_fixed() {
        return Err(TimelineError::FixedPhase("moved"));
    }
    if active_index == over_index {
        return Ok(());
    }

    let mut new_index = over_index;
    if let Some(intro) = index_of_type(class, PhaseType::Introduction) {
        if new_index <= intro {
            new_index = intro + 1;
        }
    }
    if let Some(integration) = index_of_type(class, PhaseType::Integration) {
        if new_index >= integration {
            new_index = integration.saturating_sub(1);
        }
    }

    let phase = class.phases.remove(active_index);
    let new_index = new_index.min(class.phases.len());
    class.phases.insert(new_index, phase);

    finish_edit(class);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn class_with_defaults() -> BreathworkClass {
        let mut class = BreathworkClass::new("c1");
        ensure_default_phases(&mut class);
        class
    }

    fn names(class: &BreathworkClass) -> Vec<&str> {
        class.phases.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_new_class_gets_fixed_phases() {
        let class = class_with_defaults();
        assert_eq!(names(&class), vec!["Introduction", "Integration"]);
        assert_eq!(class.total_duration, 8);
    }

    #[test]
    fn test_existing_phases_are_kept() {
        let mut class = class_with_defaults();
        add_phase(&mut class, PhaseType::Grounding).unwrap();
        assert!(!ensure_default_phases(&mut class));
        assert_eq!(class.phases.len(), 3);
    }

    #[test]
    fn test_add_phase_inserts_before_integration_and_numbers_rounds() {
        let mut class = class_with_defaults();
        let first = add_phase(&mut class, PhaseType::Breathing).unwrap();
        add_phase(&mut class, PhaseType::Grounding).unwrap();
        add_phase(&mut class, PhaseType::Breathing).unwrap();

        assert_eq!(
            names(&class),
            vec!["Introduction", "Breathing Round 1", "Grounding", "Breathing Round 2", "Integration"]
        );
        assert_eq!(first.duration, NEW_PHASE_MINUTES);
        assert_eq!(first.breathing_rhythm, Some(BreathingRhythm::default()));
        assert_eq!(class.total_duration, 3 + 5 + 5 + 5 + 5);
    }

    #[test]
    fn test_fixed_phases_cannot_be_added_or_deleted() {
        let mut class = class_with_defaults();
        assert!(matches!(
            add_phase(&mut class, PhaseType::Introduction),
            Err(TimelineError::FixedPhase(_))
        ));

        let intro_id = class.phases[0].id.clone();
        assert!(matches!(
            delete_phase(&mut class, &intro_id),
            Err(TimelineError::FixedPhase(_))
        ));
    }

    #[test]
    fn test_delete_renumbers_breathing_rounds() {
        let mut class = class_with_defaults();
        let first = add_phase(&mut class, PhaseType::Breathing).unwrap();
        add_phase(&mut class, PhaseType::Breathing).unwrap();

        delete_phase(&mut class, &first.id).unwrap();
        assert_eq!(names(&class), vec!["Introduction", "Breathing Round 1", "Integration"]);
        assert_eq!(class.total_duration, 13);
    }

    #[test]
    fn test_update_phase_merges_and_recomputes_total() {
        let mut class = class_with_defaults();
        let grounding = add_phase(&mut class, PhaseType::Grounding).unwrap();

        let updated = update_phase(
            &mut class,
            &grounding.id,
            PhaseChanges {
                duration: Some(10),
                grounding_instructions: Some("Feel your feet".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(updated.duration, 10);
        assert_eq!(updated.name, "Grounding");
        assert_eq!(class.total_duration, 18);

        assert!(matches!(
            update_phase(&mut class, "missing", PhaseChanges::default()),
            Err(TimelineError::PhaseNotFound(_))
        ));
    }

    #[test]
    fn test_reorder_moves_between_fixed_phases() {
        let mut class = class_with_defaults();
        let a = add_phase(&mut class, PhaseType::Grounding).unwrap();
        let b = add_phase(&mut class, PhaseType::Breathing).unwrap();
        let c = add_phase(&mut class, PhaseType::Custom).unwrap();

        reorder_phase(&mut class, &c.id, &a.id).unwrap();
        assert_eq!(
            names(&class),
            vec!["Introduction", "Custom", "Grounding", "Breathing Round 1", "Integration"]
        );

        reorder_phase(&mut class, &c.id, &b.id).unwrap();
        assert_eq!(
            names(&class),
            vec!["Introduction", "Grounding", "Breathing Round 1", "Custom", "Integration"]
        );
    }

    #[test]
    fn test_reorder_rejects_fixed_phases() {
        let mut class = class_with_defaults();
        let a = add_phase(&mut class, PhaseType::Grounding).unwrap();
        let integration_id = class.phases.last().unwrap().id.clone();

        assert!(matches!(
            reorder_phase(&mut class, &a.id, &integration_id),
            Err(TimelineError::FixedPhase(_))
        ));
    }
}
