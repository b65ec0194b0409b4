#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use firefight_core::config::DecisionTuning;
    use firefight_core::constants::*;
    use firefight_core::enums::{Goal, SoldierArchetype};
    use firefight_core::types::{AgentId, Position};

    use crate::blackboard::{Blackboard, Contact};
    use crate::commitment::{CommitPhase, EvalGate};
    use crate::goals::{decide, score_goals, DecisionContext, DecisionReason};
    use crate::profiles::get_profile;
    use crate::psych::{MoraleContext, PsychState};

    fn psych(fear: f64, composure: f64, experience: f64) -> PsychState {
        PsychState {
            fear,
            morale: 0.6,
            composure,
            experience,
        }
    }

    /// A calm agent with one enemy in view at 150px.
    fn make_context(tick: u64, effective_fear: f64) -> DecisionContext {
        DecisionContext {
            tick,
            effective_fear,
            morale: 0.7,
            health_fraction: 1.0,
            aggression: 0.5,
            discipline: 0.5,
            visible_threats: 1,
            nearest_threat_distance: Some(150.0),
            has_last_known: false,
            leader_distance: None,
            objective_distance: 400.0,
        }
    }

    fn quiet_context(tick: u64) -> DecisionContext {
        DecisionContext {
            visible_threats: 0,
            nearest_threat_distance: None,
            ..make_context(tick, 0.0)
        }
    }

    // ---- Psychological model ----

    proptest! {
        #[test]
        fn prop_stress_keeps_fear_in_unit_range(start in 0.0f64..=1.0, s in 0.0f64..10.0) {
            let mut p = psych(start, 0.5, 0.5);
            p.apply_stress(s);
            prop_assert!((0.0..=1.0).contains(&p.fear));
            prop_assert!(p.fear >= start);
        }

        #[test]
        fn prop_effective_fear_monotonic(a in 0.0f64..=1.0, b in 0.0f64..=1.0,
                                         composure in 0.0f64..=1.0, experience in 0.0f64..=1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let low = psych(lo, composure, experience).effective_fear();
            let high = psych(hi, composure, experience).effective_fear();
            prop_assert!(low <= high);
        }

        #[test]
        fn prop_morale_stays_in_unit_range(morale in 0.0f64..=1.0, incoming in 0u32..20,
                                           suppression in 0.0f64..=1.0, isolation in 0u32..500,
                                           under_fire: bool, discipline in 0.0f64..=1.0) {
            let mut p = PsychState { morale, ..psych(0.5, 0.5, 0.5) };
            let ctx = MoraleContext {
                under_fire,
                incoming_fire: incoming,
                suppression,
                isolation_ticks: isolation,
                squad_casualty_rate: 1.0,
                squad_stress: 1.0,
                ..Default::default()
            };
            for _ in 0..200 {
                p.update_morale(DT, discipline, &ctx);
            }
            prop_assert!((0.0..=1.0).contains(&p.morale));
            prop_assert!((0.0..=1.0).contains(&p.fear));
        }
    }

    #[test]
    fn test_composure_and_experience_dampen_fear() {
        let steady = psych(0.6, 1.0, 1.0).effective_fear();
        let green = psych(0.6, 0.0, 0.0).effective_fear();
        assert!(steady < green);
        assert_eq!(green, 0.6);
    }

    #[test]
    fn test_recover_fear_never_undershoots() {
        let mut p = psych(0.05, 1.0, 1.0);
        p.morale = 1.0;
        for _ in 0..10_000 {
            p.recover_fear(1.0);
            assert!(p.fear >= 0.0);
        }
        assert_eq!(p.fear, 0.0);
    }

    #[test]
    fn test_recovery_faster_with_composure() {
        let mut calm = psych(0.5, 1.0, 0.0);
        let mut jumpy = psych(0.5, 0.0, 0.0);
        calm.recover_fear(1.0);
        jumpy.recover_fear(1.0);
        assert!(calm.fear < jumpy.fear);
    }

    #[test]
    fn test_critical_morale_under_fire_feeds_fear() {
        let mut p = PsychState {
            morale: 0.05,
            ..psych(0.2, 0.0, 0.0)
        };
        let ctx = MoraleContext {
            under_fire: true,
            incoming_fire: 3,
            ..Default::default()
        };
        p.update_morale(1.0, 0.0, &ctx);
        assert!(p.fear > 0.2, "panic nudge should raise fear, got {}", p.fear);
    }

    #[test]
    fn test_high_morale_calm_accelerates_recovery() {
        let ctx = MoraleContext {
            visible_allies: 3,
            ..Default::default()
        };
        let mut confident = PsychState {
            morale: 0.9,
            ..psych(0.5, 0.5, 0.0)
        };
        let mut reference = confident;
        confident.update_morale(1.0, 0.5, &ctx);
        reference.morale = 0.5;
        reference.update_morale(1.0, 0.5, &ctx);
        assert!(confident.fear < reference.fear);
    }

    #[test]
    fn test_pressure_and_isolation_erode_morale() {
        let mut p = PsychState {
            morale: 0.6,
            ..psych(0.0, 0.5, 0.5)
        };
        let ctx = MoraleContext {
            under_fire: true,
            incoming_fire: 4,
            suppression: 0.7,
            visible_threats: 4,
            isolation_ticks: 300,
            squad_casualty_rate: 0.5,
            ..Default::default()
        };
        p.update_morale(2.0, 0.2, &ctx);
        assert!(p.morale < 0.6);
    }

    #[test]
    fn test_profiles_are_normalised() {
        for archetype in [
            SoldierArchetype::Rifleman,
            SoldierArchetype::Recruit,
            SoldierArchetype::Veteran,
            SoldierArchetype::Marksman,
            SoldierArchetype::Gunner,
        ] {
            let p = get_profile(archetype);
            for v in [
                p.aggression,
                p.discipline,
                p.marksmanship,
                p.composure,
                p.experience,
                p.fieldcraft,
            ] {
                assert!((0.0..=1.0).contains(&v), "{archetype:?} out of range");
            }
        }
        let vet = PsychState::from_profile(&get_profile(SoldierArchetype::Veteran));
        let rec = PsychState::from_profile(&get_profile(SoldierArchetype::Recruit));
        assert!(vet.morale > rec.morale);
    }

    // ---- Blackboard ----

    #[test]
    fn test_threats_retained_after_visibility_loss() {
        let mut bb = Blackboard::default();
        let contact = Contact {
            id: AgentId(7),
            position: Position::new(50.0, 0.0),
        };
        bb.update_threats(&[contact], 10);
        assert_eq!(bb.visible_count(), 1);

        bb.update_threats(&[], 11);
        assert_eq!(bb.threats.len(), 1);
        assert!(!bb.threats[0].is_visible);
        assert_eq!(bb.last_known().map(|f| f.position), Some(Position::new(50.0, 0.0)));

        bb.update_threats(&[], 10 + THREAT_STALE_TICKS);
        assert_eq!(bb.threats.len(), 1);
        assert!(bb.threats[0].confidence < 0.1);

        bb.update_threats(&[], 11 + THREAT_STALE_TICKS);
        assert!(bb.threats.is_empty(), "stale belief should be dropped");
    }

    #[test]
    fn test_threat_upsert_refreshes_position() {
        let mut bb = Blackboard::default();
        bb.update_threats(
            &[Contact {
                id: AgentId(1),
                position: Position::new(1.0, 1.0),
            }],
            1,
        );
        bb.update_threats(&[], 5);
        bb.update_threats(
            &[Contact {
                id: AgentId(1),
                position: Position::new(9.0, 9.0),
            }],
            6,
        );
        assert_eq!(bb.threats.len(), 1);
        assert_eq!(bb.threats[0].position, Position::new(9.0, 9.0));
        assert_eq!(bb.threats[0].confidence, 1.0);
        assert_eq!(bb.threats[0].last_seen_tick, 6);
    }

    #[test]
    fn test_hearing_never_downgrades_visible_belief() {
        let mut bb = Blackboard::default();
        bb.update_threats(
            &[Contact {
                id: AgentId(3),
                position: Position::new(10.0, 0.0),
            }],
            1,
        );
        bb.hear_gunfire(AgentId(3), Position::new(99.0, 99.0), 0.2, 1);
        assert!(bb.threats[0].is_visible);
        assert_eq!(bb.threats[0].position, Position::new(10.0, 0.0));

        bb.hear_gunfire(AgentId(4), Position::new(0.0, 80.0), 0.4, 2);
        let heard = bb.threats.iter().find(|f| f.source == AgentId(4)).unwrap();
        assert!(!heard.is_visible);
        assert_eq!(heard.confidence, 0.4);
    }

    #[test]
    fn test_nearest_visible_ignores_memories() {
        let mut bb = Blackboard::default();
        bb.update_threats(
            &[Contact {
                id: AgentId(1),
                position: Position::new(5.0, 0.0),
            }],
            1,
        );
        bb.update_threats(
            &[Contact {
                id: AgentId(2),
                position: Position::new(300.0, 0.0),
            }],
            2,
        );
        let nearest = bb.nearest_visible(&Position::default()).unwrap();
        assert_eq!(nearest.source, AgentId(2));
    }

    #[test]
    fn test_pin_edge_adds_shatter_once() {
        let mut bb = Blackboard::default();
        let mut pin_events = 0;
        for _ in 0..10 {
            bb.begin_tick();
            if bb.add_suppression(SUPPRESS_PER_MISS) {
                pin_events += 1;
            }
            bb.decay_suppression(DT);
        }
        assert!(bb.pinned);
        assert_eq!(pin_events, 1);
        assert!((bb.commitment.shatter_pressure - SHATTER_ON_PIN).abs() < 1e-12);
    }

    #[test]
    fn test_pin_latch_releases_below_release_level() {
        let mut bb = Blackboard::default();
        assert!(bb.add_suppression(1.0));
        bb.decay_suppression(0.5);
        assert!(bb.pinned, "still above release level");
        bb.decay_suppression(10.0);
        assert!(!bb.pinned);
        assert_eq!(bb.suppress_level, 0.0);
        assert!(bb.add_suppression(1.0), "a fresh crossing pins again");
    }

    #[test]
    fn test_incoming_fire_weighted_for_passive_goals() {
        let mut active = Blackboard {
            current_goal: Goal::Engage,
            ..Default::default()
        };
        let mut passive = Blackboard {
            current_goal: Goal::HoldPosition,
            ..Default::default()
        };
        active.register_incoming();
        passive.register_incoming();
        assert!(passive.commitment.shatter_pressure > active.commitment.shatter_pressure);
        assert_eq!(active.incoming_fire, 1);

        active.begin_tick();
        assert_eq!(active.incoming_fire, 0);
        assert_eq!(active.last_incoming, 1);
        assert!(active.under_fire());
    }

    #[test]
    fn test_pull_bookkeeping_moves_momentum() {
        let mut bb = Blackboard::default();
        bb.record_pull(2);
        bb.record_pull(1);
        assert_eq!(bb.hit_streak, 2);
        assert!(bb.shot_momentum > 0.0);
        bb.record_pull(0);
        assert_eq!(bb.hit_streak, 0);
        assert_eq!(bb.miss_streak, 1);
    }

    #[test]
    fn test_path_failure_ema() {
        let mut bb = Blackboard::default();
        for _ in 0..10 {
            bb.record_path_attempt(false);
        }
        assert!(bb.path_failure_ema > 0.8);
        assert!(!bb.path_active);
        bb.record_path_attempt(true);
        assert!(bb.path_active);
        assert!(bb.path_failure_ema < 0.8);
    }

    // ---- Commitment ----

    #[test]
    fn test_commitment_phases_advance() {
        let tuning = DecisionTuning::default();
        let mut bb = Blackboard::default();
        assert_eq!(bb.commitment.gate(0, &tuning), EvalGate::Review);

        bb.commitment.commit(100);
        assert_eq!(bb.commitment.gate(100 + tuning.commit_ticks - 1, &tuning), EvalGate::Hold);
        assert_eq!(bb.commitment.gate(100 + tuning.commit_ticks, &tuning), EvalGate::Hold);
        assert_eq!(bb.commitment.phase, CommitPhase::Sustain);
        let review_at = 100 + tuning.commit_ticks + tuning.sustain_ticks;
        assert_eq!(bb.commitment.gate(review_at, &tuning), EvalGate::Review);
    }

    #[test]
    fn test_shatter_forces_and_resets() {
        let tuning = DecisionTuning::default();
        let mut bb = Blackboard::default();
        bb.commitment.commit(0);
        bb.commitment.add_shatter(tuning.shatter_threshold);
        assert_eq!(bb.commitment.gate(1, &tuning), EvalGate::Shattered);
        assert_eq!(bb.commitment.shatter_pressure, 0.0);
        assert_eq!(bb.commitment.gate(2, &tuning), EvalGate::Hold);
    }

    // ---- Goal selection ----

    #[test]
    fn test_first_decision_engages_visible_enemy() {
        let tuning = DecisionTuning::default();
        let mut bb = Blackboard::default();
        let d = decide(&mut bb, &make_context(0, 0.0), &tuning);
        assert_eq!(d.goal, Goal::Engage);
        assert!(d.changed);
        assert_eq!(bb.previous_goal, Goal::Advance);
        assert_eq!(bb.commitment.phase, CommitPhase::Commit);
    }

    #[test]
    fn test_commit_window_holds_goal() {
        let tuning = DecisionTuning::default();
        let mut bb = Blackboard::default();
        decide(&mut bb, &make_context(0, 0.0), &tuning);
        assert_eq!(bb.current_goal, Goal::Engage);

        // The enemy disappears; inside COMMIT nothing changes.
        for tick in 1..tuning.commit_ticks {
            let d = decide(&mut bb, &quiet_context(tick), &tuning);
            assert_eq!(d.goal, Goal::Engage);
            assert_eq!(d.reason, DecisionReason::Held);
        }
    }

    #[test]
    fn test_shatter_pressure_breaks_commit_window() {
        let tuning = DecisionTuning::default();
        let mut bb = Blackboard::default();
        decide(&mut bb, &make_context(0, 0.0), &tuning);

        for _ in 0..4 {
            bb.register_incoming();
        }
        let mut ctx = quiet_context(2);
        ctx.has_last_known = true;
        let d = decide(&mut bb, &ctx, &tuning);
        assert_eq!(d.reason, DecisionReason::Shattered);
        assert_ne!(d.goal, Goal::Engage);
        assert_eq!(bb.commitment.shatter_pressure, 0.0);
    }

    #[test]
    fn test_shatter_reported_when_goal_survives() {
        let tuning = DecisionTuning::default();
        let mut bb = Blackboard::default();
        decide(&mut bb, &make_context(0, 0.0), &tuning);
        assert_eq!(bb.current_goal, Goal::Engage);

        bb.commitment.add_shatter(tuning.shatter_threshold + 1.0);
        let d = decide(&mut bb, &make_context(2, 0.0), &tuning);
        assert_eq!(d.goal, Goal::Engage);
        assert!(!d.changed);
        assert_eq!(d.reason, DecisionReason::Shattered);
        assert!(bb.shattered);

        bb.begin_tick();
        assert!(!bb.shattered);
    }

    #[test]
    fn test_panic_forces_survive_and_latches() {
        let tuning = DecisionTuning::default();
        let mut bb = Blackboard::default();
        let mut p = psych(0.0, 0.0, 0.0);
        decide(&mut bb, &make_context(0, p.effective_fear()), &tuning);
        assert_eq!(bb.current_goal, Goal::Engage);

        p.fear = 0.95;
        let d = decide(&mut bb, &make_context(1, p.effective_fear()), &tuning);
        assert_eq!(d.goal, Goal::Survive);
        assert_eq!(d.reason, DecisionReason::PanicEntered);

        // Between the thresholds the latch holds, however long it takes.
        p.fear = 0.6;
        for tick in 2..200 {
            let d = decide(&mut bb, &make_context(tick, p.effective_fear()), &tuning);
            assert_eq!(d.goal, Goal::Survive);
            assert_eq!(d.reason, DecisionReason::PanicLocked);
        }

        p.fear = 0.3;
        let d = decide(&mut bb, &make_context(200, p.effective_fear()), &tuning);
        assert!(!bb.panicked);
        assert_eq!(d.goal, Goal::Engage);
    }

    #[test]
    fn test_hysteresis_blocks_marginal_switch() {
        let tuning = DecisionTuning::default();
        let mut bb = Blackboard {
            current_goal: Goal::MoveToContact,
            ..Default::default()
        };
        let mut ctx = quiet_context(0);
        ctx.has_last_known = true;
        let scores = score_goals(&bb, &ctx);
        let mtc = scores.iter().find(|(g, _)| *g == Goal::MoveToContact).unwrap().1;
        assert!(mtc > 0.0);

        // A challenger just under the margin does not unseat the current goal.
        let huge = DecisionTuning {
            hysteresis_margin: 10.0,
            ..tuning
        };
        let mut ctx_visible = make_context(0, 0.0);
        ctx_visible.has_last_known = true;
        let d = decide(&mut bb, &ctx_visible, &huge);
        assert_eq!(d.goal, Goal::MoveToContact);
        assert_eq!(d.reason, DecisionReason::Retained);
    }

    #[test]
    fn test_reinforcement_defers_review() {
        let tuning = DecisionTuning::default();
        let mut bb = Blackboard {
            current_goal: Goal::Engage,
            shot_momentum: 0.5,
            cover_defence: Some(0.6),
            ..Default::default()
        };
        let d = decide(&mut bb, &make_context(500, 0.0), &tuning);
        assert_eq!(d.reason, DecisionReason::Reinforced);
        assert_eq!(bb.commitment.phase, CommitPhase::Sustain);
    }

    #[test]
    fn test_defaults_to_advance_when_nothing_qualifies() {
        let tuning = DecisionTuning::default();
        let mut bb = Blackboard {
            current_goal: Goal::HoldPosition,
            path_failure_ema: 1.0,
            ..Default::default()
        };
        let ctx = DecisionContext {
            nearest_threat_distance: Some(MAX_FIRE_RANGE * 2.0),
            ..make_context(0, 0.0)
        };
        let d = decide(&mut bb, &ctx, &tuning);
        assert_eq!(d.goal, Goal::Advance);
        assert_eq!(d.reason, DecisionReason::Defaulted);
    }

    #[test]
    fn test_move_to_contact_from_memory() {
        let tuning = DecisionTuning::default();
        let mut bb = Blackboard::default();
        let mut ctx = quiet_context(0);
        ctx.has_last_known = true;
        let d = decide(&mut bb, &ctx, &tuning);
        assert_eq!(d.goal, Goal::MoveToContact);
    }
}
