//! Perception pass: what each agent sees, and what its squad tells it.
//!
//! Snapshot every agent first, then write beliefs. Squads aggregate the
//! fresh beliefs and publish their signals into member blackboards.

use std::collections::HashMap;

use hecs::{Entity, World};

use firefight_core::components::{Health, Senses, Soldier};
use firefight_core::constants::ALLY_SUPPORT_RADIUS;
use firefight_core::enums::Team;
use firefight_core::types::{AgentId, Position};
use firefight_mind::{Blackboard, Contact, PsychState};
use firefight_terrain::SightQuery;

use crate::roster::Roster;
use crate::squad::{MemberStatus, Squad};

#[derive(Debug, Clone, Copy)]
struct Observed {
    entity: Entity,
    id: AgentId,
    team: Team,
    position: Position,
    alive: bool,
    sight_range: f64,
    blinded: bool,
    effective_fear: f64,
}

struct Sighting {
    contacts: Vec<Contact>,
    visible_allies: usize,
    /// Dead enemies this agent believes in and can now see are down.
    confirmed_dead: Vec<AgentId>,
    sightline: f64,
}

pub fn run<M: SightQuery>(
    world: &mut World,
    map: &M,
    roster: &Roster,
    squads: &mut [Squad],
    tick: u64,
) {
    let agents = observe(world, roster);

    // 1. Sight.
    let mut sightings: Vec<(usize, Sighting)> = Vec::new();
    for (i, me) in agents.iter().enumerate() {
        if !me.alive {
            continue;
        }
        let sees = |pos: &Position| {
            !me.blinded
                && me.position.range_to(pos) <= me.sight_range
                && map.has_clear_shot(&me.position, pos)
        };

        let contacts = agents
            .iter()
            .filter(|o| o.alive && o.team != me.team && sees(&o.position))
            .map(|o| Contact {
                id: o.id,
                position: o.position,
            })
            .collect();

        let visible_allies = agents
            .iter()
            .filter(|o| o.alive && o.team == me.team && o.id != me.id)
            .filter(|o| me.position.range_to(&o.position) <= ALLY_SUPPORT_RADIUS)
            .filter(|o| map.has_line_of_sight(&me.position, &o.position))
            .count();

        let believed: Vec<AgentId> = world
            .get::<&Blackboard>(me.entity)
            .map(|bb| bb.threats.iter().map(|f| f.source).collect())
            .unwrap_or_default();
        let confirmed_dead = agents
            .iter()
            .filter(|o| !o.alive && believed.contains(&o.id) && sees(&o.position))
            .map(|o| o.id)
            .collect();

        sightings.push((
            i,
            Sighting {
                contacts,
                visible_allies,
                confirmed_dead,
                sightline: map.sightline_score(&me.position),
            },
        ));
    }

    // 2. Beliefs.
    let mut status: HashMap<AgentId, MemberStatus> = HashMap::new();
    for agent in &agents {
        status.insert(
            agent.id,
            MemberStatus {
                alive: agent.alive,
                position: agent.position,
                effective_fear: agent.effective_fear,
                sees_enemy: false,
            },
        );
    }
    for (i, sighting) in sightings {
        let me = &agents[i];
        let Ok(mut bb) = world.get::<&mut Blackboard>(me.entity) else {
            continue;
        };
        bb.update_threats(&sighting.contacts, tick);
        for id in &sighting.confirmed_dead {
            bb.forget(*id);
        }

        bb.visible_allies = sighting.visible_allies;
        bb.isolation_ticks = if sighting.visible_allies == 0 {
            bb.isolation_ticks.saturating_add(1)
        } else {
            0
        };
        bb.cover_defence = bb
            .threat_focus(&me.position)
            .and_then(|threat| map.cover_against(&me.position, &threat))
            .map(|cover| cover.defence);
        bb.local_sightline = sighting.sightline;

        if let Some(s) = status.get_mut(&me.id) {
            s.sees_enemy = !sighting.contacts.is_empty();
        }
    }

    // 3. Squad signals.
    for squad in squads.iter_mut() {
        squad.refresh(|id| status.get(&id).copied());

        let mut slot = 0;
        for &member in &squad.members {
            let Some(entity) = roster.entity(member) else {
                continue;
            };
            if !status.get(&member).is_some_and(|s| s.alive) {
                continue;
            }
            let signals = squad.signals_for(member, slot);
            if !signals.is_leader {
                slot += 1;
            }
            if let Ok(mut bb) = world.get::<&mut Blackboard>(entity) {
                bb.squad = signals;
            }
        }
    }
}

fn observe(world: &World, roster: &Roster) -> Vec<Observed> {
    roster
        .iter()
        .filter_map(|(id, entity)| {
            let soldier = world.get::<&Soldier>(entity).ok()?;
            let position = *world.get::<&Position>(entity).ok()?;
            let health = world.get::<&Health>(entity).ok()?;
            let senses = world.get::<&Senses>(entity).ok()?;
            let psych = world.get::<&PsychState>(entity).ok()?;
            Some(Observed {
                entity,
                id,
                team: soldier.team,
                position,
                alive: health.is_alive(),
                sight_range: senses.sight_range,
                blinded: senses.blinded_ticks > 0,
                effective_fear: psych.effective_fear(),
            })
        })
        .collect()
}
