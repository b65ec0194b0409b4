//! Battle engine: the core of the simulation.
//!
//! `BattleEngine` owns the hecs ECS world, the map and squads, processes
//! external commands, runs all systems in a fixed order, and produces
//! `BattleSnapshot`s. Completely headless, enabling deterministic testing.

use std::collections::VecDeque;

use hecs::{Entity, World};

use firefight_core::commands::BattleCommand;
use firefight_core::components::{Health, Soldier};
use firefight_core::config::SimConfig;
use firefight_core::enums::{BattlePhase, Team};
use firefight_core::error::{Result, SimError};
use firefight_core::state::BattleSnapshot;
use firefight_core::types::{AgentId, Position, SimTime, SquadId};
use firefight_terrain::{BattleMap, NavGrid};

use crate::effects::{EffectBuffers, ScoreState};
use crate::roster::Roster;
use crate::scenario::Scenario;
use crate::squad::Squad;
use crate::systems;
use crate::systems::fire_control::FireEnv;
use crate::world_setup;

/// The battle engine. Owns the ECS world and all sim state.
pub struct BattleEngine {
    world: World,
    time: SimTime,
    phase: BattlePhase,
    config: SimConfig,
    map: BattleMap,
    nav: NavGrid,
    roster: Roster,
    squads: Vec<Squad>,
    command_queue: VecDeque<BattleCommand>,
    effects: EffectBuffers,
    score: ScoreState,
    scenario_name: String,
}

impl BattleEngine {
    /// Create an empty engine. Load a scenario before starting the battle.
    pub fn new(config: SimConfig) -> Self {
        let map = BattleMap::default();
        let nav = NavGrid::from_map(&map);
        Self {
            world: World::new(),
            time: SimTime::default(),
            phase: BattlePhase::default(),
            config,
            map,
            nav,
            roster: Roster::default(),
            squads: Vec::new(),
            command_queue: VecDeque::new(),
            effects: EffectBuffers::default(),
            score: ScoreState::default(),
            scenario_name: String::new(),
        }
    }

    /// Replace the battlefield with `scenario` and return to Setup.
    pub fn load_scenario(&mut self, scenario: Scenario) -> Result<()> {
        scenario.validate()?;

        self.world.clear();
        self.roster.clear();
        self.squads.clear();
        self.effects.clear();
        self.score = ScoreState::default();
        self.time = SimTime::default();
        self.phase = BattlePhase::Setup;

        for spec in &scenario.squads {
            let mut members = Vec::with_capacity(spec.members.len());
            for agent in &spec.members {
                let entity = world_setup::spawn_agent(&mut self.world, agent, spec.team, spec.id);
                self.roster.insert(agent.id, entity)?;
                members.push(agent.id);
            }
            self.squads.push(Squad::new(spec.id, spec.team, members));
        }

        self.nav = NavGrid::from_map(&scenario.map);
        self.map = scenario.map;
        self.scenario_name = scenario.name;

        tracing::info!(
            scenario = %self.scenario_name,
            agents = self.roster.len(),
            squads = self.squads.len(),
            seed = self.config.seed,
            "scenario loaded"
        );
        Ok(())
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: BattleCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = BattleCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the battle by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> BattleSnapshot {
        self.process_commands();

        if self.phase == BattlePhase::Active {
            self.run_systems();
            self.time.advance();
        }

        systems::snapshot::build_snapshot(
            &self.world,
            &self.roster,
            &self.squads,
            &self.time,
            self.phase,
            &mut self.effects,
            &self.score,
        )
    }

    /// Give a squad a destination, replacing any earlier order.
    pub fn assign_move_order(&mut self, squad: SquadId, to: Position) -> Result<()> {
        let squad = self.squad_mut(squad)?;
        squad.move_order = Some(to);
        Ok(())
    }

    pub fn clear_move_order(&mut self, squad: SquadId) -> Result<()> {
        self.squad_mut(squad)?.move_order = None;
        Ok(())
    }

    /// Get the current battle phase.
    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn scenario_name(&self) -> &str {
        &self.scenario_name
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn entity_of(&self, agent: AgentId) -> Option<Entity> {
        self.roster.entity(agent)
    }

    pub fn agent_position(&self, agent: AgentId) -> Option<Position> {
        world_setup::position_of(&self.world, self.roster.entity(agent)?)
    }

    /// Mutable world access for tests that stage agent state directly.
    #[cfg(test)]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Get a read-only reference to the score state.
    #[cfg(test)]
    pub fn score(&self) -> &ScoreState {
        &self.score
    }

    fn squad_mut(&mut self, id: SquadId) -> Result<&mut Squad> {
        self.squads
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(SimError::UnknownSquad(id))
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single command.
    fn handle_command(&mut self, command: BattleCommand) {
        match command {
            BattleCommand::StartBattle => {
                if self.phase == BattlePhase::Setup && !self.roster.is_empty() {
                    self.phase = BattlePhase::Active;
                    tracing::info!(scenario = %self.scenario_name, "battle started");
                }
            }
            BattleCommand::Pause => {
                if self.phase == BattlePhase::Active {
                    self.phase = BattlePhase::Paused;
                }
            }
            BattleCommand::Resume => {
                if self.phase == BattlePhase::Paused {
                    self.phase = BattlePhase::Active;
                }
            }
            BattleCommand::AssignMoveOrder { squad, x, y } => {
                if let Err(err) = self.assign_move_order(squad, Position::new(x, y)) {
                    tracing::warn!(%err, "move order ignored");
                }
            }
            BattleCommand::ClearMoveOrder { squad } => {
                if let Err(err) = self.clear_move_order(squad) {
                    tracing::warn!(%err, "clear order ignored");
                }
            }
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        let tick = self.time.tick;
        let dt = self.time.dt();
        let tuning = &self.config.tuning;

        // 1. Upkeep (effect aging, suppression decay, weapon timers)
        systems::upkeep::run(&mut self.world, &mut self.effects, dt);
        // 2. Psychology (fear recovery, morale)
        systems::psychology::run(&mut self.world, dt);
        // 3. Perception and squad signals
        systems::perception::run(&mut self.world, &self.map, &self.roster, &mut self.squads, tick);
        // 4. Goal selection
        systems::decision::run(&mut self.world, &tuning.decision, tick);
        // 5-6. Fire control, Blue then Red
        let env = FireEnv {
            map: &self.map,
            roster: &self.roster,
            tuning: &tuning.combat,
            seed: self.config.seed,
            tick,
        };
        for team in [Team::Blue, Team::Red] {
            systems::fire_control::run(
                &mut self.world,
                &env,
                &mut self.effects,
                &mut self.score,
                team,
            );
        }
        // 7. Sound propagation
        systems::sound::run(&mut self.world, &self.map, &self.roster, &self.effects, tick);
        // 8. Movement
        systems::movement::run(&mut self.world, &self.nav, &self.map, self.config.seed, tick);
        // 9. Battle end
        self.check_battle_end();
    }

    fn check_battle_end(&mut self) {
        let (mut blue, mut red) = (0usize, 0usize);
        for (_entity, (soldier, health)) in self.world.query_mut::<(&Soldier, &Health)>() {
            if !health.is_alive() {
                continue;
            }
            match soldier.team {
                Team::Blue => blue += 1,
                Team::Red => red += 1,
            }
        }
        if blue > 0 && red > 0 {
            return;
        }

        self.score.winner = match (blue > 0, red > 0) {
            (true, false) => Some(Team::Blue),
            (false, true) => Some(Team::Red),
            _ => None,
        };
        self.phase = BattlePhase::Finished;
        tracing::info!(
            tick = self.time.tick,
            winner = ?self.score.winner,
            blue,
            red,
            "battle finished"
        );
    }
}
