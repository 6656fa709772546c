//! In-memory host
//!
//! A small deterministic stand-in for the game: units, a mineral bank,
//! supply, construction and training timers, and the placement and
//! proximity queries the behaviors ask for. It validates every command the
//! way the live host would and refuses the ones that cannot be carried out.
//! Used by the CLI runner and throughout the tests.

use ahash::{AHashMap, AHashSet};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::core::error::{AgentError, RejectReason, Result};
use crate::core::types::{PlayerId, Position, Race, Tick, TilePosition, UnitId, TILE_SIZE};
use crate::host::{
    Command, Flag, FrameInfo, Host, PlayerInfo, PlayerState, UnitSnapshot, UnitStatus, UnitType,
};
use crate::render::colors::player_color;

/// Frames a worker needs for one mining round trip
pub const MINING_TRIP_FRAMES: Tick = 160;

/// Minerals delivered per trip
pub const MINERALS_PER_TRIP: u32 = 8;

/// Map edge length in build tiles
const MAP_TILES: i32 = 64;

/// Furthest ring searched by [`Host::build_location`]
const PLACEMENT_SEARCH_RADIUS: i32 = 20;

/// A command as the host saw it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandRecord {
    pub frame: Tick,
    pub command: Command,
    /// `None` when accepted
    pub rejected: Option<RejectReason>,
}

#[derive(Debug, Clone, Copy)]
enum Job {
    Construct { structure: UnitId, builder: UnitId },
    Train { producer: UnitId, kind: UnitType },
}

#[derive(Debug, Clone, Copy)]
struct ScheduledJob {
    job: Job,
    done_at: Tick,
}

/// Deterministic in-memory game
#[derive(Debug)]
pub struct SimulatedHost {
    frame: FrameInfo,
    map_name: String,
    controls_player: bool,
    economy: PlayerState,
    players: Vec<PlayerInfo>,
    units: AHashMap<UnitId, UnitSnapshot>,
    next_id: u32,
    jobs: Vec<ScheduledJob>,
    commands: Vec<CommandRecord>,
    chat: Vec<String>,
    console: Vec<String>,
    flags: AHashSet<Flag>,
    optimization_level: u8,
}

impl SimulatedHost {
    /// Owner of resource nodes
    pub const NEUTRAL: PlayerId = PlayerId(11);

    /// Empty map with one opponent, controlling `me`
    pub fn new(me: PlayerId) -> Self {
        let opponent = PlayerId(me.0.wrapping_add(1));
        Self {
            frame: FrameInfo {
                frame: 0,
                paused: false,
                replay: false,
                latency_frames: 1,
            },
            map_name: "Simulated Plains".into(),
            controls_player: true,
            economy: PlayerState {
                id: me,
                name: "Agent".into(),
                race: Race::Terran,
                supply_used: 0,
                supply_total: 0,
                minerals: 0,
                gas: 0,
                color: player_color(me.0),
            },
            players: vec![
                PlayerInfo {
                    id: me,
                    name: "Agent".into(),
                    race: Race::Terran,
                    is_observer: false,
                    is_neutral: false,
                },
                PlayerInfo {
                    id: opponent,
                    name: "Opponent".into(),
                    race: Race::Zerg,
                    is_observer: false,
                    is_neutral: false,
                },
                PlayerInfo {
                    id: Self::NEUTRAL,
                    name: "Neutral".into(),
                    race: Race::Unknown,
                    is_observer: false,
                    is_neutral: true,
                },
            ],
            units: AHashMap::new(),
            next_id: 1,
            jobs: Vec::new(),
            commands: Vec::new(),
            chat: Vec::new(),
            console: Vec::new(),
            flags: AHashSet::new(),
            optimization_level: 0,
        }
    }

    /// A fresh base: one command center, four workers, eight mineral
    /// fields and a geyser, 50 minerals
    ///
    /// The seed jitters the mineral line so runs differ but replay exactly.
    pub fn standard_start(me: PlayerId, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut host = Self::new(me);

        let hub_site = TilePosition::new(20, 20);
        host.spawn(UnitType::CommandCenter, me, UnitType::CommandCenter.center_at(hub_site));

        for row in 0..8 {
            let site = TilePosition::new(15 + rng.gen_range(0..=1), 17 + row);
            host.spawn(
                UnitType::MineralField,
                Self::NEUTRAL,
                UnitType::MineralField.center_at(site),
            );
        }
        host.spawn(
            UnitType::VespeneGeyser,
            Self::NEUTRAL,
            UnitType::VespeneGeyser.center_at(TilePosition::new(21, 15)),
        );

        for i in 0..4 {
            host.spawn(UnitType::Scv, me, TilePosition::new(19 + i, 24).center());
        }

        host.set_minerals(50);
        tracing::debug!(seed, units = host.units.len(), "standard start laid out");
        host
    }

    /// Insert a unit as-is, replacing any unit with the same id
    pub fn add_unit(&mut self, unit: UnitSnapshot) {
        self.next_id = self.next_id.max(unit.id.0 + 1);
        self.account_supply(&unit);
        self.units.insert(unit.id, unit);
    }

    /// Create a finished, idle unit with a fresh id
    pub fn spawn(&mut self, kind: UnitType, owner: PlayerId, position: Position) -> UnitId {
        let id = self.allocate_id();
        self.add_unit(UnitSnapshot::new(id, kind, owner, position));
        id
    }

    pub fn set_minerals(&mut self, minerals: u32) {
        self.economy.minerals = minerals;
    }

    pub fn set_supply(&mut self, used: u32, total: u32) {
        self.economy.supply_used = used;
        self.economy.supply_total = total;
    }

    pub fn set_frame(&mut self, frame: Tick) {
        self.frame.frame = frame;
    }

    pub fn set_latency(&mut self, frames: u64) {
        self.frame.latency_frames = frames;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.frame.paused = paused;
    }

    pub fn set_replay(&mut self, replay: bool) {
        self.frame.replay = replay;
    }

    /// When false the host reports no controlled player, as when observing
    pub fn set_controls_player(&mut self, controls: bool) {
        self.controls_player = controls;
    }

    pub fn set_map_name(&mut self, name: impl Into<String>) {
        self.map_name = name.into();
    }

    pub fn add_player(&mut self, player: PlayerInfo) {
        self.players.push(player);
    }

    /// Every command received, accepted or not
    pub fn command_log(&self) -> &[CommandRecord] {
        &self.commands
    }

    /// Commands the host accepted, in order
    pub fn accepted_commands(&self) -> impl Iterator<Item = &Command> {
        self.commands
            .iter()
            .filter(|r| r.rejected.is_none())
            .map(|r| &r.command)
    }

    /// Lines broadcast with [`Host::send_text`]
    pub fn chat_log(&self) -> &[String] {
        &self.chat
    }

    /// Lines written with [`Host::print`]
    pub fn console_log(&self) -> &[String] {
        &self.console
    }

    pub fn flag_enabled(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn command_optimization_level(&self) -> u8 {
        self.optimization_level
    }

    pub fn minerals(&self) -> u32 {
        self.economy.minerals
    }

    /// Advance one frame: finish due jobs and pay out mining trips
    pub fn step(&mut self) {
        self.frame.frame += 1;
        let now = self.frame.frame;

        let (due, waiting): (Vec<_>, Vec<_>) =
            self.jobs.drain(..).partition(|j| j.done_at <= now);
        self.jobs = waiting;
        for job in due {
            self.finish(job.job);
        }

        if now % MINING_TRIP_FRAMES == 0 {
            let me = self.economy.id;
            let miners = self
                .units
                .values()
                .filter(|u| u.owner == me && u.status.gathering_minerals)
                .count() as u32;
            self.economy.minerals += miners * MINERALS_PER_TRIP;
        }
    }

    /// Finish every pending job immediately
    pub fn complete_all(&mut self) {
        for job in std::mem::take(&mut self.jobs) {
            self.finish(job.job);
        }
    }

    fn allocate_id(&mut self) -> UnitId {
        let id = UnitId(self.next_id);
        self.next_id += 1;
        id
    }

    fn account_supply(&mut self, unit: &UnitSnapshot) {
        if unit.owner != self.economy.id {
            return;
        }
        self.economy.supply_used += unit.kind.supply_required();
        if unit.status.completed {
            self.economy.supply_total += unit.kind.supply_provided();
        }
    }

    fn finish(&mut self, job: Job) {
        match job {
            Job::Construct { structure, builder } => {
                let mut provided = 0;
                if let Some(unit) = self.units.get_mut(&structure) {
                    unit.status.completed = true;
                    unit.status.constructing = false;
                    unit.status.idle = true;
                    provided = unit.kind.supply_provided();
                    tracing::trace!(id = %structure, kind = %unit.kind, "construction finished");
                }
                self.economy.supply_total += provided;
                if let Some(worker) = self.units.get_mut(&builder) {
                    worker.status.constructing = false;
                    worker.status.idle = true;
                }
            }
            Job::Train { producer, kind } => {
                let Some(origin) = self.units.get_mut(&producer).map(|p| {
                    p.status.idle = true;
                    Position::new(
                        p.position.x,
                        p.position.y + p.kind.tile_size().y * TILE_SIZE / 2 + TILE_SIZE / 2,
                    )
                }) else {
                    return;
                };
                let id = self.allocate_id();
                // Supply was taken when training started
                self.units
                    .insert(id, UnitSnapshot::new(id, kind, self.economy.id, origin));
                tracing::trace!(%id, %kind, "training finished");
            }
        }
    }

    fn own(&self, id: UnitId) -> std::result::Result<&UnitSnapshot, RejectReason> {
        match self.units.get(&id) {
            Some(unit) if unit.owner == self.economy.id => Ok(unit),
            Some(_) => Err(RejectReason::IncapableUnit),
            None => Err(RejectReason::UnknownUnit),
        }
    }

    fn afford(&self, kind: UnitType) -> std::result::Result<(), RejectReason> {
        if self.economy.minerals < kind.mineral_price() {
            return Err(RejectReason::InsufficientMinerals);
        }
        Ok(())
    }

    /// Footprint is on the map and clear of structures and resources
    fn can_place(&self, kind: UnitType, site: TilePosition) -> bool {
        let size = kind.tile_size();
        if site.x < 0 || site.y < 0 || site.x + size.x > MAP_TILES || site.y + size.y > MAP_TILES {
            return false;
        }

        self.units
            .values()
            .filter(|u| u.kind.is_building() || u.kind.role().is_none())
            .all(|u| {
                let other = u.tile();
                let other_size = u.kind.tile_size();
                site.x + size.x <= other.x
                    || other.x + other_size.x <= site.x
                    || site.y + size.y <= other.y
                    || other.y + other_size.y <= site.y
            })
    }

    fn apply(&mut self, command: Command) -> std::result::Result<(), RejectReason> {
        match command {
            Command::Gather { unit, target } => {
                let worker = self.own(unit)?;
                if !worker.kind.is_worker() {
                    return Err(RejectReason::IncapableUnit);
                }
                if worker.status.constructing {
                    return Err(RejectReason::UnitBusy);
                }
                let node = self.units.get(&target).ok_or(RejectReason::InvalidTarget)?;
                if !(node.kind.is_mineral_field() || node.kind.is_refinery()) {
                    return Err(RejectReason::InvalidTarget);
                }
                let minerals = node.kind.is_mineral_field();

                if let Some(worker) = self.units.get_mut(&unit) {
                    worker.status.idle = false;
                    worker.status.gathering_minerals = minerals;
                }
                Ok(())
            }
            Command::ReturnCargo { unit } => {
                let worker = self.own(unit)?;
                if !worker.is_carrying_cargo() || !worker.status.can_return_cargo {
                    return Err(RejectReason::InvalidTarget);
                }
                let delivered_minerals = worker.status.carrying_minerals;

                if let Some(worker) = self.units.get_mut(&unit) {
                    worker.status.carrying_minerals = false;
                    worker.status.carrying_gas = false;
                    worker.status.can_return_cargo = false;
                    worker.status.idle = false;
                    worker.status.gathering_minerals = delivered_minerals;
                }
                if delivered_minerals {
                    self.economy.minerals += MINERALS_PER_TRIP;
                } else {
                    self.economy.gas += MINERALS_PER_TRIP;
                }
                Ok(())
            }
            Command::Train { unit, kind } => {
                let producer = self.own(unit)?;
                if kind.what_builds() != Some(producer.kind) || kind.is_building() {
                    return Err(RejectReason::IncapableUnit);
                }
                if !producer.status.completed || !producer.status.idle {
                    return Err(RejectReason::UnitBusy);
                }
                self.afford(kind)?;
                let required = kind.supply_required();
                if self.economy.supply_used + required > self.economy.supply_total {
                    return Err(RejectReason::SupplyBlocked);
                }

                self.economy.minerals -= kind.mineral_price();
                self.economy.supply_used += required;
                if let Some(producer) = self.units.get_mut(&unit) {
                    producer.status.idle = false;
                }
                self.jobs.push(ScheduledJob {
                    job: Job::Train { producer: unit, kind },
                    done_at: self.frame.frame + kind.build_time(),
                });
                Ok(())
            }
            Command::Build { unit, kind, location } => {
                let builder = self.own(unit)?;
                if !kind.is_building() || kind.what_builds() != Some(builder.kind) {
                    return Err(RejectReason::IncapableUnit);
                }
                if builder.status.constructing
                    || !(builder.status.idle || builder.status.gathering_minerals)
                {
                    return Err(RejectReason::UnitBusy);
                }
                if !self.can_place(kind, location) {
                    return Err(RejectReason::InvalidLocation);
                }
                self.afford(kind)?;

                self.economy.minerals -= kind.mineral_price();
                let structure = self.allocate_id();
                let status = UnitStatus {
                    completed: false,
                    constructing: true,
                    idle: false,
                    ..UnitStatus::default()
                };
                let owner = self.economy.id;
                self.units.insert(
                    structure,
                    UnitSnapshot::new(structure, kind, owner, kind.center_at(location))
                        .with_status(status),
                );
                if let Some(builder) = self.units.get_mut(&unit) {
                    builder.status.idle = false;
                    builder.status.gathering_minerals = false;
                    builder.status.constructing = true;
                }
                self.jobs.push(ScheduledJob {
                    job: Job::Construct {
                        structure,
                        builder: unit,
                    },
                    done_at: self.frame.frame + kind.build_time(),
                });
                Ok(())
            }
            Command::BuildAddon { unit, .. } => {
                self.own(unit)?;
                Err(RejectReason::IncapableUnit)
            }
        }
    }
}

impl Host for SimulatedHost {
    fn frame(&self) -> FrameInfo {
        self.frame
    }

    fn self_player(&self) -> Option<PlayerState> {
        self.controls_player.then(|| self.economy.clone())
    }

    fn own_units(&self) -> Vec<UnitSnapshot> {
        let me = self.economy.id;
        let mut units: Vec<_> = self.units.values().filter(|u| u.owner == me).cloned().collect();
        units.sort_by_key(|u| u.id);
        units
    }

    fn visible_units(&self) -> Vec<UnitSnapshot> {
        let mut units: Vec<_> = self.units.values().cloned().collect();
        units.sort_by_key(|u| u.id);
        units
    }

    fn unit(&self, id: UnitId) -> Option<UnitSnapshot> {
        self.units.get(&id).cloned()
    }

    fn players(&self) -> Vec<PlayerInfo> {
        self.players.clone()
    }

    fn enemy(&self) -> Option<PlayerInfo> {
        let me = self.economy.id;
        self.players
            .iter()
            .find(|p| p.id != me && !p.is_neutral && !p.is_observer)
            .cloned()
    }

    fn map_name(&self) -> String {
        self.map_name.clone()
    }

    fn incomplete_count(&self, kind: UnitType) -> usize {
        let me = self.economy.id;
        let placed = self
            .units
            .values()
            .filter(|u| u.owner == me && u.kind == kind && !u.status.completed)
            .count();
        let training = self
            .jobs
            .iter()
            .filter(|j| matches!(j.job, Job::Train { kind: k, .. } if k == kind))
            .count();
        placed + training
    }

    fn build_location(&self, kind: UnitType, near: TilePosition) -> Option<TilePosition> {
        if !kind.is_building() {
            return None;
        }
        (0..=PLACEMENT_SEARCH_RADIUS).find_map(|ring| {
            (-ring..=ring)
                .flat_map(|dy| (-ring..=ring).map(move |dx| TilePosition::new(dx, dy)))
                .filter(|d| d.x.abs().max(d.y.abs()) == ring)
                .map(|d| near + d)
                .find(|site| self.can_place(kind, *site))
        })
    }

    fn issue(&mut self, command: Command) -> Result<()> {
        let outcome = self.apply(command);
        self.commands.push(CommandRecord {
            frame: self.frame.frame,
            command,
            rejected: outcome.err(),
        });
        outcome.map_err(|reason| AgentError::CommandRejected { command, reason })
    }

    fn send_text(&mut self, text: &str) {
        tracing::info!(target: "chat", "{text}");
        self.chat.push(text.to_string());
    }

    fn print(&mut self, text: &str) {
        tracing::info!(target: "console", "{text}");
        self.console.push(text.to_string());
    }

    fn set_command_optimization_level(&mut self, level: u8) {
        self.optimization_level = level;
    }

    fn enable_flag(&mut self, flag: Flag) {
        self.flags.insert(flag);
    }
}
