//! Match lifecycle
//!
//! [`Agent`] is what a host bridge talks to. Apart from `on_frame`, the
//! hooks are small pieces of match etiquette: greeting, announcing
//! players, echoing chat and narrating replays.

use crate::core::config::AgentConfig;
use crate::core::types::{PlayerId, Position, Tick};
use crate::host::{Flag, Host, PlayerInfo, UnitSnapshot};
use crate::render::PresentationSink;
use crate::simulation::{TickDriver, TickReport};

/// Game agent: lifecycle hooks around a [`TickDriver`]
#[derive(Debug)]
pub struct Agent {
    driver: TickDriver,
}

impl Agent {
    pub fn new(config: AgentConfig) -> Self {
        Self {
            driver: TickDriver::new(config),
        }
    }

    pub fn driver(&self) -> &TickDriver {
        &self.driver
    }

    fn config(&self) -> &AgentConfig {
        self.driver.config()
    }

    /// Greet, configure host flags and announce who is playing
    pub fn on_start(&mut self, host: &mut dyn Host) {
        let setup = &self.config().match_setup;

        let map = host.map_name();
        host.send_text(&setup.greeting);
        host.print(&format!("The map is {map}!"));

        if setup.user_input {
            host.enable_flag(Flag::UserInput);
        }
        if setup.complete_map_information {
            host.enable_flag(Flag::CompleteMapInformation);
        }
        host.set_command_optimization_level(setup.command_optimization_level);

        if host.frame().replay {
            host.print("The following players are in this replay:");
            for p in host.players().into_iter().filter(|p| !p.is_observer) {
                host.print(&format!("{}, playing as {}", p.name, p.race));
            }
        } else if let (Some(me), Some(enemy)) = (host.self_player(), host.enemy()) {
            host.print(&format!("The matchup is {} vs {}", me.race, enemy.race));
        }

        tracing::info!(%map, "match started");
    }

    pub fn on_frame(&mut self, host: &mut dyn Host, sink: &mut dyn PresentationSink) -> TickReport {
        self.driver.run_tick(host, sink)
    }

    pub fn on_end(&mut self, is_winner: bool) {
        let pending = self.driver.deferred().len();
        tracing::info!(is_winner, pending, "match ended");
    }

    /// Text typed locally goes to the match chat unchanged
    pub fn on_send_text(&mut self, host: &mut dyn Host, text: &str) {
        host.send_text(text);
    }

    pub fn on_receive_text(&mut self, host: &mut dyn Host, player: &PlayerInfo, text: &str) {
        host.print(&format!("{} said \"{}\"", player.name, text));
    }

    pub fn on_player_left(&mut self, host: &mut dyn Host, player: &PlayerInfo) {
        host.send_text(&format!("Goodbye {}!", player.name));
    }

    /// `target` is `None` when the host could not locate the strike
    pub fn on_nuke_detect(&mut self, host: &mut dyn Host, target: Option<Position>) {
        match target {
            Some(at) => host.print(&format!("Nuclear Launch Detected at {at}")),
            None => host.send_text("Where's the nuke?"),
        }
    }

    pub fn on_unit_create(&mut self, host: &mut dyn Host, unit: &UnitSnapshot) {
        self.narrate_replay_build(host, unit, "creates");
    }

    pub fn on_unit_morph(&mut self, host: &mut dyn Host, unit: &UnitSnapshot) {
        self.narrate_replay_build(host, unit, "morphs");
    }

    pub fn on_save_game(&mut self, host: &mut dyn Host, name: &str) {
        host.print(&format!("The game was saved to \"{name}\""));
    }

    pub fn on_unit_discover(&mut self, unit: &UnitSnapshot) {
        tracing::trace!(unit = %unit.id, "discovered");
    }

    pub fn on_unit_evade(&mut self, unit: &UnitSnapshot) {
        tracing::trace!(unit = %unit.id, "evaded");
    }

    pub fn on_unit_show(&mut self, unit: &UnitSnapshot) {
        tracing::trace!(unit = %unit.id, "shown");
    }

    pub fn on_unit_hide(&mut self, unit: &UnitSnapshot) {
        tracing::trace!(unit = %unit.id, "hidden");
    }

    pub fn on_unit_destroy(&mut self, unit: &UnitSnapshot) {
        tracing::trace!(unit = %unit.id, "destroyed");
    }

    pub fn on_unit_renegade(&mut self, unit: &UnitSnapshot) {
        tracing::trace!(unit = %unit.id, owner = %unit.owner, "changed owner");
    }

    pub fn on_unit_complete(&mut self, unit: &UnitSnapshot) {
        tracing::trace!(unit = %unit.id, kind = %unit.kind, "completed");
    }

    /// Replay build-order narration: `MM:SS: <player> <verb> a <kind>`
    fn narrate_replay_build(&self, host: &mut dyn Host, unit: &UnitSnapshot, verb: &str) {
        let frame = host.frame();
        if !frame.replay || !unit.kind.is_building() {
            return;
        }
        let Some(owner) = player_named(host, unit.owner) else {
            return;
        };
        if owner.is_neutral {
            return;
        }

        let clock = game_clock(frame.frame, self.config().match_setup.frames_per_second);
        host.send_text(&format!("{clock}: {} {verb} a {}", owner.name, unit.kind));
    }
}

fn player_named(host: &dyn Host, id: PlayerId) -> Option<PlayerInfo> {
    host.players().into_iter().find(|p| p.id == id)
}

/// `MM:SS` elapsed game time at `frame`
pub fn game_clock(frame: Tick, frames_per_second: u64) -> String {
    let seconds = frame / frames_per_second.max(1);
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
