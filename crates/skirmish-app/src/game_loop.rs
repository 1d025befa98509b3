//! Calc thread. Runs the simulation engine at 60Hz and hands frames over
//! the two-slot exchange.
//!
//! The engine moves into the thread and never leaves it. Commands arrive via
//! an `mpsc` channel and are queued at the next tick boundary.

use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use skirmish_core::commands::PlayerCommand;
use skirmish_core::constants::TICK_RATE;
use skirmish_core::state::Frame;
use skirmish_sim::SimulationEngine;

use crate::exchange::{frame_exchange, CalcSlot, ExchangeError, FrameExchange};

/// Nominal duration of one tick at 1x speed.
pub const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

/// Commands sent from the foreground to the calc thread.
#[derive(Debug)]
pub enum LoopCommand {
    /// A player command to forward to the simulation engine.
    Player(PlayerCommand),
    /// Shut down the calc thread gracefully.
    Shutdown,
}

/// How the calc thread spaces its ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Sleep so ticks land at `TICK_RATE`, scaled by the engine's time scale.
    RealTime,
    /// Run each tick as soon as the foreground releases a buffer.
    Unpaced,
}

/// Foreground handle to a running calc thread.
pub struct GameLoop {
    commands: mpsc::Sender<LoopCommand>,
    frames: FrameExchange,
    thread: JoinHandle<()>,
}

/// Spawns the calc thread.
pub fn spawn_game_loop(engine: SimulationEngine, pacing: Pacing) -> std::io::Result<GameLoop> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<LoopCommand>();
    let (frames, slot) = frame_exchange();

    let thread = std::thread::Builder::new()
        .name("skirmish-calc".into())
        .spawn(move || run_game_loop(engine, cmd_rx, slot, pacing))?;

    Ok(GameLoop {
        commands: cmd_tx,
        frames,
        thread,
    })
}

impl GameLoop {
    /// Forward a player command. Returns false once the calc thread is gone.
    pub fn send(&self, command: PlayerCommand) -> bool {
        self.commands.send(LoopCommand::Player(command)).is_ok()
    }

    /// Block until the next tick's frame is ready and take it.
    pub fn swap(&mut self) -> Result<&Frame, ExchangeError> {
        self.frames.swap()
    }

    pub fn current(&self) -> &Frame {
        self.frames.current()
    }

    /// Stop the calc thread and wait for it to exit.
    pub fn shutdown(self) {
        let _ = self.commands.send(LoopCommand::Shutdown);
        // Dropping our end wakes a calc thread blocked waiting for a buffer.
        drop(self.frames);
        if self.thread.join().is_err() {
            tracing::error!("calc thread panicked");
        }
    }
}

/// The calc loop. Runs until Shutdown, a closed command channel, or a
/// foreground hangup.
fn run_game_loop(
    mut engine: SimulationEngine,
    cmd_rx: mpsc::Receiver<LoopCommand>,
    slot: CalcSlot,
    pacing: Pacing,
) {
    let mut next_tick_time = Instant::now();

    loop {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(LoopCommand::Player(cmd)) => engine.queue_command(cmd),
                Ok(LoopCommand::Shutdown) => return,
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return,
            }
        }

        // 2. Take the buffer the foreground released and fill it
        let Ok(mut frame) = slot.take() else {
            return;
        };
        engine.step(&mut frame);
        if slot.publish(frame).is_err() {
            return;
        }

        if pacing == Pacing::Unpaced {
            continue;
        }

        // 3. Sleep until next tick, adjusting for time_scale
        let time_scale = engine.time_scale();
        let effective_tick_duration = if time_scale > 0.001 {
            TICK_DURATION.div_f64(time_scale)
        } else {
            TICK_DURATION
        };

        next_tick_time += effective_tick_duration;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > effective_tick_duration * 2 {
            // Too far behind, reset to avoid catch-up spiral
            next_tick_time = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;
    use skirmish_core::enums::GamePhase;
    use skirmish_core::types::{GovernmentId, SystemId};
    use skirmish_core::weapon::WeaponCatalog;
    use skirmish_sim::universe::{Galaxy, ShipSpec, StarSystem};
    use skirmish_sim::SimConfig;

    fn engine() -> SimulationEngine {
        let galaxy = Galaxy {
            systems: vec![StarSystem {
                id: SystemId(1),
                name: "Sol".into(),
                ..Default::default()
            }],
            day: 0,
        };
        let mut engine = SimulationEngine::new(SimConfig::default(), WeaponCatalog::new(), Box::new(galaxy));
        let spec = ShipSpec {
            name: "Falcon".into(),
            radius: 20.0,
            ..Default::default()
        };
        engine.spawn_flagship(&spec, GovernmentId(0), SystemId(1), DVec2::ZERO);
        engine
    }

    #[test]
    fn test_command_channel_round_trip() {
        let (tx, rx) = mpsc::channel::<LoopCommand>();

        tx.send(LoopCommand::Player(PlayerCommand::Pause)).unwrap();
        tx.send(LoopCommand::Shutdown).unwrap();

        let commands: Vec<LoopCommand> = rx.try_iter().collect();
        assert_eq!(commands.len(), 2);
        assert!(matches!(commands[0], LoopCommand::Player(PlayerCommand::Pause)));
        assert!(matches!(commands[1], LoopCommand::Shutdown));
    }

    #[test]
    fn test_frames_arrive_in_tick_order() {
        let mut game = spawn_game_loop(engine(), Pacing::Unpaced).unwrap();
        for expected in 1..=5 {
            let frame = game.swap().unwrap();
            assert_eq!(frame.time.tick, expected);
            assert_eq!(frame.flagship.system, SystemId(1));
        }
        game.shutdown();
    }

    #[test]
    fn test_pause_reaches_engine() {
        let mut game = spawn_game_loop(engine(), Pacing::Unpaced).unwrap();
        game.swap().unwrap();
        assert!(game.send(PlayerCommand::Pause));

        // Frames already in flight may predate the pause.
        let mut paused = None;
        for _ in 0..5 {
            let frame = game.swap().unwrap();
            if frame.phase == GamePhase::Paused {
                paused = Some(frame.time.tick);
                break;
            }
        }
        let paused_tick = paused.expect("pause never took effect");
        assert_eq!(game.swap().unwrap().time.tick, paused_tick);
        game.shutdown();
    }

    #[test]
    fn test_tick_duration_constant() {
        let expected_nanos = 1_000_000_000u64 / TICK_RATE as u64;
        assert_eq!(TICK_DURATION.as_nanos(), expected_nanos as u128);
    }
}
