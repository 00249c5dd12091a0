// Copyright (c) 2026 rezky_nightky

use log::debug;

use crate::network::{NodeNetwork, PacketId};
use crate::palette::ALERT;
use crate::rng::RandomSource;

pub const PREPARE_S: f32 = 0.5;
pub const IMPACT_S: f32 = 1.5;
pub const ATTACK_SPEED: f32 = 260.0;
const COOLDOWN_MIN_S: f32 = 5.0;
const COOLDOWN_MAX_S: f32 = 15.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HackState {
    Prepare,
    Launch,
    InFlight,
    Impact,
    Done,
}

impl HackState {
    pub fn label(self) -> &'static str {
        match self {
            HackState::Prepare => "prepare",
            HackState::Launch => "launch",
            HackState::InFlight => "in-flight",
            HackState::Impact => "impact",
            HackState::Done => "done",
        }
    }
}

#[derive(Clone, Debug)]
pub struct HackEvent {
    state: HackState,
    elapsed: f32,
    hacker: String,
    target: String,
    packet: Option<PacketId>,
}

impl HackEvent {
    pub fn new(net: &mut NodeNetwork, rng: &mut dyn RandomSource) -> Option<Self> {
        let hacker = net.hacker()?;
        let candidates = net.target_candidates();
        if candidates.is_empty() {
            return None;
        }
        let target = candidates[rng.index(candidates.len())];
        net.set_hacked(hacker, 1.0);
        Some(Self {
            state: HackState::Prepare,
            elapsed: 0.0,
            hacker: net.nodes()[hacker].id.clone(),
            target: net.nodes()[target].id.clone(),
            packet: None,
        })
    }

    pub fn state(&self) -> HackState {
        self.state
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    #[cfg(test)]
    pub fn packet(&self) -> Option<PacketId> {
        self.packet
    }

    fn enter(&mut self, state: HackState) {
        self.state = state;
        self.elapsed = 0.0;
    }

    pub fn update(&mut self, dt: f32, net: &mut NodeNetwork) {
        self.elapsed += dt;
        match self.state {
            HackState::Prepare => {
                if self.elapsed > PREPARE_S {
                    self.enter(HackState::Launch);
                }
            }
            HackState::Launch => {
                self.packet = net.send_packet(&self.hacker, &self.target, ALERT, ATTACK_SPEED);
                self.enter(HackState::InFlight);
            }
            HackState::InFlight => {
                // The network drops packets once they arrive.
                let arrived = self
                    .packet
                    .and_then(|id| net.packet(id))
                    .map_or(true, |p| p.t >= 1.0);
                if arrived {
                    if let Some(i) = net.index_of(&self.target) {
                        net.set_hacked(i, 1.0);
                    }
                    debug!("hack impact on {}", self.target);
                    self.enter(HackState::Impact);
                }
            }
            HackState::Impact => {
                if self.elapsed > IMPACT_S {
                    self.enter(HackState::Done);
                }
            }
            HackState::Done => {}
        }
    }
}

pub struct HackOrchestrator {
    events: Vec<HackEvent>,
    cooldown: f32,
    completed: u64,
    rng: Box<dyn RandomSource>,
}

impl HackOrchestrator {
    pub fn new(mut rng: Box<dyn RandomSource>) -> Self {
        let cooldown = rng.range(COOLDOWN_MIN_S, COOLDOWN_MAX_S);
        Self {
            events: Vec::new(),
            cooldown,
            completed: 0,
            rng,
        }
    }

    pub fn events(&self) -> &[HackEvent] {
        &self.events
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    pub fn update(&mut self, dt: f32, net: &mut NodeNetwork) {
        self.cooldown -= dt;
        if self.cooldown <= 0.0 {
            self.cooldown = self.rng.range(COOLDOWN_MIN_S, COOLDOWN_MAX_S);
            match HackEvent::new(net, self.rng.as_mut()) {
                Some(ev) => {
                    debug!(
                        "hack launched at {}, next in {:.1}s",
                        ev.target, self.cooldown
                    );
                    self.events.push(ev);
                }
                None => debug!("hack skipped: no hacker or no eligible target"),
            }
        }

        for ev in &mut self.events {
            ev.update(dt, net);
        }
        let before = self.events.len();
        self.events.retain(|ev| ev.state != HackState::Done);
        let done = (before - self.events.len()) as u64;
        if done > 0 {
            self.completed += done;
            debug!("{} hack(s) completed so far", self.completed);
        }
    }
}
