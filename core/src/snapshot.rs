//! Snapshot: the display state a front end renders from.
//!
//! A snapshot is a read-only copy taken after every operation. It holds
//! everything a renderer needs: player bars, the map, the active round
//! and any pending knowledge check.

use crate::{
    deployment_round::Target,
    game::{Game, Phase},
    region_map::RegionColor,
    types::{Millis, RegionId, SessionId},
};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct GameSnapshot {
    pub session_id:     SessionId,
    pub now_ms:         Millis,
    pub phase:          Phase,
    pub player:         PlayerView,
    pub regions:        Vec<RegionView>,
    pub current_region: Option<RegionId>,
    pub round:          Option<RoundView>,
    pub question:       Option<QuestionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub level:          u32,
    pub xp:             u32,
    pub xp_needed:      u32,
    /// XP bar fill, 0.0 to 1.0.
    pub xp_ratio:       f64,
    pub health:         u32,
    pub max_health:     u32,
    pub credits:        u32,
    pub certifications: u32,
    pub deployed:       Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionView {
    pub id:      RegionId,
    pub name:    String,
    pub x:       u32,
    pub y:       u32,
    pub color:   RegionColor,
    pub visited: bool,
    pub active:  bool,
    /// Shown only once the player has stood in the target region.
    pub target:  bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundView {
    pub service:   String,
    pub score:     u32,
    pub required:  u32,
    pub progress:  f64,
    pub time_left: u32,
    pub low_time:  bool,
    pub targets:   Vec<Target>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub question:            String,
    pub options:             BTreeMap<String, String>,
    pub problem_description: Option<String>,
    pub image:               Option<String>,
}

impl GameSnapshot {
    pub fn capture(game: &Game) -> Self {
        let p = game.player();
        let xp_needed = p.xp_to_next_level(game.config().xp_per_level);
        let xp_ratio = if xp_needed == 0 {
            0.0
        } else {
            (p.xp as f64 / xp_needed as f64).min(1.0)
        };

        let map = game.map();
        let regions = map
            .regions()
            .iter()
            .map(|r| RegionView {
                id: r.id.clone(),
                name: r.name.clone(),
                x: r.x,
                y: r.y,
                color: r.color,
                visited: r.visited,
                active: r.active,
                target: map.is_target_highlighted() && r.id == map.target_region(),
            })
            .collect();

        let active = game.round();
        let round = active.service().filter(|_| active.is_active()).map(|service| RoundView {
            service: service.to_string(),
            score: active.score(),
            required: active.required(),
            progress: active.progress(),
            time_left: active.time_left(),
            low_time: active.is_low_on_time(),
            targets: active.targets().to_vec(),
        });

        let question = game.quiz().current().map(|q| QuestionView {
            question: q.question.clone(),
            options: q.options.clone(),
            problem_description: q.problem_description.clone(),
            image: q.image.clone(),
        });

        Self {
            session_id: game.session_id.clone(),
            now_ms: game.clock.now,
            phase: game.phase(),
            player: PlayerView {
                level: p.level,
                xp: p.xp,
                xp_needed,
                xp_ratio,
                health: p.health,
                max_health: p.max_health,
                credits: p.credits,
                certifications: p.certifications,
                deployed: p.deployed.iter().map(|s| s.to_string()).collect(),
            },
            regions,
            current_region: map.current().map(|r| r.id.clone()),
            round,
            question,
        }
    }
}
