//! Region map: nine fixed regions and one hidden target.
//!
//! The target is drawn once at construction and never changes for the
//! session.

use crate::{
    error::{GameError, GameResult},
    rng::RandomSource,
    types::RegionId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionColor {
    Blue,
    Green,
    Red,
    Yellow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub id:      RegionId,
    pub name:    String,
    pub x:       u32,
    pub y:       u32,
    pub color:   RegionColor,
    pub visited: bool,
    pub active:  bool,
}

/// What changed when a new region was selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSelection {
    pub region:    RegionId,
    pub name:      String,
    pub is_target: bool,
}

const REGIONS: &[(&str, &str, u32, u32, RegionColor)] = &[
    ("us-east-1",      "N. Virginia", 220, 150, RegionColor::Blue),
    ("us-east-2",      "Ohio",        200, 160, RegionColor::Blue),
    ("us-west-2",      "Oregon",      120, 150, RegionColor::Blue),
    ("eu-west-1",      "Ireland",     440, 120, RegionColor::Green),
    ("eu-central-1",   "Frankfurt",   470, 150, RegionColor::Green),
    ("ap-northeast-1", "Tokyo",       680, 180, RegionColor::Red),
    ("ap-southeast-1", "Singapore",   650, 250, RegionColor::Red),
    ("ap-southeast-2", "Sydney",      700, 300, RegionColor::Red),
    ("sa-east-1",      "São Paulo",   270, 250, RegionColor::Yellow),
];

pub struct RegionMap {
    regions:            Vec<Region>,
    current:            Option<usize>,
    target:             usize,
    target_highlighted: bool,
}

impl RegionMap {
    pub fn new(rng: &mut dyn RandomSource) -> Self {
        let regions: Vec<Region> = REGIONS
            .iter()
            .map(|&(id, name, x, y, color)| Region {
                id: id.to_string(),
                name: name.to_string(),
                x,
                y,
                color,
                visited: false,
                active: false,
            })
            .collect();
        let target = rng.pick_index(regions.len());
        log::debug!("region_map: target region is {}", regions[target].id);
        Self { regions, current: None, target, target_highlighted: false }
    }

    /// Select a region. `Ok(None)` when it is already current.
    pub fn select(&mut self, id: &str) -> GameResult<Option<RegionSelection>> {
        let idx = self.index_of(id).ok_or_else(|| GameError::UnknownRegion { id: id.into() })?;
        if self.current == Some(idx) {
            return Ok(None);
        }

        if let Some(prev) = self.current {
            self.regions[prev].active = false;
        }
        self.current = Some(idx);
        let region = &mut self.regions[idx];
        region.visited = true;
        region.active = true;

        let is_target = idx == self.target;
        if is_target {
            self.target_highlighted = true;
        }
        let region = &self.regions[idx];
        Ok(Some(RegionSelection { region: region.id.clone(), name: region.name.clone(), is_target }))
    }

    pub fn is_in_target_region(&self) -> bool {
        self.current == Some(self.target)
    }

    pub fn current(&self) -> Option<&Region> {
        self.current.map(|i| &self.regions[i])
    }

    pub fn target_region(&self) -> &str {
        &self.regions[self.target].id
    }

    /// Set once the player has stood in the target region.
    pub fn is_target_highlighted(&self) -> bool {
        self.target_highlighted
    }

    pub fn region(&self, id: &str) -> Option<&Region> {
        self.index_of(id).map(|i| &self.regions[i])
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Hover text for a region.
    pub fn region_info(&self, id: &str) -> Option<String> {
        self.region(id).map(|r| {
            let status = if r.visited { "Visited" } else { "Unexplored" };
            format!("AWS Region: {} | Status: {status}", r.id)
        })
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.regions.iter().position(|r| r.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRng;

    fn map_with_target_index(idx: usize) -> RegionMap {
        let roll = (idx as f64 + 0.5) / REGIONS.len() as f64;
        RegionMap::new(&mut ScriptedRng::constant(roll))
    }

    #[test]
    fn scripted_roll_picks_target() {
        let map = map_with_target_index(5);
        assert_eq!(map.target_region(), "ap-northeast-1");
        assert!(!map.is_in_target_region(), "nothing selected yet");
    }

    #[test]
    fn select_moves_active_flag_and_marks_visited() {
        let mut map = map_with_target_index(0);
        map.select("eu-west-1").unwrap();
        map.select("sa-east-1").unwrap();

        let ireland = map.region("eu-west-1").unwrap();
        assert!(ireland.visited && !ireland.active);
        let sao_paulo = map.region("sa-east-1").unwrap();
        assert!(sao_paulo.visited && sao_paulo.active);
        assert_eq!(map.regions().iter().filter(|r| r.active).count(), 1);
    }

    #[test]
    fn reselecting_current_region_is_a_noop() {
        let mut map = map_with_target_index(0);
        assert!(map.select("us-west-2").unwrap().is_some());
        assert!(map.select("us-west-2").unwrap().is_none());
    }

    #[test]
    fn target_detection_follows_last_selection() {
        let mut map = map_with_target_index(3);
        let sel = map.select("eu-west-1").unwrap().unwrap();
        assert!(sel.is_target);
        assert!(map.is_in_target_region());
        assert!(map.is_target_highlighted());

        map.select("us-east-1").unwrap();
        assert!(!map.is_in_target_region());
        assert!(map.is_target_highlighted(), "highlight persists");
    }

    #[test]
    fn unknown_region_is_rejected() {
        let mut map = map_with_target_index(0);
        assert!(matches!(map.select("mars-1"), Err(GameError::UnknownRegion { .. })));
        assert!(map.current().is_none());
    }

    #[test]
    fn region_info_reports_visit_status() {
        let mut map = map_with_target_index(0);
        assert_eq!(map.region_info("us-east-2").unwrap(), "AWS Region: us-east-2 | Status: Unexplored");
        map.select("us-east-2").unwrap();
        assert_eq!(map.region_info("us-east-2").unwrap(), "AWS Region: us-east-2 | Status: Visited");
    }
}
