//! Player state and progression.

use crate::{
    config::GameConfig,
    error::{GameError, GameResult},
    service::Service,
    types::RegionId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub level:          u32,
    pub xp:             u32,
    pub health:         u32,
    pub max_health:     u32,
    pub credits:        u32,
    pub certifications: u32,
    /// Deployed services in deployment order, each at most once.
    pub deployed:       Vec<Service>,
    pub current_region: Option<RegionId>,
}

impl Player {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            level: 1,
            xp: 0,
            health: config.starting_health,
            max_health: config.starting_health,
            credits: config.starting_credits,
            certifications: 0,
            deployed: Vec::new(),
            current_region: None,
        }
    }

    pub fn has_deployed(&self, service: Service) -> bool {
        self.deployed.contains(&service)
    }

    /// Record a deployment. Returns false if it was already present.
    pub fn record_deployment(&mut self, service: Service) -> bool {
        if self.has_deployed(service) {
            return false;
        }
        self.deployed.push(service);
        true
    }

    /// Deduct `amount` credits, or leave them untouched and fail.
    pub fn spend(&mut self, amount: u32) -> GameResult<()> {
        if self.credits < amount {
            return Err(GameError::InsufficientFunds { needed: amount, available: self.credits });
        }
        self.credits -= amount;
        Ok(())
    }

    pub fn refund(&mut self, amount: u32) {
        self.credits += amount;
    }

    pub fn xp_to_next_level(&self, xp_per_level: u32) -> u32 {
        self.level * xp_per_level
    }

    /// Apply a level-up if enough XP has accumulated.
    /// Returns the new level when one was gained.
    pub fn check_level_up(&mut self, config: &GameConfig) -> Option<u32> {
        if self.xp < self.xp_to_next_level(config.xp_per_level) {
            return None;
        }
        self.level += 1;
        self.xp = 0;
        self.max_health += config.max_health_per_level;
        Some(self.level)
    }

    /// Every required service deployed.
    pub fn has_required_services(&self) -> bool {
        Service::REQUIRED.iter().all(|s| self.has_deployed(*s))
    }

    /// Scannable services not yet deployed.
    pub fn undeployed_scannable(&self) -> Vec<Service> {
        Service::SCANNABLE.into_iter().filter(|s| !self.has_deployed(*s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spend_refuses_without_mutation() {
        let mut player = Player::new(&GameConfig { starting_credits: 10, ..GameConfig::default() });
        assert!(matches!(
            player.spend(25),
            Err(GameError::InsufficientFunds { needed: 25, available: 10 })
        ));
        assert_eq!(player.credits, 10);
        player.spend(10).unwrap();
        assert_eq!(player.credits, 0);
    }

    #[test]
    fn level_up_at_threshold() {
        let config = GameConfig::default();
        let mut player = Player::new(&config);
        player.xp = 99;
        assert_eq!(player.check_level_up(&config), None);
        player.xp = 100;
        assert_eq!(player.check_level_up(&config), Some(2));
        assert_eq!(player.xp, 0);
        assert_eq!(player.max_health, 110);
        assert_eq!(player.health, 100, "health itself is not restored");
        assert_eq!(player.xp_to_next_level(config.xp_per_level), 200);
    }

    #[test]
    fn deployments_are_unique() {
        let mut player = Player::new(&GameConfig::default());
        assert!(player.record_deployment(Service::S3));
        assert!(!player.record_deployment(Service::S3));
        assert_eq!(player.deployed, vec![Service::S3]);
    }
}
