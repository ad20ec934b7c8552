/// Data-sort minigame — drag labelled data blocks into matching bins.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::minigame::{MinigameError, MinigameOutcome};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortConfig {
    /// Blocks generated per round; sorting all of them completes the game.
    pub target_score: u32,
    pub reward: u32,
    /// Clearance the proxy card is upgraded to on completion.
    pub clearance: u8,
    pub categories: Vec<String>,
    pub buzzwords: Vec<String>,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            target_score: 12,
            reward: 50,
            clearance: 2,
            categories: ["compliance", "optimization", "disruption", "redundancy"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            buzzwords: [
                "EGO", "SYNERGY", "MATRIX", "PROTOCOL", "ALIGNMENT", "NODE", "FLUX", "CORE",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl SortConfig {
    pub fn parse_ron(input: &str) -> Result<SortConfig, MinigameError> {
        let config: SortConfig = ron::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MinigameError> {
        if self.categories.is_empty() {
            return Err(MinigameError::NoCategories);
        }
        if self.target_score == 0 {
            return Err(MinigameError::ZeroQuota);
        }
        Ok(())
    }
}

/// One draggable block on the terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataBlock {
    pub id: u32,
    pub kind: String,
    pub label: String,
    /// Position as a percentage of the cluster area, in `[0, 80)`.
    pub x_pct: f32,
    pub y_pct: f32,
}

/// Result of dropping a block on a bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SortDrop {
    Inactive,
    UnknownBlock,
    /// Wrong bin; the block stays in the cluster.
    WrongBin,
    Sorted { score: u32 },
    Completed(MinigameOutcome),
}

#[derive(Debug, Clone)]
pub struct DataSort {
    config: SortConfig,
    blocks: Vec<DataBlock>,
    score: u32,
    active: bool,
}

impl DataSort {
    pub fn new(config: SortConfig) -> Result<Self, MinigameError> {
        config.validate()?;
        Ok(Self {
            config,
            blocks: Vec::new(),
            score: 0,
            active: false,
        })
    }

    /// Reset the score and generate a fresh cluster of blocks.
    pub fn start<R: Rng>(&mut self, rng: &mut R) -> &[DataBlock] {
        self.score = 0;
        self.active = true;
        self.blocks = (0..self.config.target_score)
            .map(|id| self.generate_block(id, rng))
            .collect();
        &self.blocks
    }

    fn generate_block<R: Rng>(&self, id: u32, rng: &mut R) -> DataBlock {
        let kind = self
            .config
            .categories
            .choose(rng)
            .cloned()
            .unwrap_or_default();
        DataBlock {
            id,
            kind,
            label: self.random_label(rng),
            x_pct: rng.gen_range(0.0..80.0),
            y_pct: rng.gen_range(0.0..80.0),
        }
    }

    /// A buzzword or a six-digit hex code, evenly.
    fn random_label<R: Rng>(&self, rng: &mut R) -> String {
        if rng.gen_bool(0.5) {
            if let Some(word) = self.config.buzzwords.choose(rng) {
                return word.clone();
            }
        }
        format!("0x{:06X}", rng.gen_range(0..0xFF_FFFFu32))
    }

    pub fn drop_block(&mut self, block_id: u32, bin: &str) -> SortDrop {
        if !self.active {
            return SortDrop::Inactive;
        }
        let Some(pos) = self.blocks.iter().position(|b| b.id == block_id) else {
            return SortDrop::UnknownBlock;
        };
        if self.blocks[pos].kind != bin {
            return SortDrop::WrongBin;
        }

        self.blocks.remove(pos);
        self.score += 1;
        if self.score >= self.config.target_score {
            self.active = false;
            self.blocks.clear();
            return SortDrop::Completed(MinigameOutcome {
                currency: self.config.reward,
                items: Vec::new(),
                clearance: Some(self.config.clearance),
                message: format!(
                    "Your Proxy Card beeped. It feels heavier. Clearance upgraded to Level {}.",
                    self.config.clearance
                ),
            });
        }
        SortDrop::Sorted { score: self.score }
    }

    /// Leave the terminal without finishing. Nothing is awarded.
    pub fn log_off(&mut self) -> MinigameOutcome {
        self.active = false;
        self.blocks.clear();
        MinigameOutcome::message("You log off the terminal.")
    }

    pub fn progress(&self) -> f32 {
        (self.score as f32 / self.config.target_score as f32).min(1.0)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn blocks(&self) -> &[DataBlock] {
        &self.blocks
    }

    pub fn config(&self) -> &SortConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_game() -> DataSort {
        DataSort::new(SortConfig {
            target_score: 3,
            ..SortConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn start_generates_quota_blocks() {
        let mut game = DataSort::new(SortConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let blocks = game.start(&mut rng).to_vec();
        assert_eq!(blocks.len(), 12);
        for b in &blocks {
            assert!(game.config().categories.contains(&b.kind));
            assert!((0.0..80.0f32).contains(&b.x_pct) && (0.0..80.0f32).contains(&b.y_pct));
            let is_hex = b.label.starts_with("0x") && b.label.len() == 8;
            assert!(is_hex || game.config().buzzwords.contains(&b.label), "{}", b.label);
        }
        assert!(game.is_active());
    }

    #[test]
    fn same_seed_same_cluster() {
        let mut a = small_game();
        let mut b = small_game();
        let blocks_a = a.start(&mut StdRng::seed_from_u64(99)).to_vec();
        let blocks_b = b.start(&mut StdRng::seed_from_u64(99)).to_vec();
        assert_eq!(blocks_a, blocks_b);
    }

    #[test]
    fn drop_before_start_is_inactive() {
        let mut game = small_game();
        assert_eq!(game.drop_block(0, "compliance"), SortDrop::Inactive);
    }

    #[test]
    fn wrong_bin_keeps_block() {
        let mut game = small_game();
        game.start(&mut StdRng::seed_from_u64(1));
        let block = game.blocks()[0].clone();
        let wrong = game
            .config()
            .categories
            .iter()
            .find(|c| **c != block.kind)
            .unwrap()
            .clone();
        assert_eq!(game.drop_block(block.id, &wrong), SortDrop::WrongBin);
        assert_eq!(game.blocks().len(), 3);
        assert_eq!(game.score(), 0);
        assert_eq!(game.drop_block(404, &block.kind), SortDrop::UnknownBlock);
    }

    #[test]
    fn sorting_everything_completes_with_award() {
        let mut game = small_game();
        game.start(&mut StdRng::seed_from_u64(3));
        let blocks = game.blocks().to_vec();

        assert_eq!(
            game.drop_block(blocks[0].id, &blocks[0].kind),
            SortDrop::Sorted { score: 1 }
        );
        assert_eq!(
            game.drop_block(blocks[1].id, &blocks[1].kind),
            SortDrop::Sorted { score: 2 }
        );
        match game.drop_block(blocks[2].id, &blocks[2].kind) {
            SortDrop::Completed(outcome) => {
                assert_eq!(outcome.currency, 50);
                assert_eq!(outcome.clearance, Some(2));
                assert!(outcome.message.contains("Level 2"));
            }
            other => panic!("expected completion, got {:?}", other),
        }
        assert!(!game.is_active());
        assert_eq!(game.progress(), 1.0);
    }

    #[test]
    fn log_off_awards_nothing() {
        let mut game = small_game();
        game.start(&mut StdRng::seed_from_u64(3));
        let outcome = game.log_off();
        assert_eq!(outcome.currency, 0);
        assert_eq!(outcome.message, "You log off the terminal.");
        assert!(game.blocks().is_empty());
        assert_eq!(game.drop_block(0, "compliance"), SortDrop::Inactive);
    }

    #[test]
    fn config_validation() {
        assert!(matches!(
            DataSort::new(SortConfig {
                categories: vec![],
                ..SortConfig::default()
            }),
            Err(MinigameError::NoCategories)
        ));
        assert!(matches!(
            SortConfig::parse_ron(
                r#"(target_score: 0, reward: 1, clearance: 2, categories: ["a"], buzzwords: [])"#
            ),
            Err(MinigameError::ZeroQuota)
        ));
        let config = SortConfig::parse_ron(
            r#"(target_score: 4, reward: 10, clearance: 3, categories: ["a", "b"], buzzwords: [])"#,
        )
        .unwrap();
        assert_eq!(config.target_score, 4);
    }

    #[test]
    fn labels_fall_back_to_hex_without_buzzwords() {
        let mut game = DataSort::new(SortConfig {
            buzzwords: vec![],
            ..SortConfig::default()
        })
        .unwrap();
        for b in game.start(&mut StdRng::seed_from_u64(11)) {
            assert!(b.label.starts_with("0x"));
        }
    }
}
