/// Email triage minigame — file incoming mail into the right folder
/// before the clock runs out.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::minigame::{MinigameError, MinigameOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Folder {
    Urgent,
    Spam,
    Archive,
}

impl Folder {
    pub const ALL: [Folder; 3] = [Folder::Urgent, Folder::Spam, Folder::Archive];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::Spam => "spam",
            Self::Archive => "archive",
        }
    }

    pub fn parse(s: &str) -> Option<Folder> {
        match s.to_lowercase().as_str() {
            "urgent" => Some(Self::Urgent),
            "spam" => Some(Self::Spam),
            "archive" => Some(Self::Archive),
            _ => None,
        }
    }

    fn subjects(&self) -> &'static [&'static str] {
        match self {
            Self::Urgent => &[
                "Server room is making the noise again",
                "Q3 compliance audit due TODAY",
                "Slides for the board meeting, need in 5 min",
                "Proxybot firmware recall notice",
            ],
            Self::Spam => &[
                "You have won a complimentary cruise",
                "Miracle synergy supplement, 90% off",
                "Claim your productivity crypto bonus",
                "Singles in your subnet want to connect",
            ],
            Self::Archive => &[
                "Minutes from Tuesday's sync",
                "Newsletter: breakroom edition",
                "Re: Re: Fwd: lunch order",
                "Updated parking policy (v14)",
            ],
        }
    }
}

const SENDERS: &[&str] = &["hr_bot", "gary", "it-helpdesk", "ceo", "noreply", "facilities"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageConfig {
    /// Correctly filed emails needed to finish.
    pub quota: u32,
    pub time_limit: Duration,
    pub reward: u32,
    /// Score lost per misfiled email.
    pub penalty: u32,
    /// Emails visible in the inbox at once.
    pub inbox_size: usize,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            quota: 8,
            time_limit: Duration::from_secs(60),
            reward: 30,
            penalty: 1,
            inbox_size: 5,
        }
    }
}

impl TriageConfig {
    pub fn validate(&self) -> Result<(), MinigameError> {
        if self.quota == 0 || self.inbox_size == 0 {
            return Err(MinigameError::ZeroQuota);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub id: u32,
    pub sender: String,
    pub subject: String,
    #[serde(skip_serializing)]
    pub folder: Folder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriageState {
    Ready,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TriageResult {
    Inactive,
    UnknownEmail,
    Correct { score: u32 },
    Wrong { score: u32 },
    Completed(MinigameOutcome),
}

#[derive(Debug, Clone)]
pub struct EmailTriage {
    config: TriageConfig,
    rng: StdRng,
    inbox: Vec<Email>,
    next_id: u32,
    score: u32,
    elapsed: Duration,
    state: TriageState,
}

impl EmailTriage {
    pub fn new(config: TriageConfig) -> Result<Self, MinigameError> {
        config.validate()?;
        Ok(Self {
            config,
            rng: StdRng::seed_from_u64(0),
            inbox: Vec::new(),
            next_id: 0,
            score: 0,
            elapsed: Duration::ZERO,
            state: TriageState::Ready,
        })
    }

    /// Begin a round with mail generated from `seed`.
    pub fn start(&mut self, seed: u64) -> &[Email] {
        self.rng = StdRng::seed_from_u64(seed);
        self.inbox.clear();
        self.next_id = 0;
        self.score = 0;
        self.elapsed = Duration::ZERO;
        self.state = TriageState::Running;
        self.refill();
        &self.inbox
    }

    fn refill(&mut self) {
        while self.inbox.len() < self.config.inbox_size {
            let email = self.generate_email();
            self.inbox.push(email);
        }
    }

    fn generate_email(&mut self) -> Email {
        let folder = Folder::ALL[self.rng.gen_range(0..Folder::ALL.len())];
        let subject = folder
            .subjects()
            .choose(&mut self.rng)
            .copied()
            .unwrap_or_default();
        let sender = SENDERS.choose(&mut self.rng).copied().unwrap_or_default();
        let id = self.next_id;
        self.next_id += 1;
        Email {
            id,
            sender: sender.to_string(),
            subject: subject.to_string(),
            folder,
        }
    }

    /// File an email. Filed mail leaves the inbox either way.
    pub fn classify(&mut self, email_id: u32, folder: Folder) -> TriageResult {
        if self.state != TriageState::Running {
            return TriageResult::Inactive;
        }
        let Some(pos) = self.inbox.iter().position(|e| e.id == email_id) else {
            return TriageResult::UnknownEmail;
        };
        let email = self.inbox.remove(pos);

        if email.folder != folder {
            self.score = self.score.saturating_sub(self.config.penalty);
            self.refill();
            return TriageResult::Wrong { score: self.score };
        }

        self.score += 1;
        if self.score >= self.config.quota {
            self.state = TriageState::Completed;
            self.inbox.clear();
            return TriageResult::Completed(MinigameOutcome {
                currency: self.config.reward,
                items: Vec::new(),
                clearance: None,
                message: "Inbox zero. Somewhere, a manager feels a flicker of pride.".to_string(),
            });
        }
        self.refill();
        TriageResult::Correct { score: self.score }
    }

    /// Advance the round clock. Returns the failure outcome if time ran
    /// out on this tick.
    pub fn tick(&mut self, elapsed: Duration) -> Option<MinigameOutcome> {
        if self.state != TriageState::Running {
            return None;
        }
        self.elapsed += elapsed;
        if self.elapsed < self.config.time_limit {
            return None;
        }
        self.state = TriageState::Failed;
        self.inbox.clear();
        Some(MinigameOutcome::message(
            "The inbox overflows. An automated reply apologises on your behalf.",
        ))
    }

    pub fn remaining(&self) -> Duration {
        self.config.time_limit.saturating_sub(self.elapsed)
    }

    pub fn inbox(&self) -> &[Email] {
        &self.inbox
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn state(&self) -> TriageState {
        self.state
    }
}
