//! Players, positions and teams
//!
//! Rosters are built outside the match engine and handed to it fully formed.
//! The engine only ever reads them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{ATTRIBUTE_DEFAULT, ATTRIBUTE_MAX, ATTRIBUTE_MIN, FORWARD_COUNT, SQUAD_SIZE};

/// Which half of the fixture a team plays as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Defends the top try line, attacks toward +Y
    Home,
    /// Defends the bottom try line, attacks toward -Y
    Away,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }

    /// Sign of the Y axis this side runs toward
    pub fn attack_dir(self) -> f32 {
        match self {
            Side::Home => 1.0,
            Side::Away => -1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Home => "home",
            Side::Away => "away",
        }
    }
}

/// Playing position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    Prop,
    Hooker,
    Lock,
    Flanker,
    NumberEight,
    ScrumHalf,
    FlyHalf,
    Centre,
    Wing,
    Fullback,
}

impl Position {
    /// Matchday order for a 15-player squad (forwards first)
    pub const MVP_SQUAD: [Position; SQUAD_SIZE] = [
        Position::Prop,
        Position::Prop,
        Position::Hooker,
        Position::Lock,
        Position::Lock,
        Position::Flanker,
        Position::Flanker,
        Position::NumberEight,
        Position::ScrumHalf,
        Position::FlyHalf,
        Position::Centre,
        Position::Centre,
        Position::Wing,
        Position::Wing,
        Position::Fullback,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Prop => "Prop",
            Position::Hooker => "Hooker",
            Position::Lock => "Lock",
            Position::Flanker => "Flanker",
            Position::NumberEight => "Number 8",
            Position::ScrumHalf => "Scrum-half",
            Position::FlyHalf => "Fly-half",
            Position::Centre => "Centre",
            Position::Wing => "Wing",
            Position::Fullback => "Fullback",
        }
    }

    pub fn is_forward(&self) -> bool {
        matches!(
            self,
            Position::Prop
                | Position::Hooker
                | Position::Lock
                | Position::Flanker
                | Position::NumberEight
        )
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named attribute, used for team-wide averages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Tackling,
    Passing,
    Kicking,
    Speed,
    Strength,
}

fn default_attribute() -> u8 {
    ATTRIBUTE_DEFAULT
}

/// The five playing attributes, each in `[1, 100]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(default = "default_attribute")]
    pub tackling: u8,
    #[serde(default = "default_attribute")]
    pub passing: u8,
    #[serde(default = "default_attribute")]
    pub kicking: u8,
    #[serde(default = "default_attribute")]
    pub speed: u8,
    #[serde(default = "default_attribute")]
    pub strength: u8,
}

impl Default for Attributes {
    fn default() -> Self {
        Self::uniform(ATTRIBUTE_DEFAULT)
    }
}

impl Attributes {
    pub fn new(tackling: u8, passing: u8, kicking: u8, speed: u8, strength: u8) -> Self {
        Self {
            tackling,
            passing,
            kicking,
            speed,
            strength,
        }
        .clamped()
    }

    /// Every attribute set to the same value
    pub fn uniform(value: u8) -> Self {
        Self::new(value, value, value, value, value)
    }

    /// Force every attribute into `[1, 100]`
    pub fn clamped(self) -> Self {
        let c = |v: u8| v.clamp(ATTRIBUTE_MIN, ATTRIBUTE_MAX);
        Self {
            tackling: c(self.tackling),
            passing: c(self.passing),
            kicking: c(self.kicking),
            speed: c(self.speed),
            strength: c(self.strength),
        }
    }

    pub fn get(&self, attribute: Attribute) -> u8 {
        match attribute {
            Attribute::Tackling => self.tackling,
            Attribute::Passing => self.passing,
            Attribute::Kicking => self.kicking,
            Attribute::Speed => self.speed,
            Attribute::Strength => self.strength,
        }
    }

    /// Overall skill: mean of the five attributes, truncated
    pub fn skill(&self) -> u8 {
        let total = self.tackling as u32
            + self.passing as u32
            + self.kicking as u32
            + self.speed as u32
            + self.strength as u32;
        (total / 5) as u8
    }
}

/// Serialized form of a player; skill is always re-derived on load
#[derive(Deserialize)]
struct PlayerRecord {
    name: String,
    position: Position,
    #[serde(default)]
    attributes: Attributes,
}

/// A single player. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PlayerRecord")]
pub struct Player {
    pub name: String,
    pub position: Position,
    attributes: Attributes,
    skill: u8,
}

impl From<PlayerRecord> for Player {
    fn from(record: PlayerRecord) -> Self {
        Player::new(record.name, record.position, record.attributes)
    }
}

impl Player {
    pub fn new(name: impl Into<String>, position: Position, attributes: Attributes) -> Self {
        let attributes = attributes.clamped();
        Self {
            name: name.into(),
            position,
            skill: attributes.skill(),
            attributes,
        }
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn tackling(&self) -> u8 {
        self.attributes.tackling
    }

    pub fn passing(&self) -> u8 {
        self.attributes.passing
    }

    pub fn kicking(&self) -> u8 {
        self.attributes.kicking
    }

    pub fn speed(&self) -> u8 {
        self.attributes.speed
    }

    pub fn strength(&self) -> u8 {
        self.attributes.strength
    }

    pub fn skill(&self) -> u8 {
        self.skill
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) - Skill: {}", self.name, self.position, self.skill)
    }
}

/// A rugby team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    #[serde(default)]
    pub player_controlled: bool,
    #[serde(default)]
    pub players: Vec<Player>,
}

impl Team {
    pub fn new(name: impl Into<String>, players: Vec<Player>) -> Self {
        Self {
            name: name.into(),
            player_controlled: false,
            players,
        }
    }

    /// A full MVP squad with every attribute at the default of 50
    pub fn balanced(name: impl Into<String>) -> Self {
        let name = name.into();
        let players = Position::MVP_SQUAD
            .iter()
            .enumerate()
            .map(|(i, &position)| {
                Player::new(
                    format!("{} #{}", name, i + 1),
                    position,
                    Attributes::default(),
                )
            })
            .collect();
        Self::new(name, players)
    }

    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether the player at `index` lines up with the forwards
    pub fn is_forward_slot(index: usize) -> bool {
        index < FORWARD_COUNT
    }

    /// Average derived skill (0 for an empty squad)
    pub fn average_skill(&self) -> f32 {
        if self.players.is_empty() {
            return 0.0;
        }
        let total: u32 = self.players.iter().map(|p| p.skill() as u32).sum();
        total as f32 / self.players.len() as f32
    }

    /// Average of one attribute (0 for an empty squad)
    pub fn average(&self, attribute: Attribute) -> f32 {
        if self.players.is_empty() {
            return 0.0;
        }
        let total: u32 = self
            .players
            .iter()
            .map(|p| p.attributes().get(attribute) as u32)
            .sum();
        total as f32 / self.players.len() as f32
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_clamped() {
        let attrs = Attributes::new(0, 150, 50, 100, 1);
        assert_eq!(attrs.tackling, 1);
        assert_eq!(attrs.passing, 100);
        assert_eq!(attrs.kicking, 50);
        assert_eq!(attrs.speed, 100);
        assert_eq!(attrs.strength, 1);
    }

    #[test]
    fn test_skill_is_truncated_mean() {
        let player = Player::new("Test", Position::FlyHalf, Attributes::new(60, 61, 62, 63, 65));
        // 311 / 5 = 62.2
        assert_eq!(player.skill(), 62);
        assert_eq!(player.to_string(), "Test (Fly-half) - Skill: 62");
    }

    #[test]
    fn test_balanced_team() {
        let team = Team::balanced("Harlequins");
        assert_eq!(team.len(), SQUAD_SIZE);
        assert!(team.players[..FORWARD_COUNT].iter().all(|p| p.position.is_forward()));
        assert!(team.players[FORWARD_COUNT..].iter().all(|p| !p.position.is_forward()));
        assert_eq!(team.average_skill(), 50.0);
        assert_eq!(team.average(Attribute::Kicking), 50.0);
    }

    #[test]
    fn test_empty_team_averages_are_zero() {
        let team = Team::new("Nobody", Vec::new());
        assert_eq!(team.average_skill(), 0.0);
        assert_eq!(team.average(Attribute::Speed), 0.0);
    }

    #[test]
    fn test_team_from_json_defaults_missing_fields() {
        let json = r#"{
            "name": "Saracens",
            "players": [
                { "name": "A", "position": "Prop", "attributes": { "strength": 200, "speed": 30 } },
                { "name": "B", "position": "Wing" }
            ]
        }"#;
        let team = Team::from_json(json).unwrap();
        assert!(!team.player_controlled);
        assert_eq!(team.players[0].strength(), 100);
        assert_eq!(team.players[0].speed(), 30);
        assert_eq!(team.players[0].tackling(), 50);
        // (50 + 50 + 50 + 30 + 100) / 5
        assert_eq!(team.players[0].skill(), 56);
        assert_eq!(*team.players[1].attributes(), Attributes::default());
    }

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::Home.opponent(), Side::Away);
        assert_eq!(Side::Away.opponent(), Side::Home);
        assert_eq!(Side::Home.attack_dir(), 1.0);
        assert_eq!(Side::Away.attack_dir(), -1.0);
    }
}
