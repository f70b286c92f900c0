//! Kitchen roles: the whole-role access board used before the verb-level
//! matrix. Each role either may or may not enter a station; there are no
//! verbs.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RbacError;
use crate::matrix::AccessDecision;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KitchenRole {
    HeadChef,
    SousChef,
    LineCook,
    /// No role assigned. Denied everywhere.
    #[default]
    None,
}

impl KitchenRole {
    pub const ALL: [KitchenRole; 4] = [
        KitchenRole::HeadChef,
        KitchenRole::SousChef,
        KitchenRole::LineCook,
        KitchenRole::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KitchenRole::HeadChef => "head-chef",
            KitchenRole::SousChef => "sous-chef",
            KitchenRole::LineCook => "line-cook",
            KitchenRole::None => "none",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            KitchenRole::HeadChef => "Head Chef",
            KitchenRole::SousChef => "Sous Chef",
            KitchenRole::LineCook => "Line Cook",
            KitchenRole::None => "No Role Assigned",
        }
    }
}

impl FromStr for KitchenRole {
    type Err = RbacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KitchenRole::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RbacError::UnknownRole(s.to_string()))
    }
}

impl std::fmt::Display for KitchenRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Station {
    Pantry,
    SpecialIngredients,
    MainStove,
    Expediting,
}

impl Station {
    pub const ALL: [Station; 4] = [
        Station::Pantry,
        Station::SpecialIngredients,
        Station::MainStove,
        Station::Expediting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Station::Pantry => "pantry",
            Station::SpecialIngredients => "special-ingredients",
            Station::MainStove => "main-stove",
            Station::Expediting => "expediting",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Station::Pantry => "Main Pantry",
            Station::SpecialIngredients => "Special Ingredients",
            Station::MainStove => "Main Stove Control",
            Station::Expediting => "Order Expediting",
        }
    }

    /// Lowest role rank that may use this station.
    fn required_rank(&self) -> u8 {
        match self {
            Station::Pantry => 1,
            Station::SpecialIngredients => 2,
            Station::MainStove | Station::Expediting => 3,
        }
    }
}

impl FromStr for Station {
    type Err = RbacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Station::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RbacError::UnknownStation(s.to_string()))
    }
}

impl std::fmt::Display for Station {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn rank(role: KitchenRole) -> u8 {
    match role {
        KitchenRole::HeadChef => 3,
        KitchenRole::SousChef => 2,
        KitchenRole::LineCook => 1,
        KitchenRole::None => 0,
    }
}

/// Whether `role` may use `station`.
pub fn has_access(role: KitchenRole, station: Station) -> bool {
    rank(role) >= station.required_rank()
}

/// The currently assigned kitchen role and what it unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KitchenBoard {
    role: KitchenRole,
}

impl KitchenBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(&self) -> KitchenRole {
        self.role
    }

    pub fn assign(&mut self, role: KitchenRole) {
        debug!(from = %self.role, to = %role, "kitchen role assigned");
        self.role = role;
    }

    pub fn check(&self, station: Station) -> AccessDecision {
        if has_access(self.role, station) {
            AccessDecision::Allowed
        } else {
            AccessDecision::Denied
        }
    }

    /// Stations the current role may use, in board order.
    pub fn allowed(&self) -> Vec<Station> {
        Station::ALL
            .into_iter()
            .filter(|s| has_access(self.role, *s))
            .collect()
    }

    /// Every station with its decision for the current role.
    pub fn board(&self) -> Vec<(Station, AccessDecision)> {
        Station::ALL.into_iter().map(|s| (s, self.check(s))).collect()
    }

    /// Back to no role.
    pub fn reset(&mut self) {
        self.role = KitchenRole::None;
    }
}
