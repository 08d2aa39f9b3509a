use serde::{Deserialize, Serialize};

use crate::collision::CrushRecord;

/// How a blocked plane behaves when its mover is allowed to crush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrushMode {
    /// Keep pressing and damage every blocked tic.
    #[default]
    Doom,
    /// Damage on first contact, then stall until the obstruction clears.
    Hexen,
    /// Like [`CrushMode::Doom`], but a crushing ceiling drops to 1/8 speed.
    Slowdown,
}

/// Per-mover crush settings plus the contact state the Hexen mode needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CrushPolicy {
    /// Damage per application, or `None` for a mover that never crushes.
    pub damage: Option<i32>,
    /// Crush behavior while blocked.
    pub mode: CrushMode,
    #[serde(default)]
    contact: bool,
}

impl CrushPolicy {
    /// A mover that stops or reverses instead of crushing.
    pub fn none() -> Self {
        Self::default()
    }

    /// A crushing mover.
    pub fn new(damage: i32, mode: CrushMode) -> Self {
        Self {
            damage: Some(damage),
            mode,
            contact: false,
        }
    }

    /// Build from an optional damage value as carried by activations.
    pub fn from_option(damage: Option<i32>, mode: CrushMode) -> Self {
        damage.map_or_else(Self::none, |d| Self::new(d, mode))
    }

    /// Return `true` if this mover damages obstructions.
    pub fn crushes(&self) -> bool {
        self.damage.is_some()
    }

    /// Return `true` if a blocked plane keeps its new position.
    pub(crate) fn presses(&self) -> bool {
        self.crushes() && self.mode != CrushMode::Hexen
    }

    /// Damage to apply on this tic's fit check.
    pub(crate) fn damage_now(&self) -> Option<i32> {
        match self.mode {
            CrushMode::Hexen if self.contact => None,
            _ => self.damage,
        }
    }

    /// Remember whether this tic's move touched an obstruction.
    pub(crate) fn observe(&mut self, record: &CrushRecord) {
        self.contact = record.blocked;
    }

    /// Return `true` if the last fit check was blocked.
    pub fn in_contact(&self) -> bool {
        self.contact
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.damage.is_none_or(|d| d >= 0)
    }
}
