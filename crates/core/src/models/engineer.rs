use std::fmt;

use serde::{Deserialize, Serialize};

/// On-foot engineers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Engineer {
    /// Domino Green.
    DominoGreen,
    /// Hero Ferrari.
    HeroFerrari,
    /// Jude Navarro.
    JudeNavarro,
    /// Kit Fowler.
    KitFowler,
    /// Oden Geiger.
    OdenGeiger,
    /// Terra Velasquez.
    TerraVelasquez,
    /// Uma Laszlo.
    UmaLaszlo,
    /// Wellington Beck.
    WellingtonBeck,
    /// Yarden Bond.
    YardenBond,
    /// Baltanos, Colonia.
    Baltanos,
    /// Eleanor Bresa, Colonia.
    EleanorBresa,
    /// Rosa Dayette, Colonia.
    RosaDayette,
    /// Yi Shen, Colonia.
    YiShen,
}

impl Engineer {
    /// Every engineer, bubble first.
    pub const ALL: [Engineer; 13] = [
        Engineer::DominoGreen,
        Engineer::HeroFerrari,
        Engineer::JudeNavarro,
        Engineer::KitFowler,
        Engineer::OdenGeiger,
        Engineer::TerraVelasquez,
        Engineer::UmaLaszlo,
        Engineer::WellingtonBeck,
        Engineer::YardenBond,
        Engineer::Baltanos,
        Engineer::EleanorBresa,
        Engineer::RosaDayette,
        Engineer::YiShen,
    ];

    /// Display name as written in the journal.
    pub fn name(self) -> &'static str {
        match self {
            Engineer::DominoGreen => "Domino Green",
            Engineer::HeroFerrari => "Hero Ferrari",
            Engineer::JudeNavarro => "Jude Navarro",
            Engineer::KitFowler => "Kit Fowler",
            Engineer::OdenGeiger => "Oden Geiger",
            Engineer::TerraVelasquez => "Terra Velasquez",
            Engineer::UmaLaszlo => "Uma Laszlo",
            Engineer::WellingtonBeck => "Wellington Beck",
            Engineer::YardenBond => "Yarden Bond",
            Engineer::Baltanos => "Baltanos",
            Engineer::EleanorBresa => "Eleanor Bresa",
            Engineer::RosaDayette => "Rosa Dayette",
            Engineer::YiShen => "Yi Shen",
        }
    }

    /// Journal `EngineerID`.
    pub fn journal_id(self) -> u64 {
        match self {
            Engineer::JudeNavarro => 400001,
            Engineer::DominoGreen => 400002,
            Engineer::HeroFerrari => 400003,
            Engineer::KitFowler => 400004,
            Engineer::YardenBond => 400005,
            Engineer::TerraVelasquez => 400006,
            Engineer::UmaLaszlo => 400007,
            Engineer::WellingtonBeck => 400008,
            Engineer::OdenGeiger => 400009,
            Engineer::Baltanos => 400010,
            Engineer::EleanorBresa => 400011,
            Engineer::RosaDayette => 400012,
            Engineer::YiShen => 400013,
        }
    }

    /// Engineer with the given journal `EngineerID`.
    pub fn from_journal_id(id: u64) -> Option<Self> {
        Engineer::ALL.into_iter().find(|engineer| engineer.journal_id() == id)
    }

    /// Case-insensitive lookup by display name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Engineer::ALL
            .into_iter()
            .find(|engineer| engineer.name().eq_ignore_ascii_case(name))
    }

    /// State an engineer starts in and returns to on reset.
    ///
    /// The colonia engineers unlock through a referral chain this tracker
    /// does not follow, so they are pinned at [`EngineerState::Undefined`].
    pub fn initial_state(self) -> EngineerState {
        match self {
            Engineer::Baltanos
            | Engineer::EleanorBresa
            | Engineer::RosaDayette
            | Engineer::YiShen => EngineerState::Undefined,
            _ => EngineerState::Unknown,
        }
    }
}

impl fmt::Display for Engineer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unlock progression of a single engineer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineerState {
    /// Nothing reported yet.
    Unknown,
    /// Heard of, but no invitation.
    Known,
    /// Invited, or invited and visited.
    Invited,
    /// Workshop fully unlocked.
    Unlocked,
    /// Pinned; progress is not tracked.
    Undefined,
}

impl EngineerState {
    /// Map a journal `Progress` value.
    ///
    /// `Acquainted` follows `Invited` once the workshop has been visited and
    /// grants the same access.
    pub fn from_progress(progress: &str) -> Option<Self> {
        match progress.trim().to_ascii_lowercase().as_str() {
            "known" => Some(EngineerState::Known),
            "invited" | "acquainted" => Some(EngineerState::Invited),
            "unlocked" => Some(EngineerState::Unlocked),
            _ => None,
        }
    }

    /// Position along the progression; `None` for the pinned state.
    pub fn rank(self) -> Option<u8> {
        match self {
            EngineerState::Unknown => Some(0),
            EngineerState::Known => Some(1),
            EngineerState::Invited => Some(2),
            EngineerState::Unlocked => Some(3),
            EngineerState::Undefined => None,
        }
    }

    /// Whether the engineer's workshop can be used.
    pub fn is_unlocked(self) -> bool {
        matches!(
            self,
            EngineerState::Invited | EngineerState::Unlocked | EngineerState::Undefined
        )
    }

    /// An invitation alone does not make an engineer known; meeting them does.
    pub fn is_known(self) -> bool {
        matches!(
            self,
            EngineerState::Known | EngineerState::Unlocked | EngineerState::Undefined
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn journal_ids_round_trip() {
        for engineer in Engineer::ALL {
            assert_eq!(Engineer::from_journal_id(engineer.journal_id()), Some(engineer));
        }
        assert_eq!(Engineer::from_name("domino green"), Some(Engineer::DominoGreen));
    }

    #[test]
    fn progress_strings_map_to_states() {
        assert_eq!(EngineerState::from_progress("Invited"), Some(EngineerState::Invited));
        assert_eq!(EngineerState::from_progress("Known"), Some(EngineerState::Known));
        assert_eq!(
            EngineerState::from_progress("acquainted"),
            Some(EngineerState::Invited)
        );
        assert_eq!(EngineerState::from_progress("Unlocked"), Some(EngineerState::Unlocked));
        assert_eq!(EngineerState::from_progress("Banned"), None);
    }

    #[test]
    fn invited_is_unlocked_but_not_known_marker() {
        assert!(EngineerState::Invited.is_unlocked());
        assert!(!EngineerState::Invited.is_known());
        assert!(EngineerState::Unlocked.is_known());
        assert!(!EngineerState::Known.is_unlocked());
        assert!(EngineerState::Known.is_known());
        assert!(!EngineerState::Unknown.is_known());
        assert!(EngineerState::Undefined.is_known());
    }
}
