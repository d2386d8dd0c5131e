//! Procedural sound effects for discrete game events.
//!
//! Each [`SoundType`] maps to a fixed recipe in [`recipes`]; a recipe is a
//! [`Patch`] of independent layers that render into one mono buffer.

pub mod bank;
pub mod patch;
pub mod recipes;

pub use bank::{RenderedSound, SoundBank};
pub use patch::{FilterStage, Layer, Patch, Source};

use crate::error::ClientError;

/// Game events that make a sound. The numeric ids are part of the
/// simulation ABI and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum SoundType {
    Move = 1,
    Attack = 2,
    HitReceived = 3,
    Die = 4,
    Gold = 5,
    UiClick = 6,
    UiStart = 7,
    UiStop = 8,
    KeyType = 9,
}

impl SoundType {
    pub const ALL: [SoundType; 9] = [
        SoundType::Move,
        SoundType::Attack,
        SoundType::HitReceived,
        SoundType::Die,
        SoundType::Gold,
        SoundType::UiClick,
        SoundType::UiStart,
        SoundType::UiStop,
        SoundType::KeyType,
    ];

    pub fn id(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for SoundType {
    type Error = ClientError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        SoundType::ALL
            .into_iter()
            .find(|s| s.id() == id)
            .ok_or(ClientError::UnknownSound(id))
    }
}

/// Anything that can be asked to voice a game event.
pub trait SoundSink {
    fn play(&mut self, sound: SoundType);
}

/// Collects requests for deferred playback.
impl SoundSink for Vec<SoundType> {
    fn play(&mut self, sound: SoundType) {
        self.push(sound);
    }
}
