//! Music channel slots.
//!
//! Exactly two music channels exist: the ambient track and the combat track
//! that ducks it. Each slot also remembers the last track index that played
//! in it, so ambient music can resume after combat ends.

use ember_common::MusicId;

use crate::device::AssetKey;

/// One of the two music channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MusicSlot {
    /// Background music.
    Ambient,
    /// War mode music. Takes audible priority over `Ambient`.
    Combat,
}

impl MusicSlot {
    /// Both slots, in update order.
    pub const ALL: [Self; 2] = [Self::Ambient, Self::Combat];

    /// Slot used for a play request.
    #[must_use]
    pub const fn for_mode(war_mode: bool) -> Self {
        if war_mode {
            Self::Combat
        } else {
            Self::Ambient
        }
    }
}

/// A track loaded into a slot.
#[derive(Debug)]
pub struct MusicChannel<M> {
    pub(crate) track: MusicId,
    pub(crate) asset: AssetKey,
    pub(crate) stream: M,
}

impl<M> MusicChannel<M> {
    /// Track index that was requested.
    #[must_use]
    pub fn track(&self) -> MusicId {
        self.track
    }

    /// Asset the track resolved to.
    #[must_use]
    pub fn asset(&self) -> &AssetKey {
        &self.asset
    }

    /// The playing stream.
    #[must_use]
    pub fn stream(&self) -> &M {
        &self.stream
    }
}

/// The ambient and combat slots.
#[derive(Debug)]
pub struct MusicSlots<M> {
    ambient: Option<MusicChannel<M>>,
    combat: Option<MusicChannel<M>>,
    last_ambient: MusicId,
    last_combat: MusicId,
}

impl<M> Default for MusicSlots<M> {
    fn default() -> Self {
        Self {
            ambient: None,
            combat: None,
            last_ambient: MusicId::default(),
            last_combat: MusicId::default(),
        }
    }
}

impl<M> MusicSlots<M> {
    /// Creates empty slots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel in `slot`, if occupied.
    #[must_use]
    pub fn get(&self, slot: MusicSlot) -> Option<&MusicChannel<M>> {
        match slot {
            MusicSlot::Ambient => self.ambient.as_ref(),
            MusicSlot::Combat => self.combat.as_ref(),
        }
    }

    /// Mutable channel in `slot`, if occupied.
    pub fn get_mut(&mut self, slot: MusicSlot) -> Option<&mut MusicChannel<M>> {
        match slot {
            MusicSlot::Ambient => self.ambient.as_mut(),
            MusicSlot::Combat => self.combat.as_mut(),
        }
    }

    /// Whether `slot` holds a track.
    #[must_use]
    pub fn is_occupied(&self, slot: MusicSlot) -> bool {
        self.get(slot).is_some()
    }

    /// Whether both slots are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ambient.is_none() && self.combat.is_none()
    }

    /// Loads a channel into `slot` and records its track as the last one
    /// played there. Returns the channel it replaced.
    pub fn insert(&mut self, slot: MusicSlot, channel: MusicChannel<M>) -> Option<MusicChannel<M>> {
        let track = channel.track;
        match slot {
            MusicSlot::Ambient => {
                self.last_ambient = track;
                self.ambient.replace(channel)
            },
            MusicSlot::Combat => {
                self.last_combat = track;
                self.combat.replace(channel)
            },
        }
    }

    /// Empties `slot`. The last-played record is kept.
    pub fn take(&mut self, slot: MusicSlot) -> Option<MusicChannel<M>> {
        match slot {
            MusicSlot::Ambient => self.ambient.take(),
            MusicSlot::Combat => self.combat.take(),
        }
    }

    /// Last track index loaded into `slot`.
    #[must_use]
    pub fn last_track(&self, slot: MusicSlot) -> MusicId {
        match slot {
            MusicSlot::Ambient => self.last_ambient,
            MusicSlot::Combat => self.last_combat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(track: u16, asset: &str) -> MusicChannel<()> {
        MusicChannel {
            track: MusicId::new(track),
            asset: AssetKey::new(asset),
            stream: (),
        }
    }

    #[test]
    fn test_slots_start_empty() {
        let slots = MusicSlots::<()>::new();
        assert!(slots.is_empty());
        assert!(!slots.is_occupied(MusicSlot::Ambient));
        assert_eq!(slots.last_track(MusicSlot::Ambient), MusicId::new(0));
    }

    #[test]
    fn test_insert_records_last_track() {
        let mut slots = MusicSlots::new();
        assert!(slots.insert(MusicSlot::Ambient, channel(3, "a")).is_none());
        assert!(slots.insert(MusicSlot::Combat, channel(7, "b")).is_none());

        assert_eq!(slots.last_track(MusicSlot::Ambient), MusicId::new(3));
        assert_eq!(slots.last_track(MusicSlot::Combat), MusicId::new(7));

        let replaced = slots.insert(MusicSlot::Ambient, channel(4, "c"));
        assert_eq!(replaced.map(|c| c.track()), Some(MusicId::new(3)));
    }

    #[test]
    fn test_take_keeps_last_track() {
        let mut slots = MusicSlots::new();
        slots.insert(MusicSlot::Ambient, channel(9, "a"));

        let taken = slots.take(MusicSlot::Ambient);
        assert_eq!(taken.map(|c| c.track()), Some(MusicId::new(9)));
        assert!(slots.is_empty());
        assert_eq!(slots.last_track(MusicSlot::Ambient), MusicId::new(9));
    }

    #[test]
    fn test_for_mode() {
        assert_eq!(MusicSlot::for_mode(true), MusicSlot::Combat);
        assert_eq!(MusicSlot::for_mode(false), MusicSlot::Ambient);
    }
}
