use crate::{Bar, FlickGroup, Id, NoteExtraParams, error::InvalidOrdinal};

/// A horizontal lane. `Nowhere` is the unset value new notes start with.
#[derive(PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Debug, Default, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum NotePosition {
    #[default]
    Nowhere = 0,
    Left = 1,
    CenterLeft = 2,
    Center = 3,
    CenterRight = 4,
    Right = 5,
}

impl From<NotePosition> for u8 {
    fn from(value: NotePosition) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for NotePosition {
    type Error = InvalidOrdinal;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Nowhere,
            1 => Self::Left,
            2 => Self::CenterLeft,
            3 => Self::Center,
            4 => Self::CenterRight,
            5 => Self::Right,
            _ => {
                return Err(InvalidOrdinal {
                    kind: "NotePosition",
                    value,
                });
            }
        })
    }
}

#[derive(PartialEq, Eq, Copy, Clone, Debug, Default, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum FlickType {
    #[default]
    Tap = 0,
    FlickLeft = 1,
    FlickRight = 2,
}

impl FlickType {
    pub fn is_flick(self) -> bool {
        matches!(self, Self::FlickLeft | Self::FlickRight)
    }
}

impl From<FlickType> for u8 {
    fn from(value: FlickType) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for FlickType {
    type Error = InvalidOrdinal;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Tap,
            1 => Self::FlickLeft,
            2 => Self::FlickRight,
            _ => {
                return Err(InvalidOrdinal {
                    kind: "FlickType",
                    value,
                });
            }
        })
    }
}

/// Never persisted. Hold/TapOrFlick come from the hold relation; VariantBpm is set explicitly.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
pub enum NoteType {
    Invalid,
    TapOrFlick,
    Hold,
    VariantBpm,
}

impl NoteType {
    /// Whether notes of this type are something the player actually hits.
    pub fn is_gaming(self) -> bool {
        matches!(self, Self::TapOrFlick | Self::Hold)
    }
    pub fn is_special(self) -> bool {
        self == Self::VariantBpm
    }
}

/// A single beat in a chart.
///
/// Relations to other notes are stored as ids into the owning [`Chart`](crate::Chart) and can
/// only be changed through its connectors (`connect_sync`, `connect_flick`, `connect_hold` and
/// friends), which keep both ends of every relation in agreement. Everything the connectors
/// derive (`note_type`, `flick_type`, `is_sync`, ...) is read-only here. Grid and lane are
/// read-only too, since both feed into derived state; move notes with
/// [`Chart::set_index_in_grid`](crate::Chart::set_index_in_grid) and friends.
#[derive(Clone, Debug)]
pub struct Note {
    id: Id<Note>,
    pub(crate) bar: Id<Bar>,

    pub(crate) index_in_grid: i32,
    pub(crate) start_position: NotePosition,
    pub(crate) finish_position: NotePosition,

    pub(crate) ty: NoteType,
    pub(crate) flick_type: FlickType,

    pub(crate) sync_target: Option<Id<Note>>,
    pub(crate) prev_flick: Option<Id<Note>>,
    pub(crate) next_flick: Option<Id<Note>>,
    pub(crate) hold_target: Option<Id<Note>>,

    pub(crate) group_id: Option<Id<FlickGroup>>,
    pub(crate) extra_params: Option<NoteExtraParams>,
}

impl Note {
    pub(crate) fn new(id: Id<Note>, bar: Id<Bar>) -> Self {
        Self {
            id,
            bar,
            index_in_grid: 0,
            start_position: NotePosition::Nowhere,
            finish_position: NotePosition::Nowhere,
            ty: NoteType::TapOrFlick,
            flick_type: FlickType::Tap,
            sync_target: None,
            prev_flick: None,
            next_flick: None,
            hold_target: None,
            group_id: None,
            extra_params: None,
        }
    }

    #[inline]
    pub fn id(&self) -> Id<Note> {
        self.id
    }
    #[inline]
    pub fn bar(&self) -> Id<Bar> {
        self.bar
    }
    #[inline]
    pub fn note_type(&self) -> NoteType {
        self.ty
    }
    #[inline]
    pub fn flick_type(&self) -> FlickType {
        self.flick_type
    }

    #[inline]
    pub fn index_in_grid(&self) -> i32 {
        self.index_in_grid
    }
    #[inline]
    pub fn start_position(&self) -> NotePosition {
        self.start_position
    }
    #[inline]
    pub fn finish_position(&self) -> NotePosition {
        self.finish_position
    }

    /// Zero-based lane slot. `-1` while the note is `Nowhere`.
    pub fn index_in_track(&self) -> i32 {
        i32::from(u8::from(self.finish_position)) - 1
    }

    pub fn sync_target(&self) -> Option<Id<Note>> {
        self.sync_target
    }
    pub fn prev_flick_note(&self) -> Option<Id<Note>> {
        self.prev_flick
    }
    pub fn next_flick_note(&self) -> Option<Id<Note>> {
        self.next_flick
    }
    pub fn hold_target(&self) -> Option<Id<Note>> {
        self.hold_target
    }

    // the persisted forms of the relation slots
    pub fn sync_target_id(&self) -> Id<Note> {
        Id::or_invalid(self.sync_target)
    }
    pub fn prev_flick_note_id(&self) -> Id<Note> {
        Id::or_invalid(self.prev_flick)
    }
    pub fn next_flick_note_id(&self) -> Id<Note> {
        Id::or_invalid(self.next_flick)
    }
    pub fn hold_target_id(&self) -> Id<Note> {
        Id::or_invalid(self.hold_target)
    }

    pub fn group_id(&self) -> Option<Id<FlickGroup>> {
        self.group_id
    }
    pub fn extra_params(&self) -> Option<&NoteExtraParams> {
        self.extra_params.as_ref()
    }

    pub fn is_sync(&self) -> bool {
        self.sync_target.is_some()
    }
    pub fn is_hold(&self) -> bool {
        self.hold_target.is_some()
    }
    pub fn is_flick(&self) -> bool {
        self.ty == NoteType::TapOrFlick && self.flick_type.is_flick()
    }
    pub fn is_tap(&self) -> bool {
        self.ty == NoteType::TapOrFlick && self.flick_type == FlickType::Tap
    }

    pub fn is_hold_start(&self) -> bool {
        self.ty == NoteType::Hold && self.hold_target.is_some()
    }
    pub fn is_hold_end(&self) -> bool {
        self.ty == NoteType::TapOrFlick && self.hold_target.is_some()
    }

    pub fn has_prev_flick(&self) -> bool {
        self.ty == NoteType::TapOrFlick && self.prev_flick.is_some()
    }
    pub fn has_next_flick(&self) -> bool {
        self.ty == NoteType::TapOrFlick && self.next_flick.is_some()
    }
    pub(crate) fn has_chain_neighbor(&self) -> bool {
        self.prev_flick.is_some() || self.next_flick.is_some()
    }

    pub fn is_gaming_note(&self) -> bool {
        self.ty.is_gaming()
    }
    pub fn is_special_note(&self) -> bool {
        self.ty.is_special()
    }
}
