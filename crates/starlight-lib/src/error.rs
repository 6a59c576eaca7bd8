use crate::{Bar, Id, Note, NoteType};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NoteError {
    #[error("note {0:?} is not part of this chart")]
    MissingNote(Id<Note>),
    #[error("bar {0:?} is not part of this chart")]
    MissingBar(Id<Bar>),
    #[error("{0:?} is not a usable note id")]
    InvalidId(Id<Note>),
    #[error("note {0:?} already exists")]
    DuplicateNote(Id<Note>),
    #[error("note {0:?} cannot be related to itself")]
    SelfRelation(Id<Note>),
    #[error("notes {0:?} and {1:?} share a timing and can't form a hold")]
    SimultaneousHold(Id<Note>, Id<Note>),
    #[error("{0:?} is not a special note type")]
    NotSpecialType(NoteType),
    #[error("flick type of note {0:?} is determined by its flick chain")]
    FlickTypeLocked(Id<Note>),
}

/// A persisted enum ordinal that doesn't name any variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{value} is not a valid {kind} ordinal")]
pub struct InvalidOrdinal {
    pub kind: &'static str,
    pub value: u8,
}

pub type Result<T, E = NoteError> = std::result::Result<T, E>;
