//! Notes of a rhythm game chart and the relations between them: sync pairs, flick chains and
//! holds. Relations are always kept symmetric and everything derived from them (note type,
//! flick direction) is recomputed whenever they change.

mod id;
pub use id::{Id, IdMap};
mod error;
pub use error::{InvalidOrdinal, NoteError, Result};
mod note;
pub use note::{FlickType, Note, NotePosition, NoteType};
mod params;
pub use params::{ExtraParamsChanged, ListenerHandle, NoteExtraParams};
mod chart;
pub use chart::{Bar, Chart};
mod relation;
mod ordering;
mod flick_group;
pub use flick_group::{FlickGroup, FlickGroupMembers, FlickGroupResolution};
mod record;
pub use record::{BarRecord, NoteRecord};
