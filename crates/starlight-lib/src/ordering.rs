use std::cmp::Ordering;

use crate::{Chart, Id, Note, NoteType, error::Result};

impl Note {
    /// Lane order, ignoring time. Used for laying notes out, not for the timeline.
    pub fn track_position_cmp(&self, other: &Note) -> Ordering {
        u8::from(self.finish_position).cmp(&u8::from(other.finish_position))
    }
}

impl Chart {
    /// Timeline order: bar, then grid line. On a shared grid line a VariantBpm note comes
    /// after every other note.
    pub fn compare_timing(&self, a: Id<Note>, b: Id<Note>) -> Result<Ordering> {
        let a = self.note(a)?;
        let b = self.note(b)?;
        Ok(self.timing_cmp(a, b))
    }

    pub fn compare_track_position(&self, a: Id<Note>, b: Id<Note>) -> Result<Ordering> {
        Ok(self.note(a)?.track_position_cmp(self.note(b)?))
    }

    /// `a` comes strictly after `b` on the timeline.
    pub fn is_later(&self, a: Id<Note>, b: Id<Note>) -> Result<bool> {
        Ok(self.compare_timing(a, b)? == Ordering::Greater)
    }
    /// `a` comes strictly before `b` on the timeline.
    pub fn is_earlier(&self, a: Id<Note>, b: Id<Note>) -> Result<bool> {
        Ok(self.compare_timing(a, b)? == Ordering::Less)
    }

    /// Stable sort of `ids` into timeline order. Nothing is moved if any id is unknown.
    pub fn sort_by_timing(&self, ids: &mut [Id<Note>]) -> Result<()> {
        for &id in ids.iter() {
            self.check_note(id)?;
        }
        ids.sort_by(|&a, &b| {
            self.timing_cmp(self.notes.force_get(a), self.notes.force_get(b))
        });
        Ok(())
    }

    pub(crate) fn timing_cmp(&self, a: &Note, b: &Note) -> Ordering {
        if a.id() == b.id() {
            return Ordering::Equal;
        }
        if a.bar != b.bar {
            return self.bar_index(a.bar).cmp(&self.bar_index(b.bar));
        }
        a.index_in_grid.cmp(&b.index_in_grid).then_with(|| {
            match (a.ty == NoteType::VariantBpm, b.ty == NoteType::VariantBpm) {
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                _ => Ordering::Equal,
            }
        })
    }
}
