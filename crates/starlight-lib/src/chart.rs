use crate::{
    ExtraParamsChanged, FlickType, Id, IdMap, ListenerHandle, Note, NoteError, NoteExtraParams,
    NotePosition, NoteType, error::Result, params::Listeners,
};

/// A measure. Only its position in the chart matters to notes.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct Bar {
    pub index: u32,
}

/// Owns every note of a chart and the bars they sit in.
///
/// Notes refer to each other by [`Id`], never by reference, so removing a note can't leave
/// a cycle of partners keeping each other alive. All relation changes go through the
/// connectors in this type, which keep both ends of a relation in agreement.
#[derive(Debug, Default)]
pub struct Chart {
    bars: IdMap<Bar>,
    pub(crate) notes: IdMap<Note>,

    listeners: Listeners,
}

impl Chart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a bar, or moves an existing one to `index`. Holds with a note in a moved
    /// bar are reclassified.
    pub fn set_bar(&mut self, id: Id<Bar>, index: u32) {
        match self.bars.get_mut(id) {
            Some(bar) => bar.index = index,
            None => {
                self.bars.insert(id, Bar { index });
                return;
            }
        }
        let held: Vec<_> = self
            .notes
            .iter()
            .filter(|(_, note)| note.bar == id && note.hold_target.is_some())
            .map(|(note, _)| note)
            .collect();
        for note in held {
            self.refresh_hold(note);
        }
    }
    pub fn bar(&self, id: Id<Bar>) -> Option<&Bar> {
        self.bars.get(id)
    }
    pub fn bars(&self) -> impl '_ + Iterator<Item = (Id<Bar>, &Bar)> {
        self.bars.iter()
    }
    pub(crate) fn bar_index(&self, id: Id<Bar>) -> u32 {
        self.bars.force_get(id).index
    }

    /// Creates an unlinked tap note at `Nowhere` in `bar`.
    pub fn add_note(&mut self, id: Id<Note>, bar: Id<Bar>) -> Result<&mut Note> {
        if !id.is_valid() {
            return Err(NoteError::InvalidId(id));
        }
        if self.notes.has(id) {
            return Err(NoteError::DuplicateNote(id));
        }
        if !self.bars.has(bar) {
            return Err(NoteError::MissingBar(bar));
        }
        self.notes.insert(id, Note::new(id, bar));
        Ok(self.notes.force_get_mut(id))
    }

    /// Unlinks the note from all of its partners, then drops it from the chart.
    pub fn remove_note(&mut self, id: Id<Note>) -> Result<Note> {
        self.reset(id)?;
        tracing::debug!("removing note {id:?}");
        Ok(self.notes.remove(id).unwrap_or_else(|| unreachable!()))
    }

    pub fn note(&self, id: Id<Note>) -> Result<&Note> {
        self.notes.get(id).ok_or(NoteError::MissingNote(id))
    }
    pub(crate) fn note_mut(&mut self, id: Id<Note>) -> Result<&mut Note> {
        self.notes.get_mut(id).ok_or(NoteError::MissingNote(id))
    }
    pub fn notes(&self) -> impl '_ + Iterator<Item = &Note> {
        self.notes.values()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Moves the note to another bar. Fails without moving it if the note would end up at
    /// the same timing as its hold partner.
    pub fn set_note_bar(&mut self, id: Id<Note>, bar: Id<Bar>) -> Result<()> {
        if !self.bars.has(bar) {
            return Err(NoteError::MissingBar(bar));
        }
        let old = std::mem::replace(&mut self.note_mut(id)?.bar, bar);
        if let Err(err) = self.check_moved_hold(id) {
            self.notes.force_get_mut(id).bar = old;
            return Err(err);
        }
        self.refresh_hold(id);
        Ok(())
    }

    /// Moves the note along its bar's grid, with the same hold check as [`Chart::set_note_bar`].
    pub fn set_index_in_grid(&mut self, id: Id<Note>, index_in_grid: i32) -> Result<()> {
        let old = std::mem::replace(&mut self.note_mut(id)?.index_in_grid, index_in_grid);
        if let Err(err) = self.check_moved_hold(id) {
            self.notes.force_get_mut(id).index_in_grid = old;
            return Err(err);
        }
        self.refresh_hold(id);
        Ok(())
    }

    /// Changes the lane the note ends in. Flick directions along its chain follow.
    pub fn set_finish_position(&mut self, id: Id<Note>, position: NotePosition) -> Result<()> {
        self.note_mut(id)?.finish_position = position;
        self.refresh_flick_chain(id);
        Ok(())
    }
    pub fn set_start_position(&mut self, id: Id<Note>, position: NotePosition) -> Result<()> {
        self.note_mut(id)?.start_position = position;
        Ok(())
    }

    fn check_moved_hold(&self, id: Id<Note>) -> Result<()> {
        match self.notes.force_get(id).hold_target {
            Some(partner) => self.check_hold_timing(id, partner),
            None => Ok(()),
        }
    }

    pub(crate) fn check_note(&self, id: Id<Note>) -> Result<()> {
        if self.notes.has(id) {
            Ok(())
        } else {
            Err(NoteError::MissingNote(id))
        }
    }

    /// Turns a note into a special (non-gaming) note. Only `VariantBpm` is accepted.
    pub fn set_special_type(&mut self, id: Id<Note>, ty: NoteType) -> Result<()> {
        if !ty.is_special() {
            return Err(NoteError::NotSpecialType(ty));
        }
        self.note_mut(id)?.ty = ty;
        Ok(())
    }

    /// Sets the flick direction of a note that isn't part of a flick chain, e.g. a hold end
    /// that finishes with a flick. Chained notes get their direction from their neighbors.
    pub fn set_flick_type(&mut self, id: Id<Note>, flick_type: FlickType) -> Result<()> {
        let note = self.note_mut(id)?;
        if note.has_chain_neighbor() {
            return Err(NoteError::FlickTypeLocked(id));
        }
        note.flick_type = flick_type;
        Ok(())
    }

    pub fn subscribe_extra_params(
        &mut self,
        listener: impl FnMut(&ExtraParamsChanged) + 'static,
    ) -> ListenerHandle {
        let handle = self.listeners.add(Box::new(listener));
        tracing::trace!(
            "added extra params listener {handle:?} ({} total)",
            self.listeners.len()
        );
        handle
    }
    pub fn unsubscribe_extra_params(&mut self, handle: ListenerHandle) -> bool {
        self.listeners.remove(handle)
    }

    /// Replaces the note's extra params. Listeners only hear about it if the value changed.
    pub fn set_extra_params(
        &mut self,
        id: Id<Note>,
        params: Option<NoteExtraParams>,
    ) -> Result<()> {
        let note = self.note_mut(id)?;
        if note.extra_params == params {
            return Ok(());
        }
        note.extra_params = params.clone();
        self.listeners
            .emit(&ExtraParamsChanged { note: id, params });
        Ok(())
    }

    /// Edits the note's extra params in place, creating default ones if there are none.
    pub fn update_extra_params(
        &mut self,
        id: Id<Note>,
        f: impl FnOnce(&mut NoteExtraParams),
    ) -> Result<()> {
        let mut params = self.note(id)?.extra_params.clone().unwrap_or_default();
        f(&mut params);
        self.set_extra_params(id, Some(params))
    }
}
