use std::cmp::Ordering;

use crate::{Chart, FlickType, Id, Note, NoteError, NotePosition, NoteType, error::Result};

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
enum FlickSlot {
    Prev,
    Next,
}

impl FlickSlot {
    fn opposite(self) -> Self {
        match self {
            Self::Prev => Self::Next,
            Self::Next => Self::Prev,
        }
    }
    fn get(self, note: &Note) -> Option<Id<Note>> {
        match self {
            Self::Prev => note.prev_flick,
            Self::Next => note.next_flick,
        }
    }
    fn get_mut(self, note: &mut Note) -> &mut Option<Id<Note>> {
        match self {
            Self::Prev => &mut note.prev_flick,
            Self::Next => &mut note.next_flick,
        }
    }
}

// Public connectors. These validate their arguments; the rules below assume valid ids.
impl Chart {
    fn check_pair(&self, a: Id<Note>, b: Id<Note>) -> Result<()> {
        self.check_note(a)?;
        self.check_note(b)?;
        if a == b {
            return Err(NoteError::SelfRelation(a));
        }
        Ok(())
    }

    /// Pairs two notes that are hit at the same time. Any previous partners are unpaired.
    pub fn connect_sync(&mut self, a: Id<Note>, b: Id<Note>) -> Result<()> {
        self.check_pair(a, b)?;
        tracing::trace!("connecting sync {a:?} <-> {b:?}");
        self.set_sync_target(a, Some(b));
        self.set_sync_target(b, Some(a));
        Ok(())
    }
    pub fn disconnect_sync(&mut self, id: Id<Note>) -> Result<()> {
        self.check_note(id)?;
        tracing::trace!("disconnecting sync of {id:?}");
        self.set_sync_target(id, None);
        Ok(())
    }

    /// Makes `second` follow `first` in a flick chain.
    pub fn connect_flick(&mut self, first: Id<Note>, second: Id<Note>) -> Result<()> {
        self.check_pair(first, second)?;
        tracing::trace!("connecting flick {first:?} -> {second:?}");
        self.set_flick_link(first, FlickSlot::Next, Some(second));
        self.set_flick_link(second, FlickSlot::Prev, Some(first));
        Ok(())
    }
    /// Cuts the chain between `first` and whatever follows it.
    pub fn disconnect_flick(&mut self, first: Id<Note>) -> Result<()> {
        self.check_note(first)?;
        tracing::trace!("disconnecting flick after {first:?}");
        self.set_flick_link(first, FlickSlot::Next, None);
        Ok(())
    }

    /// Pairs two notes as the start and end of a hold. Which one is the start is decided by
    /// their timing, not by argument order.
    ///
    /// Notes at the same timing can't be a hold, since neither would be the start; that
    /// fails with [`NoteError::SimultaneousHold`].
    pub fn connect_hold(&mut self, a: Id<Note>, b: Id<Note>) -> Result<()> {
        self.check_pair(a, b)?;
        self.check_hold_timing(a, b)?;
        tracing::trace!("connecting hold {a:?} <-> {b:?}");
        self.set_hold_target(a, Some(b));
        self.set_hold_target(b, Some(a));
        Ok(())
    }
    pub fn disconnect_hold(&mut self, id: Id<Note>) -> Result<()> {
        self.check_note(id)?;
        tracing::trace!("disconnecting hold of {id:?}");
        self.set_hold_target(id, None);
        Ok(())
    }

    /// Severs every relation of the note and turns it back into a plain tap.
    pub fn reset(&mut self, id: Id<Note>) -> Result<()> {
        self.check_note(id)?;
        tracing::debug!("resetting note {id:?}");

        self.set_sync_target(id, None);
        self.set_flick_link(id, FlickSlot::Next, None);
        self.set_flick_link(id, FlickSlot::Prev, None);

        let hold_partner = self.notes.force_get(id).hold_target;
        self.set_hold_target(id, None);
        if let Some(partner) = hold_partner {
            // a hold end that flicked on its own has nothing left to flick from
            let partner = self.notes.force_get_mut(partner);
            if !partner.has_chain_neighbor() && partner.flick_type != FlickType::Tap {
                partner.flick_type = FlickType::Tap;
            }
        }

        self.notes.force_get_mut(id).flick_type = FlickType::Tap;
        Ok(())
    }
}

// Keeping derived state in step with grid and lane edits.
impl Chart {
    pub(crate) fn check_hold_timing(&self, a: Id<Note>, b: Id<Note>) -> Result<()> {
        if self.timing_cmp(self.notes.force_get(a), self.notes.force_get(b)) == Ordering::Equal {
            return Err(NoteError::SimultaneousHold(a, b));
        }
        Ok(())
    }

    /// Reclassifies the hold `id` belongs to after its timing changed.
    pub(crate) fn refresh_hold(&mut self, id: Id<Note>) {
        if let Some(partner) = self.notes.force_get(id).hold_target {
            self.classify_hold(id);
            self.classify_hold(partner);
        }
    }

    /// Recomputes flick directions around `id` after its lane changed. Its neighbors compare
    /// against it too.
    pub(crate) fn refresh_flick_chain(&mut self, id: Id<Note>) {
        let note = self.notes.force_get(id);
        for member in [note.prev_flick, Some(id), note.next_flick].into_iter().flatten() {
            if let Some(flick_type) = self.chain_flick_type(member) {
                self.notes.force_get_mut(member).flick_type = flick_type;
            }
        }
    }
}

// Relation rules. Each one updates a single slot of a single note, recomputes what depends
// on it, and clears the old partner's back-link if it still pointed here.
impl Chart {
    fn set_sync_target(&mut self, id: Id<Note>, target: Option<Id<Note>>) {
        let note = self.notes.force_get_mut(id);
        let old = std::mem::replace(&mut note.sync_target, target);

        if let Some(old) = old.filter(|&old| Some(old) != target) {
            if self.notes.force_get(old).sync_target == Some(id) {
                self.set_sync_target(old, None);
            }
        }
    }

    fn set_hold_target(&mut self, id: Id<Note>, target: Option<Id<Note>>) {
        let note = self.notes.force_get_mut(id);
        let old = std::mem::replace(&mut note.hold_target, target);

        if let Some(old) = old.filter(|&old| Some(old) != target) {
            if self.notes.force_get(old).hold_target == Some(id) {
                self.set_hold_target(old, None);
            }
        }

        self.classify_hold(id);
    }

    // only the earlier note of the pair is the hold; the later one is a tap or flick
    fn classify_hold(&mut self, id: Id<Note>) {
        let note = self.notes.force_get(id);
        let is_start = note.hold_target.is_some_and(|target| {
            self.timing_cmp(self.notes.force_get(target), note) == Ordering::Greater
        });
        self.notes.force_get_mut(id).ty = if is_start {
            NoteType::Hold
        } else {
            NoteType::TapOrFlick
        };
    }

    /// Direction a chained note flicks in, or `None` if it has no chain neighbors.
    fn chain_flick_type(&self, id: Id<Note>) -> Option<FlickType> {
        let note = self.notes.force_get(id);
        let position = note.finish_position;
        Some(match (note.prev_flick, note.next_flick) {
            (None, None) => return None,
            // Equal lanes resolve to opposite directions depending on which neighbor is
            // compared. Existing charts rely on this.
            (_, Some(next)) => {
                if self.notes.force_get(next).finish_position > position {
                    FlickType::FlickRight
                } else {
                    FlickType::FlickLeft
                }
            }
            (Some(prev), None) => {
                if self.notes.force_get(prev).finish_position > position {
                    FlickType::FlickLeft
                } else {
                    FlickType::FlickRight
                }
            }
        })
    }

    fn set_flick_link(&mut self, id: Id<Note>, slot: FlickSlot, target: Option<Id<Note>>) {
        let note = self.notes.force_get(id);
        let entering_chain = !note.has_chain_neighbor() && target.is_some();
        let position = note.finish_position;

        let note = self.notes.force_get_mut(id);
        if entering_chain {
            note.flick_type = if position >= NotePosition::Center {
                FlickType::FlickRight
            } else {
                FlickType::FlickLeft
            };
        }
        let old = std::mem::replace(slot.get_mut(note), target);

        let note = self.notes.force_get(id);
        let flick_type = match self.chain_flick_type(id) {
            Some(flick_type) => flick_type,
            None if note.is_hold_start() => note.flick_type,
            None => FlickType::Tap,
        };
        self.notes.force_get_mut(id).flick_type = flick_type;

        if let Some(old) = old.filter(|&old| Some(old) != target) {
            let back = slot.opposite();
            if back.get(self.notes.force_get(old)) == Some(id) {
                self.set_flick_link(old, back, None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Bar;

    fn chart(positions: &[(i32, NotePosition)]) -> (Chart, Vec<Id<Note>>) {
        let mut chart = Chart::new();
        let bar = Id::<Bar>::from_raw(1);
        chart.set_bar(bar, 0);
        let ids = positions
            .iter()
            .enumerate()
            .map(|(i, &(grid, position))| {
                let id = Id::from_raw(i as i32 + 1);
                let note = chart.add_note(id, bar).unwrap();
                note.index_in_grid = grid;
                note.finish_position = position;
                note.start_position = position;
                id
            })
            .collect();
        (chart, ids)
    }

    fn get(chart: &Chart, id: Id<Note>) -> &Note {
        chart.note(id).unwrap()
    }

    #[test]
    fn sync_is_symmetric() {
        let (mut chart, ids) = chart(&[(0, NotePosition::Left), (0, NotePosition::Right)]);
        chart.connect_sync(ids[0], ids[1]).unwrap();
        assert_eq!(get(&chart, ids[0]).sync_target(), Some(ids[1]));
        assert_eq!(get(&chart, ids[1]).sync_target(), Some(ids[0]));
        assert!(get(&chart, ids[0]).is_sync() && get(&chart, ids[1]).is_sync());
        assert_eq!(get(&chart, ids[0]).sync_target_id(), ids[1]);

        chart.disconnect_sync(ids[1]).unwrap();
        assert!(!get(&chart, ids[0]).is_sync());
        assert!(!get(&chart, ids[1]).is_sync());
        assert!(!get(&chart, ids[0]).sync_target_id().is_valid());
    }

    #[test]
    fn reconnecting_the_same_sync_pair_keeps_it() {
        let (mut chart, ids) = chart(&[(0, NotePosition::Left), (0, NotePosition::Right)]);
        chart.connect_sync(ids[0], ids[1]).unwrap();
        chart.connect_sync(ids[0], ids[1]).unwrap();
        chart.connect_sync(ids[1], ids[0]).unwrap();
        assert_eq!(get(&chart, ids[0]).sync_target(), Some(ids[1]));
        assert_eq!(get(&chart, ids[1]).sync_target(), Some(ids[0]));
    }

    #[test]
    fn resyncing_clears_old_partner() {
        let (mut chart, ids) = chart(&[
            (0, NotePosition::Left),
            (0, NotePosition::Center),
            (0, NotePosition::Right),
            (0, NotePosition::CenterLeft),
        ]);
        chart.connect_sync(ids[0], ids[1]).unwrap();
        chart.connect_sync(ids[2], ids[3]).unwrap();
        chart.connect_sync(ids[0], ids[2]).unwrap();

        assert_eq!(get(&chart, ids[0]).sync_target(), Some(ids[2]));
        assert_eq!(get(&chart, ids[2]).sync_target(), Some(ids[0]));
        assert_eq!(get(&chart, ids[1]).sync_target(), None);
        assert_eq!(get(&chart, ids[3]).sync_target(), None);
    }

    #[test]
    fn flick_chain_directions() {
        let (mut chart, ids) = chart(&[
            (0, NotePosition::Left),
            (4, NotePosition::Center),
            (8, NotePosition::Right),
        ]);
        chart.connect_flick(ids[0], ids[1]).unwrap();
        chart.connect_flick(ids[1], ids[2]).unwrap();

        assert_eq!(get(&chart, ids[0]).flick_type(), FlickType::FlickRight);
        assert_eq!(get(&chart, ids[1]).flick_type(), FlickType::FlickRight);
        assert_eq!(get(&chart, ids[2]).flick_type(), FlickType::FlickRight);
        assert!(get(&chart, ids[1]).is_flick());
        assert_eq!(get(&chart, ids[1]).prev_flick_note(), Some(ids[0]));
        assert_eq!(get(&chart, ids[1]).next_flick_note(), Some(ids[2]));

        chart.disconnect_flick(ids[0]).unwrap();
        assert_eq!(get(&chart, ids[0]).flick_type(), FlickType::Tap);
        assert_eq!(get(&chart, ids[1]).prev_flick_note(), None);
        // still has a next neighbor
        assert_eq!(get(&chart, ids[1]).flick_type(), FlickType::FlickRight);

        chart.disconnect_flick(ids[1]).unwrap();
        assert_eq!(get(&chart, ids[1]).flick_type(), FlickType::Tap);
        assert_eq!(get(&chart, ids[2]).flick_type(), FlickType::Tap);
        assert!(!get(&chart, ids[2]).is_flick());
    }

    #[test]
    fn leftward_chain() {
        let (mut chart, ids) = chart(&[(0, NotePosition::Right), (4, NotePosition::Left)]);
        chart.connect_flick(ids[0], ids[1]).unwrap();
        assert_eq!(get(&chart, ids[0]).flick_type(), FlickType::FlickLeft);
        assert_eq!(get(&chart, ids[1]).flick_type(), FlickType::FlickLeft);
    }

    #[test]
    fn equal_lanes_break_ties_by_neighbor_side() {
        let (mut chart, ids) = chart(&[(0, NotePosition::Center), (4, NotePosition::Center)]);
        chart.connect_flick(ids[0], ids[1]).unwrap();
        // compared against next: not greater, so left
        assert_eq!(get(&chart, ids[0]).flick_type(), FlickType::FlickLeft);
        // compared against prev: not greater, so right
        assert_eq!(get(&chart, ids[1]).flick_type(), FlickType::FlickRight);
    }

    #[test]
    fn relinking_chain_detaches_old_neighbor() {
        let (mut chart, ids) = chart(&[
            (0, NotePosition::Left),
            (4, NotePosition::Center),
            (8, NotePosition::Right),
        ]);
        chart.connect_flick(ids[0], ids[1]).unwrap();
        chart.connect_flick(ids[0], ids[2]).unwrap();

        assert_eq!(get(&chart, ids[0]).next_flick_note(), Some(ids[2]));
        assert_eq!(get(&chart, ids[2]).prev_flick_note(), Some(ids[0]));
        assert_eq!(get(&chart, ids[1]).prev_flick_note(), None);
        assert_eq!(get(&chart, ids[1]).flick_type(), FlickType::Tap);

        // stealing a note that already has a predecessor
        chart.connect_flick(ids[1], ids[2]).unwrap();
        assert_eq!(get(&chart, ids[0]).next_flick_note(), None);
        assert_eq!(get(&chart, ids[0]).flick_type(), FlickType::Tap);
        assert_eq!(get(&chart, ids[2]).prev_flick_note(), Some(ids[1]));
    }

    #[test]
    fn hold_start_is_the_earlier_note() {
        let (mut chart, ids) = chart(&[(0, NotePosition::Left), (4, NotePosition::Left)]);
        // argument order doesn't matter
        chart.connect_hold(ids[1], ids[0]).unwrap();
        let (a, b) = (get(&chart, ids[0]), get(&chart, ids[1]));
        assert_eq!(a.note_type(), NoteType::Hold);
        assert_eq!(b.note_type(), NoteType::TapOrFlick);
        assert!(a.is_hold_start() && b.is_hold_end());
        assert!(a.is_hold() && b.is_hold());

        chart.disconnect_hold(ids[0]).unwrap();
        let (a, b) = (get(&chart, ids[0]), get(&chart, ids[1]));
        assert_eq!(a.note_type(), NoteType::TapOrFlick);
        assert!(!a.is_hold() && !b.is_hold());
    }

    #[test]
    fn hold_start_keeps_flick_type_when_chain_is_cut() {
        let (mut chart, ids) = chart(&[
            (0, NotePosition::Left),
            (4, NotePosition::Left),
            (2, NotePosition::Center),
        ]);
        chart.connect_flick(ids[2], ids[0]).unwrap();
        chart.connect_hold(ids[0], ids[1]).unwrap();
        let flick_type = get(&chart, ids[0]).flick_type();
        chart.disconnect_flick(ids[2]).unwrap();
        assert_eq!(get(&chart, ids[0]).flick_type(), flick_type);
        assert_eq!(get(&chart, ids[2]).flick_type(), FlickType::Tap);
    }

    #[test]
    fn flick_type_is_locked_inside_chain() {
        let (mut chart, ids) = chart(&[(0, NotePosition::Left), (4, NotePosition::Right)]);
        chart.connect_flick(ids[0], ids[1]).unwrap();
        assert_eq!(
            chart.set_flick_type(ids[0], FlickType::Tap),
            Err(NoteError::FlickTypeLocked(ids[0]))
        );
    }

    #[test]
    fn reset_unlinks_everything() {
        let (mut chart, ids) = chart(&[
            (0, NotePosition::Left),
            (4, NotePosition::Center),
            (8, NotePosition::Right),
            (4, NotePosition::Left),
            (0, NotePosition::Right),
        ]);
        let [a, b, c, d, e] = ids[..] else { unreachable!() };
        chart.connect_flick(a, b).unwrap();
        chart.connect_flick(b, c).unwrap();
        chart.connect_sync(b, d).unwrap();
        chart.connect_hold(e, b).unwrap();

        chart.reset(b).unwrap();
        let note = get(&chart, b);
        assert_eq!(note.flick_type(), FlickType::Tap);
        assert_eq!(note.note_type(), NoteType::TapOrFlick);
        assert!(!note.is_sync() && !note.is_hold() && !note.has_chain_neighbor());

        assert_eq!(get(&chart, a).next_flick_note(), None);
        assert_eq!(get(&chart, c).prev_flick_note(), None);
        assert_eq!(get(&chart, d).sync_target(), None);
        assert_eq!(get(&chart, e).hold_target(), None);
        assert_eq!(get(&chart, e).note_type(), NoteType::TapOrFlick);
    }

    #[test]
    fn reset_clears_lone_flick_on_hold_end() {
        let (mut chart, ids) = chart(&[(0, NotePosition::Left), (4, NotePosition::Left)]);
        chart.connect_hold(ids[0], ids[1]).unwrap();
        chart.set_flick_type(ids[1], FlickType::FlickLeft).unwrap();
        assert!(get(&chart, ids[1]).is_flick());

        chart.reset(ids[0]).unwrap();
        assert_eq!(get(&chart, ids[1]).flick_type(), FlickType::Tap);
        assert!(!get(&chart, ids[1]).is_hold());
    }

    #[test]
    fn connectors_reject_bad_arguments() {
        let (mut chart, ids) = chart(&[(0, NotePosition::Left)]);
        let missing = Id::from_raw(99);
        assert_eq!(
            chart.connect_sync(ids[0], missing),
            Err(NoteError::MissingNote(missing))
        );
        assert_eq!(
            chart.connect_flick(ids[0], ids[0]),
            Err(NoteError::SelfRelation(ids[0]))
        );
        assert_eq!(chart.reset(missing), Err(NoteError::MissingNote(missing)));
    }

    #[test]
    fn hold_needs_distinct_timing() {
        let (mut chart, ids) = chart(&[(4, NotePosition::Left), (4, NotePosition::Right)]);
        assert_eq!(
            chart.connect_hold(ids[0], ids[1]),
            Err(NoteError::SimultaneousHold(ids[0], ids[1]))
        );
        assert!(!get(&chart, ids[0]).is_hold() && !get(&chart, ids[1]).is_hold());
    }

    #[test]
    fn lane_edits_redirect_the_chain() {
        let (mut chart, ids) = chart(&[(0, NotePosition::Left), (4, NotePosition::Right)]);
        chart.connect_flick(ids[0], ids[1]).unwrap();
        assert_eq!(get(&chart, ids[0]).flick_type(), FlickType::FlickRight);
        assert_eq!(get(&chart, ids[1]).flick_type(), FlickType::FlickRight);

        chart.set_finish_position(ids[0], NotePosition::Right).unwrap();
        chart.set_finish_position(ids[1], NotePosition::Left).unwrap();
        assert_eq!(get(&chart, ids[0]).finish_position(), NotePosition::Right);
        assert_eq!(get(&chart, ids[0]).flick_type(), FlickType::FlickLeft);
        assert_eq!(get(&chart, ids[1]).flick_type(), FlickType::FlickLeft);
    }

    #[test]
    fn lane_edits_keep_a_lone_flick() {
        let (mut chart, ids) = chart(&[(0, NotePosition::Left), (4, NotePosition::Left)]);
        chart.connect_hold(ids[0], ids[1]).unwrap();
        chart.set_flick_type(ids[1], FlickType::FlickLeft).unwrap();
        chart.set_finish_position(ids[1], NotePosition::Right).unwrap();
        assert_eq!(get(&chart, ids[1]).flick_type(), FlickType::FlickLeft);
    }

    #[test]
    fn moving_a_hold_start_past_its_end_swaps_roles() {
        let (mut chart, ids) = chart(&[(0, NotePosition::Left), (4, NotePosition::Left)]);
        chart.connect_hold(ids[0], ids[1]).unwrap();
        assert!(get(&chart, ids[0]).is_hold_start());

        chart.set_index_in_grid(ids[0], 8).unwrap();
        assert_eq!(get(&chart, ids[0]).index_in_grid(), 8);
        assert_eq!(get(&chart, ids[0]).note_type(), NoteType::TapOrFlick);
        assert_eq!(get(&chart, ids[1]).note_type(), NoteType::Hold);
        assert!(get(&chart, ids[0]).is_hold_end() && get(&chart, ids[1]).is_hold_start());

        // landing on the partner's grid line is refused and nothing moves
        assert_eq!(
            chart.set_index_in_grid(ids[1], 8),
            Err(NoteError::SimultaneousHold(ids[1], ids[0]))
        );
        assert_eq!(get(&chart, ids[1]).index_in_grid(), 4);
        assert_eq!(get(&chart, ids[1]).note_type(), NoteType::Hold);
    }

    #[test]
    fn moving_bars_reclassifies_holds() {
        let (mut chart, ids) = chart(&[(0, NotePosition::Left), (0, NotePosition::Left)]);
        let (first, second) = (Id::<Bar>::from_raw(1), Id::<Bar>::from_raw(2));
        chart.set_bar(second, 1);
        chart.set_note_bar(ids[1], second).unwrap();
        chart.connect_hold(ids[0], ids[1]).unwrap();
        assert!(get(&chart, ids[0]).is_hold_start());

        chart.set_bar(first, 5);
        assert!(get(&chart, ids[1]).is_hold_start());
        assert!(get(&chart, ids[0]).is_hold_end());

        assert_eq!(
            chart.set_note_bar(ids[0], second),
            Err(NoteError::SimultaneousHold(ids[0], ids[1]))
        );
        assert_eq!(get(&chart, ids[0]).bar(), first);
    }
}
