use smallvec::SmallVec;

use crate::{Chart, Id, Note, error::Result};

/// Marker for flick group ids. Groups have no data of their own; the id lives on the notes.
#[derive(Debug)]
pub enum FlickGroup {}

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum FlickGroupResolution {
    /// Not (yet) a usable group. This is a normal state while a chain is being edited.
    Declined,
    /// The chain head already carries a group id.
    Reused {
        group_id: Id<FlickGroup>,
        group_start: Id<Note>,
    },
    /// The caller needs to allocate a group id and assign it, see [`Chart::assign_flick_group`].
    CreationPending { group_start: Id<Note> },
}

pub type FlickGroupMembers = SmallVec<[Id<Note>; 8]>;

impl Chart {
    /// Finds the head of the chain `id` belongs to and whether that chain already has a group id.
    pub fn resolve_flick_group(&self, id: Id<Note>) -> Result<FlickGroupResolution> {
        let note = self.note(id)?;
        // a hold end only anchors a group if the chain continues past it
        if !note.is_flick() || (note.is_hold_end() && !note.has_next_flick()) {
            return Ok(FlickGroupResolution::Declined);
        }

        let Some((group_start, before)) = self.walk_to_chain_head(id) else {
            return Ok(FlickGroupResolution::Declined);
        };
        let Some(after) = self.walk_forward(id).map(|tail| tail.len()) else {
            return Ok(FlickGroupResolution::Declined);
        };

        let member_count = before + 1 + after;
        if member_count < 2 {
            tracing::debug!("flick group of {id:?} has only {member_count} member(s)");
            return Ok(FlickGroupResolution::Declined);
        }

        let resolution = match self.notes.force_get(group_start).group_id {
            Some(group_id) => FlickGroupResolution::Reused {
                group_id,
                group_start,
            },
            None => FlickGroupResolution::CreationPending { group_start },
        };
        tracing::debug!("resolved flick group of {id:?}: {resolution:?}");
        Ok(resolution)
    }

    /// Every note of the chain `id` is part of, head first.
    pub fn flick_group_members(&self, id: Id<Note>) -> Result<FlickGroupMembers> {
        self.check_note(id)?;
        let Some((head, _)) = self.walk_to_chain_head(id) else {
            return Ok(SmallVec::new());
        };
        let Some(tail) = self.walk_forward(head) else {
            return Ok(SmallVec::new());
        };
        let mut members = SmallVec::with_capacity(tail.len() + 1);
        members.push(head);
        members.extend(tail);
        Ok(members)
    }

    /// Writes a (caller-allocated) group id onto every member of the chain `id` is part of.
    pub fn assign_flick_group(
        &mut self,
        id: Id<Note>,
        group: Option<Id<FlickGroup>>,
    ) -> Result<()> {
        for member in self.flick_group_members(id)? {
            self.notes.force_get_mut(member).group_id = group;
        }
        Ok(())
    }

    // Chains are edited one link at a time, so a caller can close a loop. Walks give up after
    // visiting more notes than the chart holds.

    fn walk_to_chain_head(&self, id: Id<Note>) -> Option<(Id<Note>, usize)> {
        let mut head = id;
        let mut steps = 0;
        while let Some(prev) = self.notes.force_get(head).prev_flick {
            head = prev;
            steps += 1;
            if steps > self.notes.len() {
                tracing::warn!("flick chain through {id:?} loops back on itself");
                return None;
            }
        }
        Some((head, steps))
    }

    fn walk_forward(&self, id: Id<Note>) -> Option<FlickGroupMembers> {
        let mut tail = FlickGroupMembers::new();
        let mut current = self.notes.force_get(id);
        while current.has_next_flick() {
            let next = current.next_flick.unwrap_or_else(|| unreachable!());
            tail.push(next);
            if tail.len() > self.notes.len() {
                tracing::warn!("flick chain through {id:?} loops back on itself");
                return None;
            }
            current = self.notes.force_get(next);
        }
        Some(tail)
    }
}
