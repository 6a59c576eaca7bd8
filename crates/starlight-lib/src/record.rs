use anyhow::Context;

use crate::{Bar, Chart, FlickType, Id, Note, NoteError, NotePosition};

/// The persisted form of a [`Note`]. Derived fields (type, sync/hold/flick flags) aren't
/// stored; they are recomputed from the relation ids when a chart is loaded.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    pub id: Id<Note>,
    // "positionInGrid" was the original name of this field in chart files
    #[serde(rename = "positionInGrid")]
    pub index_in_grid: i32,
    pub start_position: NotePosition,
    pub finish_position: NotePosition,
    pub flick_type: FlickType,
    pub prev_flick_note_id: Id<Note>,
    pub next_flick_note_id: Id<Note>,
    pub sync_target_id: Id<Note>,
    pub hold_target_id: Id<Note>,
}

impl From<&Note> for NoteRecord {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id(),
            index_in_grid: note.index_in_grid,
            start_position: note.start_position,
            finish_position: note.finish_position,
            flick_type: note.flick_type(),
            prev_flick_note_id: note.prev_flick_note_id(),
            next_flick_note_id: note.next_flick_note_id(),
            sync_target_id: note.sync_target_id(),
            hold_target_id: note.hold_target_id(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BarRecord {
    pub index: u32,
    pub notes: Vec<NoteRecord>,
}

impl Chart {
    /// Rebuilds a chart from its persisted form.
    ///
    /// Relation ids may point forward to notes that come later in the file, so every note
    /// is created first and relations are resolved in a second pass through the regular
    /// connectors. Links to notes that don't exist are dropped with a warning.
    pub fn from_records(bars: &[BarRecord]) -> anyhow::Result<Self> {
        let mut chart = Chart::new();

        for (bar_number, bar) in bars.iter().enumerate() {
            let bar_id = Id::<Bar>::from_raw(
                i32::try_from(bar_number + 1).context("too many bars in chart")?,
            );
            chart.set_bar(bar_id, bar.index);

            for record in &bar.notes {
                let note = chart
                    .add_note(record.id, bar_id)
                    .with_context(|| format!("while loading bar {}", bar.index))?;
                note.index_in_grid = record.index_in_grid;
                note.start_position = record.start_position;
                note.finish_position = record.finish_position;
            }
        }

        let records = || bars.iter().flat_map(|bar| &bar.notes);

        for record in records() {
            let id = record.id;
            let resolve = |other: Id<Note>, relation: &str| {
                let other = other.valid()?;
                if chart.notes.has(other) {
                    Some(other)
                } else {
                    tracing::warn!("note {id:?} has a {relation} link to unknown note {other:?}");
                    None
                }
            };
            let prev = resolve(record.prev_flick_note_id, "previous flick");
            let next = resolve(record.next_flick_note_id, "next flick");
            let sync = resolve(record.sync_target_id, "sync");
            let hold = resolve(record.hold_target_id, "hold");

            let context = || format!("while linking note {id:?}");
            if let Some(prev) = prev {
                chart.connect_flick(prev, id).with_context(context)?;
            }
            if let Some(next) = next {
                chart.connect_flick(id, next).with_context(context)?;
            }
            if let Some(sync) = sync {
                chart.connect_sync(id, sync).with_context(context)?;
            }
            if let Some(hold) = hold {
                match chart.connect_hold(id, hold) {
                    Err(NoteError::SimultaneousHold(..)) => {
                        tracing::warn!(
                            "dropping hold between {id:?} and {hold:?}, they share a timing"
                        );
                    }
                    result => result.with_context(context)?,
                }
            }
        }

        // chained notes already have their direction; lone flicks (e.g. on hold ends) only
        // exist in the file
        for record in records() {
            if !chart.notes.force_get(record.id).has_chain_neighbor() {
                chart
                    .set_flick_type(record.id, record.flick_type)
                    .with_context(|| format!("while restoring flick of note {:?}", record.id))?;
            }
        }

        tracing::debug!("loaded {} notes in {} bars", chart.len(), bars.len());
        Ok(chart)
    }

    /// The persisted form of the chart: bars by index, each bar's notes in timeline order.
    pub fn to_records(&self) -> Vec<BarRecord> {
        let mut bars: Vec<_> = self.bars().collect();
        bars.sort_by_key(|&(id, bar)| (bar.index, id));

        bars.into_iter()
            .map(|(bar_id, bar)| {
                let mut notes: Vec<&Note> =
                    self.notes().filter(|note| note.bar() == bar_id).collect();
                notes.sort_by(|a, b| self.timing_cmp(a, b).then(a.id().cmp(&b.id())));
                BarRecord {
                    index: bar.index,
                    notes: notes.into_iter().map(NoteRecord::from).collect(),
                }
            })
            .collect()
    }
}
