use crate::{Id, Note};

/// Extra data attached to a note. Only VariantBpm markers carry any right now.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct NoteExtraParams {
    pub new_bpm: f64,
}

/// Sent to listeners whenever a note's [`NoteExtraParams`] actually change.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtraParamsChanged {
    pub note: Id<Note>,
    pub params: Option<NoteExtraParams>,
}

#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
pub struct ListenerHandle(u64);

pub(crate) type Listener = Box<dyn FnMut(&ExtraParamsChanged)>;

#[derive(Default)]
pub(crate) struct Listeners {
    next_handle: u64,
    listeners: Vec<(ListenerHandle, Listener)>,
}

impl Listeners {
    pub fn add(&mut self, listener: Listener) -> ListenerHandle {
        self.next_handle += 1;
        let handle = ListenerHandle(self.next_handle);
        self.listeners.push((handle, listener));
        handle
    }

    pub fn remove(&mut self, handle: ListenerHandle) -> bool {
        let len = self.listeners.len();
        self.listeners.retain(|&(h, _)| h != handle);
        self.listeners.len() != len
    }

    pub fn emit(&mut self, event: &ExtraParamsChanged) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}
