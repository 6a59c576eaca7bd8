use std::{
    collections::hash_map,
    fmt::Debug,
    hash::{Hash, Hasher},
    marker::PhantomData,
};

use ahash::HashMap;

// Ids are the integers that end up in chart files, so they stay plain i32s.
// Raw 0 is reserved as the "no link" value written into relation id fields.
type IdInner = i32;

// The <T> is used to prevent accidental misuse of an Id<Note> as an Id<Bar>.
#[repr(transparent)]
pub struct Id<T = ()>(IdInner, PhantomData<T>);

impl<T> Id<T> {
    const INVALID_RAW: IdInner = 0;

    pub const fn invalid() -> Self {
        Self::from_raw(Self::INVALID_RAW)
    }

    pub const fn from_raw(raw: IdInner) -> Self {
        Self(raw, PhantomData)
    }
    pub const fn raw(self) -> IdInner {
        self.0
    }

    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID_RAW
    }

    /// `None` for the invalid sentinel. Used when reading persisted relation fields.
    pub fn valid(self) -> Option<Self> {
        if self.is_valid() { Some(self) } else { None }
    }

    /// Inverse of [`Id::valid`]: an absent link is written out as the sentinel.
    pub fn or_invalid(id: Option<Self>) -> Self {
        match id {
            Some(id) => id,
            None => Self::invalid(),
        }
    }
}

impl<T> Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let type_name = std::any::type_name::<T>();
        let type_name = type_name.rsplit("::").next().unwrap_or(type_name);
        if !self.is_valid() {
            return write!(f, "Id::<{type_name}>(<invalid>)");
        }
        write!(f, "Id::<{type_name}>({})", self.0)
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Id<T> {}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

// serde's derive would put a `T: Serialize` bound on these, which is wrong for a marker type
impl<T> serde::Serialize for Id<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.0)
    }
}
impl<'de, T> serde::Deserialize<'de> for Id<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(Self::from_raw(IdInner::deserialize(deserializer)?))
    }
}

#[derive(Clone)]
pub struct IdMap<T: 'static, V = T> {
    map: HashMap<Id<T>, V>,
}

impl<T, V> IdMap<T, V> {
    pub fn new() -> Self {
        Self {
            map: Default::default(),
        }
    }

    pub fn has(&self, id: Id<T>) -> bool {
        self.map.contains_key(&id)
    }

    pub fn get(&self, id: Id<T>) -> Option<&V> {
        self.map.get(&id)
    }
    pub fn get_mut(&mut self, id: Id<T>) -> Option<&mut V> {
        self.map.get_mut(&id)
    }
    pub fn force_get(&self, id: Id<T>) -> &V {
        match self.get(id) {
            Some(v) => v,
            None => panic!("Nonexistent id: {id:?}"),
        }
    }
    pub fn force_get_mut(&mut self, id: Id<T>) -> &mut V {
        match self.get_mut(id) {
            Some(v) => v,
            None => panic!("Nonexistent id: {id:?}"),
        }
    }
    pub fn insert(&mut self, id: Id<T>, val: V) {
        if self.map.insert(id, val).is_some() {
            panic!("tried to insert already existing id into IdMap");
        }
    }

    pub fn remove(&mut self, id: Id<T>) -> Option<V> {
        self.map.remove(&id)
    }

    pub fn values(&self) -> hash_map::Values<'_, Id<T>, V> {
        self.map.values()
    }
    pub fn iter(&self) -> impl '_ + Iterator<Item = (Id<T>, &V)> {
        self.map.iter().map(|(&id, v)| (id, v))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<T, V> Default for IdMap<T, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, V: Debug> Debug for IdMap<T, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.map.fmt(f)
    }
}
