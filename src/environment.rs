use crate::object::Object;
use std::collections::HashMap;

/// Handle to one scope inside an [`Env`].
///
/// Handles are generational: once a scope is reclaimed its slot may be
/// reused, and stale handles to it simply resolve to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvId {
    index: usize,
    generation: u32,
}

const GLOBAL: EnvId = EnvId {
    index: 0,
    generation: 0,
};

#[derive(Debug, Default)]
struct Scope {
    store: HashMap<String, Object>,
    outer: Option<EnvId>,
    // A function literal was evaluated here, so a closure may still point at it.
    captured: bool,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    scope: Option<Scope>,
}

/// Every scope of one session: the global scope plus the scopes created by
/// function calls, each chained to the scope its function was defined in.
///
/// A call scope that no closure captured is released as soon as the call
/// returns. Captured scopes stay until [`Env::collect`] finds them
/// unreachable.
#[derive(Debug)]
pub struct Env {
    slots: Vec<Slot>,
    free: Vec<usize>,
    live: usize,
}

impl Default for Env {
    fn default() -> Self {
        Self {
            slots: vec![Slot {
                generation: GLOBAL.generation,
                scope: Some(Scope::default()),
            }],
            free: Vec::new(),
            live: 1,
        }
    }
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global(&self) -> EnvId {
        GLOBAL
    }

    /// Open a fresh scope whose lookups fall back to `outer`.
    pub fn new_enclosed(&mut self, outer: EnvId) -> EnvId {
        let scope = Scope {
            outer: Some(outer),
            ..Scope::default()
        };
        self.live += 1;
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.scope = Some(scope);
                EnvId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    scope: Some(scope),
                });
                EnvId {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    /// Look `name` up in `id`, then in each enclosing scope in turn.
    pub fn get(&self, id: EnvId, name: &str) -> Option<Object> {
        let mut current = self.scope(id);
        while let Some(scope) = current {
            if let Some(value) = scope.store.get(name) {
                return Some(value.clone());
            }
            current = scope.outer.and_then(|outer| self.scope(outer));
        }
        None
    }

    /// Bind `name` in scope `id` only, replacing any previous binding there.
    pub fn set(&mut self, id: EnvId, name: impl Into<String>, value: Object) {
        if let Some(scope) = self.scope_mut(id) {
            scope.store.insert(name.into(), value);
        }
    }

    /// Record that a closure now refers to `id`.
    pub fn capture(&mut self, id: EnvId) {
        if let Some(scope) = self.scope_mut(id) {
            scope.captured = true;
        }
    }

    /// Drop the scope `id` at the end of its call, unless a closure captured
    /// it. Returns whether it was freed.
    pub fn release(&mut self, id: EnvId) -> bool {
        let releasable = id != GLOBAL && self.scope(id).map_or(false, |scope| !scope.captured);
        if releasable {
            self.free_slot(id.index);
        }
        releasable
    }

    pub fn contains(&self, id: EnvId) -> bool {
        self.scope(id).is_some()
    }

    /// Number of scopes currently alive, the global scope included.
    pub fn live_scopes(&self) -> usize {
        self.live
    }

    /// Free every scope not reachable from the global scope or from `roots`,
    /// returning how many were freed.
    ///
    /// Only sound where no evaluation is in progress: any value still in use
    /// must be bound somewhere or passed as a root.
    pub fn collect<'a>(&mut self, roots: impl IntoIterator<Item = &'a Object>) -> usize {
        let mut marked = vec![false; self.slots.len()];
        let mut pending = vec![GLOBAL];
        pending.extend(roots.into_iter().filter_map(scope_of));

        while let Some(id) = pending.pop() {
            let Some(scope) = self.scope(id) else {
                continue;
            };
            if std::mem::replace(&mut marked[id.index], true) {
                continue;
            }
            pending.extend(scope.outer);
            pending.extend(scope.store.values().filter_map(scope_of));
        }

        let mut freed = 0;
        for (index, reachable) in marked.into_iter().enumerate() {
            if !reachable && self.slots[index].scope.is_some() {
                self.free_slot(index);
                freed += 1;
            }
        }
        if freed > 0 {
            tracing::debug!(freed, live = self.live, "collected scopes");
        }
        freed
    }

    fn scope(&self, id: EnvId) -> Option<&Scope> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.scope.as_ref())
    }

    fn scope_mut(&mut self, id: EnvId) -> Option<&mut Scope> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.scope.as_mut())
    }

    fn free_slot(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        if slot.scope.take().is_some() {
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(index);
            self.live -= 1;
        }
    }
}

fn scope_of(value: &Object) -> Option<EnvId> {
    match value {
        Object::Function(function) => Some(function.env),
        Object::ReturnValue(value) => scope_of(value),
        _ => None,
    }
}
