use crate::{
    error::Result,
    studio::{apply, Action, Notice, SessionState},
};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "rgenai_session";

struct SessionSlot {
    state: SessionState,
    last_seen: DateTime<Utc>,
    generating: bool,
}

impl SessionSlot {
    fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            state: SessionState::new(),
            last_seen: now,
            generating: false,
        }
    }
}

/// Process-local session storage keyed by the session cookie. The lock is
/// never held across an inference call; a session runs at most one
/// generation at a time, tracked by [`GenerationTicket`].
pub struct SessionRegistry {
    slots: Mutex<HashMap<Uuid, SessionSlot>>,
    idle_ttl: Duration,
}

impl SessionRegistry {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            idle_ttl,
        }
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<Uuid, SessionSlot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve the session named by the cookie, starting a new one when it
    /// is missing or has expired. Expired sessions are dropped here.
    pub fn open(&self, requested: Option<Uuid>) -> Uuid {
        let now = Utc::now();
        let mut slots = self.slots();

        let ttl = self.idle_ttl;
        let before = slots.len();
        slots.retain(|_, slot| slot.generating || now - slot.last_seen <= ttl);
        let expired = before - slots.len();
        if expired > 0 {
            log::debug!("Dropped {} idle session(s)", expired);
        }

        if let Some(id) = requested {
            if let Some(slot) = slots.get_mut(&id) {
                slot.last_seen = now;
                return id;
            }
        }

        let id = Uuid::new_v4();
        slots.insert(id, SessionSlot::fresh(now));
        log::info!("Started session {} ({} active)", id, slots.len());
        id
    }

    pub fn snapshot(&self, id: Uuid) -> SessionState {
        self.slots()
            .get(&id)
            .map(|slot| slot.state.clone())
            .unwrap_or_default()
    }

    /// Snapshot for rendering; the pending notice is consumed.
    pub fn snapshot_for_render(&self, id: Uuid) -> (SessionState, Option<Notice>) {
        let mut slots = self.slots();
        match slots.get_mut(&id) {
            Some(slot) => {
                let notice = slot.state.take_notice();
                (slot.state.clone(), notice)
            }
            None => (SessionState::new(), None),
        }
    }

    pub fn store(&self, id: Uuid, state: SessionState) {
        let now = Utc::now();
        let mut slots = self.slots();
        let slot = slots.entry(id).or_insert_with(|| SessionSlot::fresh(now));
        slot.state = state;
        slot.last_seen = now;
    }

    /// Store `draft` and mark a generation as running for the session.
    /// Returns `None`, leaving the session untouched, while another
    /// generation is still running.
    pub fn begin_generation(
        &self,
        id: Uuid,
        draft: SessionState,
    ) -> Option<GenerationTicket<'_>> {
        let now = Utc::now();
        let mut slots = self.slots();
        let slot = slots.entry(id).or_insert_with(|| SessionSlot::fresh(now));
        if slot.generating {
            return None;
        }
        slot.state = draft;
        slot.generating = true;
        slot.last_seen = now;

        Some(GenerationTicket {
            registry: self,
            id,
            finished: false,
        })
    }

    pub fn is_generating(&self, id: Uuid) -> bool {
        self.slots().get(&id).map_or(false, |slot| slot.generating)
    }

    pub fn len(&self) -> usize {
        self.slots().len()
    }

    fn release(&self, id: Uuid) {
        if let Some(slot) = self.slots().get_mut(&id) {
            slot.generating = false;
        }
    }
}

/// A running generation for one session. Finishing reduces the outcome
/// into the state the session holds at that moment, so edits made while
/// the call was in flight survive. Dropping an unfinished ticket only
/// clears the running mark.
pub struct GenerationTicket<'a> {
    registry: &'a SessionRegistry,
    id: Uuid,
    finished: bool,
}

impl GenerationTicket<'_> {
    pub fn finish(mut self, outcome: Result<Action>) {
        self.finished = true;
        let now = Utc::now();
        let mut slots = self.registry.slots();
        let slot = slots
            .entry(self.id)
            .or_insert_with(|| SessionSlot::fresh(now));

        let next = outcome.and_then(|action| apply(&slot.state, action));
        slot.state = match next {
            Ok(next) => next,
            Err(err) => {
                log::warn!("Session {} rejected generate: {}", self.id, err);
                slot.state.clone().with_notice(Notice::from(&err))
            }
        };
        slot.generating = false;
        slot.last_seen = now;
    }
}

impl Drop for GenerationTicket<'_> {
    fn drop(&mut self) {
        if !self.finished {
            log::debug!("Session {} generation abandoned", self.id);
            self.registry.release(self.id);
        }
    }
}
