//! Submission sessions.
//!
//! Every submission starts a new [`Session`] owned by the browser that sent
//! it. A new submission replaces only its owner's previous session: entity
//! list, entity map, concept cache and uploaded document go away together.
//! Other browsers keep theirs. The store holds a bounded number of
//! sessions and evicts the oldest beyond that.

use crate::form::ServiceKind;
use crate::models::{Concept, Entity};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

pub const DEFAULT_MAX_SESSIONS: usize = 64;

/// Entities anchored at an index; PDF overlays resolve to the whole list.
pub type EntityMap = HashMap<usize, Vec<Entity>>;

/// Resolved concepts keyed by Wikipedia page id. `None` records a lookup
/// that found nothing, so it is not repeated.
pub type ConceptMap = HashMap<u64, Option<Concept>>;

#[derive(Default)]
struct SessionData {
    entity_map: EntityMap,
    document: Option<Arc<Vec<u8>>>,
}

pub struct Session {
    pub generation: u64,
    pub mode: ServiceKind,
    pub created: DateTime<Utc>,
    data: RwLock<SessionData>,
    concepts: Mutex<ConceptMap>,
}

impl Session {
    fn new(generation: u64, mode: ServiceKind) -> Self {
        Self {
            generation,
            mode,
            created: Utc::now(),
            data: RwLock::new(SessionData::default()),
            concepts: Mutex::new(HashMap::new()),
        }
    }

    /// Entities anchored at `index`, oldest first.
    pub async fn entities_at(&self, index: usize) -> Vec<Entity> {
        self.data
            .read()
            .await
            .entity_map
            .get(&index)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn document(&self) -> Option<Arc<Vec<u8>>> {
        self.data.read().await.document.clone()
    }

    pub async fn cached_concept(&self, wikipedia_id: u64) -> Option<Option<Concept>> {
        self.concepts.lock().await.get(&wikipedia_id).cloned()
    }

    pub async fn cache_concept(&self, wikipedia_id: u64, concept: Option<Concept>) {
        self.concepts.lock().await.insert(wikipedia_id, concept);
    }

    pub async fn concept_map(&self) -> ConceptMap {
        self.concepts.lock().await.clone()
    }
}

#[derive(Default)]
struct Sessions {
    by_generation: BTreeMap<u64, Arc<Session>>,
    by_owner: HashMap<String, u64>,
}

pub struct SessionStore {
    sessions: RwLock<Sessions>,
    next_generation: AtomicU64,
    capacity: usize,
}

impl SessionStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(Sessions::default()),
            next_generation: AtomicU64::new(1),
            capacity: capacity.max(1),
        }
    }

    /// Start a new submission for `owner`, discarding that owner's previous
    /// session. Sessions beyond capacity are evicted oldest first.
    pub async fn begin(&self, owner: &str, mode: ServiceKind) -> Arc<Session> {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        let session = Arc::new(Session::new(generation, mode));

        let mut sessions = self.sessions.write().await;
        if let Some(previous) = sessions.by_owner.insert(owner.to_string(), generation) {
            sessions.by_generation.remove(&previous);
        }
        sessions.by_generation.insert(generation, session.clone());

        while sessions.by_generation.len() > self.capacity {
            let Some((evicted, _)) = sessions.by_generation.pop_first() else {
                break;
            };
            sessions.by_owner.retain(|_, g| *g != evicted);
            tracing::debug!(generation = evicted, "session evicted");
        }

        tracing::debug!(generation, ?mode, "session started");
        session
    }

    /// The session for `generation`, unless it was replaced or evicted.
    pub async fn get(&self, generation: u64) -> Option<Arc<Session>> {
        self.sessions.read().await.by_generation.get(&generation).cloned()
    }

    /// The live session of `owner`, if any.
    pub async fn latest(&self, owner: &str) -> Option<Arc<Session>> {
        let sessions = self.sessions.read().await;
        let generation = sessions.by_owner.get(owner)?;
        sessions.by_generation.get(generation).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.by_generation.len()
    }

    /// Store the entities received for a submission and rebuild its entity
    /// map. Returns false, leaving state untouched, for a stale generation.
    pub async fn install_entities(&self, generation: u64, entities: Vec<Entity>) -> bool {
        let Some(session) = self.get(generation).await else {
            tracing::info!(generation, "dropping entities of a superseded submission");
            return false;
        };
        let mut data = session.data.write().await;
        data.entity_map = entities
            .into_iter()
            .enumerate()
            .map(|(n, entity)| (n, vec![entity]))
            .collect();
        true
    }

    /// Keep the uploaded document so the page can render it.
    pub async fn set_document(&self, generation: u64, bytes: Arc<Vec<u8>>) -> bool {
        let Some(session) = self.get(generation).await else {
            return false;
        };
        session.data.write().await.document = Some(bytes);
        true
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS)
    }
}
