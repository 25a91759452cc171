//! Session store carrying pipeline state between stages
//!
//! Three named slots (`scan`, `plan`, `execution`), each holding the last
//! value written by its owning stage. Values are kept as JSON payloads so the
//! same store works in memory and on disk.
//!
//! Reads never fail: a slot that was never written, cannot be read, or no
//! longer decodes as its type reads as absent. Writes overwrite
//! unconditionally and do not touch other slots, so downstream slots can go
//! stale after an upstream overwrite.
//!
//! Mutation takes `&mut self`: one writer at a time.

use crate::error::StoreError;
use crate::pipeline::Stage;
use crate::types::{ExecutionPlan, ExecutionReport, RepositoryProfile};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use ulid::Ulid;

/// Named slot of the session store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Repository profile
    Scan,
    /// Execution plan
    Plan,
    /// Execution report
    Execution,
}

impl Slot {
    /// All slots, in pipeline order
    pub const ALL: [Slot; 3] = [Slot::Scan, Slot::Plan, Slot::Execution];

    /// Storage key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Slot::Scan => "scan",
            Slot::Plan => "plan",
            Slot::Execution => "execution",
        }
    }

    /// Stage that writes this slot
    #[inline]
    #[must_use]
    pub fn owner(&self) -> Stage {
        match self {
            Slot::Scan => Stage::Scan,
            Slot::Plan => Stage::Plan,
            Slot::Execution => Stage::Execute,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Value type bound to a slot
pub trait SlotValue: Serialize + DeserializeOwned {
    /// Slot this type lives in
    const SLOT: Slot;
}

impl SlotValue for RepositoryProfile {
    const SLOT: Slot = Slot::Scan;
}

impl SlotValue for ExecutionPlan {
    const SLOT: Slot = Slot::Plan;
}

impl SlotValue for ExecutionReport {
    const SLOT: Slot = Slot::Execution;
}

/// Raw payload storage behind a session store
pub trait SlotBackend: fmt::Debug + Send + Sync {
    /// Read the payload of a slot, `None` if never written
    fn read(&self, slot: Slot) -> std::io::Result<Option<String>>;

    /// Replace the payload of a slot
    fn write(&mut self, slot: Slot, payload: &str) -> Result<(), StoreError>;

    /// Drop every slot payload, leaving anything else untouched
    fn clear(&mut self) -> Result<(), StoreError>;
}

/// In-process backend
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    slots: HashMap<Slot, String>,
}

impl MemoryBackend {
    /// Create empty backend
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a raw payload already present
    #[inline]
    #[must_use]
    pub fn with_payload(mut self, slot: Slot, payload: impl Into<String>) -> Self {
        self.slots.insert(slot, payload.into());
        self
    }
}

impl SlotBackend for MemoryBackend {
    fn read(&self, slot: Slot) -> std::io::Result<Option<String>> {
        Ok(self.slots.get(&slot).cloned())
    }

    fn write(&mut self, slot: Slot, payload: &str) -> Result<(), StoreError> {
        self.slots.insert(slot, payload.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.slots.clear();
        Ok(())
    }
}

/// Directory backend: one `<slot>.json` file per slot
///
/// Writes go through a temporary file and a rename, so a failed write leaves
/// the previous payload in place.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Create backend rooted at `dir` (created on first write)
    #[inline]
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Session directory
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding a slot
    #[inline]
    #[must_use]
    pub fn slot_path(&self, slot: Slot) -> PathBuf {
        self.dir.join(format!("{}.json", slot.key()))
    }

    fn staging_path(&self, slot: Slot) -> PathBuf {
        self.dir.join(format!(".{}.json.tmp", slot.key()))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError {
    let path = path.to_path_buf();
    move |source| StoreError::Io { path, source }
}

fn remove_if_exists(path: &Path) -> Result<(), StoreError> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(io_error(path)(e)),
        _ => Ok(()),
    }
}

impl SlotBackend for FileBackend {
    fn read(&self, slot: Slot) -> std::io::Result<Option<String>> {
        match std::fs::read_to_string(self.slot_path(slot)) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&mut self, slot: Slot, payload: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;

        let target = self.slot_path(slot);
        let staging = self.staging_path(slot);
        std::fs::write(&staging, payload).map_err(io_error(&staging))?;
        std::fs::rename(&staging, &target).map_err(io_error(&target))
    }

    /// Remove slot and staging files; the directory goes only if left empty
    fn clear(&mut self) -> Result<(), StoreError> {
        for slot in Slot::ALL {
            remove_if_exists(&self.slot_path(slot))?;
            remove_if_exists(&self.staging_path(slot))?;
        }

        let is_empty = match std::fs::read_dir(&self.dir) {
            Ok(mut entries) => entries.next().is_none(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(io_error(&self.dir)(e)),
        };
        if is_empty {
            std::fs::remove_dir(&self.dir).map_err(io_error(&self.dir))?;
        } else {
            tracing::debug!(dir = %self.dir.display(), "Session directory holds other files, kept");
        }
        Ok(())
    }
}

/// Session identifier, for log correlation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Ulid);

impl SessionId {
    /// Generate new session ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Typed session store
#[derive(Debug)]
pub struct SessionStore {
    id: SessionId,
    backend: Box<dyn SlotBackend>,
}

impl SessionStore {
    /// Create store over a backend
    #[must_use]
    pub fn new(backend: impl SlotBackend + 'static) -> Self {
        let id = SessionId::new();
        tracing::debug!(session = %id, ?backend, "Opened session store");
        Self {
            id,
            backend: Box::new(backend),
        }
    }

    /// Create empty in-memory store
    #[inline]
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Open a durable store in a session directory
    #[inline]
    #[must_use]
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self::new(FileBackend::new(dir))
    }

    /// Session identifier
    #[inline]
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.id
    }

    /// Overwrite the slot of `T` with `value`
    ///
    /// # Errors
    /// - `StoreError::Encode` if the value cannot be serialized
    /// - `StoreError::Io` if the backend cannot persist it
    pub fn put<T: SlotValue>(&mut self, value: &T) -> Result<(), StoreError> {
        let payload = serde_json::to_string(value).map_err(|e| StoreError::Encode {
            slot: T::SLOT,
            message: e.to_string(),
        })?;
        self.backend.write(T::SLOT, &payload)?;
        tracing::debug!(session = %self.id, slot = %T::SLOT, bytes = payload.len(), "Slot written");
        Ok(())
    }

    /// Last value written to the slot of `T`, if any and still decodable
    #[must_use]
    pub fn get<T: SlotValue>(&self) -> Option<T> {
        let payload = match self.backend.read(T::SLOT) {
            Ok(payload) => payload?,
            Err(e) => {
                tracing::warn!(session = %self.id, slot = %T::SLOT, "Slot unreadable, treating as absent: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&payload) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(session = %self.id, slot = %T::SLOT, "Slot payload does not decode, treating as absent: {}", e);
                None
            }
        }
    }

    /// Stored repository profile
    #[inline]
    #[must_use]
    pub fn profile(&self) -> Option<RepositoryProfile> {
        self.get()
    }

    /// Stored execution plan
    #[inline]
    #[must_use]
    pub fn plan(&self) -> Option<ExecutionPlan> {
        self.get()
    }

    /// Stored execution report
    #[inline]
    #[must_use]
    pub fn report(&self) -> Option<ExecutionReport> {
        self.get()
    }

    /// Store repository profile
    ///
    /// # Errors
    /// See [`SessionStore::put`]
    #[inline]
    pub fn put_profile(&mut self, profile: &RepositoryProfile) -> Result<(), StoreError> {
        self.put(profile)
    }

    /// Store execution plan
    ///
    /// # Errors
    /// See [`SessionStore::put`]
    #[inline]
    pub fn put_plan(&mut self, plan: &ExecutionPlan) -> Result<(), StoreError> {
        self.put(plan)
    }

    /// Store execution report
    ///
    /// # Errors
    /// See [`SessionStore::put`]
    #[inline]
    pub fn put_report(&mut self, report: &ExecutionReport) -> Result<(), StoreError> {
        self.put(report)
    }

    /// Empty every slot
    ///
    /// Ends the session: afterwards the resume point is the scan stage.
    ///
    /// # Errors
    /// `StoreError::Io` if the backend cannot remove a slot
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.backend.clear()?;
        tracing::info!(session = %self.id, "Session cleared");
        Ok(())
    }

    /// Check if a slot holds a decodable value
    #[must_use]
    pub fn is_present(&self, slot: Slot) -> bool {
        match slot {
            Slot::Scan => self.profile().is_some(),
            Slot::Plan => self.plan().is_some(),
            Slot::Execution => self.report().is_some(),
        }
    }

    /// Earliest stage whose output is missing
    ///
    /// `None` once every slot is filled.
    #[must_use]
    pub fn resume_point(&self) -> Option<Stage> {
        Slot::ALL
            .into_iter()
            .find(|slot| !self.is_present(*slot))
            .map(|slot| slot.owner())
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::in_memory()
    }
}
