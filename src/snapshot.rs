//! Checksummed persistence for scenario/spawn-state snapshots.
//!
//! The save subsystem proper is out of scope; what lives here is the one
//! record it needs from this core: a snapshot that restores a running
//! scenario exactly, pity counter, doom thresholds and spawn/reveal flags
//! included. The store is a trait so hosts can inject their own backend.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::scenario::types::Scenario;
use crate::spawns::types::ObjectiveSpawnState;

/// Version magic guarding snapshot files ("MYTHOS" + format revision).
pub const SNAPSHOT_VERSION_MAGIC: u64 = 0x4D59_5448_4F53_0001;

/// Everything needed to restore a scenario mid-play.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSnapshot {
    /// Unix timestamp of the save.
    pub saved_at: i64,
    pub scenario: Scenario,
    pub spawn_state: ObjectiveSpawnState,
}

impl ScenarioSnapshot {
    pub fn new(scenario: Scenario, spawn_state: ObjectiveSpawnState) -> Self {
        Self {
            saved_at: chrono::Utc::now().timestamp(),
            scenario,
            spawn_state,
        }
    }

    /// Pretty JSON export for the save/UI subsystems.
    pub fn to_json(&self) -> io::Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub fn from_json(json: &str) -> io::Result<Self> {
        serde_json::from_str(json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// Injected storage interface for snapshots.
pub trait SnapshotStore {
    fn save(&self, snapshot: &ScenarioSnapshot) -> io::Result<()>;
    /// `Ok(None)` covers both "no snapshot" and "snapshot unreadable";
    /// corruption is logged, never propagated as a panic.
    fn load(&self) -> io::Result<Option<ScenarioSnapshot>>;
    fn clear(&self) -> io::Result<()>;
}

/// File-backed store with checksum verification.
///
/// File format:
/// - Version magic (8 bytes)
/// - Data length (4 bytes)
/// - Serialized snapshot (variable length)
/// - SHA256 checksum (32 bytes)
pub struct FileSnapshotStore {
    save_path: PathBuf,
}

impl FileSnapshotStore {
    /// Store at the platform's config directory via the `directories` crate.
    pub fn new() -> io::Result<Self> {
        let project_dirs = ProjectDirs::from("", "", "mythos").ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "Could not determine config directory")
        })?;
        let config_dir = project_dirs.config_dir();
        fs::create_dir_all(config_dir)?;
        Ok(Self {
            save_path: config_dir.join("scenario.dat"),
        })
    }

    /// Store at an explicit path (tests, host-managed save slots).
    pub fn at_path(save_path: PathBuf) -> Self {
        Self { save_path }
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn save(&self, snapshot: &ScenarioSnapshot) -> io::Result<()> {
        let data = bincode::serialize(snapshot)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let data_len = data.len() as u32;

        let mut hasher = Sha256::new();
        hasher.update(SNAPSHOT_VERSION_MAGIC.to_le_bytes());
        hasher.update(data_len.to_le_bytes());
        hasher.update(&data);
        let checksum = hasher.finalize();

        let mut file = fs::File::create(&self.save_path)?;
        file.write_all(&SNAPSHOT_VERSION_MAGIC.to_le_bytes())?;
        file.write_all(&data_len.to_le_bytes())?;
        file.write_all(&data)?;
        file.write_all(&checksum)?;
        Ok(())
    }

    fn load(&self) -> io::Result<Option<ScenarioSnapshot>> {
        let mut file = match fs::File::open(&self.save_path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;

        // Magic + length + checksum is the minimum plausible file.
        if contents.len() < 8 + 4 + 32 {
            warn!("snapshot file truncated; ignoring it");
            return Ok(None);
        }

        let mut magic_bytes = [0u8; 8];
        magic_bytes.copy_from_slice(&contents[0..8]);
        if u64::from_le_bytes(magic_bytes) != SNAPSHOT_VERSION_MAGIC {
            warn!("snapshot version magic mismatch; ignoring it");
            return Ok(None);
        }

        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&contents[8..12]);
        let data_len = u32::from_le_bytes(len_bytes) as usize;
        if contents.len() != 8 + 4 + data_len + 32 {
            warn!("snapshot length field disagrees with file size; ignoring it");
            return Ok(None);
        }

        let data = &contents[12..12 + data_len];
        let stored_checksum = &contents[12 + data_len..];

        let mut hasher = Sha256::new();
        hasher.update(&contents[0..12]);
        hasher.update(data);
        let computed = hasher.finalize();
        if computed.as_slice() != stored_checksum {
            warn!("snapshot checksum mismatch; ignoring it");
            return Ok(None);
        }

        match bincode::deserialize(data) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                warn!(error = %e, "snapshot payload undecodable; ignoring it");
                Ok(None)
            }
        }
    }

    fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.save_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::generation::generate_random_scenario;
    use crate::scenario::types::Difficulty;
    use crate::spawns::logic::{initialize_objective_spawns, mark_item_spawned};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn create_test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(12345)
    }

    fn temp_store(tag: &str) -> FileSnapshotStore {
        let path = std::env::temp_dir().join(format!("mythos_snapshot_test_{}.dat", tag));
        fs::remove_file(&path).ok();
        FileSnapshotStore::at_path(path)
    }

    fn sample_snapshot() -> ScenarioSnapshot {
        let mut rng = create_test_rng();
        let scenario = generate_random_scenario(Difficulty::Hard, &mut rng);
        let mut state = initialize_objective_spawns(&scenario);
        if let Some(item) = state.quest_items.first().cloned() {
            state = mark_item_spawned(&state, &item.id, "t-study");
        }
        state.tiles_explored = 7;
        state.tiles_since_last_spawn = 3;
        ScenarioSnapshot::new(scenario, state)
    }

    #[test]
    fn test_save_and_load_roundtrip_exactly() {
        let store = temp_store("roundtrip");
        let snapshot = sample_snapshot();
        store.save(&snapshot).expect("save should succeed");

        let loaded = store
            .load()
            .expect("load should succeed")
            .expect("snapshot should be present");

        assert_eq!(loaded.scenario.id, snapshot.scenario.id);
        assert_eq!(loaded.scenario.start_doom, snapshot.scenario.start_doom);
        assert_eq!(
            loaded.spawn_state.tiles_since_last_spawn,
            snapshot.spawn_state.tiles_since_last_spawn
        );
        assert_eq!(loaded.spawn_state.tiles_explored, 7);
        assert_eq!(
            loaded.spawn_state.quest_items[0].spawned_on_tile_id,
            snapshot.spawn_state.quest_items[0].spawned_on_tile_id
        );
        let thresholds: Vec<i32> = loaded
            .scenario
            .doom_events
            .iter()
            .map(|e| e.threshold)
            .collect();
        let expected: Vec<i32> = snapshot
            .scenario
            .doom_events
            .iter()
            .map(|e| e.threshold)
            .collect();
        assert_eq!(thresholds, expected);

        store.clear().expect("clear should succeed");
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_missing_file_loads_as_none() {
        let store = temp_store("missing");
        assert!(store.load().expect("load should succeed").is_none());
    }

    #[test]
    fn test_corrupt_file_loads_as_none() {
        let store = temp_store("corrupt");
        let snapshot = sample_snapshot();
        store.save(&snapshot).expect("save should succeed");

        // Flip a payload byte; the checksum must catch it.
        let path = std::env::temp_dir().join("mythos_snapshot_test_corrupt.dat");
        let mut contents = fs::read(&path).unwrap();
        let mid = contents.len() / 2;
        contents[mid] ^= 0xFF;
        fs::write(&path, contents).unwrap();

        assert!(store.load().expect("load should not error").is_none());
        store.clear().ok();
    }

    #[test]
    fn test_json_export_roundtrip() {
        let snapshot = sample_snapshot();
        let json = snapshot.to_json().expect("export should succeed");
        let parsed = ScenarioSnapshot::from_json(&json).expect("import should succeed");
        assert_eq!(parsed.scenario.id, snapshot.scenario.id);
        assert_eq!(
            parsed.spawn_state.quest_items.len(),
            snapshot.spawn_state.quest_items.len()
        );
    }
}
