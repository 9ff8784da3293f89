use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::codec::{decode_tokens, DecodeIssue};
use crate::inventory::VirtualInventory;
use crate::item::BatchLimits;
use crate::kernel::constants;
use crate::persistence::{UnitId, UnitRecord};
use crate::registry::error::RegistryError;

/// Block position of a storage unit: `world,x,y,z`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub world: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Location {
    pub fn new(world: impl Into<String>, x: i32, y: i32, z: i32) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.world, self.x, self.y, self.z)
    }
}

impl FromStr for Location {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [world, x, y, z] = parts.as_slice() else {
            return Err(RegistryError::malformed(
                "location",
                format!("expected world,x,y,z but got '{}'", s),
            ));
        };
        if world.is_empty() {
            return Err(RegistryError::malformed("location", "empty world name"));
        }
        let coord = |text: &str| {
            text.parse::<i32>()
                .map_err(|e| RegistryError::malformed("location", format!("'{}': {}", text, e)))
        };
        Ok(Self::new(*world, coord(*x)?, coord(*y)?, coord(*z)?))
    }
}

/// Per-unit spawner settings, stored as one comma-joined line.
///
/// Field order on disk: exp, active, range, stopped, delay, max_slots,
/// max_exp, min_spawn, max_spawn, stack_size, last_spawn_epoch_ms,
/// allow_equipment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSettings {
    pub exp: u64,
    pub active: bool,
    pub range: u32,
    pub stopped: bool,
    /// Ticks between spawn cycles
    pub delay: u64,
    /// Derived from `stack_size`; rewritten on load and resize
    pub max_slots: u32,
    pub max_exp: u64,
    pub min_spawn: u32,
    pub max_spawn: u32,
    pub stack_size: u32,
    pub last_spawn_epoch_ms: i64,
    pub allow_equipment: bool,
}

const SETTINGS_FIELDS: usize = 12;

impl Default for UnitSettings {
    fn default() -> Self {
        Self {
            exp: 0,
            active: true,
            range: 16,
            stopped: false,
            delay: 500,
            max_slots: constants::DEFAULT_SLOTS_PER_PAGE,
            max_exp: 1000,
            min_spawn: 1,
            max_spawn: 4,
            stack_size: 1,
            last_spawn_epoch_ms: 0,
            allow_equipment: false,
        }
    }
}

impl fmt::Display for UnitSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{},{},{},{},{},{},{}",
            self.exp,
            self.active,
            self.range,
            self.stopped,
            self.delay,
            self.max_slots,
            self.max_exp,
            self.min_spawn,
            self.max_spawn,
            self.stack_size,
            self.last_spawn_epoch_ms,
            self.allow_equipment
        )
    }
}

fn setting<T: FromStr>(parts: &[&str], index: usize, name: &str) -> Result<T, RegistryError>
where
    T::Err: fmt::Display,
{
    let text = parts[index];
    text.parse()
        .map_err(|e| RegistryError::malformed("settings", format!("{} '{}': {}", name, text, e)))
}

impl FromStr for UnitSettings {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != SETTINGS_FIELDS {
            return Err(RegistryError::malformed(
                "settings",
                format!("expected {} fields, found {}", SETTINGS_FIELDS, parts.len()),
            ));
        }
        Ok(Self {
            exp: setting(&parts, 0, "exp")?,
            active: setting(&parts, 1, "active")?,
            range: setting(&parts, 2, "range")?,
            stopped: setting(&parts, 3, "stopped")?,
            delay: setting(&parts, 4, "delay")?,
            max_slots: setting(&parts, 5, "max_slots")?,
            max_exp: setting(&parts, 6, "max_exp")?,
            min_spawn: setting(&parts, 7, "min_spawn")?,
            max_spawn: setting(&parts, 8, "max_spawn")?,
            stack_size: setting(&parts, 9, "stack_size")?,
            last_spawn_epoch_ms: setting(&parts, 10, "last_spawn_epoch_ms")?,
            allow_equipment: setting(&parts, 11, "allow_equipment")?,
        })
    }
}

/// World names end up in the comma-joined location line, so they must
/// survive a round trip through [`Location`]'s parser.
pub(crate) fn validate_world(world: &str) -> Result<(), RegistryError> {
    if world.is_empty() || world.contains(',') || world.trim() != world {
        return Err(RegistryError::InvalidWorld(world.to_string()));
    }
    Ok(())
}

pub(crate) fn validate_entity_kind(kind: &str) -> Result<String, RegistryError> {
    let kind = kind.trim();
    if kind.is_empty() || kind.chars().any(|c| c.is_whitespace() || c == ',') {
        return Err(RegistryError::InvalidEntityKind(kind.to_string()));
    }
    Ok(kind.to_string())
}

/// One storage unit ("spawner") and the inventory it owns.
#[derive(Debug)]
pub struct StorageUnit {
    id: UnitId,
    location: Location,
    entity_kind: String,
    settings: UnitSettings,
    data_version: u32,
    inventory: VirtualInventory,
}

impl StorageUnit {
    pub(crate) fn new(
        id: UnitId,
        location: Location,
        entity_kind: String,
        settings: UnitSettings,
        limits: Arc<dyn BatchLimits>,
    ) -> Self {
        let inventory = VirtualInventory::new(settings.max_slots, limits);
        Self {
            id,
            location,
            entity_kind,
            settings,
            data_version: constants::DATA_VERSION,
            inventory,
        }
    }

    /// Rebuild a unit from its record, replaying the encoded items.
    ///
    /// `max_slots` is recomputed from the stored stack size; bad inventory
    /// tokens are skipped and returned.
    pub(crate) fn from_record(
        id: UnitId,
        record: &UnitRecord,
        slots_per_page: u32,
        limits: Arc<dyn BatchLimits>,
    ) -> Result<(Self, Vec<DecodeIssue>), RegistryError> {
        let location: Location = record.location.parse()?;
        let entity_kind = validate_entity_kind(&record.kind)?;
        let mut settings: UnitSettings = record.settings.parse()?;
        if settings.stack_size == 0 {
            return Err(RegistryError::InvalidStackSize(0));
        }
        settings.max_slots = settings.stack_size.saturating_mul(slots_per_page);

        let decoded = decode_tokens(&record.inventory);
        let mut inventory = VirtualInventory::new(settings.max_slots, limits);
        inventory.add_batches(&decoded.store.to_batches());

        let unit = Self {
            id,
            location,
            entity_kind,
            settings,
            data_version: record.data_version,
            inventory,
        };
        Ok((unit, decoded.issues))
    }

    pub fn id(&self) -> &UnitId {
        &self.id
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn entity_kind(&self) -> &str {
        &self.entity_kind
    }

    pub fn settings(&self) -> &UnitSettings {
        &self.settings
    }

    pub fn stack_size(&self) -> u32 {
        self.settings.stack_size
    }

    pub fn max_slots(&self) -> u32 {
        self.inventory.max_slots()
    }

    /// Version the unit's record was last read with
    pub fn data_version(&self) -> u32 {
        self.data_version
    }

    pub fn inventory(&self) -> &VirtualInventory {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut VirtualInventory {
        &mut self.inventory
    }

    /// Swap in a new-capacity inventory holding the same items
    pub(crate) fn resize(&mut self, stack_size: u32, max_slots: u32) {
        self.inventory = self.inventory.resized(max_slots);
        self.settings.stack_size = stack_size;
        self.settings.max_slots = max_slots;
    }

    /// Record fields except the inventory tokens
    pub(crate) fn record_header(&self) -> UnitRecord {
        UnitRecord {
            data_version: self.data_version,
            location: self.location.to_string(),
            kind: self.entity_kind.clone(),
            settings: self.settings.to_string(),
            inventory: Vec::new(),
        }
    }
}
