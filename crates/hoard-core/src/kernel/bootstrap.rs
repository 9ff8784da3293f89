use std::any::TypeId;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::item::BatchLimits;
use crate::kernel::component::{DependencyRegistry, KernelComponent};
use crate::kernel::constants;
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};
use crate::persistence::{PersistenceQueue, RecordStore, SaveReport, SnapshotSource};
use crate::registry::{StorageRegistry, UnitTable, WorldProbe};
use crate::storage::{ConfigFormat, ConfigManager, EngineConfig, LocalStorageProvider, StorageProvider};

/// Wires the engine together over one data directory and drives its
/// components through initialize, start and shutdown.
#[derive(Debug)]
pub struct Application {
    base_path: PathBuf,
    config_manager: Arc<ConfigManager>,
    engine_config: EngineConfig,
    dependencies: DependencyRegistry,
    component_init_order: Vec<TypeId>,
    queue: Arc<PersistenceQueue>,
    registry: Arc<StorageRegistry>,
    initialized: bool,
    started: bool,
}

impl Application {
    /// Build the engine over `base_path`.
    ///
    /// Writes the default engine config when none exists yet.
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        log::info!("Initializing {} v{} in {}", constants::APP_NAME, constants::APP_VERSION, base_path.display());

        let provider = Arc::new(LocalStorageProvider::new(base_path.clone())) as Arc<dyn StorageProvider>;
        let config_manager = Arc::new(ConfigManager::new(
            Arc::clone(&provider),
            PathBuf::from(constants::CONFIG_DIR),
            ConfigFormat::Yaml,
        ));
        let engine_config = {
            let config_manager = Arc::clone(&config_manager);
            tokio::task::spawn_blocking(move || Self::load_engine_config(&config_manager))
                .await
                .map_err(|e| Error::Other(format!("Engine config task failed: {}", e)))??
        };
        let limits: Arc<dyn BatchLimits> = Arc::new(engine_config.batch_table());

        let table = Arc::new(UnitTable::new());
        let records = RecordStore::new(provider, engine_config.records_dir.clone());
        let queue = Arc::new(PersistenceQueue::new(
            records,
            Arc::clone(&table) as Arc<dyn SnapshotSource>,
            engine_config.flush_interval,
        )?);
        let registry = Arc::new(StorageRegistry::new(
            table,
            queue.as_ref().clone(),
            engine_config.clone(),
            limits,
        ));

        let mut dependencies = DependencyRegistry::new();
        let mut component_init_order = Vec::new();
        dependencies.register_instance(Arc::clone(&queue));
        component_init_order.push(TypeId::of::<PersistenceQueue>());
        dependencies.register_instance(Arc::clone(&registry));
        component_init_order.push(TypeId::of::<StorageRegistry>());

        Ok(Self {
            base_path,
            config_manager,
            engine_config,
            dependencies,
            component_init_order,
            queue,
            registry,
            initialized: false,
            started: false,
        })
    }

    fn load_engine_config(config_manager: &ConfigManager) -> Result<EngineConfig> {
        let data = config_manager.load_config(constants::ENGINE_CONFIG_NAME)?;
        let config = EngineConfig::from_config_data(&data);
        if !config_manager.exists(constants::ENGINE_CONFIG_NAME) {
            log::info!("Writing default engine config");
            config_manager.save_config(constants::ENGINE_CONFIG_NAME, &config.to_config_data()?)?;
        }
        Ok(config)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn config_manager(&self) -> &Arc<ConfigManager> {
        &self.config_manager
    }

    pub fn engine_config(&self) -> &EngineConfig {
        &self.engine_config
    }

    pub fn registry(&self) -> &Arc<StorageRegistry> {
        &self.registry
    }

    pub fn queue(&self) -> &Arc<PersistenceQueue> {
        &self.queue
    }

    /// Look up a component by its concrete type
    pub fn get_component<T: KernelComponent + 'static>(&self) -> Option<Arc<T>> {
        self.dependencies.get_concrete::<T>()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    fn component(&self, type_id: &TypeId, phase: KernelLifecyclePhase) -> Result<Arc<dyn KernelComponent>> {
        self.dependencies.get_component_by_id(type_id).ok_or_else(|| {
            log::error!("Component instance not found in registry for TypeId {:?}", type_id);
            Error::KernelLifecycleError {
                phase,
                component_name: None,
                message: "Instance missing from registry".to_string(),
                source: None,
            }
        })
    }

    /// Initialize every component in order; this loads all records.
    pub async fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Err(Error::KernelLifecycleError {
                phase: KernelLifecyclePhase::Initialize,
                component_name: None,
                message: "Application already initialized".to_string(),
                source: None,
            });
        }
        log::info!("Initializing components...");
        for type_id in &self.component_init_order {
            let component = self.component(type_id, KernelLifecyclePhase::Initialize)?;
            log::info!("Initializing component: {}", component.name());
            component.initialize().await.map_err(|e| {
                Error::lifecycle(KernelLifecyclePhase::Initialize, component.name(), "Component failed to initialize", Some(e))
            })?;
        }
        self.initialized = true;
        Ok(())
    }

    /// Start every component in order; this starts the periodic flush.
    pub async fn start(&mut self) -> Result<()> {
        if !self.initialized {
            return Err(Error::KernelLifecycleError {
                phase: KernelLifecyclePhase::Start,
                component_name: None,
                message: "Application must be initialized before start".to_string(),
                source: None,
            });
        }
        log::info!("Starting components...");
        for type_id in &self.component_init_order {
            let component = self.component(type_id, KernelLifecyclePhase::Start)?;
            log::info!("Starting component: {}", component.name());
            component.start().await.map_err(|e| {
                Error::lifecycle(KernelLifecyclePhase::Start, component.name(), "Component failed to start", Some(e))
            })?;
        }
        self.started = true;
        Ok(())
    }

    /// Deferred pass once the host world is available: drop ghost units.
    pub fn world_ready(&self, probe: &dyn WorldProbe) -> usize {
        let removed = self.registry.purge_ghosts(probe);
        if !removed.is_empty() {
            log::warn!("Removed {} ghost storage units", removed.len());
        }
        removed.len()
    }

    /// Stop components in reverse order. The persistence queue drains both
    /// queues and saves every unit; its report is returned.
    ///
    /// Every component is stopped even if an earlier one fails; the first
    /// failure is returned.
    pub async fn shutdown(&mut self) -> Result<SaveReport> {
        log::info!("Shutting down components...");
        let mut first_error = None;
        for type_id in self.component_init_order.iter().rev() {
            let component = self.component(type_id, KernelLifecyclePhase::Shutdown)?;
            log::info!("Stopping component: {}", component.name());
            if let Err(e) = component.stop().await {
                log::error!("Error stopping component {}: {}", component.name(), e);
                if first_error.is_none() {
                    first_error = Some(Error::lifecycle(
                        KernelLifecyclePhase::Shutdown,
                        component.name(),
                        "Component failed to stop",
                        Some(e),
                    ));
                }
            }
        }
        self.started = false;
        if let Some(e) = first_error {
            return Err(e);
        }
        let report = self.queue.last_report().unwrap_or_default();
        log::info!("Shutdown complete ({} saved, {} failed)", report.attempted - report.failed, report.failed);
        Ok(report)
    }
}
