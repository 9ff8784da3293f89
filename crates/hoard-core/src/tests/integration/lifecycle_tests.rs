use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tempfile::tempdir;

use super::common::{loc, plain, started_app};
use crate::persistence::{SaveState, UnitRecord};
use crate::registry::{Location, WorldProbe};

#[tokio::test]
async fn test_periodic_flush_writes_routine_changes() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let mut app = started_app(temp_dir.path(), 1).await;
    let registry = app.registry().clone();
    let id = registry.create("ZOMBIE", loc(1), 1).unwrap();
    registry.queue().wait_idle().await;

    registry.add_items(&id, &[plain("STICK", 7)]).unwrap();
    assert_eq!(registry.queue().state_of(&id), SaveState::Modified);

    let path = temp_dir.path().join(format!("spawners/{}.yml", id));
    let mut flushed = false;
    for _ in 0..40 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        registry.queue().wait_idle().await;
        let text = std::fs::read_to_string(&path).unwrap();
        if UnitRecord::from_yaml(&text).unwrap().inventory == vec!["STICK:7".to_string()] {
            flushed = true;
            break;
        }
    }
    assert!(flushed, "periodic flush never wrote the change");
    app.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_mutations_are_not_lost() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let mut app = started_app(temp_dir.path(), 1).await;
    let registry = app.registry().clone();
    let id = registry.create("ZOMBIE", loc(1), 1).unwrap();

    let mut tasks = Vec::new();
    let mut expected = 0u64;
    for _ in 0..8 {
        let amounts: Vec<u64> = {
            let mut rng = rand::thread_rng();
            (0..50).map(|_| rng.gen_range(1..=100)).collect()
        };
        expected += amounts.iter().sum::<u64>();
        let registry = Arc::clone(&registry);
        let id = id.clone();
        tasks.push(tokio::spawn(async move {
            for amount in amounts {
                registry.add_items(&id, &[plain("STICK", amount)]).unwrap();
                tokio::task::yield_now().await;
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
    assert_eq!(registry.metrics(&id).unwrap().total_items, expected);

    let report = app.shutdown().await.unwrap();
    assert_eq!(report.failed, 0);
    let text = std::fs::read_to_string(temp_dir.path().join(format!("spawners/{}.yml", id))).unwrap();
    assert_eq!(UnitRecord::from_yaml(&text).unwrap().inventory, vec![format!("STICK:{}", expected)]);
}

struct OnlyAt(Location);

impl WorldProbe for OnlyAt {
    fn hosts_unit(&self, location: &Location, _entity_kind: &str) -> bool {
        *location == self.0
    }
}

#[tokio::test]
async fn test_ghosts_purged_after_world_ready() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let (kept, ghost) = {
        let mut app = started_app(temp_dir.path(), 3600).await;
        let kept = app.registry().create("ZOMBIE", loc(1), 1).unwrap();
        let ghost = app.registry().create("ZOMBIE", loc(2), 1).unwrap();
        app.shutdown().await.unwrap();
        (kept, ghost)
    };

    let mut app = started_app(temp_dir.path(), 3600).await;
    assert_eq!(app.registry().len(), 2, "ghosts are only detected once the world is ready");

    assert_eq!(app.world_ready(&OnlyAt(loc(1))), 1);
    let report = app.shutdown().await.unwrap();
    assert_eq!(report.failed, 0);
    assert!(temp_dir.path().join(format!("spawners/{}.yml", kept)).is_file());
    assert!(!temp_dir.path().join(format!("spawners/{}.yml", ghost)).exists());
}
