use tempfile::tempdir;

use super::common::{kind, loc, plain, scalar, started_app};
use crate::item::ItemSignature;
use crate::registry::Location;

#[tokio::test]
async fn test_slot_counts_follow_adds_and_removes() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let mut app = started_app(temp_dir.path(), 3600).await;
    let registry = app.registry().clone();
    let id = registry.create("ZOMBIE", loc(1), 1).unwrap();

    registry.add_items(&id, &[plain("STICK", 130)]).unwrap();
    assert_eq!(registry.metrics(&id).unwrap().used_slots, 3);
    let page = registry.display_page(&id, 0).unwrap();
    let counts: Vec<u32> = page.values().map(|b| b.count).collect();
    assert_eq!(counts, vec![64, 64, 2]);

    assert!(registry.remove_items(&id, &[plain("STICK", 2)]).unwrap());
    registry.display_page(&id, 0).unwrap();
    assert_eq!(registry.metrics(&id).unwrap().used_slots, 2);

    app.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_hand_written_record_decodes() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let dir = temp_dir.path().join("spawners");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("legacy.yml"),
        "data_version: 1\nlocation: world,5,70,5\nkind: SKELETON\n\
         settings: 0,true,16,false,500,45,1000,1,4,1,0,false\n\
         inventory:\n- STICK:40\n- SWORD;3:1,7:2\n",
    )
    .unwrap();

    let mut app = started_app(temp_dir.path(), 3600).await;
    let registry = app.registry().clone();
    let id = registry
        .find_by_location(&Location::new("world", 5, 70, 5))
        .expect("legacy unit loaded");

    {
        let unit = registry.get(&id).unwrap();
        let unit = unit.lock();
        let inventory = unit.inventory();
        assert_eq!(inventory.quantity_of(&ItemSignature::plain(kind("STICK"))), 40);
        assert_eq!(inventory.quantity_of(&ItemSignature::scalar(kind("SWORD"), 3)), 1);
        assert_eq!(inventory.quantity_of(&ItemSignature::scalar(kind("SWORD"), 7)), 2);
    }

    // Swords never share a slot
    assert_eq!(registry.display_page(&id, 0).unwrap().len(), 4);
    app.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_resize_then_restart_preserves_items() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let id = {
        let mut app = started_app(temp_dir.path(), 3600).await;
        let registry = app.registry().clone();
        let id = registry.create("ZOMBIE", loc(1), 1).unwrap();
        registry.add_items(&id, &[plain("STICK", 45 * 64)]).unwrap();
        assert_eq!(registry.metrics(&id).unwrap().used_slots, 45);

        registry.resize(&id, 2).unwrap();
        registry
            .add_items(&id, &[plain("ENDER_PEARL", 20), scalar("SWORD", 12, 3)])
            .unwrap();
        registry.display_page(&id, 0).unwrap();
        let metrics = registry.metrics(&id).unwrap();
        assert_eq!(metrics.max_slots, 90);
        assert_eq!(metrics.used_slots, 45 + 2 + 3);

        app.shutdown().await.unwrap();
        id
    };

    let mut app = started_app(temp_dir.path(), 3600).await;
    let metrics = app.registry().metrics(&id).unwrap();
    assert_eq!(metrics.max_slots, 90);
    assert_eq!(metrics.total_items, 45 * 64 + 20 + 3);
    assert_eq!(metrics.distinct, 3);
    app.shutdown().await.unwrap();
}
