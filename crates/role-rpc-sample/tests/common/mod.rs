//! CRUD scenario shared by the client tests.

#![allow(dead_code)]

use role_rpc_sample::clients::DummyClientApi;
use role_rpc_sample::model::Dummy;

pub fn dummy1() -> Dummy {
    Dummy::new("Key 1", "Content 1")
}

pub fn dummy2() -> Dummy {
    Dummy::new("Key 2", "Content 2")
}

/// Create two, list, update one, delete it, and check it is gone.
pub async fn test_crud_operations<C: DummyClientApi>(client: &C) {
    // Create one dummy
    let created1 = client.create_dummy("crud", &dummy1()).await.unwrap();
    assert_eq!(created1.key, "Key 1");
    assert_eq!(created1.content, "Content 1");
    assert!(created1.id.is_some());

    // Create another dummy
    let created2 = client.create_dummy("crud", &dummy2()).await.unwrap();
    assert_eq!(created2.key, "Key 2");
    assert_eq!(created2.content, "Content 2");

    // Get all dummies
    let page = client.get_dummies("crud", None).await.unwrap();
    assert_eq!(page.data.len(), 2);

    // Update the dummy
    let mut changed = created1.clone();
    changed.content = "Updated Content 1".to_string();
    let updated = client.update_dummy("crud", &changed).await.unwrap().unwrap();
    assert_eq!(updated.id, created1.id);
    assert_eq!(updated.content, "Updated Content 1");
    assert_eq!(updated.key, created1.key);

    // Delete dummy
    let id = created1.id.clone().unwrap();
    let deleted = client.delete_dummy("crud", &id).await.unwrap();
    assert_eq!(deleted.map(|d| d.id), Some(created1.id.clone()));

    // Try to get deleted dummy
    let missing = client.get_dummy_by_id("crud", &id).await.unwrap();
    assert!(missing.is_none());
}
