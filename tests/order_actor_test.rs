use chrono::Utc;
use fleet_actor::ActorClient;
use fleet_dispatch::clients::OrderClient;
use fleet_dispatch::model::{
    CarrierId, EtaPrediction, GeoPoint, OrderCreate, OrderPatch, OrderStatus, WorkOrderId,
};
use fleet_dispatch::order_actor::{self, OrderError};

fn create(client_name: &str) -> OrderCreate {
    OrderCreate {
        id: None,
        client_name: client_name.to_string(),
        requested_at: Utc::now(),
        pickup: None,
        dropoff: GeoPoint::new(39.0, -76.9),
        distance_km: 0.0,
        eta_minutes: 0.0,
    }
}

fn spawn_store() -> OrderClient {
    let (actor, client) = order_actor::new(16);
    tokio::spawn(actor.run(()));
    client
}

/// Real Order store: an order walks pending -> assigned -> completed and never back.
#[tokio::test]
async fn test_order_status_only_moves_forward() {
    let client = spawn_store();
    let id = client.submit(create("Acme")).await.unwrap();

    // Assigning needs a carrier.
    let bare = OrderPatch {
        status: Some(OrderStatus::Assigned),
        ..Default::default()
    };
    let err = client.apply_patches(vec![(id.clone(), bare)]).await.unwrap_err();
    assert!(matches!(err, OrderError::ValidationError(_)));

    client
        .apply_patches(vec![(id.clone(), OrderPatch::assign(CarrierId::from("C1"), Some(12.0)))])
        .await
        .unwrap();

    let back = OrderPatch {
        status: Some(OrderStatus::Pending),
        ..Default::default()
    };
    let err = client.apply_patches(vec![(id.clone(), back)]).await.unwrap_err();
    assert_eq!(
        err,
        OrderError::InvalidTransition {
            from: OrderStatus::Assigned,
            to: OrderStatus::Pending,
        }
    );

    let done = client.complete(id.clone()).await.unwrap();
    assert_eq!(done.status, OrderStatus::Completed);

    // Completed orders are frozen.
    let err = client
        .record_prediction(
            id.clone(),
            EtaPrediction {
                eta_minutes: 3.0,
                distance_km: 1.0,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::ValidationError(_)));
    assert!(client.complete(id).await.is_err());
}

#[tokio::test]
async fn test_invalid_patch_rejects_whole_batch() {
    let client = spawn_store();
    let first = client.submit(create("Acme")).await.unwrap();
    let second = client.submit(create("Globex")).await.unwrap();
    let snapshots = client.subscribe();
    let revision = snapshots.borrow().revision;

    let negative_eta = OrderPatch {
        eta_minutes: Some(-1.0),
        ..OrderPatch::assign(CarrierId::from("C2"), None)
    };
    let result = client
        .apply_patches(vec![
            (first.clone(), OrderPatch::assign(CarrierId::from("C1"), Some(9.0))),
            (second.clone(), negative_eta),
        ])
        .await;
    assert!(matches!(result, Err(OrderError::ValidationError(_))));

    assert_eq!(snapshots.borrow().revision, revision);
    let orders = client.snapshot().await.unwrap();
    assert!(orders.iter().all(|o| o.status == OrderStatus::Pending && o.carrier.is_none()));
}

#[tokio::test]
async fn test_batch_with_unknown_order_is_rejected() {
    let client = spawn_store();
    let id = client.submit(create("Acme")).await.unwrap();

    let result = client
        .apply_patches(vec![
            (id.clone(), OrderPatch::assign(CarrierId::from("C1"), None)),
            (WorkOrderId::from("WO-404"), OrderPatch::assign(CarrierId::from("C2"), None)),
        ])
        .await;
    assert!(matches!(result, Err(OrderError::NotFound(_))));

    let order = client.get(id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_ids_follow_submission_order() {
    let client = spawn_store();
    for name in ["Acme", "Globex", "Initech"] {
        client.submit(create(name)).await.unwrap();
    }
    let err = client.submit(create("   ")).await.unwrap_err();
    assert!(matches!(err, OrderError::ValidationError(_)));
    let next = client.submit(create("Umbrella")).await.unwrap();

    let names: Vec<_> = client
        .snapshot()
        .await
        .unwrap()
        .into_iter()
        .map(|o| (o.id.to_string(), o.client_name))
        .collect();
    assert_eq!(
        names,
        vec![
            ("WO-1".to_string(), "Acme".to_string()),
            ("WO-2".to_string(), "Globex".to_string()),
            ("WO-3".to_string(), "Initech".to_string()),
            ("WO-4".to_string(), "Umbrella".to_string()),
        ]
    );
    assert_eq!(next, WorkOrderId::from("WO-4"));
}

#[tokio::test]
async fn test_explicit_id_must_be_unique() {
    let client = spawn_store();
    let mut params = create("Acme");
    params.id = Some(WorkOrderId::from("WO-7"));
    client.submit(params.clone()).await.unwrap();

    assert!(client.submit(params).await.is_err());
    assert_eq!(client.snapshot().await.unwrap().len(), 1);
}
