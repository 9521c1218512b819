//! Repository behaviour against a real (in-memory SQLite) database

mod common;

use std::collections::HashSet;

use common::{executor, file_executor, vehicle};
use fleet_core::{Page, SparePart, VehicleStatus};
use fleet_server::db::{BoundQuery, SparePartRepo, StoreCause, VehicleRepo};

#[tokio::test]
async fn vehicle_plate_lifecycle() {
    let executor = executor().await;
    let mut repo = VehicleRepo::new(executor.clone());
    let input = vehicle("ABC1234");

    let id = repo.create(&input).await.unwrap().expect("generated key");
    assert!(repo.is_vehicle_exists("ABC1234").await.unwrap());

    let stored = repo
        .get_vehicle_by_plate_numbers("ABC1234")
        .await
        .unwrap()
        .expect("vehicle by plate");
    assert_eq!(stored, fleet_core::Vehicle { id: Some(id), ..input });

    assert!(repo.delete_by_plate("ABC1234").await.unwrap());
    assert!(!repo.is_vehicle_exists("ABC1234").await.unwrap());
}

#[tokio::test]
async fn created_record_reads_back_equal() {
    let executor = executor().await;
    let mut repo = SparePartRepo::new(executor.clone());
    let part = SparePart {
        id: None,
        part_number: "BRK-001".into(),
        name: "Brake pads".into(),
        quantity: 12,
        unit_price: 39.5,
        reorder_level: 4,
    };

    let id = repo.create(&part).await.unwrap().unwrap();
    let stored = repo.get(id).await.unwrap().unwrap();
    assert_eq!(stored, SparePart { id: Some(id), ..part });
}

#[tokio::test]
async fn missing_key_is_none() {
    let executor = executor().await;
    let mut repo = VehicleRepo::new(executor.clone());

    assert!(repo.get(404).await.unwrap().is_none());
    assert!(repo
        .get_vehicle_by_plate_numbers("NOPE1")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn filter_without_matches_is_empty() {
    let executor = executor().await;
    let mut repo = VehicleRepo::new(executor.clone());
    repo.create(&vehicle("KEEP1")).await.unwrap();

    let found = repo
        .list_by_status(VehicleStatus::OutOfService)
        .await
        .unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn update_of_missing_key_is_false() {
    let executor = executor().await;
    let mut repo = VehicleRepo::new(executor.clone());

    assert!(!repo.update(99, &vehicle("GHOST1")).await.unwrap());
    assert!(!repo
        .update_status(99, VehicleStatus::OutOfService)
        .await
        .unwrap());
    assert!(!repo.delete(99).await.unwrap());
}

#[tokio::test]
async fn update_by_plate_rewrites_row() {
    let executor = executor().await;
    let mut repo = VehicleRepo::new(executor.clone());
    let id = repo.create(&vehicle("UPD100")).await.unwrap().unwrap();

    let mut changed = vehicle("UPD100");
    changed.odometer_km = 50_000;
    changed.status = VehicleStatus::InMaintenance;
    assert!(repo.update_by_plate("UPD100", &changed).await.unwrap());

    let stored = repo.get(id).await.unwrap().unwrap();
    assert_eq!(stored.odometer_km, 50_000);
    assert_eq!(stored.status, VehicleStatus::InMaintenance);
}

#[tokio::test]
async fn empty_table_pages_are_empty() {
    let executor = executor().await;
    let mut repo = VehicleRepo::new(executor.clone());

    let page = repo.list(Page::new(1, 10).unwrap()).await.unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn pages_split_results() {
    let executor = executor().await;
    let mut repo = VehicleRepo::new(executor.clone());
    for n in 0..5 {
        repo.create(&vehicle(&format!("PG{n:03}"))).await.unwrap();
    }

    let first = repo.list(Page::new(1, 2).unwrap()).await.unwrap();
    let last = repo.list(Page::new(3, 2).unwrap()).await.unwrap();
    let beyond = repo.list(Page::new(4, 2).unwrap()).await.unwrap();

    assert_eq!(first.items.len(), 2);
    assert_eq!(first.total, 5);
    assert_eq!(last.items.len(), 1);
    assert!(beyond.items.is_empty());
}

#[tokio::test]
async fn invalid_page_fails_before_any_query() {
    let executor = common::bare_executor();

    assert!(Page::new(0, 10).is_err());
    assert!(Page::new(1, 0).is_err());
    assert_eq!(executor.provider().open_connections(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_get_distinct_keys() {
    let (_dir, executor) = file_executor(4).await;

    let creates = (0..8).map(|n| {
        let executor = executor.clone();
        tokio::spawn(async move {
            VehicleRepo::new(executor)
                .create(&vehicle(&format!("CON{n:03}")))
                .await
        })
    });
    let keys: Vec<i64> = futures::future::join_all(creates)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap().expect("generated key"))
        .collect();

    let distinct: HashSet<i64> = keys.iter().copied().collect();
    assert_eq!(distinct.len(), keys.len());
    assert_eq!(VehicleRepo::new(executor).count().await.unwrap(), 8);
}

#[tokio::test]
async fn duplicate_plate_is_a_unique_violation() {
    let executor = executor().await;
    let mut repo = VehicleRepo::new(executor.clone());
    repo.create(&vehicle("DUP123")).await.unwrap();

    let err = repo.create(&vehicle("DUP123")).await.unwrap_err();
    assert!(err.is_unique_violation());
    assert_eq!(err.operation, "vehicles.insert");
}

#[tokio::test]
async fn unknown_stored_enum_is_rejected() {
    let executor = executor().await;
    executor
        .run(
            "seed bad row",
            BoundQuery::command(
                "INSERT INTO vehicles (plate_numbers, manufacturer, model, year, kind, fuel, status, odometer_km) \
                 VALUES (@plate, 'Ford', 'Transit', 2019, 'Van', 'Diesel', 'Flying', 0)",
            )
            .bind("plate", "BAD001"),
            |_| Ok(()),
        )
        .await
        .unwrap();

    let err = VehicleRepo::new(executor.clone())
        .get_vehicle_by_plate_numbers("BAD001")
        .await
        .unwrap_err();
    assert!(matches!(
        err.cause,
        StoreCause::Driver(sqlx::Error::ColumnDecode { .. })
    ));
}

#[tokio::test]
async fn stock_withdrawal_never_goes_negative() {
    let executor = executor().await;
    let mut repo = SparePartRepo::new(executor.clone());
    let id = repo
        .create(&SparePart {
            id: None,
            part_number: "FLT-9".into(),
            name: "Oil filter".into(),
            quantity: 3,
            unit_price: 8.0,
            reorder_level: 2,
        })
        .await
        .unwrap()
        .unwrap();

    assert!(repo.withdraw(id, 2).await.unwrap());
    assert!(!repo.withdraw(id, 2).await.unwrap());
    assert_eq!(repo.get(id).await.unwrap().unwrap().quantity, 1);

    let low = repo.list_low_stock().await.unwrap();
    assert_eq!(low.len(), 1);
}
