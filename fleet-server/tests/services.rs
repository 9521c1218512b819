//! Service workflows, including the multi-table writes that run in a
//! single transaction

mod common;

use common::{day, driver, executor, user, vehicle};
use fleet_core::{
    Application, ApplicationKind, ApplicationStatus, DriverStatus, JobOrderStatus, Maintenance,
    MaintenanceKind, MaintenanceStatus, Mission, MissionStatus, Patrol, PlateNumbers, SparePart,
    Vacation, VehicleKind, VehicleStatus,
};
use fleet_server::db::{BusRepo, VehicleRepo};
use fleet_server::services::{
    ApplicationService, BusService, DriverService, InventoryService, MaintenanceService,
    MissionService, NewBus, PatrolService, UserService, VacationService, VehicleService,
};
use fleet_server::ServiceError;

fn plate(text: &str) -> PlateNumbers {
    PlateNumbers::new(text).unwrap()
}

fn new_bus(plate: &str, capacity: i64) -> NewBus {
    NewBus {
        vehicle: vehicle(plate),
        capacity,
        route_name: Some("North loop".into()),
    }
}

#[tokio::test]
async fn duplicate_plate_is_conflict() {
    let executor = executor().await;
    let service = VehicleService::new(executor.clone());

    service.create(&vehicle("DUP001")).await.unwrap();
    let err = service.create(&vehicle("DUP001")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn invalid_vehicle_is_rejected_before_writing() {
    let executor = executor().await;
    let service = VehicleService::new(executor.clone());

    let mut bad = vehicle("OK001");
    bad.year = 1800;
    let err = service.create(&bad).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(service.count(None).await.unwrap(), 0);
}

#[tokio::test]
async fn missing_vehicle_is_not_found() {
    let executor = executor().await;
    let err = VehicleService::new(executor.clone())
        .get_by_plate(&plate("NONE01"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { resource: "vehicle", .. }));
}

#[tokio::test]
async fn bus_is_created_with_its_vehicle() {
    let executor = executor().await;
    let buses = BusService::new(executor.clone());

    let id = buses.create(new_bus("BUS001", 30)).await.unwrap();
    let details = buses.get(id).await.unwrap();
    assert_eq!(details.bus.capacity, 30);
    assert_eq!(details.vehicle.kind, VehicleKind::Bus);
    assert_eq!(details.vehicle.plate_numbers, "BUS001");
}

#[tokio::test]
async fn failed_bus_create_leaves_no_vehicle() {
    let executor = executor().await;
    let buses = BusService::new(executor.clone());

    // The duplicate plate is caught inside the transaction.
    buses.create(new_bus("BUS002", 20)).await.unwrap();
    let err = buses.create(new_bus("BUS002", 20)).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    let vehicles = VehicleService::new(executor.clone());
    assert_eq!(vehicles.count(None).await.unwrap(), 1);
}

#[tokio::test]
async fn bus_delete_removes_both_rows() {
    let executor = executor().await;
    let buses = BusService::new(executor.clone());
    buses.create(new_bus("BUS003", 12)).await.unwrap();

    buses.delete_by_plate(&plate("BUS003")).await.unwrap();

    assert!(!VehicleRepo::new(executor.clone())
        .is_vehicle_exists("BUS003")
        .await
        .unwrap());
    assert!(BusRepo::new(executor.clone())
        .get_by_plate("BUS003")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn approving_an_application_opens_a_job_order() {
    let executor = executor().await;
    let applicant = UserService::new(executor.clone())
        .create(&user("alice"))
        .await
        .unwrap();
    let service = ApplicationService::new(executor.clone());

    let id = service
        .submit(&Application {
            id: None,
            applicant_id: applicant,
            vehicle_id: None,
            kind: ApplicationKind::Transport,
            description: "Airport run for visiting auditors".into(),
            submitted_on: day(2024, 1, 1),
            status: ApplicationStatus::Approved,
        })
        .await
        .unwrap();
    // Submitted applications always start pending.
    assert_eq!(service.get(id).await.unwrap().status, ApplicationStatus::Pending);

    let job_order = service.approve(id).await.unwrap();
    assert_eq!(service.get(id).await.unwrap().status, ApplicationStatus::Approved);

    let orders = service.job_orders_for_application(id).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, Some(job_order));
    assert_eq!(orders[0].status, JobOrderStatus::Open);

    // A decided application cannot be decided again.
    let err = service.reject(id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn patrol_capacity_is_enforced() {
    let executor = executor().await;
    let bus_id = BusService::new(executor.clone())
        .create(new_bus("BUS010", 1))
        .await
        .unwrap();
    let patrols = PatrolService::new(executor.clone());
    let patrol = patrols
        .create(&Patrol {
            id: None,
            bus_id,
            name: "Morning shift".into(),
            route: "Depot - Plant".into(),
            departure_time: "06:30".into(),
            status: Default::default(),
        })
        .await
        .unwrap();

    let users = UserService::new(executor.clone());
    let first = users.create(&user("rider1")).await.unwrap();
    let second = users.create(&user("rider2")).await.unwrap();

    patrols.subscribe(patrol, first).await.unwrap();
    let again = patrols.subscribe(patrol, first).await.unwrap_err();
    assert!(matches!(again, ServiceError::Conflict(_)));
    let full = patrols.subscribe(patrol, second).await.unwrap_err();
    assert!(matches!(full, ServiceError::Conflict(_)));

    assert_eq!(patrols.subscriptions_for_patrol(patrol).await.unwrap().len(), 1);
}

#[tokio::test]
async fn suspended_patrol_refuses_subscriptions() {
    let executor = executor().await;
    let bus_id = BusService::new(executor.clone())
        .create(new_bus("BUS011", 10))
        .await
        .unwrap();
    let patrols = PatrolService::new(executor.clone());
    let patrol = patrols
        .create(&Patrol {
            id: None,
            bus_id,
            name: "Night shift".into(),
            route: "Plant - Depot".into(),
            departure_time: "22:15".into(),
            status: Default::default(),
        })
        .await
        .unwrap();
    let rider = UserService::new(executor.clone())
        .create(&user("rider3"))
        .await
        .unwrap();

    patrols.suspend(patrol).await.unwrap();
    let err = patrols.subscribe(patrol, rider).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn maintenance_takes_vehicle_out_and_back() {
    let executor = executor().await;
    let vehicles = VehicleService::new(executor.clone());
    let vehicle_id = vehicles.create(&vehicle("MNT001")).await.unwrap();
    let service = MaintenanceService::new(executor.clone());

    let record = service
        .schedule(&Maintenance {
            id: None,
            vehicle_id,
            kind: MaintenanceKind::Preventive,
            description: "Oil change".into(),
            cost: 120.0,
            scheduled_on: day(2024, 3, 1),
            completed_on: None,
            status: Default::default(),
        })
        .await
        .unwrap();
    assert_eq!(
        vehicles.get(vehicle_id).await.unwrap().status,
        VehicleStatus::InMaintenance
    );

    service.start(record).await.unwrap();
    service.complete(record, Some(day(2024, 3, 2))).await.unwrap();

    let done = service.get(record).await.unwrap();
    assert_eq!(done.status, MaintenanceStatus::Completed);
    assert_eq!(done.completed_on, Some(day(2024, 3, 2)));
    assert_eq!(
        vehicles.get(vehicle_id).await.unwrap().status,
        VehicleStatus::Available
    );
}

#[tokio::test]
async fn mission_lifecycle_frees_driver_and_vehicles() {
    let executor = executor().await;
    let vehicles = VehicleService::new(executor.clone());
    let drivers = DriverService::new(executor.clone());
    let vehicle_id = vehicles.create(&vehicle("MIS001")).await.unwrap();
    let driver_id = drivers.create(&driver("LIC-100")).await.unwrap();
    let missions = MissionService::new(executor.clone());

    let mission = missions
        .create(&Mission {
            id: None,
            title: "Supply run".into(),
            destination: "Warehouse 4".into(),
            driver_id: None,
            start_date: day(2024, 5, 1),
            end_date: None,
            status: MissionStatus::Completed,
        })
        .await
        .unwrap();
    assert_eq!(missions.get(mission).await.unwrap().status, MissionStatus::Planned);

    missions.assign_driver(mission, driver_id).await.unwrap();
    missions.attach_vehicle(mission, vehicle_id).await.unwrap();
    assert_eq!(missions.list_vehicles(mission).await.unwrap().len(), 1);

    missions.start(mission).await.unwrap();
    assert_eq!(
        drivers.get(driver_id).await.unwrap().status,
        DriverStatus::OnMission
    );
    assert_eq!(
        vehicles.get(vehicle_id).await.unwrap().status,
        VehicleStatus::OnMission
    );

    missions.complete(mission, Some(day(2024, 5, 3))).await.unwrap();
    assert_eq!(missions.get(mission).await.unwrap().status, MissionStatus::Completed);
    assert_eq!(
        drivers.get(driver_id).await.unwrap().status,
        DriverStatus::Available
    );
    assert_eq!(
        vehicles.get(vehicle_id).await.unwrap().status,
        VehicleStatus::Available
    );
}

fn planned(title: &str, driver_id: Option<i64>) -> Mission {
    Mission {
        id: None,
        title: title.into(),
        destination: "Depot".into(),
        driver_id,
        start_date: day(2024, 6, 1),
        end_date: None,
        status: MissionStatus::Planned,
    }
}

#[tokio::test]
async fn finished_mission_keeps_its_vehicles() {
    let executor = executor().await;
    let vehicles = VehicleService::new(executor.clone());
    let missions = MissionService::new(executor.clone());
    let vehicle_id = vehicles.create(&vehicle("MIS002")).await.unwrap();

    let first = missions.create(&planned("First run", None)).await.unwrap();
    missions.attach_vehicle(first, vehicle_id).await.unwrap();
    missions.complete(first, Some(day(2024, 6, 2))).await.unwrap();

    let second = missions.create(&planned("Second run", None)).await.unwrap();
    missions.attach_vehicle(second, vehicle_id).await.unwrap();

    let err = missions.detach_vehicle(first, vehicle_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
    assert_eq!(
        vehicles.get(vehicle_id).await.unwrap().status,
        VehicleStatus::OnMission
    );

    missions.detach_vehicle(second, vehicle_id).await.unwrap();
    assert_eq!(
        vehicles.get(vehicle_id).await.unwrap().status,
        VehicleStatus::Available
    );
}

#[tokio::test]
async fn replaced_driver_of_active_mission_is_released() {
    let executor = executor().await;
    let drivers = DriverService::new(executor.clone());
    let missions = MissionService::new(executor.clone());
    let first = drivers.create(&driver("LIC-301")).await.unwrap();
    let second = drivers.create(&driver("LIC-302")).await.unwrap();

    let mission = missions
        .create(&planned("Night shift", Some(first)))
        .await
        .unwrap();
    missions.start(mission).await.unwrap();
    assert_eq!(drivers.get(first).await.unwrap().status, DriverStatus::OnMission);

    missions.assign_driver(mission, second).await.unwrap();
    assert_eq!(drivers.get(first).await.unwrap().status, DriverStatus::Available);
    assert_eq!(drivers.get(second).await.unwrap().status, DriverStatus::OnMission);

    missions.complete(mission, Some(day(2024, 6, 3))).await.unwrap();
    assert_eq!(drivers.get(first).await.unwrap().status, DriverStatus::Available);
    assert_eq!(drivers.get(second).await.unwrap().status, DriverStatus::Available);
}

#[tokio::test]
async fn restock_cannot_overflow_quantity() {
    let executor = executor().await;
    let inventory = InventoryService::new(executor);
    let id = inventory
        .create_part(&SparePart {
            id: None,
            part_number: "BLT-1".into(),
            name: "Wheel bolt".into(),
            quantity: i64::MAX - 5,
            unit_price: 0.5,
            reorder_level: 0,
        })
        .await
        .unwrap();

    let err = inventory.restock_part(id, i64::MAX).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let err = inventory.restock_part(id, 6).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
    assert_eq!(inventory.get_part(id).await.unwrap().quantity, i64::MAX - 5);

    let full = inventory.restock_part(id, 5).await.unwrap();
    assert_eq!(full.quantity, i64::MAX);

    let err = inventory.restock_part(id + 1, 1).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));
}

#[tokio::test]
async fn overlapping_vacation_cannot_be_approved() {
    let executor = executor().await;
    let driver_id = DriverService::new(executor.clone())
        .create(&driver("LIC-200"))
        .await
        .unwrap();
    let vacations = VacationService::new(executor.clone());
    let request = |start, end| Vacation {
        id: None,
        driver_id,
        start_date: start,
        end_date: end,
        reason: None,
        status: Default::default(),
    };

    let first = vacations
        .request(&request(day(2024, 7, 1), day(2024, 7, 10)))
        .await
        .unwrap();
    let second = vacations
        .request(&request(day(2024, 7, 5), day(2024, 7, 12)))
        .await
        .unwrap();

    vacations.approve(first).await.unwrap();
    let err = vacations.approve(second).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}
