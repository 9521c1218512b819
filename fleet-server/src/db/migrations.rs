//! Schema creation
//!
//! Every statement is `CREATE TABLE IF NOT EXISTS`, so `run` is safe to
//! repeat on every start. Dates are `VARCHAR(10)` in `YYYY-MM-DD` form and
//! enum columns hold the variant name; both backends see identical text.

use tracing::info;

use super::{BoundQuery, DataAccessError, Dialect, QueryExecutor};

/// Tables in creation order (parents before children).
pub const TABLES: &[&str] = &[
    "users",
    "vehicles",
    "drivers",
    "buses",
    "maintenance",
    "maintenanceapplications",
    "applications",
    "joborders",
    "missions",
    "missionsnotes",
    "missionsvehicles",
    "missionsjoborders",
    "vacations",
    "patrols",
    "patrolssubscriptions",
    "spareparts",
    "consumables",
];

/// Create any missing tables.
pub async fn run(executor: &QueryExecutor) -> Result<(), DataAccessError> {
    let dialect = executor.dialect();
    for (table, ddl) in TABLES.iter().zip(statements(dialect)) {
        executor
            .run(format!("migrate {table}"), BoundQuery::command(ddl), |_| Ok(()))
            .await?;
    }
    info!(tables = TABLES.len(), dialect = ?dialect, "Schema up to date");
    Ok(())
}

/// DDL for every table, aligned with [`TABLES`].
pub fn statements(dialect: Dialect) -> Vec<String> {
    let id = dialect.surrogate_key();
    let opts = dialect.table_options();

    vec![
        format!(
            "CREATE TABLE IF NOT EXISTS users (
                id {id},
                username VARCHAR(32) NOT NULL UNIQUE,
                full_name VARCHAR(128) NOT NULL,
                email VARCHAR(128),
                phone VARCHAR(64),
                role VARCHAR(16) NOT NULL,
                created_on VARCHAR(10) NOT NULL
            ){opts}"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS vehicles (
                id {id},
                plate_numbers VARCHAR(16) NOT NULL UNIQUE,
                manufacturer VARCHAR(64) NOT NULL,
                model VARCHAR(64) NOT NULL,
                year BIGINT NOT NULL,
                kind VARCHAR(16) NOT NULL,
                fuel VARCHAR(16) NOT NULL,
                status VARCHAR(16) NOT NULL,
                odometer_km BIGINT NOT NULL DEFAULT 0
            ){opts}"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS drivers (
                id {id},
                full_name VARCHAR(128) NOT NULL,
                license_number VARCHAR(32) NOT NULL UNIQUE,
                license_expiry VARCHAR(10) NOT NULL,
                phone VARCHAR(64),
                status VARCHAR(16) NOT NULL,
                vehicle_id BIGINT,
                FOREIGN KEY (vehicle_id) REFERENCES vehicles(id) ON DELETE SET NULL
            ){opts}"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS buses (
                id {id},
                vehicle_id BIGINT NOT NULL UNIQUE,
                capacity BIGINT NOT NULL,
                route_name VARCHAR(64),
                FOREIGN KEY (vehicle_id) REFERENCES vehicles(id)
            ){opts}"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS maintenance (
                id {id},
                vehicle_id BIGINT NOT NULL,
                kind VARCHAR(16) NOT NULL,
                description VARCHAR(2048) NOT NULL,
                cost DOUBLE NOT NULL,
                scheduled_on VARCHAR(10) NOT NULL,
                completed_on VARCHAR(10),
                status VARCHAR(16) NOT NULL,
                FOREIGN KEY (vehicle_id) REFERENCES vehicles(id)
            ){opts}"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS maintenanceapplications (
                id {id},
                vehicle_id BIGINT NOT NULL,
                requested_by BIGINT NOT NULL,
                description VARCHAR(2048) NOT NULL,
                submitted_on VARCHAR(10) NOT NULL,
                status VARCHAR(16) NOT NULL,
                maintenance_id BIGINT,
                FOREIGN KEY (vehicle_id) REFERENCES vehicles(id),
                FOREIGN KEY (requested_by) REFERENCES users(id),
                FOREIGN KEY (maintenance_id) REFERENCES maintenance(id) ON DELETE SET NULL
            ){opts}"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS applications (
                id {id},
                applicant_id BIGINT NOT NULL,
                vehicle_id BIGINT,
                kind VARCHAR(16) NOT NULL,
                description VARCHAR(2048) NOT NULL,
                submitted_on VARCHAR(10) NOT NULL,
                status VARCHAR(16) NOT NULL,
                FOREIGN KEY (applicant_id) REFERENCES users(id),
                FOREIGN KEY (vehicle_id) REFERENCES vehicles(id) ON DELETE SET NULL
            ){opts}"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS joborders (
                id {id},
                application_id BIGINT,
                vehicle_id BIGINT,
                title VARCHAR(256) NOT NULL,
                description VARCHAR(2048) NOT NULL,
                opened_on VARCHAR(10) NOT NULL,
                closed_on VARCHAR(10),
                status VARCHAR(16) NOT NULL,
                FOREIGN KEY (application_id) REFERENCES applications(id) ON DELETE SET NULL,
                FOREIGN KEY (vehicle_id) REFERENCES vehicles(id) ON DELETE SET NULL
            ){opts}"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS missions (
                id {id},
                title VARCHAR(256) NOT NULL,
                destination VARCHAR(256) NOT NULL,
                driver_id BIGINT,
                start_date VARCHAR(10) NOT NULL,
                end_date VARCHAR(10),
                status VARCHAR(16) NOT NULL,
                FOREIGN KEY (driver_id) REFERENCES drivers(id) ON DELETE SET NULL
            ){opts}"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS missionsnotes (
                id {id},
                mission_id BIGINT NOT NULL,
                author_id BIGINT NOT NULL,
                note VARCHAR(2048) NOT NULL,
                written_on VARCHAR(10) NOT NULL,
                FOREIGN KEY (mission_id) REFERENCES missions(id) ON DELETE CASCADE,
                FOREIGN KEY (author_id) REFERENCES users(id)
            ){opts}"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS missionsvehicles (
                mission_id BIGINT NOT NULL,
                vehicle_id BIGINT NOT NULL,
                PRIMARY KEY (mission_id, vehicle_id),
                FOREIGN KEY (mission_id) REFERENCES missions(id) ON DELETE CASCADE,
                FOREIGN KEY (vehicle_id) REFERENCES vehicles(id)
            ){opts}"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS missionsjoborders (
                mission_id BIGINT NOT NULL,
                job_order_id BIGINT NOT NULL,
                PRIMARY KEY (mission_id, job_order_id),
                FOREIGN KEY (mission_id) REFERENCES missions(id) ON DELETE CASCADE,
                FOREIGN KEY (job_order_id) REFERENCES joborders(id) ON DELETE CASCADE
            ){opts}"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS vacations (
                id {id},
                driver_id BIGINT NOT NULL,
                start_date VARCHAR(10) NOT NULL,
                end_date VARCHAR(10) NOT NULL,
                reason VARCHAR(2048),
                status VARCHAR(16) NOT NULL,
                FOREIGN KEY (driver_id) REFERENCES drivers(id) ON DELETE CASCADE
            ){opts}"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS patrols (
                id {id},
                bus_id BIGINT NOT NULL,
                name VARCHAR(128) NOT NULL,
                route VARCHAR(512) NOT NULL,
                departure_time VARCHAR(5) NOT NULL,
                status VARCHAR(16) NOT NULL,
                FOREIGN KEY (bus_id) REFERENCES buses(id)
            ){opts}"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS patrolssubscriptions (
                id {id},
                patrol_id BIGINT NOT NULL,
                employee_id BIGINT NOT NULL,
                subscribed_on VARCHAR(10) NOT NULL,
                status VARCHAR(16) NOT NULL,
                FOREIGN KEY (patrol_id) REFERENCES patrols(id) ON DELETE CASCADE,
                FOREIGN KEY (employee_id) REFERENCES users(id) ON DELETE CASCADE
            ){opts}"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS spareparts (
                id {id},
                part_number VARCHAR(64) NOT NULL UNIQUE,
                name VARCHAR(128) NOT NULL,
                quantity BIGINT NOT NULL,
                unit_price DOUBLE NOT NULL,
                reorder_level BIGINT NOT NULL
            ){opts}"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS consumables (
                id {id},
                name VARCHAR(128) NOT NULL UNIQUE,
                unit VARCHAR(16) NOT NULL,
                quantity BIGINT NOT NULL,
                reorder_level BIGINT NOT NULL
            ){opts}"
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionSettings;
    use crate::db::ConnectionProvider;

    #[test]
    fn one_statement_per_table() {
        let ddl = statements(Dialect::MySql);
        assert_eq!(ddl.len(), TABLES.len());
        for (table, sql) in TABLES.iter().zip(&ddl) {
            assert!(
                sql.starts_with(&format!("CREATE TABLE IF NOT EXISTS {table} (")),
                "statement for {table} out of order"
            );
        }
        assert!(ddl[0].contains("AUTO_INCREMENT"));
        assert!(ddl[0].ends_with("ENGINE=InnoDB DEFAULT CHARSET=utf8mb4"));
    }

    #[test]
    fn no_placeholders_in_ddl() {
        for sql in statements(Dialect::Sqlite) {
            assert!(!sql.contains('@'));
        }
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let provider = ConnectionProvider::new(ConnectionSettings::in_memory()).unwrap();
        let executor = QueryExecutor::new(provider);

        run(&executor).await.expect("first run");
        run(&executor).await.expect("second run");

        let tables = executor
            .run(
                "list tables",
                BoundQuery::rows(
                    "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
                ),
                |out| Ok(out.into_rows().len()),
            )
            .await
            .unwrap();
        assert_eq!(tables, TABLES.len());
    }
}
