use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists. Migrations record themselves there.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

const CATALOG_SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS cost_profiles (
        id                INTEGER PRIMARY KEY AUTOINCREMENT,
        name              TEXT NOT NULL,
        hourly_cost       TEXT NOT NULL,
        active            INTEGER NOT NULL DEFAULT 1,
        status_changed_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS users (
        id                INTEGER PRIMARY KEY AUTOINCREMENT,
        name              TEXT NOT NULL,
        email             TEXT NOT NULL UNIQUE,
        password_hash     TEXT,
        role              TEXT NOT NULL CHECK(role IN ('ADMIN','GESTOR','COLABORADOR')),
        cost_profile_id   INTEGER REFERENCES cost_profiles(id),
        hourly_cost       TEXT,
        weekly_hours      TEXT NOT NULL,
        active            INTEGER NOT NULL DEFAULT 1,
        status_changed_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS projects (
        id                INTEGER PRIMARY KEY AUTOINCREMENT,
        name              TEXT NOT NULL,
        client            TEXT,
        cost_center       TEXT,
        status            TEXT NOT NULL DEFAULT 'ATIVO'
                          CHECK(status IN ('ATIVO','PAUSADO','CONCLUIDO','CANCELADO')),
        billing_model     TEXT NOT NULL CHECK(billing_model IN ('ESCOPO_FECHADO','ALOCACAO')),
        fee_type          TEXT CHECK(fee_type IN ('FIXO','POR_HORA')),
        fee_amount        TEXT,
        manager_id        INTEGER NOT NULL REFERENCES users(id),
        active            INTEGER NOT NULL DEFAULT 1,
        status_changed_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS tasks (
        id                INTEGER PRIMARY KEY AUTOINCREMENT,
        project_id        INTEGER NOT NULL REFERENCES projects(id),
        name              TEXT NOT NULL,
        budget_hours      TEXT NOT NULL DEFAULT '0',
        active            INTEGER NOT NULL DEFAULT 1,
        status_changed_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS allocations (
        id                INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id           INTEGER NOT NULL REFERENCES users(id),
        project_id        INTEGER NOT NULL REFERENCES projects(id),
        task_id           INTEGER REFERENCES tasks(id),
        start_date        TEXT NOT NULL,
        active            INTEGER NOT NULL DEFAULT 1,
        status_changed_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS project_estimates (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        project_id       INTEGER NOT NULL REFERENCES projects(id),
        cost_profile_id  INTEGER NOT NULL REFERENCES cost_profiles(id),
        estimated_hours  TEXT NOT NULL,
        cost_per_hour    TEXT NOT NULL,
        price_per_hour   TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS project_contracts (
        id                INTEGER PRIMARY KEY AUTOINCREMENT,
        project_id        INTEGER NOT NULL REFERENCES projects(id),
        competence        TEXT NOT NULL,
        cost_profile_id   INTEGER NOT NULL REFERENCES cost_profiles(id),
        contracted_hours  TEXT NOT NULL,
        price_contracted  TEXT NOT NULL,
        price_additional  TEXT NOT NULL,
        price_off_hours   TEXT NOT NULL,
        price_overtime    TEXT NOT NULL,
        cost_per_hour     TEXT NOT NULL,
        UNIQUE(project_id, competence, cost_profile_id)
    );

    CREATE TABLE IF NOT EXISTS fee_installments (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        project_id   INTEGER NOT NULL REFERENCES projects(id),
        kind         TEXT NOT NULL CHECK(kind IN ('MARCO','OUTRO')),
        description  TEXT,
        due_date     TEXT NOT NULL,
        amount       TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_tasks_project ON tasks(project_id);
    CREATE INDEX IF NOT EXISTS idx_allocations_user ON allocations(user_id);
    CREATE INDEX IF NOT EXISTS idx_contracts_project ON project_contracts(project_id, competence);
"#;

const LEDGER_SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS clock_punches (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id     INTEGER NOT NULL REFERENCES users(id),
        date        TEXT NOT NULL,
        kind        TEXT NOT NULL
                    CHECK(kind IN ('ENTRADA','SAIDA_ALMOCO','VOLTA_ALMOCO','SAIDA')),
        project_id  INTEGER REFERENCES projects(id),
        note        TEXT,
        created_at  TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS timesheet_entries (
        id                        INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id                   INTEGER NOT NULL REFERENCES users(id),
        project_id                INTEGER NOT NULL REFERENCES projects(id),
        task_id                   INTEGER REFERENCES tasks(id),
        date                      TEXT NOT NULL,
        start_time                TEXT,
        end_time                  TEXT,
        hours                     TEXT NOT NULL,
        mode                      TEXT NOT NULL CHECK(mode IN ('TIMESHEET','PONTO')),
        collaborator_class        TEXT NOT NULL CHECK(collaborator_class IN ('NORMAL','EXTRA','BANCO')),
        project_class             TEXT NOT NULL CHECK(project_class IN ('NORMAL','EXTRA')),
        cost_profile_snapshot_id  INTEGER REFERENCES cost_profiles(id),
        cost_per_hour_snapshot    TEXT,
        price_per_hour_snapshot   TEXT,
        off_hours                 INTEGER NOT NULL DEFAULT 0,
        edit_reason               TEXT,
        created_by                INTEGER NOT NULL,
        updated_by                INTEGER NOT NULL,
        created_at                TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS banked_hours_movements (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id     INTEGER NOT NULL REFERENCES users(id),
        hours       TEXT NOT NULL,
        note        TEXT,
        created_at  TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_punches_user_date ON clock_punches(user_id, date);
    CREATE INDEX IF NOT EXISTS idx_entries_user_date ON timesheet_entries(user_id, date);
    CREATE INDEX IF NOT EXISTS idx_entries_project_date ON timesheet_entries(project_id, date);
    CREATE INDEX IF NOT EXISTS idx_movements_user ON banked_hours_movements(user_id);
"#;

const APPEND_ONLY_TRIGGERS: &str = r#"
    CREATE TRIGGER IF NOT EXISTS trg_punches_no_update
        BEFORE UPDATE ON clock_punches
        BEGIN SELECT RAISE(ABORT, 'clock_punches is append-only'); END;
    CREATE TRIGGER IF NOT EXISTS trg_punches_no_delete
        BEFORE DELETE ON clock_punches
        BEGIN SELECT RAISE(ABORT, 'clock_punches is append-only'); END;

    CREATE TRIGGER IF NOT EXISTS trg_entries_no_update
        BEFORE UPDATE ON timesheet_entries
        BEGIN SELECT RAISE(ABORT, 'timesheet_entries is append-only'); END;
    CREATE TRIGGER IF NOT EXISTS trg_entries_no_delete
        BEFORE DELETE ON timesheet_entries
        BEGIN SELECT RAISE(ABORT, 'timesheet_entries is append-only'); END;

    CREATE TRIGGER IF NOT EXISTS trg_movements_no_update
        BEFORE UPDATE ON banked_hours_movements
        BEGIN SELECT RAISE(ABORT, 'banked_hours_movements is append-only'); END;
    CREATE TRIGGER IF NOT EXISTS trg_movements_no_delete
        BEFORE DELETE ON banked_hours_movements
        BEGIN SELECT RAISE(ABORT, 'banked_hours_movements is append-only'); END;
"#;

/// Ordered schema steps. Versions are never renamed once released.
const MIGRATIONS: &[(&str, &str, &str)] = &[
    (
        "20260301_0001_catalog",
        CATALOG_SCHEMA,
        "Created catalog tables (profiles, users, projects, tasks, allocations, billing)",
    ),
    (
        "20260301_0002_ledger",
        LEDGER_SCHEMA,
        "Created ledger tables (punches, timesheet entries, banked hours)",
    ),
    (
        "20260301_0003_append_only",
        APPEND_ONLY_TRIGGERS,
        "Installed append-only triggers on ledger tables",
    ),
];

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

/// Versions already recorded in the `log` table, in application order.
pub fn applied_versions(conn: &Connection) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for (version, _, _) in MIGRATIONS {
        if is_applied(conn, version)? {
            out.push((*version).to_string());
        }
    }
    Ok(out)
}

pub fn pending_versions(conn: &Connection) -> Result<Vec<String>> {
    ensure_log_table(conn)?;
    let mut out = Vec::new();
    for (version, _, _) in MIGRATIONS {
        if !is_applied(conn, version)? {
            out.push((*version).to_string());
        }
    }
    Ok(out)
}

/// Public entry point: run all pending migrations.
///
/// Each step runs in its own transaction together with its `migration_applied`
/// marker, so a failed step leaves nothing half-applied.
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_log_table(conn)?;

    for (version, sql, message) in MIGRATIONS {
        if is_applied(conn, version)? {
            continue;
        }

        conn.execute_batch("BEGIN;")?;
        let step = conn.execute_batch(sql).and_then(|_| {
            conn.execute(
                "INSERT INTO log (date, operation, target, message)
                 VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
                [version, message],
            )
        });

        match step {
            Ok(_) => {
                conn.execute_batch("COMMIT;")?;
                success(format!("Migration applied: {} → {}", version, message));
            }
            Err(e) => {
                conn.execute_batch("ROLLBACK;").ok();
                return Err(e);
            }
        }
    }

    Ok(())
}
