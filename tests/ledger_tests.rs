use chrono::NaiveTime;
use rtimebill::config::Config;
use rtimebill::context::RequestContext;
use rtimebill::core::banked::BankedHoursLogic;
use rtimebill::core::catalog::CatalogLogic;
use rtimebill::core::punch::PunchLogic;
use rtimebill::db::catalog::CatalogTable;
use rtimebill::db::initialize::init_db;
use rtimebill::db::pool::DbPool;
use rtimebill::errors::AppError;
use rtimebill::models::lifecycle::ActivityState;
use rtimebill::models::punch::PunchType;
use rtimebill::models::timesheet::{CollaboratorClass, EntryMode, ProjectClass};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::thread;

mod common;
use common::{ctx, draft, open_test_db, record, seed_allocation_project, seed_profile, seed_user};

#[test]
fn test_start_end_span_becomes_hours() {
    let (mut pool, cfg) = open_test_db("ledger_span");
    let profile = seed_profile(&mut pool, "Dev", dec!(50));
    let user = seed_user(&mut pool, "Ana", Some(profile));
    let project = seed_allocation_project(&mut pool, "Span", user);

    let mut d = draft(user, project, "2025-03-03", dec!(0));
    d.hours = None;
    d.start = NaiveTime::from_hms_opt(9, 0, 0);
    d.end = NaiveTime::from_hms_opt(18, 0, 0);

    let entry = record(&mut pool, &cfg, &d).unwrap();
    assert_eq!(entry.hours, dec!(9.00));
    assert_eq!(entry.mode, EntryMode::Timesheet);
    assert_eq!(entry.cost_profile_snapshot_id, Some(profile));
    assert_eq!(entry.cost_per_hour_snapshot, Some(dec!(50)));
    assert_eq!(entry.created_by, user);
}

#[test]
fn test_span_rounds_to_two_places() {
    let (mut pool, cfg) = open_test_db("ledger_round");
    let user = seed_user(&mut pool, "Bia", None);
    let project = seed_allocation_project(&mut pool, "Round", user);

    // 09:00 → 09:20 is 0.333… h
    let mut d = draft(user, project, "2025-03-03", dec!(0));
    d.hours = None;
    d.start = NaiveTime::from_hms_opt(9, 0, 0);
    d.end = NaiveTime::from_hms_opt(9, 20, 0);

    let entry = record(&mut pool, &cfg, &d).unwrap();
    assert_eq!(entry.hours, dec!(0.33));
    assert_eq!(entry.cost_per_hour_snapshot, None);
}

#[test]
fn test_end_before_start_is_rejected() {
    let (mut pool, cfg) = open_test_db("ledger_end_before_start");
    let user = seed_user(&mut pool, "Caio", None);
    let project = seed_allocation_project(&mut pool, "Bad span", user);

    let mut d = draft(user, project, "2025-03-03", dec!(0));
    d.hours = None;
    d.start = NaiveTime::from_hms_opt(18, 0, 0);
    d.end = NaiveTime::from_hms_opt(9, 0, 0);

    let err = record(&mut pool, &cfg, &d).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "got {err:?}");
}

#[test]
fn test_non_positive_and_oversized_hours_are_rejected() {
    let (mut pool, cfg) = open_test_db("ledger_bad_hours");
    let user = seed_user(&mut pool, "Duda", None);
    let project = seed_allocation_project(&mut pool, "Bad hours", user);

    for hours in [dec!(0), dec!(-1), dec!(24.5)] {
        let err = record(&mut pool, &cfg, &draft(user, project, "2025-03-03", hours)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "{hours}: got {err:?}");
    }
}

#[test]
fn test_daily_manual_cap() {
    let (mut pool, cfg) = open_test_db("ledger_cap");
    let user = seed_user(&mut pool, "Edu", None);
    let project = seed_allocation_project(&mut pool, "Cap", user);

    record(&mut pool, &cfg, &draft(user, project, "2025-03-03", dec!(5))).unwrap();

    let err = record(&mut pool, &cfg, &draft(user, project, "2025-03-03", dec!(8))).unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)), "got {err:?}");
    assert!(err.to_string().contains("daily manual-entry cap exceeded"));

    // exactly up to the cap is fine
    record(&mut pool, &cfg, &draft(user, project, "2025-03-03", dec!(7))).unwrap();

    // another day starts from zero
    record(&mut pool, &cfg, &draft(user, project, "2025-03-04", dec!(12))).unwrap();
}

#[test]
fn test_cap_applies_to_every_entry_mode() {
    let (mut pool, cfg) = open_test_db("ledger_cap_punch_mode");
    let user = seed_user(&mut pool, "Fabi", None);
    let project = seed_allocation_project(&mut pool, "Punch mode", user);

    record(&mut pool, &cfg, &draft(user, project, "2025-03-03", dec!(12))).unwrap();

    let mut from_punches = draft(user, project, "2025-03-03", dec!(10));
    from_punches.mode = EntryMode::Punch;
    let err = record(&mut pool, &cfg, &from_punches).unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)), "got {err:?}");
    let day = Some(common::date("2025-03-03"));
    let on_day = rtimebill::db::ledger::project_hours_between(&pool.conn, project, day, day).unwrap();
    assert_eq!(on_day, dec!(12));

    // punch-derived lines are not part of the existing manual total
    let mut earlier = draft(user, project, "2025-03-04", dec!(10));
    earlier.mode = EntryMode::Punch;
    record(&mut pool, &cfg, &earlier).unwrap();
    record(&mut pool, &cfg, &draft(user, project, "2025-03-04", dec!(12))).unwrap();
}

#[test]
fn test_user_falls_back_to_acting_user() {
    let (mut pool, cfg) = open_test_db("ledger_actor");
    let user = seed_user(&mut pool, "Gil", None);
    let project = seed_allocation_project(&mut pool, "Actor", user);

    let mut d = draft(user, project, "2025-03-03", dec!(2));
    d.user_id = None;

    let err = record(&mut pool, &cfg, &d).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "got {err:?}");

    let actor = RequestContext::new(Some(user));
    let strategies = rtimebill::core::billing::BillingStrategies::default();
    let entry =
        rtimebill::core::timesheet::TimesheetLogic::record(&mut pool, &cfg, &actor, &strategies, &d)
            .unwrap();
    assert_eq!(entry.user_id, user);
    assert_eq!(entry.updated_by, user);
}

#[test]
fn test_inactive_user_cannot_record() {
    let (mut pool, cfg) = open_test_db("ledger_inactive");
    let user = seed_user(&mut pool, "Hugo", None);
    let project = seed_allocation_project(&mut pool, "Inactive", user);

    CatalogLogic::set_state(&mut pool, &ctx(), CatalogTable::Users, user, ActivityState::Inactive)
        .unwrap();

    let err = record(&mut pool, &cfg, &draft(user, project, "2025-03-03", dec!(1))).unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)), "got {err:?}");

    let err = PunchLogic::record(
        &mut pool, &cfg, &ctx(), user, "2025-03-03", PunchType::Entrada, None, None,
    )
    .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)), "got {err:?}");
}

#[test]
fn test_unknown_project_and_foreign_task() {
    let (mut pool, cfg) = open_test_db("ledger_refs");
    let user = seed_user(&mut pool, "Iris", None);
    let project = seed_allocation_project(&mut pool, "Refs", user);
    let other = seed_allocation_project(&mut pool, "Other", user);
    let task = CatalogLogic::add_task(&mut pool, &ctx(), other, "Design", dec!(10)).unwrap();

    let err = record(&mut pool, &cfg, &draft(user, 999, "2025-03-03", dec!(1))).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");

    let mut d = draft(user, project, "2025-03-03", dec!(1));
    d.task_id = Some(task);
    let err = record(&mut pool, &cfg, &d).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");
}

#[test]
fn test_explicit_classes_and_edit_reason_are_kept() {
    let (mut pool, cfg) = open_test_db("ledger_explicit");
    let user = seed_user(&mut pool, "Jo", None);
    let project = seed_allocation_project(&mut pool, "Explicit", user);

    let mut d = draft(user, project, "2025-03-03", dec!(3));
    d.collaborator_class = Some(CollaboratorClass::Banked);
    d.project_class = Some(ProjectClass::Extra);
    d.off_hours = true;
    d.edit_reason = Some("forgot to punch".into());

    let entry = record(&mut pool, &cfg, &d).unwrap();
    assert_eq!(entry.collaborator_class, CollaboratorClass::Banked);
    assert_eq!(entry.project_class, ProjectClass::Extra);
    assert!(entry.off_hours);
    assert!(entry.is_correction());
}

#[test]
fn test_concurrent_submissions_respect_cap() {
    let (mut pool, cfg) = open_test_db("ledger_concurrency");
    let user = seed_user(&mut pool, "Kai", None);
    let project = seed_allocation_project(&mut pool, "Race", user);
    drop(pool);

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let cfg: Config = cfg.clone();
            thread::spawn(move || {
                let mut pool = DbPool::with_busy_timeout(&cfg.database, 30_000).unwrap();
                record(&mut pool, &cfg, &draft(user, project, "2025-03-03", dec!(4))).is_ok()
            })
        })
        .collect();

    let accepted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(accepted, 3);

    let pool = DbPool::new(&cfg.database).unwrap();
    init_db(&pool.conn).unwrap();
    let total = rtimebill::db::ledger::manual_hours_for_day(
        &pool.conn,
        user,
        common::date("2025-03-03"),
    )
    .unwrap();
    assert_eq!(total, dec!(12));
}

#[test]
fn test_punch_sequence() {
    let (mut pool, cfg) = open_test_db("ledger_punch_sequence");
    let user = seed_user(&mut pool, "Lia", None);

    let p = PunchLogic::record(
        &mut pool, &cfg, &ctx(), user, "2025-03-03", PunchType::Entrada, None, Some("on time"),
    )
    .unwrap();
    assert_eq!(p.kind, PunchType::Entrada);

    // skipping the lunch punches is allowed
    PunchLogic::record(&mut pool, &cfg, &ctx(), user, "2025-03-03", PunchType::Saida, None, None)
        .unwrap();

    let err = PunchLogic::record(
        &mut pool, &cfg, &ctx(), user, "2025-03-03", PunchType::VoltaAlmoco, None, None,
    )
    .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)), "got {err:?}");

    let day = PunchLogic::day(&mut pool, user, "2025-03-03").unwrap();
    assert_eq!(day.len(), 2);

    let mut relaxed = cfg.clone();
    relaxed.enforce_punch_sequence = false;
    PunchLogic::record(
        &mut pool, &relaxed, &ctx(), user, "2025-03-03", PunchType::VoltaAlmoco, None, None,
    )
    .unwrap();
}

#[test]
fn test_banked_balance_is_order_independent() {
    let (mut pool, cfg) = open_test_db("ledger_banked");
    let a = seed_user(&mut pool, "Mel", None);
    let b = seed_user(&mut pool, "Nina", None);

    for h in [dec!(5), dec!(-2), dec!(3.5)] {
        BankedHoursLogic::record_movement(&mut pool, &cfg, &ctx(), a, h, None).unwrap();
    }
    for h in [dec!(3.5), dec!(5), dec!(-2)] {
        BankedHoursLogic::record_movement(&mut pool, &cfg, &ctx(), b, h, Some("swap")).unwrap();
    }

    assert_eq!(BankedHoursLogic::balance(&pool, a).unwrap(), dec!(6.5));
    assert_eq!(BankedHoursLogic::balance(&pool, b).unwrap(), dec!(6.5));
    assert_eq!(BankedHoursLogic::movements(&pool, b).unwrap().len(), 3);
}

#[test]
fn test_banked_movement_rules() {
    let (mut pool, mut cfg) = open_test_db("ledger_banked_rules");
    let user = seed_user(&mut pool, "Otto", None);

    let err = BankedHoursLogic::record_movement(&mut pool, &cfg, &ctx(), user, Decimal::ZERO, None)
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "got {err:?}");

    let err = BankedHoursLogic::record_movement(&mut pool, &cfg, &ctx(), 999, dec!(1), None)
        .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)), "got {err:?}");

    cfg.banked_hours_min = Some(dec!(-4));
    let balance =
        BankedHoursLogic::record_movement(&mut pool, &cfg, &ctx(), user, dec!(-4), None).unwrap();
    assert_eq!(balance, dec!(-4));
    let err = BankedHoursLogic::record_movement(&mut pool, &cfg, &ctx(), user, dec!(-0.5), None)
        .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)), "got {err:?}");
}

#[test]
fn test_ledger_tables_are_append_only() {
    let (mut pool, cfg) = open_test_db("ledger_append_only");
    let user = seed_user(&mut pool, "Pia", None);
    let project = seed_allocation_project(&mut pool, "Append", user);
    record(&mut pool, &cfg, &draft(user, project, "2025-03-03", dec!(2))).unwrap();
    PunchLogic::record(&mut pool, &cfg, &ctx(), user, "2025-03-03", PunchType::Entrada, None, None)
        .unwrap();
    BankedHoursLogic::record_movement(&mut pool, &cfg, &ctx(), user, dec!(1), None).unwrap();

    for sql in [
        "UPDATE timesheet_entries SET hours = '1'",
        "DELETE FROM timesheet_entries",
        "UPDATE clock_punches SET note = 'x'",
        "DELETE FROM clock_punches",
        "UPDATE banked_hours_movements SET hours = '9'",
        "DELETE FROM banked_hours_movements",
    ] {
        let res = pool.conn.execute(sql, []);
        assert!(res.is_err(), "{sql} should be rejected");
    }
}
