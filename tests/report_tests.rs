use rtimebill::core::banked::BankedHoursLogic;
use rtimebill::core::calendar::{BusinessCalendar, ConfiguredCalendar};
use rtimebill::core::catalog::CatalogLogic;
use rtimebill::core::punch::PunchLogic;
use rtimebill::core::reports::{LedgerSnapshot, capacity, collaborator, compliance};
use rtimebill::db::catalog::CatalogTable;
use rtimebill::errors::AppError;
use rtimebill::models::lifecycle::ActivityState;
use rtimebill::models::punch::PunchType;
use rtimebill::models::report_filter::ReportFilter;
use rtimebill::models::timesheet::{CollaboratorClass, EntryMode};
use rust_decimal_macros::dec;

mod common;
use common::{ctx, date, draft, open_test_db, record, seed_allocation_project, seed_profile, seed_user};

fn range(from: &str, to: &str) -> ReportFilter {
    ReportFilter::parse(Some(from), Some(to), None, None, None, None).unwrap()
}

#[test]
fn test_filter_rejects_inverted_range() {
    let err = ReportFilter::parse(Some("2025-03-31"), Some("2025-03-01"), None, None, None, None)
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "got {err:?}");

    let err = ReportFilter::parse(Some("2025/03/01"), None, None, None, None, None).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "got {err:?}");
}

#[test]
fn test_compliance_counts_missing_punches() {
    let (mut pool, cfg) = open_test_db("report_compliance");
    let user = seed_user(&mut pool, "Ana", None);
    let project = seed_allocation_project(&mut pool, "Compliance", user);

    for kind in [PunchType::Entrada, PunchType::Saida] {
        PunchLogic::record(&mut pool, &cfg, &ctx(), user, "2025-03-03", kind, None, None).unwrap();
    }
    record(&mut pool, &cfg, &draft(user, project, "2025-03-03", dec!(7.5))).unwrap();

    let mut fixed = draft(user, project, "2025-03-04", dec!(8));
    fixed.edit_reason = Some("clock was down".into());
    record(&mut pool, &cfg, &fixed).unwrap();

    let snapshot = LedgerSnapshot::load(&pool.conn, &cfg, &range("2025-03-01", "2025-03-31"))
        .unwrap()
        .with_punches(&pool.conn, &cfg)
        .unwrap();
    let report = compliance::build(&snapshot, dec!(8));
    assert_eq!(report.rows.len(), 2);

    let monday = &report.rows[0];
    assert_eq!(monday.date, date("2025-03-03"));
    assert_eq!(monday.punches, vec![PunchType::Entrada, PunchType::Saida]);
    assert_eq!(monday.missing_punches, 2);
    assert_eq!(monday.registered_hours, dec!(7.5));
    assert_eq!(monday.difference, dec!(-0.5));
    assert_eq!(monday.corrections, 0);

    let tuesday = &report.rows[1];
    assert_eq!(tuesday.missing_punches, 4);
    assert_eq!(tuesday.corrections, 1);
    assert_eq!(tuesday.difference, dec!(0));
}

#[test]
fn test_compliance_counts_only_manual_corrections() {
    let (mut pool, cfg) = open_test_db("report_compliance_corrections");
    let user = seed_user(&mut pool, "Caio", None);
    let project = seed_allocation_project(&mut pool, "Corrections", user);

    let mut from_clock = draft(user, project, "2025-03-05", dec!(6));
    from_clock.mode = EntryMode::Punch;
    from_clock.edit_reason = Some("late sync".into());
    record(&mut pool, &cfg, &from_clock).unwrap();

    let mut manual = draft(user, project, "2025-03-05", dec!(2));
    manual.edit_reason = Some("forgot to log".into());
    record(&mut pool, &cfg, &manual).unwrap();

    let snapshot = LedgerSnapshot::load(&pool.conn, &cfg, &range("2025-03-01", "2025-03-31"))
        .unwrap()
        .with_punches(&pool.conn, &cfg)
        .unwrap();
    let report = compliance::build(&snapshot, dec!(8));
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].registered_hours, dec!(8));
    assert_eq!(report.rows[0].corrections, 1);
}

#[test]
fn test_compliance_project_filter_does_not_drop_punches() {
    let (mut pool, cfg) = open_test_db("report_compliance_project");
    let user = seed_user(&mut pool, "Bia", None);
    let project = seed_allocation_project(&mut pool, "Filtered", user);
    let other = seed_allocation_project(&mut pool, "Other", user);

    PunchLogic::record(&mut pool, &cfg, &ctx(), user, "2025-03-03", PunchType::Entrada, Some(other), None)
        .unwrap();
    record(&mut pool, &cfg, &draft(user, other, "2025-03-03", dec!(3))).unwrap();
    record(&mut pool, &cfg, &draft(user, project, "2025-03-03", dec!(2))).unwrap();

    let filter = ReportFilter::parse(Some("2025-03-01"), Some("2025-03-31"), Some(project), None, None, None)
        .unwrap();
    let snapshot = LedgerSnapshot::load(&pool.conn, &cfg, &filter)
        .unwrap()
        .with_punches(&pool.conn, &cfg)
        .unwrap();
    let report = compliance::build(&snapshot, dec!(8));

    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].registered_hours, dec!(2));
    assert_eq!(report.rows[0].missing_punches, 3);
}

#[test]
fn test_collaborator_breakdown_and_banked_balance() {
    let (mut pool, cfg) = open_test_db("report_collaborator");
    let user = seed_user(&mut pool, "Caio", None);
    let project = seed_allocation_project(&mut pool, "People", user);
    let task = CatalogLogic::add_task(&mut pool, &ctx(), project, "Backend", dec!(40)).unwrap();

    let mut on_task = draft(user, project, "2025-03-03", dec!(6));
    on_task.task_id = Some(task);
    record(&mut pool, &cfg, &on_task).unwrap();

    let mut extra = draft(user, project, "2025-03-04", dec!(2));
    extra.collaborator_class = Some(CollaboratorClass::Extra);
    record(&mut pool, &cfg, &extra).unwrap();

    let mut banked = draft(user, project, "2025-03-05", dec!(3));
    banked.collaborator_class = Some(CollaboratorClass::Banked);
    record(&mut pool, &cfg, &banked).unwrap();

    BankedHoursLogic::record_movement(&mut pool, &cfg, &ctx(), user, dec!(3), None).unwrap();
    BankedHoursLogic::record_movement(&mut pool, &cfg, &ctx(), user, dec!(-1), None).unwrap();

    let snapshot = LedgerSnapshot::load(&pool.conn, &cfg, &range("2025-03-01", "2025-03-31")).unwrap();
    let report = collaborator::build(&snapshot);
    assert_eq!(report.rows.len(), 1);

    let row = &report.rows[0];
    assert_eq!(row.name, "Caio");
    assert_eq!(row.total_hours, dec!(11));
    assert_eq!(row.extra_hours, dec!(2));
    assert_eq!(row.banked_class_hours, dec!(3));
    assert_eq!(row.banked_balance, dec!(2));

    assert_eq!(row.breakdown.len(), 2);
    assert_eq!(row.breakdown[0].task_id, None);
    assert_eq!(row.breakdown[0].hours, dec!(5));
    assert_eq!(row.breakdown[1].task.as_deref(), Some("Backend"));
    assert_eq!(row.breakdown[1].hours, dec!(6));
}

#[test]
fn test_manager_and_profile_filters() {
    let (mut pool, cfg) = open_test_db("report_filters");
    let dev = seed_profile(&mut pool, "Dev", dec!(50));
    let ana = seed_user(&mut pool, "Ana", Some(dev));
    let bruno = seed_user(&mut pool, "Bruno", None);
    let mine = seed_allocation_project(&mut pool, "Mine", ana);
    let theirs = seed_allocation_project(&mut pool, "Theirs", bruno);

    record(&mut pool, &cfg, &draft(ana, mine, "2025-03-03", dec!(2))).unwrap();
    record(&mut pool, &cfg, &draft(bruno, theirs, "2025-03-03", dec!(3))).unwrap();

    let by_manager = ReportFilter::parse(None, None, None, None, None, Some(bruno)).unwrap();
    let snapshot = LedgerSnapshot::load(&pool.conn, &cfg, &by_manager).unwrap();
    assert_eq!(snapshot.entries.len(), 1);
    assert_eq!(snapshot.entries[0].project_id, theirs);

    let by_profile = ReportFilter::parse(None, None, None, None, Some(dev), None).unwrap();
    let snapshot = LedgerSnapshot::load(&pool.conn, &cfg, &by_profile).unwrap();
    assert_eq!(snapshot.entries.len(), 1);
    assert_eq!(snapshot.entries[0].user_id, ana);
}

#[test]
fn test_scan_limit() {
    let (mut pool, mut cfg) = open_test_db("report_scan_limit");
    let user = seed_user(&mut pool, "Duda", None);
    let project = seed_allocation_project(&mut pool, "Big", user);
    for day in ["2025-03-03", "2025-03-04", "2025-03-05"] {
        record(&mut pool, &cfg, &draft(user, project, day, dec!(1))).unwrap();
    }

    cfg.report_max_rows = 3;
    assert!(LedgerSnapshot::load(&pool.conn, &cfg, &ReportFilter::default()).is_ok());

    cfg.report_max_rows = 2;
    let err = LedgerSnapshot::load(&pool.conn, &cfg, &ReportFilter::default()).unwrap_err();
    assert!(matches!(err, AppError::ScanLimit(2)), "got {err:?}");
    assert!(err.is_client_error());
}

#[test]
fn test_business_days_skip_weekends_and_holidays() {
    let plain = ConfiguredCalendar::default();
    assert_eq!(plain.business_days(date("2025-03-01"), date("2025-03-31")), 21);
    assert_eq!(plain.business_days(date("2025-03-31"), date("2025-03-01")), 0);

    let carnival = ConfiguredCalendar::new([date("2025-03-03"), date("2025-03-04")]);
    assert!(!carnival.is_business_day(date("2025-03-03")));
    assert_eq!(carnival.business_days(date("2025-03-01"), date("2025-03-31")), 19);
}

#[test]
fn test_capacity_allocated_realized_and_utilization() {
    let (mut pool, cfg) = open_test_db("report_capacity");
    let dev = seed_profile(&mut pool, "Dev", dec!(50));
    let ana = seed_user(&mut pool, "Ana", Some(dev));
    let idle = seed_user(&mut pool, "Idle", None);
    let gone = seed_user(&mut pool, "Gone", None);
    let p1 = seed_allocation_project(&mut pool, "P1", ana);
    let p2 = seed_allocation_project(&mut pool, "P2", ana);
    let p3 = seed_allocation_project(&mut pool, "P3", idle);

    CatalogLogic::add_allocation(&mut pool, &ctx(), ana, p1, None, "2025-01-01").unwrap();
    // starts on Monday the 24th: 6 business days left in March
    CatalogLogic::add_allocation(&mut pool, &ctx(), ana, p2, None, "2025-03-24").unwrap();
    CatalogLogic::set_state(&mut pool, &ctx(), CatalogTable::Users, gone, ActivityState::Inactive)
        .unwrap();

    record(&mut pool, &cfg, &draft(ana, p1, "2025-03-03", dec!(8))).unwrap();
    record(&mut pool, &cfg, &draft(ana, p1, "2025-03-04", dec!(8))).unwrap();
    record(&mut pool, &cfg, &draft(ana, p3, "2025-03-05", dec!(4))).unwrap();

    let snapshot = LedgerSnapshot::load(&pool.conn, &cfg, &range("2025-03-01", "2025-03-31")).unwrap();
    let report = capacity::build(
        &snapshot,
        &ConfiguredCalendar::default(),
        dec!(4.33),
        date("2026-10-16"),
    );
    assert_eq!(report.reference_month, "2025-03");

    let names: Vec<_> = report.rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Ana", "Idle"]);

    let row = &report.rows[0];
    assert_eq!(row.capacity, dec!(173.20));
    // 8 h/day × (21 + 6) business days
    assert_eq!(row.allocated, dec!(216));
    assert_eq!(row.realized, dec!(20));
    assert_eq!(row.difference, dec!(-42.80));
    assert_eq!(row.utilization_pct, dec!(11.55));

    let shares: Vec<_> = row.distribution.iter().map(|d| (d.project_id, d.hours)).collect();
    assert_eq!(shares, vec![(p1, dec!(16)), (p2, dec!(0))]);

    let idle_row = &report.rows[1];
    assert_eq!(idle_row.allocated, dec!(0));
    assert_eq!(idle_row.utilization_pct, dec!(0));

    // project filter keeps only users allocated to it
    let filter = ReportFilter::parse(Some("2025-03-01"), None, Some(p2), None, None, None).unwrap();
    let snapshot = LedgerSnapshot::load(&pool.conn, &cfg, &filter).unwrap();
    let report = capacity::build(&snapshot, &ConfiguredCalendar::default(), dec!(4.33), date("2026-10-16"));
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].user_id, ana);
}

#[test]
fn test_capacity_reference_month_falls_back_to_today() {
    let (mut pool, cfg) = open_test_db("report_capacity_today");
    seed_user(&mut pool, "Eva", None);

    let snapshot = LedgerSnapshot::load(&pool.conn, &cfg, &ReportFilter::default()).unwrap();
    assert_eq!(capacity::reference_month(&snapshot, date("2026-10-16")).to_string(), "2026-10");

    let to_only = ReportFilter::parse(None, Some("2025-07-10"), None, None, None, None).unwrap();
    let snapshot = LedgerSnapshot::load(&pool.conn, &cfg, &to_only).unwrap();
    assert_eq!(capacity::reference_month(&snapshot, date("2026-10-16")).to_string(), "2025-07");
}
