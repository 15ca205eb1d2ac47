use rtimebill::core::billing::{BillingStrategies, ModelDetail};
use rtimebill::core::catalog::CatalogLogic;
use rtimebill::core::reports::{LedgerSnapshot, profitability, project_month};
use rtimebill::errors::AppError;
use rtimebill::models::project::{BillingModel, FeeType, InstallmentType};
use rtimebill::models::report_filter::ReportFilter;
use rtimebill::models::timesheet::{CollaboratorClass, EntryMode, ProjectClass};
use rust_decimal_macros::dec;

mod common;
use common::{
    ctx, draft, open_test_db, prices, record, seed_allocation_project, seed_fixed_project,
    seed_profile, seed_user,
};

fn month_filter(from: &str, to: &str) -> ReportFilter {
    ReportFilter::parse(Some(from), Some(to), None, None, None, None).unwrap()
}

#[test]
fn test_allocation_threshold_marks_project_extra() {
    let (mut pool, cfg) = open_test_db("billing_alloc_threshold");
    let profile = seed_profile(&mut pool, "Dev", dec!(50));
    let user = seed_user(&mut pool, "Ana", Some(profile));
    let project = seed_allocation_project(&mut pool, "Alloc", user);
    CatalogLogic::add_contract(&mut pool, &ctx(), project, "2025-03", profile, dec!(10), prices(100, 120, 150, 200))
        .unwrap();

    let first = record(&mut pool, &cfg, &draft(user, project, "2025-03-03", dec!(8))).unwrap();
    assert_eq!(first.project_class, ProjectClass::Normal);

    let second = record(&mut pool, &cfg, &draft(user, project, "2025-03-04", dec!(4))).unwrap();
    assert_eq!(second.project_class, ProjectClass::Extra);

    // the budget is per competence month
    let april = record(&mut pool, &cfg, &draft(user, project, "2025-04-01", dec!(4))).unwrap();
    assert_eq!(april.project_class, ProjectClass::Normal);
}

#[test]
fn test_zero_threshold_never_gives_extra() {
    let (mut pool, cfg) = open_test_db("billing_zero_threshold");
    let user = seed_user(&mut pool, "Bia", None);
    let project = seed_fixed_project(&mut pool, "No estimate", user, FeeType::Fixed, None);

    for day in ["2025-03-03", "2025-03-04", "2025-03-05"] {
        let e = record(&mut pool, &cfg, &draft(user, project, day, dec!(12))).unwrap();
        assert_eq!(e.project_class, ProjectClass::Normal);
    }
}

#[test]
fn test_fixed_scope_threshold_is_all_time() {
    let (mut pool, cfg) = open_test_db("billing_fixed_threshold");
    let profile = seed_profile(&mut pool, "Dev", dec!(40));
    let user = seed_user(&mut pool, "Caio", Some(profile));
    let project = seed_fixed_project(&mut pool, "Scope", user, FeeType::Fixed, Some(dec!(5000)));
    CatalogLogic::add_estimate(&mut pool, &ctx(), project, profile, dec!(10), dec!(90)).unwrap();

    let jan = record(&mut pool, &cfg, &draft(user, project, "2025-01-10", dec!(8))).unwrap();
    assert_eq!(jan.project_class, ProjectClass::Normal);
    let feb = record(&mut pool, &cfg, &draft(user, project, "2025-02-10", dec!(3))).unwrap();
    assert_eq!(feb.project_class, ProjectClass::Extra);
}

#[test]
fn test_allocation_tiers_partition_hours() {
    let (mut pool, cfg) = open_test_db("billing_alloc_tiers");
    let dev = seed_profile(&mut pool, "Dev", dec!(50));
    let qa = seed_profile(&mut pool, "QA", dec!(30));
    let ana = seed_user(&mut pool, "Ana", Some(dev));
    let bruno = seed_user(&mut pool, "Bruno", Some(qa));
    let project = seed_allocation_project(&mut pool, "Tiers", ana);
    CatalogLogic::add_contract(&mut pool, &ctx(), project, "2025-03", dev, dec!(10), prices(100, 120, 150, 200))
        .unwrap();

    record(&mut pool, &cfg, &draft(ana, project, "2025-03-03", dec!(8))).unwrap();

    let mut extra = draft(ana, project, "2025-03-04", dec!(4));
    extra.collaborator_class = Some(CollaboratorClass::Extra);
    record(&mut pool, &cfg, &extra).unwrap();

    let mut night = draft(ana, project, "2025-03-05", dec!(3));
    night.off_hours = true;
    record(&mut pool, &cfg, &night).unwrap();

    record(&mut pool, &cfg, &draft(ana, project, "2025-03-06", dec!(3))).unwrap();

    // QA has no contract row this month
    record(&mut pool, &cfg, &draft(bruno, project, "2025-03-06", dec!(2))).unwrap();

    let snapshot = LedgerSnapshot::load(&pool.conn, &cfg, &month_filter("2025-03-01", "2025-03-31")).unwrap();
    let report = project_month::build(&snapshot, &BillingStrategies::default());
    assert_eq!(report.rows.len(), 1);

    let row = &report.rows[0];
    assert_eq!(row.billing_model, BillingModel::Allocation);
    assert_eq!(row.total_hours, dec!(20));

    let ModelDetail::Allocation { contracted_hours, tiers } = &row.detail else {
        panic!("expected allocation detail, got {:?}", row.detail);
    };
    assert_eq!(*contracted_hours, dec!(10));
    assert_eq!(tiers.contracted, dec!(10));
    assert_eq!(tiers.overtime, dec!(4));
    assert_eq!(tiers.additional, dec!(3));
    assert_eq!(tiers.unpriced, dec!(2));
    assert_eq!(tiers.off_hours, dec!(3));
    assert_eq!(tiers.total(), row.total_hours);

    // 10×100 + 4×200 + 1×120 + 3×150 (+ 2×0 unpriced)
    assert_eq!(row.revenue, dec!(2370));
    // 18×50 + 2×30
    assert_eq!(row.cost, dec!(960));
    assert_eq!(row.margin, dec!(1410));
}

#[test]
fn test_fixed_scope_cumulative_and_balance() {
    let (mut pool, cfg) = open_test_db("billing_fixed_balance");
    let profile = seed_profile(&mut pool, "Dev", dec!(40));
    let user = seed_user(&mut pool, "Duda", Some(profile));
    let project = seed_fixed_project(&mut pool, "Portal", user, FeeType::Fixed, Some(dec!(45000)));
    CatalogLogic::add_estimate(&mut pool, &ctx(), project, profile, dec!(450), dec!(100)).unwrap();

    // 60 h in March, 40 h in April
    for day in 3..=7 {
        record(&mut pool, &cfg, &draft(user, project, &format!("2025-03-{day:02}"), dec!(12))).unwrap();
    }
    for day in 1..=4 {
        record(&mut pool, &cfg, &draft(user, project, &format!("2025-04-{day:02}"), dec!(10))).unwrap();
    }

    let whole = month_filter("2025-03-01", "2025-04-30");
    let snapshot = LedgerSnapshot::load(&pool.conn, &cfg, &whole).unwrap();
    let report = profitability::build(&snapshot, &BillingStrategies::default());
    assert_eq!(report.rows.len(), 1);
    let row = &report.rows[0];
    assert_eq!(row.hours, dec!(100));
    assert_eq!(
        row.detail,
        ModelDetail::FixedScope {
            estimated_hours: dec!(450),
            cumulative_hours: dec!(100),
            balance_hours: dec!(350),
        }
    );

    // cumulative grows month over month and counts history before the range
    let snapshot = LedgerSnapshot::load(&pool.conn, &cfg, &whole).unwrap();
    let months = project_month::build(&snapshot, &BillingStrategies::default());
    let cumulative: Vec<_> = months
        .rows
        .iter()
        .map(|r| match r.detail {
            ModelDetail::FixedScope { cumulative_hours, .. } => cumulative_hours,
            _ => panic!("expected fixed-scope detail"),
        })
        .collect();
    assert_eq!(cumulative, vec![dec!(60), dec!(100)]);

    let april_only = month_filter("2025-04-01", "2025-04-30");
    let snapshot = LedgerSnapshot::load(&pool.conn, &cfg, &april_only).unwrap();
    let report = profitability::build(&snapshot, &BillingStrategies::default());
    assert_eq!(report.rows[0].hours, dec!(40));
    assert!(matches!(
        report.rows[0].detail,
        ModelDetail::FixedScope { cumulative_hours, .. } if cumulative_hours == dec!(100)
    ));
}

#[test]
fn test_fixed_fee_is_earned_on_first_activity_without_installments() {
    let (mut pool, cfg) = open_test_db("billing_fixed_first_activity");
    let user = seed_user(&mut pool, "Edu", None);
    let project = seed_fixed_project(&mut pool, "Fee", user, FeeType::Fixed, Some(dec!(9000)));

    record(&mut pool, &cfg, &draft(user, project, "2025-03-10", dec!(5))).unwrap();
    record(&mut pool, &cfg, &draft(user, project, "2025-04-10", dec!(5))).unwrap();

    let snapshot = LedgerSnapshot::load(&pool.conn, &cfg, &ReportFilter::default()).unwrap();
    let report = project_month::build(&snapshot, &BillingStrategies::default());
    let revenue: Vec<_> = report.rows.iter().map(|r| (r.competence.clone(), r.revenue)).collect();
    assert_eq!(
        revenue,
        vec![("2025-03".to_string(), dec!(9000)), ("2025-04".to_string(), dec!(0))]
    );
}

#[test]
fn test_fixed_fee_installments_follow_due_dates() {
    let (mut pool, cfg) = open_test_db("billing_fixed_installments");
    let user = seed_user(&mut pool, "Fabi", None);
    let project = seed_fixed_project(&mut pool, "Milestones", user, FeeType::Fixed, Some(dec!(10000)));
    CatalogLogic::add_installment(&mut pool, &ctx(), project, InstallmentType::Milestone, Some("kickoff"), "2025-03-15", dec!(4000))
        .unwrap();
    CatalogLogic::add_installment(&mut pool, &ctx(), project, InstallmentType::Other, None, "2025-05-15", dec!(6000))
        .unwrap();

    record(&mut pool, &cfg, &draft(user, project, "2025-03-03", dec!(4))).unwrap();
    record(&mut pool, &cfg, &draft(user, project, "2025-05-05", dec!(4))).unwrap();

    let snapshot = LedgerSnapshot::load(&pool.conn, &cfg, &ReportFilter::default()).unwrap();
    let report = project_month::build(&snapshot, &BillingStrategies::default());
    let revenue: Vec<_> = report.rows.iter().map(|r| r.revenue).collect();
    assert_eq!(revenue, vec![dec!(4000), dec!(6000)]);

    let snapshot = LedgerSnapshot::load(&pool.conn, &cfg, &month_filter("2025-03-01", "2025-05-31")).unwrap();
    let report = profitability::build(&snapshot, &BillingStrategies::default());
    assert_eq!(report.rows[0].revenue, dec!(10000));
    // entries carry no cost snapshot: the whole revenue is margin
    assert_eq!(report.rows[0].margin_pct, Some(dec!(100)));
}

#[test]
fn test_installment_due_without_hours_is_still_billed() {
    let (mut pool, cfg) = open_test_db("billing_fixed_installment_no_hours");
    let user = seed_user(&mut pool, "Iara", None);
    let other = seed_user(&mut pool, "Joel", None);
    let project = seed_fixed_project(&mut pool, "Quiet month", user, FeeType::Fixed, Some(dec!(10000)));
    CatalogLogic::add_installment(&mut pool, &ctx(), project, InstallmentType::Milestone, None, "2025-03-15", dec!(4000))
        .unwrap();
    CatalogLogic::add_installment(&mut pool, &ctx(), project, InstallmentType::Other, None, "2025-05-15", dec!(6000))
        .unwrap();

    record(&mut pool, &cfg, &draft(user, project, "2025-03-03", dec!(4))).unwrap();

    let snapshot = LedgerSnapshot::load(&pool.conn, &cfg, &ReportFilter::default()).unwrap();
    let report = project_month::build(&snapshot, &BillingStrategies::default());
    let months: Vec<_> = report
        .rows
        .iter()
        .map(|r| (r.competence.as_str(), r.total_hours, r.revenue))
        .collect();
    assert_eq!(
        months,
        vec![("2025-03", dec!(4), dec!(4000)), ("2025-05", dec!(0), dec!(6000))]
    );
    match &report.rows[1].detail {
        ModelDetail::FixedScope { cumulative_hours, .. } => assert_eq!(*cumulative_hours, dec!(4)),
        other => panic!("unexpected detail {other:?}"),
    }

    // no entries at all in May: the project still shows up with its installment
    let may = month_filter("2025-05-01", "2025-05-31");
    let snapshot = LedgerSnapshot::load(&pool.conn, &cfg, &may).unwrap();
    let report = profitability::build(&snapshot, &BillingStrategies::default());
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].hours, dec!(0));
    assert_eq!(report.rows[0].revenue, dec!(6000));
    assert_eq!(report.rows[0].margin_pct, Some(dec!(100)));

    // another manager's filter leaves it out
    let filter = ReportFilter::parse(Some("2025-05-01"), Some("2025-05-31"), None, None, None, Some(other)).unwrap();
    let snapshot = LedgerSnapshot::load(&pool.conn, &cfg, &filter).unwrap();
    assert!(profitability::build(&snapshot, &BillingStrategies::default()).rows.is_empty());
}

#[test]
fn test_hourly_fee_uses_estimate_price() {
    let (mut pool, cfg) = open_test_db("billing_fixed_hourly");
    let dev = seed_profile(&mut pool, "Dev", dec!(40));
    let user = seed_user(&mut pool, "Gil", Some(dev));
    let project = seed_fixed_project(&mut pool, "Hourly", user, FeeType::Hourly, None);
    CatalogLogic::add_estimate(&mut pool, &ctx(), project, dev, dec!(100), dec!(85)).unwrap();

    let mut from_clock = draft(user, project, "2025-03-03", dec!(6));
    from_clock.mode = EntryMode::Punch;
    record(&mut pool, &cfg, &from_clock).unwrap();
    record(&mut pool, &cfg, &draft(user, project, "2025-03-04", dec!(4))).unwrap();

    let snapshot = LedgerSnapshot::load(&pool.conn, &cfg, &month_filter("2025-03-01", "2025-03-31")).unwrap();
    let report = profitability::build(&snapshot, &BillingStrategies::default());
    let row = &report.rows[0];
    assert_eq!(row.revenue, dec!(850));
    assert_eq!(row.cost, dec!(400));
    assert_eq!(row.margin, dec!(450));
    assert_eq!(row.margin_pct, Some(dec!(52.94)));
}

#[test]
fn test_model_specific_catalog_rows_are_checked() {
    let (mut pool, _cfg) = open_test_db("billing_catalog_rules");
    let dev = seed_profile(&mut pool, "Dev", dec!(40));
    let user = seed_user(&mut pool, "Hugo", Some(dev));
    let alloc = seed_allocation_project(&mut pool, "Alloc", user);
    let fixed = seed_fixed_project(&mut pool, "Fixed", user, FeeType::Fixed, Some(dec!(100)));

    let err = CatalogLogic::add_estimate(&mut pool, &ctx(), alloc, dev, dec!(10), dec!(10)).unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)), "got {err:?}");

    let err = CatalogLogic::add_contract(&mut pool, &ctx(), fixed, "2025-03", dev, dec!(10), prices(1, 1, 1, 1))
        .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)), "got {err:?}");

    CatalogLogic::add_contract(&mut pool, &ctx(), alloc, "2025-03", dev, dec!(10), prices(1, 1, 1, 1)).unwrap();
    let err = CatalogLogic::add_contract(&mut pool, &ctx(), alloc, "2025-03", dev, dec!(5), prices(1, 1, 1, 1))
        .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)), "got {err:?}");

    let err = CatalogLogic::add_contract(&mut pool, &ctx(), alloc, "2025-13", dev, dec!(5), prices(1, 1, 1, 1))
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "got {err:?}");
}
