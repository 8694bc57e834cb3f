use std::fs;
use std::path::PathBuf;

use chargeview_engine::*;
use pretty_assertions::assert_eq;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("fixtures")
}

fn load_sessions() -> Vec<Session> {
    let path = fixtures_dir().join("sessions.json");
    let json = fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("Failed to read fixture: {:?}", path));
    normalize(&json, &EngineConfig::default()).expect("fixture should normalize")
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn test_fixture_normalizes_every_record() {
    let sessions = load_sessions();
    assert_eq!(sessions.len(), 5);

    let ids: Vec<&str> = sessions.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["1704873600", "1705737600", "1707984000", "1709625600", "1710921600"]
    );

    let first = &sessions[0];
    assert_eq!(first.provider, "IONITY");
    assert!(approx(first.cost, 25.5));
    assert!(approx(first.duration_minutes, 60.0));
    assert!(!first.is_energy_estimated);

    let failed = &sessions[1];
    assert_eq!(failed.location, UNKNOWN_LOCATION);
    assert!(failed.is_energy_estimated);
    assert!(approx(failed.energy_added, 0.46));

    let dc = &sessions[2];
    assert!(dc.is_energy_estimated);
    assert_eq!(dc.charging_type(&EngineConfig::default()), ChargingType::Dc);
    assert!(approx(dc.energy_added, 58.8));
    assert!(approx(dc.efficiency, 0.98));
}

#[test]
fn test_aggregate_stats_over_fixture() {
    let sessions = load_sessions();
    let stats = compute_aggregate_stats(&sessions, &EngineConfig::default());

    assert!(stats.uses_estimated_energy);
    assert!(approx(stats.overall_efficiency, 172.76 / 185.5));
    assert!(approx(stats.power_per_100km, 9.275));
    assert!(approx(stats.power_per_100km_no_losses, 8.638));

    assert_eq!(stats.session_stats.total_sessions, 5);
    assert_eq!(stats.session_stats.successful_sessions, 4);
    assert_eq!(stats.session_stats.failed_sessions, 1);
    assert_eq!(
        stats.session_stats.top_failed_providers,
        vec![ProviderCount {
            provider: "IONITY GmbH".to_string(),
            count: 1
        }]
    );
    let successful: Vec<&str> = stats
        .session_stats
        .top_successful_providers
        .iter()
        .map(|p| p.provider.as_str())
        .collect();
    assert_eq!(successful, vec!["IONITY", "HPC/IONITY", "EnBW", "123"]);

    let soc = &stats.soc_stats;
    assert_eq!(soc.failed_sessions, 1);
    assert!(approx(soc.average_start_soc, 23.75));
    assert!(approx(soc.average_end_soc, 82.5));
    assert!(approx(soc.lowest_start_soc, 10.0));
    assert_eq!(soc.below_80_count, 1);
    assert_eq!(soc.exactly_80_count, 1);
    assert_eq!(soc.above_80_count, 2);
    assert_eq!(soc.above_90_count, 0);
}

#[test]
fn test_battery_health_over_fixture() {
    let sessions = load_sessions();
    let config = EngineConfig::default();
    let points = estimate_battery_health(&sessions, &config);

    let raw = points.iter().filter(|p| !p.is_monthly_average()).count();
    let monthly: Vec<&str> = points
        .iter()
        .filter_map(|p| p.month.as_deref())
        .collect();
    assert_eq!(raw, 4);
    assert_eq!(monthly, vec!["2024-01", "2024-02", "2024-03"]);
    assert!(points.windows(2).all(|w| w[0].date <= w[1].date));

    let trend = fit_capacity_trend(&sessions, &config).expect("three months of data");
    assert_eq!(trend.months, 3);
    assert!(trend.slope_per_day < 0.0);
}

#[test]
fn test_provider_grouping_over_fixture() {
    let sessions = load_sessions();
    let grouping = group_providers(&sessions, &EngineConfig::default());

    let groups: Vec<(&str, usize)> = grouping
        .all_groups
        .iter()
        .map(|g| (g.provider.as_str(), g.total))
        .collect();
    assert_eq!(groups, vec![("IONITY", 3), ("EnBW", 1), ("Unknown", 1)]);

    let ionity = &grouping.all_groups[0];
    assert_eq!(ionity.failed_count, 1);
    assert!(approx(ionity.failure_rate, 100.0 / 3.0));

    assert_eq!(grouping.unknown_providers.len(), 1);
    assert_eq!(grouping.unknown_providers[0].reason, "Only numbers: 123");
    assert_eq!(grouping.top_failed.len(), 1);
    assert_eq!(grouping.top_failed[0].provider, "IONITY");
}

#[test]
fn test_locations_and_fingerprint_over_fixture() {
    let sessions = load_sessions();

    let locations = summarize_locations(&sessions);
    assert_eq!(locations.len(), 2);
    assert_eq!(locations[0].session_count, 2);
    assert_eq!(locations[0].provider, "HPC/IONITY");
    assert_eq!(locations[1].name, "Alexanderplatz, Berlin");

    let again = load_sessions();
    assert_eq!(content_fingerprint(&sessions), content_fingerprint(&again));

    let fleet = Fleet::from_sessions(sessions);
    let march = fleet.in_date_range(
        parse_date("2024-03-01").unwrap(),
        parse_date("2024-03-31").unwrap(),
    );
    assert_eq!(march.len(), 2);
    assert_eq!(fleet.fingerprint(), content_fingerprint(&again));
}

#[test]
fn test_malformed_fixture_variants_fail() {
    let config = EngineConfig::default();
    assert!(matches!(
        normalize(r#"{"sessions": []}"#, &config),
        Err(ParseError::NotAnArray(_))
    ));
    assert!(matches!(
        normalize(r#"[{"startTime": 1}]"#, &config),
        Err(ParseError::Json(_))
    ));
    assert!(normalize("[]", &config).unwrap().is_empty());
}
