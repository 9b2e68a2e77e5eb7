use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn defaults_when_nothing_set() {
    let cfg = AppConfig::from_lookup(lookup_from(&[]));
    assert_eq!(cfg.poll.max_attempts, 30);
    assert_eq!(cfg.poll.initial_delay, Duration::from_secs(15));
    assert!(matches!(cfg.poll.interval, Interval::Tiered));
    assert_eq!(cfg.api.base_url, DEFAULT_API_URL);
    assert_eq!(
        cfg.api.timeouts,
        ApiTimeouts { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    );
    assert_eq!(cfg.state_file, PathBuf::from(DEFAULT_STATE_FILE));
}

#[test]
fn parses_overrides() {
    let cfg = AppConfig::from_lookup(lookup_from(&[
        ("POLL_MAX_ATTEMPTS", "5"),
        ("POLL_INITIAL_DELAY_MS", "250"),
        ("POLL_FIXED_INTERVAL_MS", "1000"),
        ("DRONEMAP_API_URL", "https://d2s.example.test/"),
        ("DRONEMAP_REQUEST_TIMEOUT_SECS", "42"),
        ("DRONEMAP_CONNECT_TIMEOUT_SECS", "7"),
        ("DRONEMAP_STATE_FILE", "/tmp/dronemap.json"),
    ]));
    assert_eq!(cfg.poll.max_attempts, 5);
    assert_eq!(cfg.poll.initial_delay, Duration::from_millis(250));
    assert_eq!(cfg.poll.interval.delay(1), Duration::from_secs(1));
    assert_eq!(cfg.poll.interval.delay(20), Duration::from_secs(1));
    assert_eq!(cfg.api.base_url, "https://d2s.example.test");
    assert_eq!(cfg.api.timeouts, ApiTimeouts { request_secs: 42, connect_secs: 7 });
    assert_eq!(cfg.state_file, PathBuf::from("/tmp/dronemap.json"));
}

#[test]
fn invalid_numbers_fall_back_to_defaults() {
    let cfg = AppConfig::from_lookup(lookup_from(&[
        ("POLL_MAX_ATTEMPTS", "lots"),
        ("POLL_INITIAL_DELAY_MS", "-1"),
        ("DRONEMAP_REQUEST_TIMEOUT_SECS", ""),
    ]));
    assert_eq!(cfg.poll.max_attempts, 30);
    assert_eq!(cfg.poll.initial_delay, Duration::from_secs(15));
    assert_eq!(cfg.api.timeouts.request_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
}

#[test]
fn zero_max_attempts_clamped() {
    let cfg = AppConfig::from_lookup(lookup_from(&[("POLL_MAX_ATTEMPTS", "0")]));
    assert_eq!(cfg.poll.max_attempts, 1);
}

#[test]
fn surrounding_whitespace_is_ignored() {
    let cfg = AppConfig::from_lookup(lookup_from(&[("POLL_MAX_ATTEMPTS", " 12 ")]));
    assert_eq!(cfg.poll.max_attempts, 12);
}

#[test]
fn api_config_new_trims_trailing_slashes() {
    assert_eq!(ApiConfig::new("http://host:8000//").base_url, "http://host:8000");
}
