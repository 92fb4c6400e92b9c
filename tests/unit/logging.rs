//! Unit tests for logging setup

use confluence::logging::is_production;

#[test]
fn only_production_names_select_json_output() {
    assert!(is_production("production"));
    assert!(is_production("prod"));
    assert!(!is_production("sandbox"));
    assert!(!is_production("staging"));
}
