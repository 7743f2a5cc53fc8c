//! End-to-end validation of realistic configuration trees

use keystone_validation::{ConfigSection, Mapping, Rules, ValidationResult, Validator, Value, ValueType};

fn parse(yaml: &str) -> Mapping {
    serde_yaml::from_str(yaml).expect("test yaml must parse")
}

fn server_validator() -> Validator {
    Validator::new()
        .add_rule(Rules::value_type("server.name", ValueType::String))
        .add_rule(Rules::range("server.port", 1024, 65535))
        .add_rule(Rules::pattern("server.name", "[a-z][a-z0-9-]*").unwrap())
        .add_rule(Rules::enum_value(
            "server.difficulty",
            false,
            ["peaceful", "easy", "normal", "hard"],
        ))
        .add_rule(Rules::list("server.admins", Some(1), Some(5), Some(ValueType::String)))
        .add_rule(Rules::dependency("server.whitelist", "server.online", true))
}

#[test]
fn test_valid_configuration_passes() {
    let config = parse(
        r#"
server:
  name: lobby-1
  port: 25565
  difficulty: Normal
  admins: [alice, bob]
  online: true
  whitelist: [carol]
"#,
    );

    let result = server_validator().validate(&config);

    assert!(!result.has_errors(), "unexpected errors: {:?}", result.errors());
}

#[test]
fn test_every_violation_is_reported_with_its_path() {
    let config = parse(
        r#"
server:
  name: Lobby_1
  port: 80
  difficulty: brutal
  admins: []
  online: false
  whitelist: [carol]
"#,
    );

    let result = server_validator().validate(&config);

    assert_eq!(
        result.errors(),
        [
            "Error at 'server.port': Value must be between 1024 and 65535",
            "Error at 'server.name': Value must match pattern: [a-z][a-z0-9-]*",
            "Error at 'server.difficulty': Value must be one of: peaceful, easy, normal, hard",
            "Error at 'server.admins': List must have at least 1 elements",
            "Error at 'server.whitelist': Requires server.online to be true",
        ]
    );
}

#[test]
fn test_required_rule_is_evaluated_at_every_section() {
    let config = parse("server:\n  name: lobby\n  port: 25565\n");
    let validator = Validator::new().add_rule(Rules::required(["server.name"]));

    let result = validator.validate(&config);

    // The root has it, the nested `server` section does not have `server.name`
    assert_eq!(
        result.errors(),
        ["Error at 'server.server.name': Required field is missing"]
    );
}

#[test]
fn test_missing_optional_fields_are_silent() {
    let config = parse("server:\n  name: lobby\n  port: 25565\n");

    let result = server_validator().validate(&config);

    assert!(result.is_empty());
}

#[test]
fn test_required_rule_reports_each_missing_path() {
    let config = parse("motd: hello\n");
    let validator = Validator::new().add_rule(Rules::required(["server.name", "server.port", "motd"]));

    let result = validator.validate(&config);

    assert_eq!(
        result.errors(),
        [
            "Error at 'server.name': Required field is missing",
            "Error at 'server.port': Required field is missing",
        ]
    );
}

#[test]
fn test_custom_rules_and_closures_share_one_result() {
    let config = parse("world:\n  seed: 0\n  spawn:\n    radius: 16\n");

    let validator = Validator::new()
        .add_rule(Rules::custom(
            "world.seed",
            |value: &Value| value.as_i64() != Some(0),
            "Seed must not be zero",
        ))
        .add_rule(|section: &dyn ConfigSection, path: &str| {
            let mut result = ValidationResult::new();
            if section.contains("radius") {
                result.add_suggestion(path, "Spawn radius is deprecated");
            }
            result
        });

    let result = validator.validate(&config);

    assert_eq!(result.errors(), ["Error at 'world.seed': Seed must not be zero"]);
    assert_eq!(
        result.suggestions(),
        ["Suggestion for 'world.spawn': Spawn radius is deprecated"]
    );
}

#[test]
fn test_type_mismatch_names_both_types() {
    let config = parse("limits:\n  players: \"twenty\"\n");
    let validator = Validator::new().add_rule(Rules::value_type("limits.players", ValueType::Integer));

    let result = validator.validate(&config);

    assert_eq!(
        result.errors(),
        ["Error at 'limits.players': Expected type Integer but got String"]
    );
}

#[test]
fn test_invalid_pattern_is_rejected_at_construction() {
    let err = Rules::pattern("server.name", "[unclosed").unwrap_err();
    assert!(err.to_string().starts_with("Invalid pattern '[unclosed' for server.name"));
}

#[test]
fn test_validator_is_reusable_across_threads() {
    let validator = std::sync::Arc::new(server_validator());
    let handles: Vec<_> = (0..4)
        .map(|port| {
            let validator = std::sync::Arc::clone(&validator);
            std::thread::spawn(move || {
                let config = parse(&format!("server:\n  name: lobby\n  port: {}\n", port));
                validator.validate(&config).errors().len()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 1);
    }
}
