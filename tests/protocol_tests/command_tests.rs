//! Command Tests
//!
//! Validation of wire requests against the supported command set.

use serde_json::{json, Value};
use slatekv::protocol::{Command, CommandType, Request};
use slatekv::SlateError;

fn scoped(method: &str, arguments: Vec<Value>) -> Request {
    Request::new(method, arguments).with_collection("users")
}

// =============================================================================
// Accepted Requests
// =============================================================================

#[test]
fn test_collection_commands() {
    assert_eq!(
        Command::try_from(scoped("get", vec![json!("alice")])).unwrap(),
        Command::Get {
            collection: "users".to_string(),
            key: "alice".to_string(),
        }
    );
    assert_eq!(
        Command::try_from(scoped("set", vec![json!("alice"), json!({ "age": 30 })])).unwrap(),
        Command::Set {
            collection: "users".to_string(),
            key: "alice".to_string(),
            value: json!({ "age": 30 }),
        }
    );
    assert_eq!(
        Command::try_from(scoped("all", vec![])).unwrap(),
        Command::All {
            collection: "users".to_string(),
        }
    );
    assert_eq!(
        Command::try_from(scoped("drop", vec![])).unwrap(),
        Command::Drop {
            collection: "users".to_string(),
        }
    );
}

#[test]
fn test_numeric_key_accepted() {
    let command = Command::try_from(scoped("get", vec![json!(42)])).unwrap();
    assert_eq!(
        command,
        Command::Get {
            collection: "users".to_string(),
            key: "42".to_string(),
        }
    );
}

#[test]
fn test_count_arguments() {
    assert_eq!(
        Command::try_from(scoped("count", vec![])).unwrap(),
        Command::Count {
            collection: "users".to_string(),
            pattern: None,
            exact: false,
        }
    );
    assert_eq!(
        Command::try_from(scoped("count", vec![json!("^a"), json!(true)])).unwrap(),
        Command::Count {
            collection: "users".to_string(),
            pattern: Some("^a".to_string()),
            exact: true,
        }
    );
}

#[test]
fn test_database_commands() {
    assert_eq!(
        Command::try_from(Request::new("all", vec![])).unwrap(),
        Command::ListCollections
    );
    assert_eq!(
        Command::try_from(Request::new("drop", vec![json!("users")])).unwrap(),
        Command::DropCollection {
            name: "users".to_string(),
        }
    );
    assert_eq!(
        Command::try_from(Request::new("dropAll", vec![])).unwrap(),
        Command::DropAll
    );
    assert_eq!(
        Command::try_from(Request::new("ping", vec![])).unwrap(),
        Command::Ping
    );
}

#[test]
fn test_into_request_round_trip() {
    let commands = vec![
        Command::Remove {
            collection: "users".to_string(),
            key: "bob".to_string(),
        },
        Command::Query {
            collection: "users".to_string(),
            pattern: "^b".to_string(),
        },
        Command::Count {
            collection: "users".to_string(),
            pattern: Some("x".to_string()),
            exact: true,
        },
        Command::Truncate {
            collection: "users".to_string(),
        },
        Command::Info {
            collection: "users".to_string(),
        },
        Command::ListCollections,
        Command::DropCollection {
            name: "old".to_string(),
        },
        Command::DropAll,
    ];

    for command in commands {
        let request = command.clone().into_request();
        assert_eq!(request.method, command.method());
        assert_eq!(request.collection.as_deref(), command.collection());
        assert_eq!(Command::try_from(request).unwrap(), command);
    }
}

#[test]
fn test_method_names() {
    assert_eq!(CommandType::from_method("dropAll"), Some(CommandType::DropAll));
    assert_eq!(CommandType::from_method("dropall"), None);
    assert_eq!(CommandType::Remove.method(), "remove");
    assert_eq!(Command::ListCollections.command_type(), CommandType::All);
}

// =============================================================================
// Rejected Requests
// =============================================================================

#[test]
fn test_unknown_method() {
    match Command::try_from(scoped("explode", vec![])) {
        Err(SlateError::UnknownMethod(method)) => assert_eq!(method, "explode"),
        other => panic!("Expected UnknownMethod, got {:?}", other),
    }
}

#[test]
fn test_missing_collection() {
    assert!(matches!(
        Command::try_from(Request::new("get", vec![json!("k")])),
        Err(SlateError::Protocol(_))
    ));
}

#[test]
fn test_drop_all_with_collection() {
    assert!(matches!(
        Command::try_from(scoped("dropAll", vec![])),
        Err(SlateError::Protocol(_))
    ));
}

#[test]
fn test_wrong_arity() {
    assert!(matches!(
        Command::try_from(scoped("get", vec![])),
        Err(SlateError::Protocol(_))
    ));
    assert!(matches!(
        Command::try_from(scoped("set", vec![json!("k")])),
        Err(SlateError::Protocol(_))
    ));
    assert!(matches!(
        Command::try_from(scoped("info", vec![json!(1)])),
        Err(SlateError::Protocol(_))
    ));
}

#[test]
fn test_wrong_argument_types() {
    assert!(matches!(
        Command::try_from(scoped("get", vec![json!({ "not": "a key" })])),
        Err(SlateError::Protocol(_))
    ));
    assert!(matches!(
        Command::try_from(scoped("query", vec![json!(5)])),
        Err(SlateError::Protocol(_))
    ));
    assert!(matches!(
        Command::try_from(scoped("count", vec![json!("a"), json!("yes")])),
        Err(SlateError::Protocol(_))
    ));
}
