//! Statement loading integration tests.

use cypher_mend::statements::{load, load_all, StatementSource};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_script_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("seed.cypher");
    fs::write(
        &path,
        "// people\nCREATE (a:Person {name: 'Ann'});\nCREATE (b:Person {name: 'Bob; Jr.'});\n\nMATCH (a:Person), (b:Person) CREATE (a)-[:KNOWS]->(b);\n",
    )
    .unwrap();

    let statements = load(&StatementSource::File(path)).unwrap();

    assert_eq!(
        statements,
        vec![
            "CREATE (a:Person {name: 'Ann'})",
            "CREATE (b:Person {name: 'Bob; Jr.'})",
            "MATCH (a:Person), (b:Person) CREATE (a)-[:KNOWS]->(b)",
        ]
    );
}

#[test]
fn test_load_json_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("statements.JSON");
    fs::write(&path, r#"["CREATE (u:User {id:1})", "", "BAD SYNTAX {"]"#).unwrap();

    let statements = load(&StatementSource::File(path)).unwrap();

    assert_eq!(statements, vec!["CREATE (u:User {id:1})", "", "BAD SYNTAX {"]);
}

#[test]
fn test_invalid_json_file_names_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, r#"{"statements": []}"#).unwrap();

    let err = load(&StatementSource::File(path)).unwrap_err();

    assert!(err.to_string().contains("broken.json"));
}

#[test]
fn test_load_all_keeps_source_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("first.cypher");
    fs::write(&path, "RETURN 1; RETURN 2;").unwrap();

    let statements = load_all(&[
        StatementSource::File(path),
        StatementSource::Inline(vec!["RETURN 3".to_string()]),
    ])
    .unwrap();

    assert_eq!(statements, vec!["RETURN 1", "RETURN 2", "RETURN 3"]);
}

#[test]
fn test_empty_script_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.cypher");
    fs::write(&path, "\n// nothing to do\n").unwrap();

    assert!(load(&StatementSource::File(path)).unwrap().is_empty());
}
