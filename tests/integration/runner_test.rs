//! Repair runner integration tests.
//!
//! Drives the runner through the public API with the mock executor and an
//! LLM oracle backed by the mock LLM client.

use cypher_mend::error::MendError;
use cypher_mend::graph::MockExecutor;
use cypher_mend::llm::MockLlmClient;
use cypher_mend::repair::{
    GiveUpPolicy, LlmRepairOracle, RecordingObserver, RepairEvent, RunnerConfig,
    StatementOutcome, StatementRepairRunner,
};
use pretty_assertions::assert_eq;

fn statements(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn oracle_with(pattern: &str, reply: &str) -> LlmRepairOracle {
    LlmRepairOracle::new(Box::new(MockLlmClient::new().with_response(pattern, reply)))
}

#[tokio::test]
async fn test_example_scenario() {
    let executor = MockExecutor::permissive().with_failure("BAD SYNTAX", "SyntaxError: ...");
    let oracle = oracle_with("BAD SYNTAX", "CREATE (x:Fixed)");
    let runner = StatementRepairRunner::new(&executor, &oracle, RunnerConfig::default());

    let report = runner
        .run(&statements(&["CREATE (u:User {id:1})", "", "BAD SYNTAX {"]))
        .await
        .unwrap();

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.results[0].outcome, StatementOutcome::Executed);
    assert_eq!(report.results[0].attempts, 1);
    assert_eq!(report.results[1].outcome, StatementOutcome::Executed);
    assert_eq!(report.results[1].attempts, 2);
    assert_eq!(report.results[1].final_statement, "CREATE (x:Fixed)");
    assert!(report.all_executed());
}

#[tokio::test]
async fn test_first_time_success_needs_no_repair() {
    let executor = MockExecutor::new();
    let client = MockLlmClient::new();
    let oracle = LlmRepairOracle::new(Box::new(client));
    let observer = RecordingObserver::new();
    let runner = StatementRepairRunner::new(&executor, &oracle, RunnerConfig::default())
        .with_observer(&observer);

    let report = runner
        .run(&statements(&["CREATE (a:Person {name: 'Ann'})", "MATCH (n) RETURN count(n)"]))
        .await
        .unwrap();

    assert!(report.results.iter().all(|r| r.attempts == 1 && r.repairs == 0));
    assert!(!observer
        .events()
        .iter()
        .any(|e| matches!(e, RepairEvent::Repairing { .. })));
}

#[tokio::test]
async fn test_always_failing_statement_is_bounded() {
    let executor = MockExecutor::permissive().with_failure("", "Neo.ClientError.Statement.SyntaxError");
    let client = MockLlmClient::new().with_response("", "MATCH (still broken");
    let oracle = LlmRepairOracle::new(Box::new(client));
    let config = RunnerConfig {
        max_repair_attempts: 4,
        ..RunnerConfig::default()
    };
    let runner = StatementRepairRunner::new(&executor, &oracle, config);

    let report = runner.run(&statements(&["MATCH (broken"])).await.unwrap();

    assert_eq!(report.results[0].outcome, StatementOutcome::GaveUp);
    assert_eq!(report.results[0].repairs, 4);
    assert_eq!(executor.executed().len(), 5);
}

#[tokio::test]
async fn test_replacement_is_executed_next() {
    let executor = MockExecutor::new();
    let oracle = oracle_with("RETURN (", "   MATCH (n) RETURN n   ");
    let runner = StatementRepairRunner::new(&executor, &oracle, RunnerConfig::default());

    runner.run(&statements(&["RETURN ("])).await.unwrap();

    assert_eq!(
        executor.executed(),
        statements(&["RETURN (", "MATCH (n) RETURN n"])
    );
}

#[tokio::test]
async fn test_default_mock_llm_repairs_unclosed_brace() {
    let executor = MockExecutor::new();
    let oracle = LlmRepairOracle::new(Box::new(MockLlmClient::new()));
    let runner = StatementRepairRunner::new(&executor, &oracle, RunnerConfig::default());

    let report = runner
        .run(&statements(&["CREATE (u:User {id: 1"]))
        .await
        .unwrap();

    assert_eq!(report.results[0].outcome, StatementOutcome::Executed);
    assert_eq!(report.results[0].attempts, 2);
    assert_eq!(report.results[0].final_statement, "CREATE (u:User {id: 1})");
}

#[tokio::test]
async fn test_blank_statements_are_never_executed() {
    let executor = MockExecutor::new();
    let oracle = LlmRepairOracle::new(Box::new(MockLlmClient::new()));
    let runner = StatementRepairRunner::new(&executor, &oracle, RunnerConfig::default());

    let report = runner
        .run(&statements(&["  ", "RETURN 1", "\t\n", "RETURN 2", ""]))
        .await
        .unwrap();

    assert_eq!(executor.executed(), statements(&["RETURN 1", "RETURN 2"]));
    assert_eq!(
        report.results.iter().map(|r| r.index).collect::<Vec<_>>(),
        vec![1, 3]
    );
}

#[tokio::test]
async fn test_oracle_failure_stops_later_statements() {
    let executor = MockExecutor::new();
    let oracle = LlmRepairOracle::new(Box::new(MockLlmClient::failing(
        "Invalid API key. Check your OPENAI_API_KEY.",
    )));
    let runner = StatementRepairRunner::new(&executor, &oracle, RunnerConfig::default());

    let err = runner
        .run(&statements(&["RETURN 1", "RETURN (", "RETURN 3"]))
        .await
        .unwrap_err();

    assert!(matches!(err.cause(), MendError::OracleUnavailable { index: 1, .. }));
    assert_eq!(executor.executed(), statements(&["RETURN 1", "RETURN ("]));
    let applied: Vec<_> = err
        .partial_report()
        .map(|r| r.results.iter().map(|s| s.final_statement.clone()).collect())
        .unwrap_or_default();
    assert_eq!(applied, statements(&["RETURN 1"]));
}

#[tokio::test]
async fn test_results_preserve_input_order() {
    let executor = MockExecutor::new();
    let oracle = LlmRepairOracle::new(Box::new(MockLlmClient::new()));
    let runner = StatementRepairRunner::new(&executor, &oracle, RunnerConfig::default());

    let input = statements(&["RETURN 'c'", "RETURN [1, 2", "", "RETURN 'a'", "RETURN {b: 1"]);
    let report = runner.run(&input).await.unwrap();

    let originals: Vec<_> = report
        .results
        .iter()
        .map(|r| r.original_statement.as_str())
        .collect();
    assert_eq!(
        originals,
        vec!["RETURN 'c'", "RETURN [1, 2", "RETURN 'a'", "RETURN {b: 1"]
    );
}

#[tokio::test]
async fn test_abort_policy_leaves_rest_untouched() {
    let executor = MockExecutor::permissive().with_failure("DROP", "Neo.ClientError.Security.Forbidden");
    let oracle = oracle_with("DROP", "DROP INDEX person_name");
    let config = RunnerConfig {
        max_repair_attempts: 2,
        give_up_policy: GiveUpPolicy::Abort,
        ..RunnerConfig::default()
    };
    let runner = StatementRepairRunner::new(&executor, &oracle, config);

    let report = runner
        .run(&statements(&["DROP INDEX person", "CREATE (a)"]))
        .await
        .unwrap();

    assert!(report.stopped_early);
    assert_eq!(report.results.len(), 1);
    assert!(!executor.executed().contains(&"CREATE (a)".to_string()));
}
