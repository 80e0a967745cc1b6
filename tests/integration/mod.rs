//! Integration tests for cypher-mend.

pub mod cli_test;
pub mod neo4j_test;
pub mod runner_test;
pub mod statements_test;
