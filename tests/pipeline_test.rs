use async_trait::async_trait;
use pretty_assertions::assert_eq;
use sparkify::prelude::*;
use sparkify::tables::{SONGPLAYS, STAGING_EVENTS, STAGING_SONGS};

const CONFIG: &str = r#"
[cluster]
host = "dwh.abc123.us-west-2.redshift.amazonaws.com"
db_name = "dev"
db_user = "awsuser"
db_password = "Passw0rd"

[iam_role]
arn = "'arn:aws:iam::123456789012:role/dwhRole'"

[s3]
log_data = "'s3://udacity-dend/log_data'"
log_jsonpath = "'s3://udacity-dend/log_json_path.json'"
song_data = "'s3://udacity-dend/song_data'"
"#;

fn registry() -> Registry {
    let config = Config::from_toml(CONFIG).expect("sample config parses");
    Registry::from_config(&config).expect("registry builds")
}

#[test]
fn test_statement_counts() {
    let registry = registry();
    assert_eq!(registry.phase(Phase::Drop).len(), 7);
    assert_eq!(registry.phase(Phase::Create).len(), 7);
    assert_eq!(registry.phase(Phase::Copy).len(), 2);
    assert_eq!(registry.phase(Phase::Insert).len(), 5);
}

#[test]
fn test_drop_order_follows_declarations() {
    let registry = registry();
    let expected: Vec<String> = registry
        .tables()
        .iter()
        .map(|t| format!("DROP TABLE IF EXISTS {} CASCADE;", t.name))
        .collect();
    assert_eq!(registry.phase(Phase::Drop), expected.as_slice());
}

#[test]
fn test_copy_statements_use_config() {
    let registry = registry();
    let copies = registry.phase(Phase::Copy);
    assert_eq!(
        copies[0],
        format!(
            "COPY {}\nFROM 's3://udacity-dend/log_data'\n\
             IAM_ROLE 'arn:aws:iam::123456789012:role/dwhRole'\nREGION 'us-west-2'\n\
             FORMAT JSON AS 's3://udacity-dend/log_json_path.json'\nEMPTYASNULL\nBLANKSASNULL;",
            STAGING_EVENTS
        )
    );
    assert!(copies[1].starts_with(&format!("COPY {}\n", STAGING_SONGS)));
    assert!(copies[1].contains("FORMAT JSON AS 'auto'\n"));
}

#[test]
fn test_time_table_ddl() {
    let registry = registry();
    let create = registry
        .phase(Phase::Create)
        .iter()
        .find(|sql| sql.starts_with("CREATE TABLE IF NOT EXISTS time ("))
        .expect("time table is declared");
    assert_eq!(
        create,
        "CREATE TABLE IF NOT EXISTS time (\n  start_time TIMESTAMP,\n  hour INT2 NOT NULL,\n  \
         day INT2 NOT NULL,\n  week INT2 NOT NULL,\n  month INT2 NOT NULL,\n  \
         year INT2 NOT NULL,\n  weekday INT2 NOT NULL,\n  PRIMARY KEY (start_time));"
    );
}

#[test]
fn test_songplays_insert_omits_identity() {
    let registry = registry();
    let insert = registry
        .phase(Phase::Insert)
        .iter()
        .find(|sql| sql.starts_with(&format!("INSERT INTO {} ", SONGPLAYS)))
        .expect("songplays insert");
    let header = insert.lines().next().unwrap();
    assert_eq!(
        header,
        "INSERT INTO songplays (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)"
    );
    assert!(insert.ends_with("AND e.ts IS NOT NULL;"));
}

#[test]
fn test_every_statement_is_terminated() {
    let registry = registry();
    for phase in Phase::ALL {
        for sql in registry.phase(phase) {
            assert!(sql.ends_with(';'), "{phase}: {sql}");
            assert_eq!(sql.matches(";\n").count(), 0, "{phase}: {sql}");
        }
    }
}

struct Recorder(Vec<String>);

#[async_trait]
impl Executor for Recorder {
    async fn execute(&mut self, sql: &str) -> EtlResult<u64> {
        if sql.starts_with("INSERT INTO artists") {
            return Err(EtlError::Connection("relation does not exist".into()));
        }
        self.0.push(sql.to_string());
        Ok(1)
    }
}

#[tokio::test]
async fn test_full_pipeline_aborts_on_failure() {
    let registry = registry();
    let mut recorder = Recorder(Vec::new());
    let err = run_phases(&mut recorder, &registry, &Phase::ALL)
        .await
        .unwrap_err();

    // drop, create and copy ran; inserts stopped before artists
    assert_eq!(recorder.0.len(), 7 + 7 + 2 + 2);
    match err {
        EtlError::Execution { index, .. } => assert_eq!(index, 3),
        other => panic!("unexpected error: {other}"),
    }
}
