//! End-to-end tests against a scripted in-memory session.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tinyorm::{
    assign, col, AccessMode, Db, Entity, ExecResult, OrmError, OrmResult, RowCursor, Session,
    Transaction, Value,
};

#[derive(Debug, Clone, PartialEq, Entity)]
struct TestModel {
    id: i64,
    first_name: String,
    age: i8,
    last_name: Option<String>,
}

fn tom() -> TestModel {
    TestModel {
        id: 12,
        first_name: "Tom".to_string(),
        age: 18,
        last_name: Some("Cat".to_string()),
    }
}

#[derive(Default)]
struct State {
    /// Queued results for `query` calls, oldest first.
    result_sets: VecDeque<(Vec<String>, Vec<Vec<Value>>)>,
    /// Queued results for `execute` calls.
    exec_results: VecDeque<ExecResult>,
    /// Every statement that reached the session, with its args.
    statements: Vec<(String, Vec<Value>)>,
    /// Transaction lifecycle events, in order.
    tx_log: Vec<&'static str>,
    fail_rollback: bool,
}

impl State {
    fn push_rows(&mut self, columns: &[&str], rows: Vec<Vec<Value>>) {
        self.result_sets
            .push_back((columns.iter().map(|c| c.to_string()).collect(), rows));
    }
}

type Shared = Arc<Mutex<State>>;

struct FakeSession {
    state: Shared,
}

struct FakeCursor {
    columns: Vec<String>,
    rows: VecDeque<Vec<Value>>,
}

impl RowCursor for FakeCursor {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> OrmResult<Option<Vec<Value>>> {
        Ok(self.rows.pop_front())
    }
}

fn run_query(state: &Shared, sql: &str, args: &[Value]) -> OrmResult<Box<dyn RowCursor>> {
    let mut state = state.lock().unwrap();
    state.statements.push((sql.to_string(), args.to_vec()));
    let (columns, rows) = state
        .result_sets
        .pop_front()
        .ok_or_else(|| OrmError::session("unscripted query"))?;
    Ok(Box::new(FakeCursor {
        columns,
        rows: rows.into(),
    }))
}

fn run_execute(state: &Shared, sql: &str, args: &[Value]) -> OrmResult<ExecResult> {
    let mut state = state.lock().unwrap();
    state.statements.push((sql.to_string(), args.to_vec()));
    Ok(state.exec_results.pop_front().unwrap_or(ExecResult {
        rows_affected: 1,
        last_insert_id: None,
    }))
}

#[async_trait]
impl Session for FakeSession {
    async fn query(&self, sql: &str, args: &[Value]) -> OrmResult<Box<dyn RowCursor>> {
        run_query(&self.state, sql, args)
    }

    async fn execute(&self, sql: &str, args: &[Value]) -> OrmResult<ExecResult> {
        run_execute(&self.state, sql, args)
    }

    async fn begin(&self) -> OrmResult<Box<dyn Transaction>> {
        self.state.lock().unwrap().tx_log.push("begin");
        Ok(Box::new(FakeTx {
            state: self.state.clone(),
            finished: false,
        }))
    }
}

struct FakeTx {
    state: Shared,
    finished: bool,
}

#[async_trait]
impl Session for FakeTx {
    async fn query(&self, sql: &str, args: &[Value]) -> OrmResult<Box<dyn RowCursor>> {
        run_query(&self.state, sql, args)
    }

    async fn execute(&self, sql: &str, args: &[Value]) -> OrmResult<ExecResult> {
        run_execute(&self.state, sql, args)
    }

    async fn begin(&self) -> OrmResult<Box<dyn Transaction>> {
        Err(OrmError::session("nested transactions are not supported"))
    }
}

#[async_trait]
impl Transaction for FakeTx {
    async fn commit(&mut self) -> OrmResult<()> {
        self.finished = true;
        self.state.lock().unwrap().tx_log.push("commit");
        Ok(())
    }

    async fn rollback(&mut self) -> OrmResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_rollback {
            return Err(OrmError::session("connection lost during rollback"));
        }
        self.finished = true;
        state.tx_log.push("rollback");
        Ok(())
    }
}

// The `Transaction` drop contract: an uncommitted handle rolls back.
impl Drop for FakeTx {
    fn drop(&mut self) {
        if !self.finished {
            let mut state = self.state.lock().unwrap();
            if !state.fail_rollback {
                state.tx_log.push("rollback");
            }
        }
    }
}

fn fake_db() -> (Db, Shared) {
    let state: Shared = Arc::default();
    let db = Db::new(FakeSession {
        state: state.clone(),
    });
    (db, state)
}

#[tokio::test]
async fn insert_exec_sends_sql_and_args() {
    let (db, state) = fake_db();
    state.lock().unwrap().exec_results.push_back(ExecResult {
        rows_affected: 1,
        last_insert_id: Some(12),
    });

    let result = db.insert::<TestModel>().values(vec![tom()]).exec().await.unwrap();
    assert_eq!(result.rows_affected, 1);
    assert_eq!(result.last_insert_id, Some(12));

    let state = state.lock().unwrap();
    let (sql, args) = &state.statements[0];
    assert_eq!(
        sql,
        "INSERT INTO `test_model`(`id`,`first_name`,`age`,`last_name`) VALUES (?,?,?,?);"
    );
    assert_eq!(
        args,
        &vec![
            Value::I64(12),
            Value::Text("Tom".to_string()),
            Value::I8(18),
            Value::Text("Cat".to_string()),
        ]
    );
}

#[tokio::test]
async fn get_binds_first_row() {
    let (db, state) = fake_db();
    state.lock().unwrap().push_rows(
        &["id", "first_name", "age", "last_name"],
        vec![vec![
            Value::I64(12),
            Value::Text("Tom".to_string()),
            Value::I8(18),
            Value::Text("Cat".to_string()),
        ]],
    );

    let got = db
        .select::<TestModel>()
        .filter(col("id").eq(12))
        .get()
        .await
        .unwrap();
    assert_eq!(got, tom());
}

#[tokio::test]
async fn get_binds_shuffled_columns_in_both_modes() {
    for mode in [AccessMode::Accessor, AccessMode::Direct] {
        let (db, state) = fake_db();
        let db = db.with_access_mode(mode);
        state.lock().unwrap().push_rows(
            &["last_name", "id", "age", "first_name"],
            vec![vec![
                Value::Text("Cat".to_string()),
                Value::I64(12),
                Value::I8(18),
                Value::Text("Tom".to_string()),
            ]],
        );

        let got = db.select::<TestModel>().get().await.unwrap();
        assert_eq!(got, tom());
    }
}

#[tokio::test]
async fn get_with_no_rows_is_an_error() {
    let (db, state) = fake_db();
    state
        .lock()
        .unwrap()
        .push_rows(&["id", "first_name", "age", "last_name"], vec![]);

    let err = db.select::<TestModel>().get().await.unwrap_err();
    assert!(err.is_no_rows());
}

#[tokio::test]
async fn fetch_all_with_no_rows_is_empty() {
    let (db, state) = fake_db();
    state
        .lock()
        .unwrap()
        .push_rows(&["id", "first_name", "age", "last_name"], vec![]);

    let all = db.select::<TestModel>().fetch_all().await.unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn fetch_all_binds_every_row() {
    let (db, state) = fake_db();
    state.lock().unwrap().push_rows(
        &["id", "first_name", "age", "last_name"],
        vec![
            vec![
                Value::I64(12),
                Value::Text("Tom".to_string()),
                Value::I8(18),
                Value::Text("Cat".to_string()),
            ],
            vec![
                Value::I64(13),
                Value::Text("Jerry".to_string()),
                Value::I8(17),
                Value::Null,
            ],
        ],
    );

    let all = db.select::<TestModel>().fetch_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0], tom());
    assert_eq!(all[1].first_name, "Jerry");
    assert_eq!(all[1].last_name, None);
}

#[tokio::test]
async fn transaction_commits_on_ok() {
    let (db, state) = fake_db();

    let result: OrmResult<u64> = async {
        tinyorm::transaction!(db, tx, {
            let res = db
                .update::<TestModel>()
                .set(assign("age", 19))
                .filter(col("id").eq(12))
                .via(&*tx)
                .exec()
                .await?;
            Ok(res.rows_affected)
        })
    }
    .await;

    assert_eq!(result.unwrap(), 1);
    let state = state.lock().unwrap();
    assert_eq!(state.tx_log, vec!["begin", "commit"]);
    assert_eq!(
        state.statements[0].0,
        "UPDATE `test_model` SET `age`=? WHERE `id` = ?;"
    );
}

#[tokio::test]
async fn transaction_rolls_back_on_err() {
    let (db, state) = fake_db();

    let result: OrmResult<()> = async {
        tinyorm::transaction!(db, tx, {
            db.delete::<TestModel>()
                .filter(col("id").eq(12))
                .via(&*tx)
                .exec()
                .await?;
            Err(OrmError::NoRows)
        })
    }
    .await;

    assert_eq!(result.unwrap_err(), OrmError::NoRows);
    assert_eq!(state.lock().unwrap().tx_log, vec!["begin", "rollback"]);
}

#[tokio::test]
async fn dropping_uncommitted_transaction_rolls_back() {
    let (db, state) = fake_db();
    let tx = db.begin().await.unwrap();
    drop(tx);
    assert_eq!(state.lock().unwrap().tx_log, vec!["begin", "rollback"]);
}

#[tokio::test]
async fn panic_inside_transaction_rolls_back() {
    let (db, state) = fake_db();
    let handle = tokio::spawn(async move {
        let result: OrmResult<()> = tinyorm::transaction!(db, tx, {
            let _ = &tx;
            panic!("boom");
        });
        result
    });
    // The panic unwinds out of the block; the dropped handle must still
    // have rolled the transaction back.
    assert!(handle.await.is_err());
    assert_eq!(state.lock().unwrap().tx_log, vec!["begin", "rollback"]);
}

#[tokio::test]
async fn failed_rollback_reports_both_errors() {
    let (db, state) = fake_db();
    state.lock().unwrap().fail_rollback = true;

    let result: OrmResult<()> = async {
        tinyorm::transaction!(db, tx, {
            let _ = &tx;
            Err(OrmError::NoRows)
        })
    }
    .await;

    match result.unwrap_err() {
        OrmError::Rollback { source, rollback } => {
            assert_eq!(*source, OrmError::NoRows);
            assert_eq!(
                *rollback,
                OrmError::session("connection lost during rollback")
            );
        }
        other => panic!("expected a rollback error, got {other:?}"),
    }
}
