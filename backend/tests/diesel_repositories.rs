//! Diesel repositories against embedded PostgreSQL.
//!
//! Each test provisions its own database on a fresh cluster, applies the
//! embedded migrations through `run_pending_migrations`, and drives the
//! repositories from a Tokio runtime owned by the test context. Set
//! `SKIP_TEST_CLUSTER=1` where the cluster cannot start.

use std::time::Duration;

use calc_api::domain::ports::{
    CalculationPersistenceError, CalculationRepository, UniqueField, UserPersistenceError,
    UserRepository,
};
use calc_api::domain::{
    Calculation, CalculationUpdate, EmailAddress, NewCalculation, NewUser, Operation, User,
    UserId, UserUpdate, Username,
};
use calc_api::outbound::persistence::{
    DbPool, DieselCalculationRepository, DieselUserRepository, PoolConfig,
    run_pending_migrations,
};
use pagination::PageRequest;
use pg_embedded_setup_unpriv::TestCluster;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;
use uuid::Uuid;

#[path = "support/pg_embed.rs"]
mod pg_embed;

#[path = "support/embedded_postgres.rs"]
mod embedded_postgres;

use embedded_postgres::{connect, handle_cluster_setup_failure, reset_database};
use pg_embed::test_cluster;

struct TestContext {
    runtime: Runtime,
    _cluster: TestCluster,
    database_url: String,
    users: DieselUserRepository,
    calculations: DieselCalculationRepository,
}

impl TestContext {
    fn user(&self, name: &str) -> User {
        let new_user =
            NewUser::try_from_parts(name, format!("{name}@example.com")).expect("valid user");
        self.runtime
            .block_on(self.users.create(&new_user))
            .expect("create user")
    }

    fn calculation(&self, operation: &str, owner: UserId) -> Calculation {
        self.runtime
            .block_on(self.calculations.create(&new_calculation(operation, owner)))
            .expect("create calculation")
    }
}

fn new_calculation(operation: &str, owner: UserId) -> NewCalculation {
    NewCalculation {
        operation: Operation::new(operation).expect("valid operation"),
        operand_a: 8.0,
        operand_b: 2.0,
        result: 4.0,
        user_id: owner,
    }
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = test_cluster()?;
    let database = format!("calc_{}", Uuid::new_v4().simple());
    reset_database(&cluster, &database)?;
    let database_url = cluster.connection().database_url(&database);
    runtime
        .block_on(run_pending_migrations(&database_url))
        .map_err(|err| err.to_string())?;

    let config = PoolConfig::new(&database_url)
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        _cluster: cluster,
        database_url,
        users: DieselUserRepository::new(pool.clone()),
        calculations: DieselCalculationRepository::new(pool),
    })
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

#[rstest]
fn migrations_are_idempotent(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: migrations_are_idempotent skipped");
        return;
    };

    ctx.runtime
        .block_on(run_pending_migrations(&ctx.database_url))
        .expect("second run applies nothing");
}

#[rstest]
#[case("carol", "other@example.com", UniqueField::Username)]
#[case("dave", "carol@example.com", UniqueField::Email)]
fn duplicate_registration_names_the_column(
    repo_context: Option<TestContext>,
    #[case] username: &str,
    #[case] email: &str,
    #[case] field: UniqueField,
) {
    let Some(ctx) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: duplicate_registration_names_the_column skipped");
        return;
    };
    ctx.user("carol");

    let new_user = NewUser::try_from_parts(username, email).expect("valid user");
    let err = ctx
        .runtime
        .block_on(ctx.users.create(&new_user))
        .expect_err("duplicate rejected");
    assert_eq!(err, UserPersistenceError::duplicate(field));

    let listed = ctx
        .runtime
        .block_on(ctx.users.list(PageRequest::default()))
        .expect("list users");
    assert_eq!(listed.len(), 1);
}

#[rstest]
#[case(Some("carol"), None, UniqueField::Username)]
#[case(None, Some("carol@example.com"), UniqueField::Email)]
fn update_collisions_are_classified_by_constraint(
    repo_context: Option<TestContext>,
    #[case] username: Option<&str>,
    #[case] email: Option<&str>,
    #[case] field: UniqueField,
) {
    let Some(ctx) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: update_collisions_are_classified_by_constraint skipped");
        return;
    };
    ctx.user("carol");
    let dave = ctx.user("dave");

    let update = UserUpdate {
        username: username.map(|raw| Username::new(raw).expect("valid username")),
        email: email.map(|raw| EmailAddress::new(raw).expect("valid email")),
    };
    let err = ctx
        .runtime
        .block_on(ctx.users.update(dave.id, &update))
        .expect_err("collision rejected");
    assert_eq!(err, UserPersistenceError::duplicate(field));

    let unchanged = ctx
        .runtime
        .block_on(ctx.users.find_by_id(dave.id))
        .expect("find dave")
        .expect("dave present");
    assert_eq!(unchanged.username.as_ref(), "dave");
    assert_eq!(unchanged.email.as_ref(), "dave@example.com");
}

#[rstest]
fn partial_update_keeps_untouched_fields(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: partial_update_keeps_untouched_fields skipped");
        return;
    };
    let carol = ctx.user("carol");
    let owned = ctx.calculation("add", carol.id);

    let update = UserUpdate {
        username: None,
        email: Some(EmailAddress::new("carol@newdomain.com").expect("valid email")),
    };
    let updated = ctx
        .runtime
        .block_on(ctx.users.update(carol.id, &update))
        .expect("update carol")
        .expect("carol present");
    assert_eq!(updated.username.as_ref(), "carol");
    assert_eq!(updated.email.as_ref(), "carol@newdomain.com");
    assert_eq!(updated.created_at, carol.created_at);
    assert_eq!(updated.calculations, vec![owned.clone()]);

    let unchanged = ctx
        .runtime
        .block_on(ctx.users.update(carol.id, &UserUpdate::default()))
        .expect("empty update")
        .expect("carol present");
    assert_eq!(unchanged, updated);

    let patched = ctx
        .runtime
        .block_on(
            ctx.calculations
                .update_result(owned.id, CalculationUpdate { result: 6.0 }),
        )
        .expect("update result")
        .expect("calculation present");
    assert_eq!(patched.result.to_bits(), 6.0_f64.to_bits());
    assert_eq!(patched.operation, owned.operation);
    assert_eq!(patched.timestamp, owned.timestamp);
}

#[rstest]
fn missing_owner_is_reported_and_nothing_is_stored(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: missing_owner_is_reported_and_nothing_is_stored skipped");
        return;
    };

    let err = ctx
        .runtime
        .block_on(
            ctx.calculations
                .create(&new_calculation("divide", UserId::new(7))),
        )
        .expect_err("owner missing");
    assert_eq!(err, CalculationPersistenceError::UserNotFound);

    let listed = ctx
        .runtime
        .block_on(ctx.calculations.list(PageRequest::default()))
        .expect("list calculations");
    assert!(listed.is_empty());
}

#[rstest]
fn owner_deleted_during_insert_is_reported_as_missing(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: owner_deleted_during_insert_is_reported_as_missing skipped");
        return;
    };
    let carol = ctx.user("carol");

    let mut client = connect(&ctx.database_url).expect("connect");
    let mut deleting = client.transaction().expect("begin delete");
    deleting
        .execute("DELETE FROM users WHERE id = $1", &[&carol.id.get()])
        .expect("delete carol");

    let calculations = ctx.calculations.clone();
    let pending = ctx.runtime.spawn(async move {
        calculations
            .create(&new_calculation("add", carol.id))
            .await
    });
    // Let the insert reach the owner row and wait on the uncommitted delete.
    std::thread::sleep(Duration::from_millis(300));
    deleting.commit().expect("commit delete");

    let outcome = ctx.runtime.block_on(pending).expect("insert task");
    assert_eq!(outcome, Err(CalculationPersistenceError::UserNotFound));
    let listed = ctx
        .runtime
        .block_on(ctx.calculations.list(PageRequest::default()))
        .expect("list calculations");
    assert!(listed.is_empty());
}

#[rstest]
fn deleting_a_user_cascades(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: deleting_a_user_cascades skipped");
        return;
    };
    let carol = ctx.user("carol");
    let dave = ctx.user("dave");
    ctx.calculation("add", carol.id);
    let kept = ctx.calculation("multiply", dave.id);

    assert!(
        ctx.runtime
            .block_on(ctx.users.delete(carol.id))
            .expect("delete carol")
    );
    assert!(
        !ctx.runtime
            .block_on(ctx.users.delete(carol.id))
            .expect("second delete")
    );

    let remaining = ctx
        .runtime
        .block_on(ctx.calculations.list(PageRequest::default()))
        .expect("list calculations");
    assert_eq!(remaining, vec![kept]);
}

#[rstest]
fn join_follows_calculation_order(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: join_follows_calculation_order skipped");
        return;
    };
    let carol = ctx.user("carol");
    let dave = ctx.user("dave");
    for (operation, owner) in [("add", dave.id), ("subtract", carol.id), ("multiply", dave.id)] {
        ctx.calculation(operation, owner);
    }

    let joined = ctx
        .runtime
        .block_on(ctx.calculations.list_with_usernames())
        .expect("join");
    let pairs: Vec<_> = joined
        .iter()
        .map(|row| (row.username.as_ref(), row.operation.as_ref()))
        .collect();
    assert_eq!(
        pairs,
        vec![("dave", "add"), ("carol", "subtract"), ("dave", "multiply")]
    );

    let found = ctx
        .runtime
        .block_on(ctx.users.find_by_id(dave.id))
        .expect("find dave")
        .expect("dave present");
    let owned: Vec<_> = found
        .calculations
        .iter()
        .map(|calc| calc.operation.as_ref())
        .collect();
    assert_eq!(owned, vec!["add", "multiply"]);
}
