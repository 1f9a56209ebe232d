//! Runs the user-lookup scenarios against a small set of executables and
//! prints each outcome as JSON.

use std::collections::HashMap;

use clap::{Parser, ValueEnum};
use parking_lot::RwLock;
use railguard_runtime::{
    DependencyKey, DependencyRegistry, ErrorKind, ErrorRegistry, Executable, ExecutionContext,
    ExecutionOutcome, Failure,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scenario {
    All,
    Success,
    NotFound,
    MissingDependency,
    UnregisteredError,
}

#[derive(Debug, Parser)]
#[command(name = "railguard-demo", about = "Run the railguard user-lookup scenarios")]
struct Args {
    /// Log output format.
    #[arg(long, value_enum, default_value = "text", env = "RAILGUARD_LOG_FORMAT")]
    log_format: LogFormat,

    /// Which scenario to run.
    #[arg(long, value_enum, default_value = "all", env = "RAILGUARD_SCENARIO")]
    scenario: Scenario,
}

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct User {
    name: String,
    id: String,
}

#[derive(Debug, Clone)]
struct GetUser {
    id: String,
    scope: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "error", rename_all = "camelCase")]
enum UserError {
    #[error("user {user_id} not found")]
    #[serde(rename_all = "camelCase")]
    NotFound { user_id: String },
    #[error("real error {code}")]
    Real { code: i32 },
}

struct UserNotFound;

impl ErrorKind for UserNotFound {
    const NAME: &'static str = "UserNotFoundError";
    type Error = UserError;
    type Params = String;

    fn build(user_id: String) -> UserError {
        UserError::NotFound { user_id }
    }
}

struct RealError;

impl ErrorKind for RealError {
    const NAME: &'static str = "RealError";
    type Error = UserError;
    type Params = i32;

    fn build(code: i32) -> UserError {
        UserError::Real { code }
    }
}

/// In-memory user table shared by every invocation.
#[derive(Debug, Default)]
struct UserStore {
    users: RwLock<HashMap<String, User>>,
}

impl UserStore {
    fn insert(&self, user: User) {
        self.users.write().insert(user.id.clone(), user);
    }

    fn find(&self, id: &str) -> Option<User> {
        self.users.read().get(id).cloned()
    }
}

struct Users;

impl DependencyKey for Users {
    const NAME: &'static str = "UserStore";
    type Value = UserStore;
}

// ---------------------------------------------------------------------------
// Operations and middlewares
// ---------------------------------------------------------------------------

async fn find_user(
    ctx: ExecutionContext<UserError>,
    request: GetUser,
) -> Result<User, Failure<UserError>> {
    tracing::debug!(scope = %request.scope, id = %request.id, "looking up user");
    if request.id == "bad-id" {
        return Err(ctx.raise::<UserNotFound>(request.id));
    }
    let store = ctx.resolve::<Users>()?;
    match store.find(&request.id) {
        Some(user) => Ok(user),
        None => Err(ctx.raise::<UserNotFound>(request.id)),
    }
}

async fn find_user_with_logger(
    ctx: ExecutionContext<UserError>,
    request: GetUser,
) -> Result<User, Failure<UserError>> {
    let logger = ctx.get::<String>("Logger")?;
    tracing::info!(logger = %logger, "logger resolved");
    find_user(ctx, request).await
}

async fn raise_typo(
    ctx: ExecutionContext<UserError>,
    _request: GetUser,
) -> Result<User, Failure<UserError>> {
    Err(ctx.raise_named("TypoError", 1_i32))
}

async fn uppercase_name(
    _ctx: ExecutionContext<UserError>,
    mut user: User,
) -> Result<User, Failure<UserError>> {
    user.name = user.name.to_uppercase();
    Ok(user)
}

fn seeded_store() -> UserStore {
    let store = UserStore::default();
    store.insert(User {
        name: "alice galvao".to_string(),
        id: "7".to_string(),
    });
    store
}

fn user_errors() -> anyhow::Result<ErrorRegistry<UserError>> {
    Ok(ErrorRegistry::builder()
        .register::<UserNotFound>()?
        .register::<RealError>()?
        .build())
}

fn lookup_executable() -> anyhow::Result<Executable<GetUser, User, UserError>> {
    let dependencies = DependencyRegistry::builder()
        .provide_key::<Users>(seeded_store())?
        .build();
    Ok(Executable::builder(find_user)
        .label("find-user")
        .errors(user_errors()?)
        .dependencies(dependencies)
        .after(uppercase_name)
        .build())
}

fn print_outcome(
    scenario: &str,
    outcome: &ExecutionOutcome<User, UserError>,
) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(outcome)?;
    println!("--- {scenario} ---\n{rendered}");
    Ok(())
}

fn request(id: &str) -> GetUser {
    GetUser {
        id: id.to_string(),
        scope: "admin".to_string(),
    }
}

async fn run(scenario: Scenario) -> anyhow::Result<()> {
    let runs = |wanted: Scenario| scenario == Scenario::All || scenario == wanted;

    if runs(Scenario::Success) {
        let outcome = lookup_executable()?.invoke(request("7")).await;
        print_outcome("success", &outcome)?;
    }

    if runs(Scenario::NotFound) {
        let outcome = lookup_executable()?.invoke(request("bad-id")).await;
        print_outcome("not-found", &outcome)?;
    }

    if runs(Scenario::MissingDependency) {
        let exe = Executable::builder(find_user_with_logger)
            .label("find-user-with-logger")
            .errors(user_errors()?)
            .build();
        print_outcome("missing-dependency", &exe.invoke(request("7")).await)?;
    }

    if runs(Scenario::UnregisteredError) {
        let errors = ErrorRegistry::builder().register::<RealError>()?.build();
        let exe = Executable::builder(raise_typo)
            .label("raise-typo")
            .errors(errors)
            .build();
        print_outcome("unregistered-error", &exe.invoke(request("7")).await)?;
    }

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format);
    tracing::info!(scenario = ?args.scenario, "railguard demo starting");
    run(args.scenario).await
}
