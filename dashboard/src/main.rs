//! Operator CLI over the dashboard collection store.
//!
//! Every command prints JSON lines on stdout: records for reads, a notice
//! for writes, and field errors when a candidate fails validation. Logs go
//! to stderr.

use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use dashboard::{
    CollectionStore, DashboardSettings, FormSubmission, MutationRequest, Notice,
    RestCollectionSource, SearchField, SearchQuery, SubmitError,
};
use ortho_config::OrthoConfig;
use resource_schema::{Collection, ResourceId, Schema};
use serde::Serialize;
use serde_json::{Value, json};
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// `dashboard` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dashboard",
    about = "Browse and edit the admin dashboard collections",
    version
)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Print every record of a collection, optionally filtered.
    List {
        /// `users` or `posts`.
        collection: Collection,
        /// Field the search term is matched against.
        #[arg(long, value_name = "field")]
        field: Option<SearchField>,
        /// Case-insensitive search term.
        #[arg(long, value_name = "text", default_value = "")]
        term: String,
    },
    /// Print one record.
    Show {
        /// `users` or `posts`.
        collection: Collection,
        /// Record identifier.
        id: ResourceId,
    },
    /// Validate and create a record.
    Create {
        /// `users` or `posts`.
        collection: Collection,
        /// Candidate record as JSON.
        #[arg(long, value_name = "record")]
        json: Value,
    },
    /// Validate and replace a record.
    Update {
        /// `users` or `posts`.
        collection: Collection,
        /// Record identifier.
        id: ResourceId,
        /// Candidate record as JSON.
        #[arg(long, value_name = "record")]
        json: Value,
    },
    /// Delete a record.
    Delete {
        /// `users` or `posts`.
        collection: Collection,
        /// Record identifier.
        id: ResourceId,
    },
}

fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main(args))
}

async fn async_main(args: CliArgs) -> io::Result<()> {
    let settings = DashboardSettings::load_from_iter([OsString::from("dashboard")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    let base_url = settings.base_url().map_err(io::Error::other)?;
    let source = RestCollectionSource::new(base_url, settings.timeout())
        .map_err(|error| io::Error::other(format!("create HTTP client: {error}")))?;
    let store = CollectionStore::new(Arc::new(source), settings.store_config());

    match args.command {
        Command::List {
            collection,
            field,
            term,
        } => list(&store, collection, field, &term).await,
        Command::Show { collection, id } => {
            let record = store
                .fetch_one(collection, id)
                .await
                .map_err(|error| io::Error::other(format!("fetch {collection}/{id}: {error}")))?;
            emit(&mut io::stdout().lock(), &record)
        }
        Command::Create { collection, json } => {
            let form = FormSubmission::create(Schema::for_collection(collection), json);
            submit(&store, &form).await
        }
        Command::Update {
            collection,
            id,
            json,
        } => {
            let form = FormSubmission::update(Schema::for_collection(collection), id, json);
            submit(&store, &form).await
        }
        Command::Delete { collection, id } => {
            let mut request = MutationRequest::delete(collection, id);
            let outcome = store.execute(&mut request).await;
            if let Some(notice) = request.notice() {
                emit(&mut io::stdout().lock(), &notice)?;
            }
            outcome
                .map(|_| ())
                .map_err(|error| io::Error::other(format!("delete {collection}/{id}: {error}")))
        }
    }
}

async fn list(
    store: &CollectionStore,
    collection: Collection,
    field: Option<SearchField>,
    term: &str,
) -> io::Result<()> {
    let mut subscription = store.subscribe(collection);
    let mut snapshot = subscription.current();
    while !snapshot.is_settled() {
        snapshot = subscription
            .next()
            .await
            .ok_or_else(|| io::Error::other("store stopped publishing updates"))?;
    }
    if let Some(error) = snapshot.error() {
        return Err(io::Error::other(format!("list {collection}: {error}")));
    }

    let query = field.map_or_else(
        || SearchQuery::new(term),
        |chosen| SearchQuery::on(chosen, term),
    );
    let mut out = io::stdout().lock();
    for record in query.filter(snapshot.data()) {
        emit(&mut out, &record)?;
    }
    Ok(())
}

async fn submit(store: &CollectionStore, form: &FormSubmission) -> io::Result<()> {
    let collection = form.schema.collection();
    let outcome = store.submit(form).await;
    let mut out = io::stdout().lock();
    match outcome {
        Ok(echo) => {
            if let Some(record) = echo {
                emit(&mut out, &record)?;
            }
            emit(&mut out, &Notice::success(collection, form.kind()))
        }
        Err(SubmitError::Invalid(errors)) => {
            emit(&mut out, &json!({ "errors": &errors }))?;
            Err(io::Error::other(errors))
        }
        Err(SubmitError::Source(error)) => {
            emit(&mut out, &Notice::failure(collection, form.kind()))?;
            Err(io::Error::other(error))
        }
    }
}

fn emit(out: &mut impl Write, value: &impl Serialize) -> io::Result<()> {
    serde_json::to_writer(&mut *out, value).map_err(io::Error::other)?;
    writeln!(out)
}
