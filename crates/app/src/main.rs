use std::sync::Arc;

use chat_bot::{Console, Dispatcher};
use engine::{CsvStore, Ledger, LedgerStore, MemoryStore, SqliteStore};
use settings::Store;

mod error;
mod settings;

#[tokio::main]
async fn main() -> error::Result<()> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "catat={level},chat_bot={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let ledger = Ledger::builder()
        .store(open_store(&settings.store).await?)
        .timezone(settings.app.timezone()?)
        .build()?;
    ledger.ensure_schema().await?;
    tracing::info!(
        "ledger ready ({:?}, {})",
        settings.store,
        ledger.timezone().name()
    );

    let dispatcher = Dispatcher::builder()
        .ledger(Arc::new(ledger))
        .session_timeout(settings.app.session_timeout()?)
        .build()?;

    if let Some(telegram) = settings.telegram {
        tracing::info!("Found telegram settings...");
        let bot = chat_bot::Bot::builder()
            .token(&telegram.token)
            .allowed_users(telegram.allowed_users)
            .dispatcher(dispatcher.clone())
            .build()?;
        tasks.spawn(async move { bot.run().await });
    }

    if let Some(console) = settings.console {
        tracing::info!("Found console settings...");
        let console = Console::new(dispatcher, console.sender);
        tasks.spawn(async move {
            if let Err(err) = console.run().await {
                tracing::error!("console failed: {err}");
            }
        });
    }

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

async fn open_store(config: &Store) -> error::Result<Arc<dyn LedgerStore>> {
    let store: Arc<dyn LedgerStore> = match config {
        Store::Memory => Arc::new(MemoryStore::new()),
        Store::Csv(path) => Arc::new(CsvStore::new(path)),
        Store::Sqlite(path) => {
            Arc::new(SqliteStore::connect(&format!("sqlite:{path}?mode=rwc")).await?)
        }
    };
    Ok(store)
}
