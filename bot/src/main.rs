use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use clutch_bot::store::{load_promo_definitions, Store};
use clutch_bot::telegram::Telegram;
use clutch_bot::{App, BotConfig, Sweeper};
use clutch_engine::PromoLedger;
use clutch_types::{Catalog, RankTable};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "clutch-bot")]
#[command(about = "Telegram group bot for CS:GO style match grinding")]
struct Args {
    /// YAML settings file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the ledger location from the settings file.
    #[arg(long)]
    data_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut config = BotConfig::load(args.config.as_deref())?;
    if let Some(data_file) = args.data_file {
        config.data_file = data_file;
    }

    let token = std::env::var("BOT_TOKEN").context("BOT_TOKEN is not set")?;

    let catalog = Catalog::builtin();
    for issue in catalog.validate() {
        error!(%issue, "catalog issue");
    }

    let store = Store::new(&config.data_file);
    let mut ledger = PromoLedger::builtin();
    ledger.extend(load_promo_definitions(&config.promo_file));
    let document = store.load();
    if let Some(promo_uses) = &document.promo_uses {
        ledger.absorb_usage(promo_uses);
    }

    let telegram = Telegram::new(&token)?;
    let me = telegram
        .get_me()
        .await
        .context("could not verify the bot token")?;
    info!(
        id = me.id,
        username = me.username.as_deref().unwrap_or(&me.first_name),
        data_file = %config.data_file.display(),
        "starting"
    );

    let (sweeper, _worker) = Sweeper::start(telegram.clone());
    let mut app = App {
        telegram,
        sweeper,
        store,
        config,
        catalog,
        ranks: RankTable::builtin(),
        ledger,
        me,
        rng: StdRng::from_entropy(),
    };
    app.run().await;
    Ok(())
}
