use std::sync::Arc;
use teloxide::{dptree::deps, prelude::*};

use crate::{
    config::Config,
    database::Database,
    handlers::{self, commands::Command},
};

/// # Panics
///
/// Panics if there's no bot token or the database can't be opened.
pub async fn entry() {
    let config = Config::load().expect("Could not load config!");
    log::info!("Starting with {config:?}");

    let bot = Bot::new(&config.bot_token);

    bot.set_my_commands(Command::generate_bot_commands())
        .await
        .expect("Failed to set bot commands!");

    let database = Arc::new(
        Database::connect(&config)
            .await
            .expect("Could not connect to the database!"),
    );

    log::info!("Creating the handler...");

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handlers::handle_message::<Database>));

    log::info!("Dispatching the dispatcher!");

    Dispatcher::builder(bot, handler)
        .default_handler(|_| async {})
        .dependencies(deps![database.clone()])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("it appears we have been bonked.");

    database.close().await;
}
