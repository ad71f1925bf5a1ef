//! Demo that pushes one test notification through the configured transport
//! (logged and dropped when SMTP is not set up).

use sitewatch::config::Config;
use sitewatch::notify::{self, ChangeNotification};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let cfg = Config::from_env()?;
    let notifier = notify::from_config(&cfg)?;

    let notification = ChangeNotification::for_url(&cfg, "http://example.com/demo");
    match notifier.send(&notification).await {
        Ok(()) => println!("notify-demo done"),
        Err(e) => eprintln!("notify-demo failed: {e:#}"),
    }

    Ok(())
}
