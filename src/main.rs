use customer_dedup::config::{LoggingSettings, Settings};
use customer_dedup::{
    CachedDirectory, DirectorySearch, HttpDirectoryClient, MatchSession, SessionEvent, SubmitOutcome,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const HELP: &str = "commands: name <text> | phone <text> | submit [initial credit] | select <id> | show | quit";

fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::CandidatesChanged(list) if list.is_empty() => println!("no similar customers"),
        SessionEvent::CandidatesChanged(list) => {
            let plural = if list.len() > 1 { "s" } else { "" };
            println!("{} similar customer{} found:", list.len(), plural);
            for c in list {
                println!(
                    "  [{}] {} | {} | {}",
                    c.id,
                    c.name,
                    c.phone.as_deref().unwrap_or("No phone"),
                    c.customer_type.as_deref().unwrap_or("-")
                );
            }
        }
        SessionEvent::SearchingChanged(true) => println!("searching..."),
        SessionEvent::SearchingChanged(false) => {}
        SessionEvent::ValidationFailed(reason) => println!("missing information: {}", reason),
        SessionEvent::Blocked(conflict) => {
            println!("duplicate phone number, a customer with this phone number already exists: {}", conflict.name)
        }
        SessionEvent::Submitted(payload) => match serde_json::to_string(payload) {
            Ok(json) => println!("create customer: {}", json),
            Err(e) => println!("create customer {} ({})", payload.name, e),
        },
        SessionEvent::ExistingSelected(candidate) => println!("{} has been selected", candidate.name),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load();
    let logging = settings.as_ref().map(|s| s.logging.clone()).unwrap_or_default();
    init_tracing(&logging);

    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    info!("Starting customer dedup console against {}", settings.directory.base_url);

    let http = HttpDirectoryClient::new(
        settings.directory.base_url.clone(),
        settings.directory.auth_token.clone(),
        settings.directory_timeout(),
    )?;

    let http: Arc<dyn DirectorySearch> = Arc::new(http);
    let cache = settings.cache.enabled.then(|| {
        info!(
            "Lookup cache enabled ({} entries, TTL: {}s)",
            settings.cache.max_entries, settings.cache.ttl_secs
        );
        Arc::new(CachedDirectory::new(
            http.clone(),
            settings.cache.max_entries,
            Duration::from_secs(settings.cache.ttl_secs),
        ))
    });
    let directory: Arc<dyn DirectorySearch> = match &cache {
        Some(cache) => cache.clone() as Arc<dyn DirectorySearch>,
        None => http,
    };

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let session_config = settings.session_config();
    let mut name = String::new();
    let mut phone = session_config.phone_placeholder.clone();
    let mut session = MatchSession::spawn(directory, Arc::new(events_tx), session_config);
    info!("Session {} opened", session.id());

    let printer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            print_event(&event);
        }
    });

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

        match command {
            "name" => {
                name = rest.to_string();
                session.input_changed(name.clone(), phone.clone())?;
            }
            "phone" => {
                phone = rest.to_string();
                session.input_changed(name.clone(), phone.clone())?;
            }
            "submit" => {
                let initial_credit = Some(rest.to_string()).filter(|s| !s.trim().is_empty());
                if let SubmitOutcome::Created(_) = session.submit(initial_credit).await? {
                    break;
                }
            }
            "select" => {
                let candidate = rest.trim().parse::<u64>().ok().and_then(|id| session.candidates().get(id).cloned());
                match candidate {
                    Some(candidate) => {
                        session.select_existing(candidate)?;
                        session.join().await;
                        break;
                    }
                    None => println!("no such candidate: {}", rest.trim()),
                }
            }
            "show" => println!("{:?}", session.snapshot()),
            "quit" | "exit" => break,
            "" => {}
            _ => println!("{}", HELP),
        }
    }

    let outcome = session.dispose().await;
    info!("Session ended: {:?}", outcome);

    if let Some(cache) = &cache {
        info!("Lookup cache held {} entries", cache.stats().await.entries);
    }

    // session and its notifier are gone, the printer drains and stops
    if let Err(e) = printer.await {
        error!("Event printer failed: {}", e);
    }

    Ok(())
}
