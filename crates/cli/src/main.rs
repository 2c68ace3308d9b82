//! Terminal driver for the Side Quest client.
//!
//! Thin by design: every command wires the session controller and stores
//! together, prints plain text, and exits non-zero with the structured
//! error message on failure.

use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sidequest_client::store::{AdventurerStore, QuestStore};
use sidequest_client::{ClientConfig, HttpClient, SessionController, SessionState, TokenStore};
use sidequest_core::adventurer::NewAdventurer;
use sidequest_core::quest::NewQuest;
use sidequest_core::user::{Credentials, RegisterUser};

const USAGE: &str = "\
sidequest <command> [args]

Account:
  register <username> <email> <password>
  login <username> <password>
  logout
  me

Adventurers:
  adventurers
  adventurer-create <name> [type]

Quests:
  quests <adventurer-id>
  quest-create <adventurer-id> <title> [reward]
  quest-complete <adventurer-id> <quest-id>
  quest-delete <quest-id>
";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sidequest_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(args).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    // --- Configuration + wiring ---
    let config = ClientConfig::from_env();
    tracing::debug!(environment = %config.environment, origin = %config.origin(), "loaded configuration");

    let tokens = Arc::new(TokenStore::on_disk(data_dir()));
    let http = Arc::new(HttpClient::new(&config, Arc::clone(&tokens)));
    let session = SessionController::new(Arc::clone(&http), Arc::clone(&tokens));

    let mut args = args.into_iter();
    let command = args.next().unwrap_or_else(|| "help".to_string());
    let rest: Vec<String> = args.collect();

    match (command.as_str(), rest.as_slice()) {
        ("register", [username, email, password]) => {
            let payload = RegisterUser {
                username: username.clone(),
                email: email.clone(),
                password: password.clone(),
            };
            let user = session.register(&payload).await?;
            println!("registered and logged in as {} <{}>", user.username, user.email);
        }

        ("login", [username, password]) => {
            let credentials = Credentials {
                username: username.clone(),
                password: password.clone(),
            };
            let user = session.login(&credentials).await?;
            println!("logged in as {}", user.username);
        }

        ("logout", []) => {
            session.logout().await;
            println!("logged out");
        }

        ("me", []) => {
            let user = require_session(&session).await?;
            println!("{} <{}> (id {})", user.username, user.email, user.id);
        }

        ("adventurers", []) => {
            require_session(&session).await?;
            let mut store = AdventurerStore::new(Arc::clone(&http));
            store.fetch().await?;
            if store.adventurers().is_empty() {
                println!("no adventurers yet");
            }
            for adv in store.adventurers() {
                let class = adv
                    .adventurer_type
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "untyped".to_string());
                println!(
                    "{}  {}  [{}]  level {}  {}/{} xp  {:.0}%  ({} quests done)",
                    adv.id,
                    adv.name,
                    class,
                    adv.level,
                    adv.experience,
                    adv.experience_for_next_level,
                    adv.progress_percentage,
                    adv.completed_quests_count,
                );
            }
        }

        ("adventurer-create", [name, rest @ ..]) if rest.len() <= 1 => {
            let user = require_session(&session).await?;
            let mut payload = NewAdventurer::new(name.clone(), user.id.clone());
            if let Some(kind) = rest.first() {
                payload = payload.with_type(kind.parse()?);
            }
            let mut store = AdventurerStore::new(Arc::clone(&http));
            let adv = store.create(&payload).await?;
            println!("created adventurer {} (id {})", adv.name, adv.id);
        }

        ("quests", [adventurer_id]) => {
            require_session(&session).await?;
            let mut store = QuestStore::new(Arc::clone(&http));
            store.fetch_for(adventurer_id).await?;
            if store.quests().is_empty() {
                println!("no quests for adventurer {adventurer_id}");
            }
            for quest in store.quests() {
                let mark = if quest.completed { "x" } else { " " };
                println!(
                    "[{}] {}  {}  ({} xp)",
                    mark, quest.id, quest.title, quest.experience_reward
                );
            }
        }

        ("quest-create", [adventurer_id, title, rest @ ..]) if rest.len() <= 1 => {
            require_session(&session).await?;
            let mut payload = NewQuest::new(title.clone(), adventurer_id.clone());
            if let Some(reward) = rest.first() {
                payload = payload.with_reward(reward.parse()?);
            }
            let mut store = QuestStore::new(Arc::clone(&http));
            let quest = store.create(&payload).await?;
            println!(
                "created quest {} (id {}, {} xp)",
                quest.title, quest.id, quest.experience_reward
            );
        }

        ("quest-complete", [adventurer_id, quest_id]) => {
            require_session(&session).await?;
            let mut store = AdventurerStore::new(Arc::clone(&http));
            let outcome = store.complete_quest(adventurer_id, quest_id).await?;
            let adv = store.current().expect("completion merges the adventurer");
            if !outcome.was_new_completion {
                println!("quest {quest_id} was already complete");
            } else if outcome.leveled_up {
                println!("quest complete -- {} reached level {}!", adv.name, adv.level);
            } else {
                println!(
                    "quest complete -- {} at {}/{} xp",
                    adv.name, adv.experience, adv.experience_for_next_level
                );
            }
        }

        ("quest-delete", [quest_id]) => {
            require_session(&session).await?;
            let mut store = QuestStore::new(Arc::clone(&http));
            store.delete(quest_id).await?;
            println!("deleted quest {quest_id}");
        }

        ("help", _) | ("--help", _) | ("-h", _) => print!("{USAGE}"),

        (other, _) => {
            eprintln!("unknown or malformed command: {other}\n");
            print!("{USAGE}");
            std::process::exit(2);
        }
    }

    Ok(())
}

/// Run the session check and refuse to proceed without a confirmed session.
async fn require_session(
    session: &SessionController,
) -> Result<sidequest_core::user::User, Box<dyn std::error::Error>> {
    match session.check_auth_status().await {
        SessionState::Authenticated(user) => Ok(user),
        _ => {
            let detail = session
                .last_error()
                .unwrap_or_else(|| "not logged in (run `sidequest login`)".to_string());
            Err(detail.into())
        }
    }
}

/// Where the session token lives: `$SIDEQUEST_DATA_DIR`, else `~/.sidequest`.
fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SIDEQUEST_DATA_DIR") {
        return PathBuf::from(dir);
    }
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".sidequest")
}
