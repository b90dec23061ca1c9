use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use serde::Serialize;

use mooddiary_lib::{
    api::{self, ApiClient},
    capture::FileDevice,
    events::{self, ChannelSink},
    feed::{self, FeedFilter},
    init_logging,
    models::{Mood, ProfileUpdate, Registration, SessionContext, UserProfile},
    settings::{ProgressMode, SettingsStore},
    wizard::{self, DraftPatch},
    AppState,
};

#[derive(Parser, Debug)]
#[command(name = "mooddiary")]
#[command(about = "Record and browse video journal entries")]
#[command(version)]
struct Args {
    /// Bearer token of the signed-in user (see `login`)
    #[arg(long, env = "MOODDIARY_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Settings file (created with defaults on first save)
    #[arg(long, env = "MOODDIARY_SETTINGS", default_value = "mooddiary.json")]
    settings: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a local webm file through the recording wizard and submit it
    Record {
        #[arg(long)]
        video: PathBuf,

        /// How long to "record" before stopping
        #[arg(long, default_value_t = 3)]
        seconds: u64,

        #[arg(long, default_value = "")]
        title: String,

        #[arg(long, default_value = "")]
        note: String,

        #[arg(long)]
        mood: Option<Mood>,

        /// 1 to 10, only with --mood
        #[arg(long)]
        intensity: Option<i64>,

        /// Comma-separated tags
        #[arg(long, default_value = "")]
        tags: String,

        #[arg(long)]
        public: bool,
    },
    /// Print a page of the feed
    Feed {
        #[arg(long)]
        mood: Option<Mood>,

        #[arg(long)]
        favorites: bool,

        /// Pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Print the month grid
    Calendar {
        #[arg(long)]
        year: i32,

        #[arg(long)]
        month: u32,
    },
    /// Print one entry
    Show {
        #[arg(long)]
        id: i64,
    },
    /// Print summary statistics
    Stats,
    /// Sign in and print the access token
    Login {
        /// User name or e-mail
        #[arg(long)]
        username: String,

        #[arg(long, env = "MOODDIARY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and print its access token
    Register {
        #[arg(long)]
        email: String,

        #[arg(long)]
        username: String,

        #[arg(long, env = "MOODDIARY_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long)]
        full_name: Option<String>,
    },
    /// Print the profile, updating the given fields first
    Profile {
        #[arg(long)]
        full_name: Option<String>,

        #[arg(long)]
        bio: Option<String>,

        #[arg(long)]
        language: Option<String>,

        #[arg(long)]
        timezone: Option<String>,
    },
    /// Change stored settings and print them
    Config {
        #[arg(long)]
        api_url: Option<String>,

        /// `transfer` or `simulated`
        #[arg(long)]
        progress: Option<ProgressMode>,

        #[arg(long)]
        page_size: Option<u32>,
    },
}

#[derive(Serialize)]
struct SignedIn<'a> {
    access_token: &'a str,
    user: Option<&'a UserProfile>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let store = SettingsStore::new(args.settings.clone()).context("Failed to open settings")?;

    // Commands that need no signed-in user.
    let command = match args.command {
        Command::Config {
            api_url,
            progress,
            page_size,
        } => {
            let saved = store.update(|settings| {
                if let Some(url) = api_url {
                    settings.api_base_url = url;
                }
                if let Some(mode) = progress {
                    settings.upload.progress = mode;
                }
                if let Some(size) = page_size {
                    settings.feed_page_size = size;
                }
            })?;
            return print_json(&saved);
        }
        Command::Login { username, password } => {
            let client = ApiClient::from_settings(&store.current())?;
            let session = client.login(&username, &password).await?;
            return print_signed_in(&session);
        }
        Command::Register {
            email,
            username,
            password,
            full_name,
        } => {
            let client = ApiClient::from_settings(&store.current())?;
            let session = client
                .register(&Registration {
                    email,
                    username,
                    password,
                    full_name,
                })
                .await?;
            return print_signed_in(&session);
        }
        command => command,
    };

    let token = args
        .token
        .context("A token is required: pass --token or set MOODDIARY_TOKEN")?;
    let state = AppState::new(store.current(), SessionContext::new(token, None))
        .context("Failed to build API client")?;

    let result = match command {
        Command::Record {
            video,
            seconds,
            title,
            note,
            mood,
            intensity,
            tags,
            public,
        } => {
            let patch = DraftPatch {
                title: Some(title),
                note: Some(note),
                tags: Some(tags),
                is_private: Some(!public),
            };
            record(&state, video, seconds, mood, intensity, patch).await
        }
        Command::Feed {
            mood,
            favorites,
            pages,
        } => {
            let filter = FeedFilter {
                mood,
                favorites_only: favorites,
            };
            let mut view = feed::commands::load_feed(&state, filter)
                .await
                .map_err(anyhow::Error::msg)?;
            for _ in 1..pages {
                if !view.has_more {
                    break;
                }
                view = feed::commands::load_more_entries(&state)
                    .await
                    .map_err(anyhow::Error::msg)?;
            }
            print_json(&view)
        }
        Command::Calendar { year, month } => {
            let grid = feed::commands::month_calendar(&state, year, month)
                .await
                .map_err(anyhow::Error::msg)?;
            print_json(&grid)
        }
        Command::Show { id } => {
            let entry = feed::commands::get_entry(&state, id)
                .await
                .map_err(anyhow::Error::msg)?;
            print_json(&entry)
        }
        Command::Stats => {
            let stats = feed::commands::get_stats(&state)
                .await
                .map_err(anyhow::Error::msg)?;
            print_json(&stats)
        }
        Command::Profile {
            full_name,
            bio,
            language,
            timezone,
        } => {
            let update = ProfileUpdate {
                full_name,
                bio,
                language,
                timezone,
            };
            let profile = api::commands::update_profile(&state, update)
                .await
                .map_err(anyhow::Error::msg)?;
            print_json(&profile)
        }
        Command::Config { .. } | Command::Login { .. } | Command::Register { .. } => Ok(()),
    };

    state.shutdown().await;
    result
}

async fn record(
    state: &AppState,
    video: PathBuf,
    seconds: u64,
    mood: Option<Mood>,
    intensity: Option<i64>,
    patch: DraftPatch,
) -> Result<()> {
    let seconds = seconds.max(1);
    let device = FileDevice::spread_over(&video, seconds)
        .await
        .with_context(|| format!("Failed to read {}", video.display()))?;
    let (sink, mut ui_events) = ChannelSink::new();

    let snapshot = wizard::commands::open_wizard(state, Arc::new(device), Arc::new(sink))
        .await
        .map_err(anyhow::Error::msg)?;
    if !snapshot.stream_active {
        bail!("Camera stream could not be opened");
    }

    wizard::commands::start_recording(state)
        .await
        .map_err(anyhow::Error::msg)?;
    tokio::time::sleep(Duration::from_secs(seconds)).await;
    let snapshot = wizard::commands::stop_recording(state)
        .await
        .map_err(anyhow::Error::msg)?;
    if let Some(artifact) = &snapshot.artifact {
        info!("Recorded {} bytes", artifact.size_bytes);
    }

    wizard::commands::proceed_to_details(state)
        .await
        .map_err(anyhow::Error::msg)?;
    wizard::commands::update_draft(state, patch)
        .await
        .map_err(anyhow::Error::msg)?;
    if mood.is_some() {
        wizard::commands::set_mood(state, mood)
            .await
            .map_err(anyhow::Error::msg)?;
    }
    if let Some(value) = intensity {
        wizard::commands::set_mood_intensity(state, value)
            .await
            .map_err(anyhow::Error::msg)?;
    }

    let outcome = wizard::commands::submit_entry(state)
        .await
        .map_err(anyhow::Error::msg)?;
    print_json(&outcome)?;

    // The wizard leaves on its own once the success state has been shown.
    let navigated = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(event) = ui_events.recv().await {
            match event.name.as_str() {
                events::UPLOAD_PROGRESS => info!("progress {}", event.payload),
                events::NAVIGATE => return Some(event.payload),
                _ => {}
            }
        }
        None
    })
    .await;

    match navigated {
        Ok(Some(target)) => info!("Done, continuing to {target}"),
        _ => warn!("Wizard did not navigate away"),
    }
    Ok(())
}

fn print_signed_in(session: &SessionContext) -> Result<()> {
    print_json(&SignedIn {
        access_token: session.token(),
        user: session.user(),
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
