//! audience-lists - page through user lists from a discovery node
//!
//! Loads the entity the list is about, then drives a `UserListStore` for the
//! requested number of pages and prints one JSON line per user.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use audience_common::config::ConfigResolver;
use audience_common::events::{EventBus, ListEvent};
use audience_common::models::{Collection, Id, Track};
use audience_lists::api::DiscoveryClient;
use audience_lists::repository::{
    AccountRepository, EntityRepository, InMemoryAccount, InMemoryCollectionRepository,
    InMemorySupportersStore, InMemoryTrackRepository, InMemoryUserCache, SupportersStore, UserCache,
};
use audience_lists::sources::{
    Engagement, EngagementSource, SocialKind, SocialSource, TippingKind, TippingSource,
};
use audience_lists::{UserListProvider, UserListSource, UserListStore};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ListKind {
    Followers,
    Following,
    Mutuals,
    Supporters,
    Supporting,
    TrackReposts,
    TrackFavorites,
    PlaylistReposts,
    PlaylistFavorites,
}

/// Command-line arguments for audience-lists
#[derive(Parser, Debug)]
#[command(name = "audience-lists")]
#[command(about = "Page through follower, repost and supporter lists")]
#[command(version)]
struct Args {
    /// Which list to load
    #[arg(value_enum)]
    kind: ListKind,

    /// User, track or playlist id the list is about
    id: Id,

    /// Number of pages to load
    #[arg(long, default_value_t = 1)]
    pages: u32,

    /// Users per page (defaults to lists.page_size from config)
    #[arg(long)]
    page_size: Option<u32>,

    /// Act as this logged-in user
    #[arg(long, env = "AUDIENCE_USER_ID")]
    user_id: Option<Id>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Discovery node base URL (overrides config)
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ConfigResolver::new(args.config.clone())
        .resolve()
        .context("Failed to load configuration")?;
    if let Some(base_url) = &args.base_url {
        config.api.base_url = base_url.clone();
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        "Starting audience-lists v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Discovery node: {}", config.api.base_url);

    let page_size = args.page_size.unwrap_or(config.lists.page_size);
    if page_size == 0 {
        bail!("--page-size must be greater than 0");
    }

    let client = Arc::new(DiscoveryClient::new(&config.api)?);
    let users = Arc::new(InMemoryUserCache::new());
    let account = Arc::new(InMemoryAccount::new());

    if let Some(user_id) = args.user_id {
        let me = client
            .get_user(user_id, None)
            .await?
            .with_context(|| format!("Logged-in user {} not found", user_id))?;
        info!("Acting as @{}", me.handle);
        users.upsert_users(&[me.clone()]);
        account.sign_in(me);
    }

    let events = Arc::new(EventBus::new(100));
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            match event {
                ListEvent::PageLoaded { list, page, total, has_more, .. } => {
                    info!(list = %list, page, total, has_more, "Page loaded")
                }
                other => debug!(?other, "List event"),
            }
        }
    });

    let ctx = RunContext {
        id: args.id,
        pages: args.pages,
        page_size,
        users: users.clone(),
        account: account.clone(),
        events,
    };
    let viewer = account.current_user_id();

    let (ids, supporters) = match args.kind {
        ListKind::Followers | ListKind::Following | ListKind::Mutuals => {
            seed_user(&client, &users, args.id, viewer).await?;
            let kind = match args.kind {
                ListKind::Followers => SocialKind::Followers,
                ListKind::Following => SocialKind::Following,
                _ => SocialKind::Mutuals,
            };
            let source = SocialSource::new(kind, client.clone(), users.clone());
            (ctx.page_through(source).await?, None)
        }
        ListKind::Supporters | ListKind::Supporting => {
            seed_user(&client, &users, args.id, viewer).await?;
            let kind = match args.kind {
                ListKind::Supporters => TippingKind::Supporters,
                _ => TippingKind::Supporting,
            };
            let store = Arc::new(InMemorySupportersStore::new());
            let source = TippingSource::new(kind, client.clone(), users.clone(), store.clone());
            (ctx.page_through(source).await?, Some((kind, store)))
        }
        ListKind::TrackReposts | ListKind::TrackFavorites => {
            let track = client
                .get_track(args.id, viewer)
                .await?
                .with_context(|| format!("Track {} not found", args.id))?;
            let tracks = Arc::new(InMemoryTrackRepository::new());
            tracks.upsert(vec![track]);
            let engagement = engagement_for(args.kind);
            let source = EngagementSource::<Track>::new(engagement, client.clone(), tracks);
            (ctx.page_through(source).await?, None)
        }
        ListKind::PlaylistReposts | ListKind::PlaylistFavorites => {
            let playlist = client
                .get_playlist(args.id, viewer)
                .await?
                .with_context(|| format!("Playlist {} not found", args.id))?;
            let collections = Arc::new(InMemoryCollectionRepository::new());
            collections.upsert(vec![playlist]);
            let engagement = engagement_for(args.kind);
            let source = EngagementSource::<Collection>::new(engagement, client.clone(), collections);
            (ctx.page_through(source).await?, None)
        }
    };

    for user in users.get_users(&ids) {
        let mut line = serde_json::json!({
            "user_id": user.user_id,
            "name": user.name,
            "handle": user.handle,
        });
        if let Some((kind, store)) = &supporters {
            let records = match kind {
                TippingKind::Supporters => store.supporters_for_user(args.id),
                TippingKind::Supporting => store.supporting_for_user(args.id),
            };
            let record = records.iter().find(|r| match kind {
                TippingKind::Supporters => r.sender_id == user.user_id,
                TippingKind::Supporting => r.receiver_id == user.user_id,
            });
            if let Some(record) = record {
                line["rank"] = record.rank.into();
                line["amount"] = record.amount.clone().into();
            }
        }
        println!("{}", line);
    }

    Ok(())
}

fn engagement_for(kind: ListKind) -> Engagement {
    match kind {
        ListKind::TrackFavorites | ListKind::PlaylistFavorites => Engagement::Favorites,
        _ => Engagement::Reposts,
    }
}

async fn seed_user(client: &DiscoveryClient, users: &InMemoryUserCache, id: Id, viewer: Option<Id>) -> Result<()> {
    let user = client
        .get_user(id, viewer)
        .await?
        .with_context(|| format!("User {} not found", id))?;
    users.upsert_users(&[user]);
    Ok(())
}

struct RunContext {
    id: Id,
    pages: u32,
    page_size: u32,
    users: Arc<InMemoryUserCache>,
    account: Arc<InMemoryAccount>,
    events: Arc<EventBus>,
}

impl RunContext {
    /// Load up to `pages` pages and return the merged id list
    async fn page_through<S: UserListSource>(&self, source: S) -> Result<Vec<Id>> {
        let provider = Arc::new(UserListProvider::new(
            source,
            self.users.clone(),
            self.account.clone(),
        ));
        let store = UserListStore::new(provider, self.events.clone(), self.page_size);
        store.open(self.id);

        for _ in 0..self.pages {
            if store.load_more().await?.is_none() {
                break;
            }
        }

        Ok(store.snapshot().user_ids)
    }
}
