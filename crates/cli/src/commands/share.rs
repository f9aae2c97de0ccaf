//! Share link commands.

use clap::Subcommand;

use gifty_core::{ItemId, ShareCode, WishlistId};
use gifty_client::share::{self, ShareResolver, ShareState};
use gifty_client::store;

use crate::context::{Context, confirm};

#[derive(Subcommand)]
pub enum ShareAction {
    /// Generate a share link for one of your wishlists
    Generate {
        /// Wishlist ID
        wishlist: String,
    },
    /// Resolve a share code and show the wishlist behind it
    Show {
        /// Share code from a link you received
        code: String,
    },
    /// Reserve an item on a shared wishlist, or release your reservation
    Reserve {
        /// Share code from a link you received
        code: String,

        /// Item ID
        item: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

pub async fn run(action: ShareAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ShareAction::Generate { wishlist } => {
            let config = gifty_client::GiftyConfig::from_env()?;
            let ctx = Context::signed_in().await?;
            let store = ctx.loaded_store().await?;
            let wishlist = WishlistId::new(wishlist);
            let code = store.generate_share_link(&ctx.session, &wishlist).await?;
            println!("Share code: {code}");
            if let Some(base) = &config.app_base_url {
                println!("Share URL:  {}", store::share_url(base.as_str(), &code));
            }
        }
        ShareAction::Show { code } => {
            let code = ShareCode::new(code).ok_or("share code cannot be empty")?;

            // Anonymous lookup works; a stored session personalizes it.
            let ctx = match Context::signed_in().await {
                Ok(ctx) => Some(ctx),
                Err(_) => None,
            };
            let api = match &ctx {
                Some(ctx) => ctx.api.clone(),
                None => Context::anonymous()?.api,
            };

            let mut resolver = ShareResolver::new(api, code);
            resolver.resolve(ctx.as_ref().map(|c| &c.session)).await?;

            match resolver.state() {
                ShareState::Resolved(wishlist) => {
                    println!("{} (shared by {})", wishlist.name, wishlist.user_id);
                    for item in &wishlist.items {
                        let status = if item.is_reserved { "  [reserved]" } else { "" };
                        println!("{}  {}  {}{status}", item.id, item.name, item.link);
                    }
                }
                ShareState::InvalidOrExpired => {
                    println!("This share link is invalid or has expired.");
                }
                ShareState::Loading => unreachable!("resolve() always leaves a terminal state or errors"),
            }
        }
        ShareAction::Reserve { code, item, yes } => {
            let code = ShareCode::new(code).ok_or("share code cannot be empty")?;
            let ctx = Context::signed_in().await?;

            let mut resolver = ShareResolver::new(ctx.api.clone(), code);
            resolver.resolve(Some(&ctx.session)).await?;
            if matches!(resolver.state(), ShareState::InvalidOrExpired) {
                println!("This share link is invalid or has expired.");
                return Err("unknown share code".into());
            }

            let item = ItemId::new(item);
            let pending = match resolver.request_reservation_toggle(Some(&ctx.session), &item) {
                Ok(pending) => pending,
                Err(e) => {
                    println!("{}", e.notice());
                    return Err(e.into());
                }
            };
            if !confirm(&pending.prompt(), yes) {
                println!("Cancelled.");
                return Ok(());
            }
            if let Err(e) = resolver.confirm_reservation_toggle(&ctx.session, pending).await {
                // Surfaces the backend's own copy for domain rejections,
                // e.g. "You can only reserve 1 item per wishlist."
                println!("{}", e.notice());
                return Err(e.into());
            }
            println!("Done.");
        }
    }
    Ok(())
}

pub async fn shared_with_me() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::signed_in().await?;
    let groups = share::shared_with_me(&ctx.api, &ctx.session).await?;

    if groups.is_empty() {
        println!("Nothing has been shared with you yet.");
    }
    for group in groups {
        println!("From {}:", group.owner_name);
        for wishlist in group.wishlists {
            println!("  {}  {}  ({} items)", wishlist.id, wishlist.name, wishlist.items.len());
        }
    }
    Ok(())
}
