//! Wishlist management commands.

use clap::Subcommand;

use gifty_core::WishlistId;

use crate::context::{Context, confirm};

#[derive(Subcommand)]
pub enum WishlistAction {
    /// List your wishlists in display order
    List,
    /// Create a wishlist
    Create {
        /// Name of the new wishlist
        name: String,
    },
    /// Rename a wishlist
    Rename {
        /// Wishlist ID
        id: String,

        /// New name
        name: String,
    },
    /// Move a wishlist to a new position (zero-based)
    Reorder {
        /// Wishlist ID to move
        id: String,

        /// Target position
        to: usize,
    },
    /// Delete a wishlist and everything in it
    Delete {
        /// Wishlist ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

pub async fn run(action: WishlistAction) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::signed_in().await?;
    let mut store = ctx.loaded_store().await?;

    match action {
        WishlistAction::List => {
            if store.wishlists().is_empty() {
                println!("No wishlists yet. Create one with `gifty wishlist create <name>`.");
            }
            for wishlist in store.wishlists() {
                let count = store.items(&wishlist.id).len();
                println!("{}  {}  ({count} items)", wishlist.id, wishlist.name);
            }
        }
        WishlistAction::Create { name } => {
            if let Err(e) = store.create_wishlist(&ctx.session, &name).await {
                println!("{}", e.notice());
                return Err(e.into());
            }
            println!("Created \"{}\".", name.trim());
        }
        WishlistAction::Rename { id, name } => {
            let id = WishlistId::new(id);
            if let Err(e) = store.rename_wishlist(&ctx.session, &id, &name).await {
                println!("{}", e.notice());
                return Err(e.into());
            }
            println!("Renamed.");
        }
        WishlistAction::Reorder { id, to } => {
            let id = WishlistId::new(id);
            let from = store
                .wishlists()
                .iter()
                .position(|w| w.id == id)
                .ok_or("no such wishlist")?;
            if let Err(e) = store.reorder_wishlists(&ctx.session, from, to).await {
                println!("{}", e.notice());
                return Err(e.into());
            }
            println!("Order saved.");
        }
        WishlistAction::Delete { id, yes } => {
            let id = WishlistId::new(id);
            let pending = store.request_delete_wishlist(&id)?;
            if !confirm(&pending.prompt(), yes) {
                println!("Cancelled.");
                return Ok(());
            }
            if let Err(e) = store.confirm_delete(&ctx.session, pending).await {
                println!("{}", e.notice());
                return Err(e.into());
            }
            println!("Deleted.");
        }
    }
    Ok(())
}
