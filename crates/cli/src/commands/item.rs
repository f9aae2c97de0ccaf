//! Item commands for your own wishlists.
//!
//! Reserving on someone else's wishlist goes through `gifty share reserve`;
//! the personal store only ever holds your own wishlists.

use clap::Subcommand;

use gifty_core::{ItemId, WishlistId};

use crate::context::{Context, confirm};

#[derive(Subcommand)]
pub enum ItemAction {
    /// List the items of a wishlist
    List {
        /// Wishlist ID
        wishlist: String,
    },
    /// Add an item to a wishlist
    Add {
        /// Wishlist ID
        wishlist: String,

        /// Item name
        name: String,

        /// Link to the item
        link: String,
    },
    /// Replace an item's name and link
    Edit {
        /// Item ID
        id: String,

        /// New name
        name: String,

        /// New link
        link: String,
    },
    /// Delete an item
    Delete {
        /// Item ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

pub async fn run(action: ItemAction) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::signed_in().await?;
    let mut store = ctx.loaded_store().await?;

    match action {
        ItemAction::List { wishlist } => {
            let wishlist = WishlistId::new(wishlist);
            for item in store.items(&wishlist) {
                let status = match &item.reserved_by {
                    Some(user) if Some(user) == ctx.session.current_user_id() => {
                        "  [reserved by you]"
                    }
                    Some(_) => "  [reserved]",
                    None => "",
                };
                println!("{}  {}  {}{status}", item.id, item.name, item.link);
            }
        }
        ItemAction::Add {
            wishlist,
            name,
            link,
        } => {
            let wishlist = WishlistId::new(wishlist);
            if let Err(e) = store.add_item(&ctx.session, &wishlist, &name, &link).await {
                println!("{}", e.notice());
                return Err(e.into());
            }
            println!("Added \"{}\".", name.trim());
        }
        ItemAction::Edit { id, name, link } => {
            let id = ItemId::new(id);
            if let Err(e) = store.edit_item(&ctx.session, &id, &name, &link).await {
                println!("{}", e.notice());
                return Err(e.into());
            }
            println!("Updated.");
        }
        ItemAction::Delete { id, yes } => {
            let id = ItemId::new(id);
            let pending = store.request_delete_item(&id)?;
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
