//! Profile self-service commands.

use clap::Subcommand;

use gifty_client::api::ProfileUpdate;

use crate::context::Context;

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show your profile
    Show,
    /// Update profile fields; omitted flags keep their current value
    Update {
        /// New display name
        #[arg(long)]
        username: Option<String>,

        /// New bio
        #[arg(long)]
        bio: Option<String>,

        /// New avatar URL
        #[arg(long)]
        avatar: Option<String>,
    },
}

pub async fn run(action: ProfileAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctx = Context::signed_in().await?;

    match action {
        ProfileAction::Show => {
            let profile = ctx.session.profile().ok_or("profile not loaded")?;
            println!("Username: {}", profile.username);
            println!("Email:    {}", profile.email);
            if !profile.bio.is_empty() {
                println!("Bio:      {}", profile.bio);
            }
            if !profile.avatar_url.is_empty() {
                println!("Avatar:   {}", profile.avatar_url);
            }
        }
        ProfileAction::Update {
            username,
            bio,
            avatar,
        } => {
            let current = ctx.session.profile().cloned().ok_or("profile not loaded")?;
            let update = ProfileUpdate {
                username: username.unwrap_or(current.username),
                bio: bio.unwrap_or(current.bio),
                avatar_url: avatar.unwrap_or(current.avatar_url),
            };
            ctx.session.update_profile(&update).await?;
            println!("Profile updated.");
        }
    }
    Ok(())
}
