//! Sign-in, registration, and session commands.

use clap::Subcommand;
use secrecy::ExposeSecret;

use gifty_client::identity;

use crate::context::Context;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Print the federated sign-in URL; finish with `auth code`
    Url,
    /// Complete federated sign-in with the code from the callback
    Code {
        /// Authorization code returned by the identity provider
        code: String,
    },
    /// Sign in with email and password
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Register a new email/password account
    Register {
        /// Email address for the new account
        #[arg(short, long)]
        email: String,

        /// Password for the new account
        #[arg(short, long)]
        password: String,

        /// Display name
        #[arg(short, long)]
        username: String,
    },
    /// Re-check verification state after following the emailed link
    Verify,
    /// Resend the verification email
    ResendVerification,
    /// Sign out and revoke the stored session
    Logout,
}

pub async fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AuthAction::Url => {
            let config = gifty_client::GiftyConfig::from_env()?;
            let client = identity::IdentityClient::new(&config.identity);
            let state = identity::generate_state();
            println!("Open this URL to sign in, then run `gifty auth code <code>`:");
            println!("{}", client.authorization_url(&state));
        }
        AuthAction::Code { code } => {
            let mut ctx = Context::anonymous()?;
            ctx.session.sign_in_with_provider(&code).await?;
            print_session_hint(&ctx);
        }
        AuthAction::Login { email, password } => {
            let mut ctx = Context::anonymous()?;
            ctx.session.sign_in_with_password(&email, &password).await?;
            print_session_hint(&ctx);
        }
        AuthAction::Register {
            email,
            password,
            username,
        } => {
            let mut ctx = Context::anonymous()?;
            ctx.session
                .register_with_email(&email, &password, &username)
                .await?;
            println!("Account created. We sent a verification email to {email}.");
            print_session_hint(&ctx);
        }
        AuthAction::Verify => {
            let config = gifty_client::GiftyConfig::from_env()?;
            let refresh_token = config
                .refresh_token
                .clone()
                .ok_or(crate::context::ContextError::NotSignedIn)?;
            let mut ctx = Context::anonymous()?;
            ctx.session.resume(refresh_token).await;
            ctx.session.refresh_identity().await?;
            match ctx.session.identity() {
                Some(identity) if !identity.needs_verification() => {
                    println!("Email verified. You're all set.");
                }
                Some(_) => println!("Still not verified. Check your inbox."),
                None => println!("Not signed in."),
            }
        }
        AuthAction::ResendVerification => {
            let ctx = resumed_session().await?;
            ctx.session.resend_verification().await?;
            println!("Verification email sent again.");
        }
        AuthAction::Logout => {
            let mut ctx = resumed_session().await?;
            ctx.session.sign_out().await;
            println!("Signed out. Remove GIFTY_REFRESH_TOKEN from your environment.");
        }
    }
    Ok(())
}

pub async fn whoami() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::signed_in().await?;

    if let Some(identity) = ctx.session.identity() {
        println!("Identity: {} <{}>", identity.subject, identity.email);
    }
    if let Some(profile) = ctx.session.profile() {
        println!("Profile:  {} ({})", profile.username, profile.id);
        if !profile.bio.is_empty() {
            println!("Bio:      {}", profile.bio);
        }
    }
    Ok(())
}

/// Resume the stored session without enforcing the route guard, for
/// commands that must work while unverified (logout, resend).
async fn resumed_session() -> Result<Context, Box<dyn std::error::Error>> {
    let config = gifty_client::GiftyConfig::from_env()?;
    let refresh_token = config
        .refresh_token
        .clone()
        .ok_or(crate::context::ContextError::NotSignedIn)?;
    let mut ctx = Context::anonymous()?;
    ctx.session.resume(refresh_token).await;
    Ok(ctx)
}

fn print_session_hint(ctx: &Context) {
    if let Some(token) = ctx.session.refresh_token() {
        println!("Signed in. To persist this session:");
        println!("export GIFTY_REFRESH_TOKEN={}", token.expose_secret());
    }
}
