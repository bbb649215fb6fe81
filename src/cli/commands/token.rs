use chrono::{TimeZone, Utc};
use clap::Args;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{Claims, JwtKeys};
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "User id the token authenticates")]
    pub user: Uuid,

    #[arg(long, help = "Validity in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
    pub hours: Option<u64>,
}

pub fn handle(args: TokenArgs, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let keys = JwtKeys::from_secret(&config.security.jwt_secret)?;
    let claims = Claims::new(args.user, args.hours.unwrap_or(config.security.jwt_expiry_hours))?;
    let token = keys.generate(&claims)?;

    match output_format {
        OutputFormat::Text => println!("{}", token),
        OutputFormat::Json => {
            let expires_at = Utc.timestamp_opt(claims.exp, 0).single();
            println!(
                "{}",
                json!({
                    "token": token,
                    "user": claims.sub,
                    "expires_at": expires_at,
                })
            );
        }
    }

    Ok(())
}
