use std::io::{self, Write};

use anyhow::{Result, anyhow};

use crate::core::AppConfig;
use crate::google::oauth::{Credentials, authorization_code, consent_url, exchange_code_for_token};

/// Run the installed app consent flow and store the refresh token in
/// the credentials file.
pub async fn run(config: &AppConfig) -> Result<()> {
    let mut credentials = Credentials::from_file(&config.credentials_path)?;

    let auth_url = consent_url(&credentials.client_id, &config.redirect_uri);
    println!(
        "\nPlease open the following URL in your browser and authorize access:\n\n{}\n",
        auth_url
    );
    println!(
        "After approving, your browser is sent to {}. The page may not load.",
        config.redirect_uri
    );
    print!("Paste the full URL from the address bar, or just the code: ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let code = authorization_code(&input)?;

    let token = exchange_code_for_token(
        credentials.token_url(),
        &credentials.client_id,
        &credentials.client_secret,
        &code,
        &config.redirect_uri,
    )
    .await?;
    let refresh_token = token
        .refresh_token
        .ok_or(anyhow!("No refresh token in response"))?;

    credentials.refresh_token = Some(refresh_token);
    credentials.save(&config.credentials_path)?;
    println!("Refresh token saved to {}", config.credentials_path);

    Ok(())
}
