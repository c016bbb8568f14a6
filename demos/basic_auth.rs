//! Basic authentication example.
//!
//! This example runs the TAN-confirmed login against the comdirect API,
//! lists account balances and revokes the session token again.
//!
//! Credentials are read from `COMDIRECT_CLIENT_ID`, `COMDIRECT_CLIENT_SECRET`,
//! `COMDIRECT_ACCESS_NUMBER` and `COMDIRECT_PIN`.
//!
//! Run with: cargo run --example basic_auth

use tokio::io::{AsyncBufReadExt, BufReader};

use comdirect_rs::{ComdirectClient, RefresherConfig};

#[tokio::main]
async fn main() -> comdirect_rs::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let client = ComdirectClient::from_env()?;

    println!("Logging in...");

    let token = client
        .authenticate(|challenge| async move {
            println!(
                "Please confirm challenge {} ({}) in your app, then press Enter",
                challenge.id, challenge.typ
            );
            let mut line = String::new();
            BufReader::new(tokio::io::stdin())
                .read_line(&mut line)
                .await
                .map_err(|e| comdirect_rs::Error::TwoFactorFailed(e.to_string()))?;
            Ok(())
        })
        .await?;

    println!("Successfully authenticated! Session {}", token.session_guid());

    let refresher = client.spawn_auto_refresh(RefresherConfig::default());

    let balances = client.accounts().balances(&token, false).await?;
    println!("\nFound {} account(s):", balances.values.len());
    for balance in &balances.values {
        let iban = balance
            .account
            .as_ref()
            .and_then(|a| a.iban.as_deref())
            .unwrap_or("-");
        println!(
            "  - {} ({}): {} {}",
            balance.account_id, iban, balance.balance.value, balance.balance.unit
        );
    }

    let depots = client.depots().list(&token).await?;
    println!("\nFound {} depot(s)", depots.values.len());

    refresher.shutdown().await;
    client.revoke_token(&token).await?;

    println!("\nDone!");
    Ok(())
}
