use std::fs;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use rti_core::{CredentialSet, OAuthToken, RtiError, RtiResult, TokenManager};

use crate::cli::args::{AuthUrlArgs, ExchangeArgs, RefreshArgs, TokenArgs};
use crate::exit_codes::SUCCESS;

pub fn auth_url(args: AuthUrlArgs) -> anyhow::Result<i32> {
    let manager = TokenManager::from_env()?;
    let request = manager.authorization_request(
        &args.client_id,
        &args.redirect_uri,
        &args.scope,
        args.environment,
    )?;

    println!("{}", request.url);
    eprintln!("state: {}", request.state);
    Ok(SUCCESS)
}

pub async fn exchange(args: ExchangeArgs) -> anyhow::Result<i32> {
    let manager = TokenManager::from_env()?;
    let token = manager
        .exchange_code_for_token(
            &args.code,
            &args.client.client_id,
            &args.client.client_secret,
            &args.redirect_uri,
            args.client.environment,
        )
        .await?;

    if let Some(path) = &args.save {
        let mut credentials = CredentialSet {
            client_id: Some(args.client.client_id.clone()),
            client_secret: Some(args.client.client_secret.clone()),
            environment: args.client.environment,
            ..CredentialSet::default()
        };
        credentials.apply_token(&token)?;
        write_credentials(path, &credentials)?;
        tracing::info!(path = %path.display(), "saved credentials");
    }

    print_token(&token)?;
    Ok(SUCCESS)
}

pub async fn refresh(args: RefreshArgs) -> anyhow::Result<i32> {
    let manager = TokenManager::from_env()?;
    let token = manager
        .refresh_access_token(
            &args.refresh_token,
            &args.client.client_id,
            &args.client.client_secret,
            args.client.environment,
        )
        .await?;

    print_token(&token)?;
    Ok(SUCCESS)
}

pub async fn token(args: TokenArgs) -> anyhow::Result<i32> {
    let raw = fs::read_to_string(&args.credentials)
        .with_context(|| format!("failed to read {}", args.credentials.display()))?;
    let credentials: CredentialSet = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", args.credentials.display()))?;

    let manager = TokenManager::from_env()?;
    let stored = Mutex::new(credentials.clone());
    let path = args.credentials.as_path();
    let persist = |token: &OAuthToken| -> RtiResult<()> {
        let mut stored = stored.lock().unwrap_or_else(|e| e.into_inner());
        stored.apply_token(token)?;
        write_credentials(path, &stored)
    };

    let access_token = manager
        .get_valid_access_token(&credentials, Some(&persist))
        .await?;

    println!("{}", access_token);
    Ok(SUCCESS)
}

fn print_token(token: &OAuthToken) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(token)?);
    Ok(())
}

/// Write the credentials file via temp file and rename.
fn write_credentials(path: &Path, credentials: &CredentialSet) -> RtiResult<()> {
    let store_err = |e: std::io::Error| RtiError::Store {
        message: format!("failed to write {}: {}", path.display(), e),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(store_err)?;
    }

    let json = serde_json::to_vec_pretty(credentials).map_err(|e| RtiError::Store {
        message: format!("failed to serialize credentials: {}", e),
    })?;

    let tmp = path.with_extension(format!("tmp.{}", std::process::id()));
    fs::write(&tmp, json).map_err(store_err)?;
    fs::rename(&tmp, path).map_err(store_err)?;
    Ok(())
}
