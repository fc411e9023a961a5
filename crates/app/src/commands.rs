use std::{collections::HashMap, fs, path::PathBuf, sync::Arc};

use api_types::{
    Platform,
    request::{RequestKey, RequestMeta},
};
use chrono::DateTime;
use chrono_tz::Tz;
use clap::{Parser, Subcommand, ValueEnum};
use client::{
    ApiClients, FileStorage, Navigator, OutcomeRouter, QueryClient, Routes, Storage, storage::AUTH_TOKEN,
    token,
};
use formatting::{dates, export, mask};
use reqwest::Method;
use serde_json::Value;

use crate::{
    error::{AppError, Result},
    settings::Settings,
};

#[derive(Debug, Parser)]
#[command(name = "portal", disable_version_flag = true)]
pub struct Args {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override log level.
    #[arg(long, global = true)]
    pub level: Option<String>,
    /// Override the platform whose routes receive navigation.
    #[arg(long, global = true, value_parser = parse_platform)]
    pub platform: Option<Platform>,
    /// Override the core API base URL.
    #[arg(long, global = true)]
    pub core_url: Option<String>,
    /// Override the auth API base URL.
    #[arg(long, global = true)]
    pub auth_url: Option<String>,
    /// Override the local storage file.
    #[arg(long, global = true)]
    pub storage: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

fn parse_platform(value: &str) -> std::result::Result<Platform, String> {
    match value.to_ascii_lowercase().as_str() {
        "gestao" => Ok(Platform::Gestao),
        "sellers" => Ok(Platform::Sellers),
        other => Err(format!("unknown platform {other:?} (expected gestao or sellers)")),
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect or change the stored auth token.
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
    /// Send a request and print the route state it leaves behind.
    Request {
        api: ApiTarget,
        method: String,
        path: String,
        /// JSON request body.
        #[arg(long)]
        body: Option<String>,
        /// Request key parts; queries default to the path.
        #[arg(long = "key")]
        key: Vec<String>,
        #[arg(long)]
        success: Option<String>,
        #[arg(long)]
        error: Option<String>,
        #[arg(long)]
        conflict: Option<String>,
        /// Run as a mutation instead of a query.
        #[arg(long)]
        mutation: bool,
    },
    /// Export a JSON array of objects as CSV.
    Export {
        input: PathBuf,
        output: PathBuf,
        /// JSON object mapping keys to column labels.
        #[arg(long)]
        headers: Option<PathBuf>,
    },
    /// Apply an input mask.
    Mask { kind: MaskKind, value: String },
}

#[derive(Debug, Subcommand)]
pub enum TokenAction {
    Status,
    Set { token: String },
    Clear,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ApiTarget {
    Core,
    Auth,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MaskKind {
    Phone,
    Cnpj,
    Cep,
    Weight,
    Currency,
    Number,
    Text,
    Nf,
    Special,
    Percentage,
    PercentageDecimal,
}

pub async fn run(command: Command, settings: &Settings) -> Result<()> {
    match command {
        Command::Token { action } => run_token(action, settings),
        Command::Request {
            api,
            method,
            path,
            body,
            key,
            success,
            error,
            conflict,
            mutation,
        } => {
            let meta = (success.is_some() || error.is_some() || conflict.is_some()).then_some(
                RequestMeta {
                    success,
                    error,
                    conflict,
                },
            );
            let request = Request {
                api,
                method,
                path,
                body,
                key,
                meta,
                mutation,
            };
            run_request(request, settings).await
        }
        Command::Export {
            input,
            output,
            headers,
        } => run_export(&input, &output, headers.as_deref()),
        Command::Mask { kind, value } => {
            println!("{}", apply_mask(kind, &value)?);
            Ok(())
        }
    }
}

fn storage(settings: &Settings) -> Arc<dyn Storage> {
    Arc::new(FileStorage::new(&settings.storage.path))
}

fn run_token(action: TokenAction, settings: &Settings) -> Result<()> {
    let storage = storage(settings);
    match action {
        TokenAction::Status => {
            let Some(stored) = storage.get_item(AUTH_TOKEN)? else {
                println!("no token stored");
                return Ok(());
            };
            let tz: Tz = settings
                .app
                .timezone
                .parse()
                .map_err(|err| AppError::InvalidArgument(format!("timezone: {err}")))?;

            let claims = token::decode_claims(&stored).map_err(client::ClientError::from)?;
            let expires = match claims.exp {
                None => "never".to_string(),
                Some(exp) => exp
                    .and_then(|exp| DateTime::from_timestamp(exp as i64, 0))
                    .map(|exp| dates::format_date(&exp.with_timezone(&tz).naive_local(), true))
                    .unwrap_or_else(|| "invalid".to_string()),
            };
            let valid = token::get_auth_token(storage.as_ref())?.is_some();

            println!("expires: {expires}");
            println!("valid:   {valid}");
        }
        TokenAction::Set { token: value } => {
            token::store_auth_token(storage.as_ref(), &value)?;
            println!("token stored");
        }
        TokenAction::Clear => {
            token::clear_auth_token(storage.as_ref())?;
            println!("token cleared");
        }
    }
    Ok(())
}

struct Request {
    api: ApiTarget,
    method: String,
    path: String,
    body: Option<String>,
    key: Vec<String>,
    meta: Option<RequestMeta>,
    mutation: bool,
}

async fn run_request(request: Request, settings: &Settings) -> Result<()> {
    let clients = ApiClients::new(&settings.api, storage(settings))?;
    let client = match request.api {
        ApiTarget::Core => &clients.core,
        ApiTarget::Auth => &clients.auth,
    };
    let method = Method::from_bytes(request.method.to_ascii_uppercase().as_bytes())
        .map_err(|err| AppError::InvalidArgument(format!("method: {err}")))?;
    let body: Option<Value> = request.body.as_deref().map(serde_json::from_str).transpose()?;

    // Chosen once; every outcome of this process lands on the same tree.
    let routes = Routes::default();
    let tree = routes.select(settings.app.platform);
    let queries = QueryClient::new(OutcomeRouter::new(tree.clone()));

    let path = request.path.as_str();
    let operation = async {
        let mut builder = client.request(method, path)?;
        if let Some(body) = &body {
            builder = builder.json(body);
        }
        client.send::<Value>(builder).await
    };

    let key = (!request.key.is_empty()).then(|| RequestKey::new(request.key.clone()));
    let result = if request.mutation {
        queries.mutate(key, request.meta, operation).await
    } else {
        let key = key.unwrap_or_else(|| RequestKey::new([path]));
        queries.query(key, request.meta, operation).await
    };

    match result {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(err) => {
            tracing::debug!("request failed: {err}");
            println!("error: {}", err.message_or(&err.to_string()));
        }
    }

    let current = tree.current();
    println!(
        "route [{}] {} state: {}",
        tree.platform().as_str(),
        current.path,
        serde_json::to_string(&tree.location_state())?
    );
    Ok(())
}

fn run_export(input: &std::path::Path, output: &std::path::Path, headers: Option<&std::path::Path>) -> Result<()> {
    let records = export::records_from_json(serde_json::from_str(&fs::read_to_string(input)?)?)?;
    let headers: Option<HashMap<String, String>> = headers
        .map(|path| -> Result<_> { Ok(serde_json::from_str(&fs::read_to_string(path)?)?) })
        .transpose()?;

    let sheet = export::export_to_csv(&records, output, headers.as_ref(), None)?;
    println!(
        "{} rows, {} columns written to {}",
        sheet.rows.len(),
        sheet.columns.len(),
        output.display()
    );
    Ok(())
}

fn apply_mask(kind: MaskKind, value: &str) -> Result<String> {
    let masked = match kind {
        MaskKind::Phone => mask::mask_phone(Some(value)),
        MaskKind::Cnpj => mask::normalize_cnpj(Some(value)),
        MaskKind::Cep => mask::normalize_cep(Some(value)),
        MaskKind::Weight => {
            let weight = value
                .replace(',', ".")
                .parse::<f64>()
                .map_err(|err| AppError::InvalidArgument(format!("weight: {err}")))?;
            mask::normalize_weight(Some(weight))
        }
        MaskKind::Currency => mask::remove_normalize_currency(Some(value)),
        MaskKind::Number => mask::normalize_only_number(Some(value)),
        MaskKind::Text => mask::normalize_only_string(Some(value)),
        MaskKind::Nf => mask::normalize_nf_number(Some(value)),
        MaskKind::Special => mask::remove_special_chars(Some(value)),
        MaskKind::Percentage => mask::normalize_percentage(value, false),
        MaskKind::PercentageDecimal => mask::normalize_percentage(value, true),
    };
    Ok(masked)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_platform_case_insensitively() {
        assert_eq!(parse_platform("Sellers").unwrap(), Platform::Sellers);
        assert_eq!(parse_platform("gestao").unwrap(), Platform::Gestao);
        assert!(parse_platform("admin").is_err());
    }

    #[test]
    fn request_flags_parse() {
        let args = Args::try_parse_from([
            "portal",
            "--platform",
            "sellers",
            "request",
            "core",
            "post",
            "/orders",
            "--key",
            "orders",
            "--key",
            "new",
            "--conflict",
            "Already exists",
            "--mutation",
        ])
        .unwrap();

        assert_eq!(args.platform, Some(Platform::Sellers));
        let Command::Request {
            key,
            conflict,
            mutation,
            ..
        } = args.command
        else {
            panic!("expected request command");
        };
        assert_eq!(key, ["orders", "new"]);
        assert_eq!(conflict.as_deref(), Some("Already exists"));
        assert!(mutation);
    }

    #[test]
    fn masks_dispatch() {
        assert_eq!(apply_mask(MaskKind::Cep, "01310100").unwrap(), "01310-100");
        assert_eq!(apply_mask(MaskKind::Weight, "12,5").unwrap(), "12,5 Kg");
        assert_eq!(apply_mask(MaskKind::PercentageDecimal, "250").unwrap(), "100,00");
        assert!(apply_mask(MaskKind::Weight, "heavy").is_err());
    }
}
