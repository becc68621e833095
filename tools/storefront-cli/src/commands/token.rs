//! Token commands.

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use storefront_codec::{Clock, DeepLinkParam, DeepLinkQuery, Envelope, SystemClock};

use super::{query_part, read_json, TokenArgs, TokenCommand};
use crate::context::Context;

/// Run the token command.
pub fn run(args: TokenArgs, ctx: &Context) -> Result<()> {
    match args.command {
        TokenCommand::Encode { kind, payload } => {
            let payload: Value = read_json(&payload)?;
            let token = ctx.envelope_codec().encode(kind.into(), &payload)?;
            print_token(ctx, &token)
        }
        TokenCommand::Decode { token } => {
            let envelope = ctx
                .envelope_codec()
                .try_decode(&token)
                .map_err(|e| anyhow!("Not an envelope token: {}", e))?;
            print_envelope(ctx, &envelope);
            Ok(())
        }
        TokenCommand::Validate { token, max_age_ms } => validate(ctx, &token, max_age_ms),
        TokenCommand::Seal { payload } => {
            let payload: Value = read_json(&payload)?;
            let token = ctx.sealed_codec().seal(&payload)?;
            print_token(ctx, &token)
        }
        TokenCommand::Open { token } => {
            let payload: Value = ctx
                .sealed_codec()
                .try_open(&token)
                .map_err(|e| anyhow!("Could not open sealed token: {}", e))?;
            ctx.output.json(&payload);
            Ok(())
        }
        TokenCommand::Compress { payload } => {
            let payload: Value = read_json(&payload)?;
            let token = ctx.sealed_codec().compress(&payload)?;
            print_token(ctx, &token)
        }
        TokenCommand::Decompress { token } => {
            let payload: Value = ctx
                .sealed_codec()
                .try_decompress(&token)
                .map_err(|e| anyhow!("Could not decompress token: {}", e))?;
            ctx.output.json(&payload);
            Ok(())
        }
        TokenCommand::Inspect { link } => inspect(ctx, &link),
    }
}

fn print_token(ctx: &Context, token: &str) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&json!({ "token": token, "length": token.chars().count() }));
    } else {
        ctx.output.plain(token);
        ctx.output.debug(&format!("token length: {}", token_length(token)));
    }
    Ok(())
}

fn print_envelope(ctx: &Context, envelope: &Envelope<Value>) {
    if ctx.output.is_json() {
        ctx.output.json(envelope);
        return;
    }

    ctx.output.header("Envelope");
    ctx.output.kv("type", envelope.kind.as_str());
    ctx.output.kv("created", &format_timestamp(envelope.timestamp));
    ctx.output.kv(
        "age",
        &format!("{}ms", envelope.age_ms(SystemClock.now_ms())),
    );
    ctx.output.json(&envelope.data);
}

fn validate(ctx: &Context, token: &str, max_age_ms: Option<i64>) -> Result<()> {
    let result = ctx.envelope_codec().try_validate(token, max_age_ms);

    if ctx.output.is_json() {
        let reason = result.as_ref().err().map(|e| e.to_string());
        ctx.output.json(&json!({ "valid": result.is_ok(), "reason": reason }));
    }

    if let Err(e) = result {
        bail!("Token is not a valid envelope: {}", e);
    }

    ctx.output.success("Token is valid");
    Ok(())
}

fn inspect(ctx: &Context, link: &str) -> Result<()> {
    let query = DeepLinkQuery::parse(query_part(link));
    let params = query.params();
    if params.is_empty() {
        bail!("No deep-link parameters found");
    }

    let mut report = serde_json::Map::new();
    ctx.output.header("Deep link");

    for param in params {
        let Some(token) = query.get(param) else {
            continue;
        };
        let decoded = decode_param(ctx, param, token);

        match &decoded {
            Some(value) => {
                ctx.output.success(param.as_str());
                if !ctx.output.is_json() {
                    ctx.output.json(value);
                }
            }
            None => ctx.output.warn(&format!("{}: could not decode", param)),
        }

        report.insert(
            param.as_str().to_string(),
            decoded.unwrap_or(Value::Null),
        );
    }

    if ctx.output.is_json() {
        ctx.output.json(&report);
    }

    Ok(())
}

/// Decode a parameter with the scheme its name implies.
fn decode_param(ctx: &Context, param: DeepLinkParam, token: &str) -> Option<Value> {
    if param.is_sealed() {
        let sealed = ctx.sealed_codec();
        return sealed.open(token).or_else(|| sealed.decompress(token));
    }
    ctx.envelope_codec()
        .decode(token)
        .and_then(|envelope| serde_json::to_value(envelope).ok())
}

fn token_length(token: &str) -> String {
    format!("{} chars", token.chars().count())
}

fn format_timestamp(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| format!("{}ms", ms))
}
