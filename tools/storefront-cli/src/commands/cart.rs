//! Cart commands.

use anyhow::{bail, Context as _, Result};
use serde::Deserialize;
use storefront_codec::{DeepLinkParam, DeepLinkQuery, EnvelopeCodec};
use storefront_commerce::cart::{CartLineItem, CartState, CartStore, SlotKey};
use storefront_commerce::checkout::OrderDraft;
use storefront_commerce::text::{LocalizedText, SelectedVariant};
use storefront_commerce::{PackageId, ProductId};

use super::{query_part, read_json, CartArgs, CartCommand, SlotArgs};
use crate::context::Context;
use crate::output::format_money;

/// Run the cart command.
pub fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    let mut store = ctx.open_cart(args.store.as_deref())?;

    match args.command {
        CartCommand::Show => {}
        CartCommand::Add { item } => {
            let item: CartLineItem = read_json(&item).context("Invalid line item")?;
            if item.quantity < 1 {
                ctx.output.warn("Quantity below 1; nothing added");
            }
            store.add(item);
        }
        CartCommand::Remove { slot, index } => match index {
            Some(index) => {
                if index >= store.line_count() {
                    bail!("No row at index {}", index);
                }
                store.remove_by_index(index);
            }
            None => {
                let slot = slot_key(&slot, ctx.locale())?;
                let before = store.line_count();
                store.remove(slot);
                let removed = before - store.line_count();
                ctx.output.info(&format!("Removed {} row(s)", removed));
            }
        },
        CartCommand::SetQty { slot, quantity } => {
            let slot = slot_key(&slot, ctx.locale())?;
            if quantity >= 1 && store.state().find(&slot).is_none() {
                bail!("No row matches {}", slot);
            }
            store.update_quantity(slot, quantity);
        }
        CartCommand::Clear => {
            store.clear();
        }
        CartCommand::Ship { country, state } => {
            let (country, state) = ctx
                .config
                .catalog()
                .resolve(&country, state.as_deref())?;
            store.update_shipping_location(country, state);
            ctx.output
                .debug("shipping location applies to this summary only");
        }
        CartCommand::Import { link } => import(ctx, &mut store, &link)?,
        CartCommand::Checkout => {
            let draft = OrderDraft::from_state(store.state(), ctx.locale());
            if draft.is_empty() {
                bail!("Cart has nothing to order");
            }
            ctx.output.json(&draft);
            return Ok(());
        }
    }

    show(ctx, store.state());
    Ok(())
}

fn show(ctx: &Context, state: &CartState) {
    if ctx.output.is_json() {
        ctx.output.json(state);
        return;
    }

    let currency = ctx.config.cart.currency;
    let locale = ctx.locale();

    ctx.output.header("Cart");
    if state.is_empty() {
        ctx.output.info("Cart is empty");
    }

    let widths = [3, 28, 5, 12, 12];
    if !state.is_empty() {
        ctx.output.table_row(&["#", "Item", "Qty", "Unit", "Total"], &widths);
    }
    for (index, item) in state.items.iter().enumerate() {
        let unit = format_money(item.unit_net_price(), currency);
        let total = format_money(item.line_total(), currency);
        ctx.output.table_row(
            &[
                &index.to_string(),
                &row_label(item, locale),
                &item.quantity.to_string(),
                &unit,
                &total,
            ],
            &widths,
        );
        for variant in &item.selected_variants {
            ctx.output.list_item(&variant.label(locale));
        }
    }

    let summary = &state.summary;
    ctx.output.header("Summary");
    ctx.output.kv("items", &summary.items_count.to_string());
    ctx.output.kv("subtotal", &format_money(summary.subtotal, currency));
    ctx.output.kv("tax", &format_money(summary.implied_tax(), currency));
    ctx.output.kv("shipping", &format_money(summary.shipping_cost, currency));
    if let Some(country) = &summary.selected_country {
        let destination = match &summary.selected_state {
            Some(state) => format!("{}/{}", country.code, state.code),
            None => country.code.clone(),
        };
        ctx.output.kv("ship to", &destination);
    }
    ctx.output.kv("total", &summary.total.display(currency));
}

fn row_label(item: &CartLineItem, locale: &str) -> String {
    let name = item.product_name.display(locale);
    if !name.is_empty() {
        return name.to_string();
    }
    item.package_id
        .as_ref()
        .map(|id| id.to_string())
        .or_else(|| item.product_id.as_ref().map(|id| id.to_string()))
        .unwrap_or_else(|| "(unnamed)".to_string())
}

fn slot_key(args: &SlotArgs, locale: &str) -> Result<SlotKey> {
    let variants = args
        .variants
        .iter()
        .map(|v| parse_variant(v, locale))
        .collect::<Result<Vec<_>>>()?;

    SlotKey::from_parts(
        args.product.clone().map(ProductId::new),
        args.package.clone().map(PackageId::new),
        variants,
    )
    .context("Pass --product or --package")
}

/// Parse `name=value`. A value starting with `{` is read as a locale map.
fn parse_variant(arg: &str, locale: &str) -> Result<SelectedVariant> {
    let Some((name, value)) = arg.split_once('=') else {
        bail!("Variant must be NAME=VALUE: {}", arg);
    };

    let value = if value.trim_start().starts_with('{') {
        serde_json::from_str::<LocalizedText>(value)
            .with_context(|| format!("Invalid variant value: {}", value))?
    } else {
        LocalizedText::new(locale, value)
    };

    Ok(SelectedVariant::new(name.trim(), value))
}

/// A full cart snapshot; only its rows are used.
#[derive(Deserialize)]
struct CartPayload {
    items: Vec<CartLineItem>,
}

/// Add links carry one row or a list.
#[derive(Deserialize)]
#[serde(untagged)]
enum Rows {
    Many(Vec<CartLineItem>),
    One(CartLineItem),
}

impl Rows {
    fn into_vec(self) -> Vec<CartLineItem> {
        match self {
            Rows::Many(rows) => rows,
            Rows::One(row) => vec![row],
        }
    }
}

/// Decode the cart rows an envelope deep-link parameter carries.
///
/// `buyNow` is a checkout handoff and never yields rows.
fn decode_rows(
    envelope: &EnvelopeCodec,
    param: DeepLinkParam,
    token: &str,
) -> Option<Vec<CartLineItem>> {
    match param {
        DeepLinkParam::Product | DeepLinkParam::AddProduct => {
            envelope.decode_product::<Rows>(token).map(Rows::into_vec)
        }
        DeepLinkParam::Package | DeepLinkParam::AddPackage => {
            envelope.decode_package::<Rows>(token).map(Rows::into_vec)
        }
        DeepLinkParam::Items => envelope.decode_items::<CartLineItem>(token),
        DeepLinkParam::Cart => envelope.decode_cart::<CartPayload>(token).map(|c| c.items),
        DeepLinkParam::BuyNow => None,
    }
}

fn import(ctx: &Context, store: &mut CartStore, link: &str) -> Result<()> {
    let mut query = DeepLinkQuery::parse(query_part(link));
    let envelope = ctx.envelope_codec();
    let mut imported = 0;

    for param in query.params() {
        if param.is_sealed() {
            ctx.output
                .warn(&format!("{} is a checkout handoff; inspect it with `token inspect`", param));
            continue;
        }
        let Some(token) = query.take(param) else {
            continue;
        };

        match decode_rows(&envelope, param, &token) {
            Some(rows) => {
                ctx.output
                    .debug(&format!("{}: {} row(s)", param, rows.len()));
                imported += rows.len();
                store.hydrate(rows);
            }
            None => ctx.output.warn(&format!("Ignoring {}: could not decode", param)),
        }
    }

    ctx.output.success(&format!("Imported {} row(s)", imported));
    if !query.is_empty() {
        ctx.output.kv("remaining query", &query.to_query_string());
    }
    Ok(())
}
