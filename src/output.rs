use crate::profile::TokenProfile;
use crate::scanner::CreationTx;
use crate::uniswap::Listing;
use alloy_primitives::Address;
use alloy_primitives::utils::format_units;
use comfy_table::{Cell, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use csv::Writer;
use serde_json::json;

#[derive(Debug, Clone)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            _ => OutputFormat::Table,
        }
    }
}

pub fn format_creations(creations: &[CreationTx], format: &OutputFormat) -> String {
    match format {
        OutputFormat::Table => {
            if creations.is_empty() {
                return "No contract creations found.".to_string();
            }

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec!["Block", "Index", "Tx Hash"]);

            for creation in creations {
                table.add_row(vec![
                    Cell::new(creation.block_number),
                    Cell::new(creation.tx_index),
                    Cell::new(format_hash(&format!("{:?}", creation.hash))),
                ]);
            }
            table.to_string()
        }
        OutputFormat::Json => {
            let entries: Vec<_> = creations
                .iter()
                .map(|c| {
                    json!({
                        "block_number": c.block_number,
                        "tx_index": c.tx_index,
                        "transaction_hash": format!("{:?}", c.hash),
                    })
                })
                .collect();
            serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string())
        }
        OutputFormat::Csv => {
            let mut wtr = Writer::from_writer(vec![]);
            let _ = wtr.write_record(["block_number", "tx_index", "transaction_hash"]);
            for creation in creations {
                let _ = wtr.write_record([
                    &creation.block_number.to_string(),
                    &creation.tx_index.to_string(),
                    &format!("{:?}", creation.hash),
                ]);
            }
            String::from_utf8(wtr.into_inner().unwrap_or_default()).unwrap_or_default()
        }
    }
}

pub fn format_addresses(addresses: &[Address], format: &OutputFormat) -> String {
    match format {
        OutputFormat::Table => {
            if addresses.is_empty() {
                return "No new tokens found.".to_string();
            }

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec!["#", "Token Address"]);

            for (i, address) in addresses.iter().enumerate() {
                table.add_row(vec![Cell::new(i + 1), Cell::new(format!("{address:#}"))]);
            }
            table.to_string()
        }
        OutputFormat::Json => {
            let entries: Vec<_> = addresses
                .iter()
                .map(|a| json!({ "address": format!("{a:?}") }))
                .collect();
            serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string())
        }
        OutputFormat::Csv => {
            let mut wtr = Writer::from_writer(vec![]);
            let _ = wtr.write_record(["address"]);
            for address in addresses {
                let _ = wtr.write_record([&format!("{address:?}")]);
            }
            String::from_utf8(wtr.into_inner().unwrap_or_default()).unwrap_or_default()
        }
    }
}

pub fn format_listings(listings: &[Listing], format: &OutputFormat) -> String {
    match format {
        OutputFormat::Table => {
            if listings.is_empty() {
                return "No listed tokens found.".to_string();
            }

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec!["Token", "Pair"]);

            for listing in listings {
                table.add_row(vec![
                    Cell::new(format!("{:#}", listing.token)),
                    Cell::new(format!("{:#}", listing.pair)),
                ]);
            }
            table.to_string()
        }
        OutputFormat::Json => {
            let entries: Vec<_> = listings
                .iter()
                .map(|l| {
                    json!({
                        "token": format!("{:?}", l.token),
                        "pair": format!("{:?}", l.pair),
                    })
                })
                .collect();
            serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string())
        }
        OutputFormat::Csv => {
            let mut wtr = Writer::from_writer(vec![]);
            let _ = wtr.write_record(["token", "pair"]);
            for listing in listings {
                let _ = wtr.write_record([
                    &format!("{:?}", listing.token),
                    &format!("{:?}", listing.pair),
                ]);
            }
            String::from_utf8(wtr.into_inner().unwrap_or_default()).unwrap_or_default()
        }
    }
}

pub fn format_profiles(profiles: &[TokenProfile], format: &OutputFormat) -> String {
    match format {
        OutputFormat::Table => format_profiles_table(profiles),
        OutputFormat::Json => format_profiles_json(profiles),
        OutputFormat::Csv => format_profiles_csv(profiles),
    }
}

fn format_profiles_table(profiles: &[TokenProfile]) -> String {
    if profiles.is_empty() {
        return "No priced tokens found.".to_string();
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            "Address",
            "Name",
            "Symbol",
            "Decimals",
            "Total Supply",
            "Price (WETH)",
            "Trade Link",
        ]);

    for profile in profiles {
        table.add_row(vec![
            Cell::new(format!("{:#}", profile.address)),
            Cell::new(&profile.name),
            Cell::new(&profile.symbol),
            Cell::new(profile.decimals),
            Cell::new(formatted_supply(profile)),
            Cell::new(display_price(profile)),
            Cell::new(&profile.trade_link),
        ]);
    }

    table.to_string()
}

fn format_profiles_json(profiles: &[TokenProfile]) -> String {
    let entries: Vec<_> = profiles
        .iter()
        .map(|p| {
            json!({
                "address": format!("{:?}", p.address),
                "name": p.name,
                "symbol": p.symbol,
                "decimals": p.decimals,
                "total_supply": formatted_supply(p),
                "total_supply_raw": p.total_supply.to_string(),
                "price_in_reference": display_price(p),
                "trade_link": p.trade_link,
            })
        })
        .collect();

    serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string())
}

fn format_profiles_csv(profiles: &[TokenProfile]) -> String {
    let mut wtr = Writer::from_writer(vec![]);

    let _ = wtr.write_record([
        "address",
        "name",
        "symbol",
        "decimals",
        "total_supply",
        "total_supply_raw",
        "price_in_reference",
        "trade_link",
    ]);

    for profile in profiles {
        let _ = wtr.write_record([
            &format!("{:?}", profile.address),
            &profile.name,
            &profile.symbol,
            &profile.decimals.to_string(),
            &formatted_supply(profile),
            &profile.total_supply.to_string(),
            &display_price(profile),
            &profile.trade_link,
        ]);
    }

    String::from_utf8(wtr.into_inner().unwrap_or_default()).unwrap_or_default()
}

fn formatted_supply(profile: &TokenProfile) -> String {
    format_units(profile.total_supply, profile.decimals)
        .unwrap_or_else(|_| profile.total_supply.to_string())
}

fn display_price(profile: &TokenProfile) -> String {
    // 18 significant digits is plenty for a quote bounded at 1000.
    profile.price_in_reference.with_prec(18).normalized().to_string()
}

fn format_hash(hash: &str) -> String {
    format!("{}...{}", &hash[..6], &hash[hash.len() - 4..])
}
