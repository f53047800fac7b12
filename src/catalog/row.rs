//! One reconciled card into one storefront product row.

use rust_decimal::Decimal;

use crate::model::ReconciledRecord;

pub const VENDOR: &str = "Wizards of the Coast";
pub const PRODUCT_CATEGORY: &str = "Toys & Games > Games > Card Games > Collectible Card Games";
pub const PRODUCT_TYPE: &str = "MTG Single";

/// Column order of the product import file.
pub const HEADER: [&str; 49] = [
    "Handle",
    "Title",
    "Body (HTML)",
    "Vendor",
    "Product Category",
    "Type",
    "Tags",
    "Published",
    "Option1 Name",
    "Option1 Value",
    "Option1 Linked To",
    "Option2 Name",
    "Option2 Value",
    "Option2 Linked To",
    "Option3 Name",
    "Option3 Value",
    "Option3 Linked To",
    "Variant SKU",
    "Variant Grams",
    "Variant Inventory Tracker",
    "Variant Inventory Qty",
    "Variant Inventory Policy",
    "Variant Fulfillment Service",
    "Variant Price",
    "Variant Compare At Price",
    "Variant Requires Shipping",
    "Variant Taxable",
    "Variant Barcode",
    "Image Src",
    "Image Position",
    "Image Alt Text",
    "Gift Card",
    "SEO Title",
    "SEO Description",
    "Card Name (product.metafields.mtg.card_name)",
    "Set Name (product.metafields.mtg.set_name)",
    "Collector Number (product.metafields.mtg.collector_number)",
    "Rarity (product.metafields.mtg.rarity)",
    "Finish (product.metafields.mtg.finish)",
    "Condition (product.metafields.mtg.condition)",
    "Language (product.metafields.mtg.language)",
    "Mana Cost (product.metafields.mtg.mana_cost)",
    "Color (product.metafields.mtg.color)",
    "Artist (product.metafields.mtg.artist)",
    "Variant Image",
    "Variant Weight Unit",
    "Variant Tax Code",
    "Cost per item",
    "Status",
];

/// Card types and supertypes that become tags.
const MAIN_TYPES: [&str; 14] = [
    "Legendary",
    "Basic",
    "Snow",
    "World",
    "Kindred",
    "Tribal",
    "Artifact",
    "Battle",
    "Creature",
    "Enchantment",
    "Instant",
    "Land",
    "Planeswalker",
    "Sorcery",
];

/// Why a reconciled record produced no row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowRejection {
    MissingNameAndSet,
}

impl std::fmt::Display for RowRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowRejection::MissingNameAndSet => write!(f, "missing both card name and set name"),
        }
    }
}

/// Map a reconciled record to a row in [`HEADER`] order.
///
/// Records with neither a name nor a set name are rejected.
pub fn to_row(record: &ReconciledRecord) -> Result<Vec<String>, RowRejection> {
    let card = &record.card;
    let name = card.name.trim();
    let set_name = card.set_name.trim();
    if name.is_empty() && set_name.is_empty() {
        return Err(RowRejection::MissingNameAndSet);
    }

    let foil = record.foil();
    let finish = finish_label(foil);
    let title = match (name.is_empty(), set_name.is_empty()) {
        (false, false) => format!("{name} ({set_name})"),
        (false, true) => name.to_string(),
        (true, _) => set_name.to_string(),
    };
    let image = card.image_url.clone().unwrap_or_default();
    let image_position = if image.is_empty() { "" } else { "1" };

    Ok(vec![
        handle(&card.set_code, &card.collector_number, name),
        title.clone(),
        description(record),
        VENDOR.to_string(),
        PRODUCT_CATEGORY.to_string(),
        PRODUCT_TYPE.to_string(),
        tags(record).join(", "),
        "TRUE".to_string(),
        // Options: condition, finish, language
        "Condition".to_string(),
        record.condition.clone(),
        String::new(),
        "Finish".to_string(),
        finish.to_string(),
        String::new(),
        "Language".to_string(),
        record.language.clone(),
        String::new(),
        // Variant
        sku(&card.set_code, &card.collector_number),
        "2".to_string(),
        "shopify".to_string(),
        record.quantity.to_string(),
        "deny".to_string(),
        "manual".to_string(),
        price(record),
        String::new(),
        "TRUE".to_string(),
        "TRUE".to_string(),
        String::new(),
        // Image
        image.clone(),
        image_position.to_string(),
        name.to_string(),
        "FALSE".to_string(),
        // SEO
        title,
        seo_description(record),
        // Card metafields
        name.to_string(),
        set_name.to_string(),
        card.collector_number.clone(),
        rarity_label(&card.rarity),
        finish.to_string(),
        record.condition.clone(),
        record.language.clone(),
        card.mana_cost.clone().unwrap_or_default(),
        color_label(&card.colors, &card.color_identity).to_string(),
        card.artist.clone().unwrap_or_default(),
        // Trailing variant columns
        image,
        "g".to_string(),
        String::new(),
        cost_per_item(record),
        "active".to_string(),
    ])
}

/// `{set}-{number}-{slug(name)}`, set code lower-cased.
pub fn handle(set_code: &str, collector_number: &str, name: &str) -> String {
    format!(
        "{}-{}-{}",
        set_code.trim().to_lowercase(),
        collector_number.trim(),
        slug(name)
    )
}

/// Lower-case, keep `[a-z0-9]`, whitespace and hyphens, then join words
/// with single hyphens.
pub fn slug(name: &str) -> String {
    let kept: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect();
    kept.split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// `{SET}-{number}`, with `UNK` and `000` standing in for missing parts.
pub fn sku(set_code: &str, collector_number: &str) -> String {
    let set = set_code.trim();
    let number = collector_number.trim();
    format!(
        "{}-{}",
        if set.is_empty() { "UNK".to_string() } else { set.to_uppercase() },
        if number.is_empty() { "000" } else { number }
    )
}

/// Ordered, de-duplicated tag list.
pub fn tags(record: &ReconciledRecord) -> Vec<String> {
    let card = &record.card;
    let mut tags: Vec<String> = Vec::new();
    let mut push = |tag: String| {
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    };

    push(card.set_code.trim().to_uppercase());
    for keyword in &card.keywords {
        push(keyword.trim().to_string());
    }
    if let Some(type_line) = &card.type_line {
        for main_type in main_types(type_line) {
            push(main_type.to_string());
        }
    }
    push(color_label(&card.colors, &card.color_identity).to_string());
    if let Some(mv) = card.mana_value {
        push(format!("MV {}", format_mana_value(mv)));
    }
    push(finish_label(record.foil()).to_string());
    push(rarity_label(&card.rarity));
    push(record.language.clone());

    tags
}

/// Recognized types from the part of each face before the subtype dash.
pub fn main_types(type_line: &str) -> Vec<&'static str> {
    let mut found = Vec::new();
    for face in type_line.split("//") {
        let head = face.split(['—', '-']).next().unwrap_or_default();
        for word in head.split_whitespace() {
            if let Some(t) = MAIN_TYPES.iter().find(|t| **t == word) {
                if !found.contains(t) {
                    found.push(*t);
                }
            }
        }
    }
    found
}

/// One color name, `Multicolor`, or `Colorless`; identity is the fallback
/// when the card itself lists no colors.
pub fn color_label(colors: &[String], color_identity: &[String]) -> &'static str {
    let source = if colors.is_empty() { color_identity } else { colors };
    match source {
        [] => "Colorless",
        [single] => match single.as_str() {
            "W" => "White",
            "U" => "Blue",
            "B" => "Black",
            "R" => "Red",
            "G" => "Green",
            _ => "Colorless",
        },
        _ => "Multicolor",
    }
}

pub fn rarity_label(rarity: &str) -> String {
    let rarity = rarity.trim();
    match rarity.to_ascii_lowercase().as_str() {
        "" => String::new(),
        "common" => "Common".to_string(),
        "uncommon" => "Uncommon".to_string(),
        "rare" => "Rare".to_string(),
        "mythic" => "Mythic".to_string(),
        "special" => "Special".to_string(),
        "bonus" => "Bonus".to_string(),
        _ => {
            let mut chars = rarity.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

fn finish_label(foil: bool) -> &'static str {
    if foil { "Foil" } else { "Non-Foil" }
}

fn format_mana_value(mv: f64) -> String {
    if mv.fract() == 0.0 {
        format!("{}", mv as i64)
    } else {
        format!("{mv}")
    }
}

/// Product body HTML.
pub fn description(record: &ReconciledRecord) -> String {
    let card = &record.card;
    let oracle = card
        .oracle_text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(html_lines);
    let type_line = card.type_line.as_deref().map(str::trim).filter(|t| !t.is_empty());

    match (type_line, oracle) {
        (Some(type_line), oracle) => {
            let mut body = format!("<p>{type_line}");
            if card.is_creature() {
                if let (Some(p), Some(t)) = (&card.power, &card.toughness) {
                    body.push_str(&format!(" - {p}/{t}"));
                }
            }
            if let Some(oracle) = oracle {
                body.push_str(" - ");
                body.push_str(&oracle);
            }
            body.push_str("</p>");
            body
        }
        (None, Some(oracle)) => oracle,
        (None, None) => card.name.trim().to_string(),
    }
}

fn html_lines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "<br>")
}

fn seo_description(record: &ReconciledRecord) -> String {
    let card = &record.card;
    let mut text = card.name.trim().to_string();
    if let Some(type_line) = card.type_line.as_deref().filter(|t| !t.is_empty()) {
        text.push_str(&format!(" - {type_line}"));
    }
    if !card.set_name.trim().is_empty() {
        text.push_str(&format!(" from {}", card.set_name.trim()));
    }
    text.push('.');
    text
}

/// Foil price for foil copies when known, else the regular price.
fn price(record: &ReconciledRecord) -> String {
    let card = &record.card;
    let money = if record.foil() {
        card.foil_price.as_ref().or(card.price.as_ref())
    } else {
        card.price.as_ref()
    };
    format_amount(money.map(|m| m.amount).unwrap_or(Decimal::ZERO))
}

fn cost_per_item(record: &ReconciledRecord) -> String {
    if record.purchase_price > Decimal::ZERO {
        format_amount(record.purchase_price)
    } else {
        String::new()
    }
}

fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}
