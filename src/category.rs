//! Maps Korean business-license labels onto [`ShopCategory`].

use crate::types::ShopCategory;
use tracing::debug;

/// Label table checked in order. The generic `미용업` entry sits last so the
/// substring pass prefers the more specific labels.
pub const CATEGORY_LABELS: [(&str, ShopCategory); 6] = [
    ("네일미용업", ShopCategory::Nail),
    ("일반미용업", ShopCategory::Hair),
    ("종합미용업", ShopCategory::Hair),
    ("피부미용업", ShopCategory::Waxing),
    ("화장ㆍ분장 미용업", ShopCategory::EyebrowTattoo),
    ("미용업", ShopCategory::Hair),
];

/// Category used for any label the table does not know.
pub const FALLBACK_CATEGORY: ShopCategory = ShopCategory::Hair;

/// Map a single trimmed label: exact match, then first table entry contained
/// in the label, then the fallback.
pub fn map_label(label: &str) -> ShopCategory {
    if let Some((_, category)) = CATEGORY_LABELS.iter().find(|(known, _)| *known == label) {
        return *category;
    }
    if let Some((_, category)) = CATEGORY_LABELS.iter().find(|(known, _)| label.contains(*known)) {
        return *category;
    }
    debug!("Unmapped shop type label {:?}, defaulting to {}", label, FALLBACK_CATEGORY);
    FALLBACK_CATEGORY
}

/// Parse a comma separated shop type string into a main category and the
/// remaining distinct categories in first-seen order.
///
/// Both ASCII `,` and full-width `，` separate labels.
pub fn parse_shop_type(type_str: &str) -> (ShopCategory, Option<Vec<ShopCategory>>) {
    let mut unique: Vec<ShopCategory> = Vec::new();
    for label in type_str.split(|c: char| c == ',' || c == '，').map(str::trim) {
        let category = map_label(label);
        if !unique.contains(&category) {
            unique.push(category);
        }
    }

    let mut iter = unique.into_iter();
    let Some(main) = iter.next() else {
        return (FALLBACK_CATEGORY, None);
    };
    let sub: Vec<ShopCategory> = iter.collect();
    (main, if sub.is_empty() { None } else { Some(sub) })
}
