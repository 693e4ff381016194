use anyhow::{Context, Result};
use sentinels_setup::Pack;
use std::collections::BTreeSet;

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Resolve a comma-separated pack list. `all` selects every pack; `promos`
/// adds the promo cards on top of whatever was listed.
pub fn parse_packs(list: &str, promos: bool) -> Result<BTreeSet<Pack>> {
    let mut packs = BTreeSet::new();
    for token in split_csv(list) {
        if token.eq_ignore_ascii_case("all") {
            packs.extend(Pack::ALL);
            continue;
        }
        let pack: Pack = token
            .parse()
            .with_context(|| format!("expected one of: all, {}", pack_keys()))?;
        packs.insert(pack);
    }
    if promos {
        packs.insert(Pack::Promos);
    }
    Ok(packs)
}

fn pack_keys() -> String {
    Pack::ALL
        .iter()
        .map(|pack| pack.key())
        .collect::<Vec<_>>()
        .join(", ")
}
