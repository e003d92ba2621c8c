//! Per-user emoji usage. A comment's avatar is an emoji on a two-color background;
//! the pair maps to a short code so `GB🐸` and `LB🐸` count separately.

use crate::archive::ArchiveStore;
use crate::date::Window;
use ahash::AHashMap;

/// Code for color pairs not in the table.
pub const UNKNOWN_COLOR_CODE: &str = "??";

/// (primary, secondary) -> code.
const COLOR_CODES: &[(&str, &str, &str)] = &[
    ("#00CBFE", "#00CBFE", "LB"),
    ("#00CBFE", "#0D13D5", "GB"),
    ("#15FF46", "#15FF46", "G"),
    ("#15FF46", "#3FC0FF", "G2"),
    ("#5857FF", "#5857FF", "PB"),
    ("#6EFFE6", "#6EFFE6", "CY"),
    ("#76FFE7", "#00A4FF", "GC"),
    ("#8483FF", "#5857FF", "GP"),
    ("#927AFF", "#927AFF", "PW"),
    ("#C0FF2D", "#C0FF2D", "YG"),
    ("#C16AFF", "#C16AFF", "P"),
    ("#C38637", "#C38637", "BR"),
    ("#D9FB8A", "#B1FD00", "GG"),
    ("#E9FDFB", "#E9FDFB", "W"),
    ("#FA81FF", "#722DFF", "LP"),
    ("#FA81FF", "#FF1885", "PI"),
    ("#FF7373", "#FF7373", "CO"),
    ("#FF7A7A", "#FF7A7A", "CO"),
    ("#FF9541", "#FF9541", "O"),
    ("#FFA236", "#FF3232", "GO"),
    ("#FFA953", "#FFA953", "LO"),
    ("#FFD38C", "#C38737", "GT"),
    ("#FFD38C", "#FFD38C", "T"),
    ("#FFD815", "#FFD815", "Y"),
    ("#FFF680", "#FFDA00", "GY"),
    ("#FFF98D", "#FFF98D", "LY"),
];

/// Short code for a color pair; hex digits compare case-insensitively.
pub fn color_code(primary: Option<&str>, secondary: Option<&str>) -> &'static str {
    let (Some(p), Some(s)) = (primary, secondary) else { return UNKNOWN_COLOR_CODE };
    COLOR_CODES
        .iter()
        .find(|(cp, cs, _)| cp.eq_ignore_ascii_case(p) && cs.eq_ignore_ascii_case(s))
        .map(|(_, _, code)| *code)
        .unwrap_or(UNKNOWN_COLOR_CODE)
}

/// `author`'s comment avatars (color code + emoji) with counts, most used first
/// (ties by code). Comments showing the OP badge have no emoji and are skipped.
/// Entries whose share of the author's total is not above `min_share` are dropped.
pub fn emoji_usage(store: &ArchiveStore, author: &str, window: &Window, min_share: f64) -> Vec<(String, u64)> {
    let mut counts: AHashMap<String, u64> = AHashMap::new();

    for (_, thread) in store.all() {
        for c in thread {
            if c.author_id.as_deref() != Some(author) || !window.contains(c.created_at) { continue; }
            let Some(emoji) = c.emoji.as_deref().filter(|e| *e != "OP") else { continue };
            let code = color_code(c.color.as_deref(), c.secondary_color.as_deref());
            *counts.entry(format!("{code}{emoji}")).or_insert(0) += 1;
        }
    }

    let total: u64 = counts.values().sum();
    if total == 0 {
        return Vec::new();
    }
    let mut ranked: Vec<(String, u64)> =
        counts.into_iter().filter(|(_, n)| *n as f64 / total as f64 > min_share).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}
