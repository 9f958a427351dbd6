use regex::Regex;
use std::sync::LazyLock;

// 連續的標籤視為一組，一起移除
static TAG_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:</?[a-zA-Z][^>]*>)+").unwrap());

/// Removes every tag-like substring, leaving only visible text.
///
/// Tag runs are removed longest first, and the pass repeats until nothing
/// tag-like is left, so stripping an already stripped string is a no-op.
pub fn strip_markup(text: &str) -> String {
    let mut out = text.to_string();
    loop {
        let mut runs: Vec<&str> = TAG_RUN_RE.find_iter(&out).map(|m| m.as_str()).collect();
        if runs.is_empty() {
            return out;
        }
        runs.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        runs.dedup();

        let mut next = out.clone();
        for run in runs {
            next = next.replace(run, "");
        }
        out = next;
    }
}

/// 參考名單比對前的正規化：去換行、去標籤、`&nbsp;` 轉空白、去頭尾空白
pub fn normalize_text(text: &str) -> String {
    let joined: String = text.chars().filter(|c| *c != '\n' && *c != '\r').collect();
    strip_markup(&joined)
        .replace("&nbsp;", " ")
        .trim()
        .to_string()
}
