//! The static rule catalog.
//!
//! The catalog is an ordered list of [`RuleDescriptor`]s. Order matters: the
//! rule matcher walks it front to back and the last matching descriptor
//! decides whether a message is shown.

use std::collections::HashSet;
use std::path::Path;

use eyre::{Result, WrapErr};
use serde::Deserialize;

/// Rule id reported by the prh dictionary engine for every finding, whatever
/// dictionary entry produced it.
pub const AGGREGATOR_RULE_ID: &str = "prh";

/// A known proofreading rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDescriptor {
    /// Namespaced rule id, e.g. `preset-japanese/max-ten`.
    pub id: String,
    /// Name shown in the editor's settings UI; also the settings key.
    pub display_name: String,
    /// Whether the rule is enabled when the user has not configured it.
    pub default_enabled: bool,
}

impl RuleDescriptor {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, default_enabled: bool) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            default_enabled,
        }
    }

    /// The part of the id after its last `/`.
    ///
    /// The prh engine embeds this key in its messages as `（key）`.
    pub fn short_key(&self) -> &str {
        self.id
            .rsplit_once('/')
            .map(|(_, key)| key)
            .unwrap_or(&self.id)
    }
}

/// Ordered, immutable list of rule descriptors.
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    rules: Vec<RuleDescriptor>,
}

impl RuleCatalog {
    /// Build a catalog, rejecting empty catalogs and duplicate ids or names.
    pub fn new(rules: Vec<RuleDescriptor>) -> Result<Self> {
        if rules.is_empty() {
            eyre::bail!("Rule catalog is empty");
        }

        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for rule in &rules {
            if rule.id.is_empty() || rule.display_name.is_empty() {
                eyre::bail!("Rule catalog entry has an empty id or display name: {rule:?}");
            }
            if !ids.insert(rule.id.as_str()) {
                eyre::bail!("Duplicate rule id in catalog: {}", rule.id);
            }
            if !names.insert(rule.display_name.as_str()) {
                eyre::bail!("Duplicate rule display name in catalog: {}", rule.display_name);
            }
        }

        Ok(Self { rules })
    }

    /// The catalog shipped with kousei.
    pub fn builtin() -> Self {
        let rules = BUILTIN_RULES
            .iter()
            .map(|(id, name)| RuleDescriptor::new(*id, *name, true))
            .collect();
        Self { rules }
    }

    /// Parse a catalog from a JSON array of descriptors.
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: Vec<RuleDescriptor> =
            serde_json::from_str(json).wrap_err("Rule catalog is not a valid descriptor list")?;
        Self::new(rules)
    }

    /// Read a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read rule catalog {}", path.display()))?;
        Self::from_json(&json).wrap_err_with(|| format!("Invalid rule catalog {}", path.display()))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RuleDescriptor> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&RuleDescriptor> {
        self.rules.iter().find(|rule| rule.id == id)
    }
}

impl<'a> IntoIterator for &'a RuleCatalog {
    type Item = &'a RuleDescriptor;
    type IntoIter = std::slice::Iter<'a, RuleDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// (id, display name) of every built-in rule, all enabled by default.
///
/// The display names double as keys under `japanese-proofreading.textlint`
/// in the editor settings, so they must not change.
const BUILTIN_RULES: &[(&str, &str)] = &[
    ("preset-japanese/max-ten", "読点の数"),
    (
        "preset-japanese/no-doubled-conjunctive-particle-ga",
        "逆接の「が」の複数回出現",
    ),
    ("preset-japanese/no-doubled-conjunction", "接続詞の連続"),
    ("preset-japanese/no-double-negative-ja", "二重否定"),
    ("preset-japanese/no-doubled-joshi", "助詞の連続"),
    ("preset-japanese/no-dropping-the-ra", "ら抜き言葉"),
    ("preset-japanese/no-mix-dearu-desumasu", "ですます調"),
    ("preset-japanese/no-nfd", "不自然な濁点"),
    ("preset-japanese/no-invalid-control-character", "制御文字"),
    ("preset-japanese/no-zero-width-spaces", "ゼロ幅スペース"),
    ("preset-japanese/no-kangxi-radicals", "康煕部首"),
    ("prh/誤字", "誤字"),
    ("prh/重言", "重言"),
    ("prh/ひらく漢字", "ひらく漢字"),
    ("prh/冗長な表現", "冗長な表現"),
    ("prh/外来語カタカナ表記", "外来語カタカナ表記"),
    ("prh/固有名詞", "固有名詞"),
    ("prh/技術用語", "技術用語"),
    // Half-width "." and "," used as Japanese punctuation.
    (
        "preset-jtf-style/1.2.1.句点(。)と読点(、)",
        "ピリオドとカンマの使用（半角）",
    ),
    // Full-width "．" and "，" used as Japanese punctuation. Only one hit per line.
    (
        "preset-jtf-style/1.2.2.ピリオド(.)とカンマ(,)",
        "ピリオドとカンマの使用（全角）",
    ),
    ("preset-jtf-style/2.1.8.算用数字", "算用数字"),
    ("preset-jtf-style/2.1.9.アルファベット", "アルファベット"),
    (
        "preset-jtf-style/2.2.2.算用数字と漢数字の使い分け",
        "算用数字と漢数字の使い分け",
    ),
    (
        "preset-jtf-style/2.2.3.一部の助数詞の表記",
        "一部の助数詞の表記",
    ),
    (
        "preset-jtf-style/3.1.1.全角文字と半角文字の間",
        "全角文字と半角文字の間",
    ),
    ("preset-jtf-style/3.1.2.全角文字どうし", "全角文字どうし"),
    (
        "preset-jtf-style/3.3.かっこ類と隣接する文字の間のスペースの有無",
        "かっこ類と隣接する文字の間のスペースの有無",
    ),
    ("preset-jtf-style/4.2.2.疑問符(？)", "疑問符(？)"),
    ("preset-jtf-style/4.2.6.ハイフン(-)", "ハイフン(-)"),
    ("preset-jtf-style/4.2.9.ダッシュ(-)", "ダッシュ(-)"),
    ("preset-jtf-style/4.3.1.丸かっこ（）", "丸かっこ（）"),
    ("preset-jtf-style/4.3.2.大かっこ［］", "大かっこ［］"),
];
