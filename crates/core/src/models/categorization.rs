use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::CoreError;

/// One semantic bucket of the keyword table: any keyword found as a substring
/// of a note suggests `category_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordRule {
    pub bucket: String,
    pub keywords: Vec<String>,
    pub category_id: String,
}

impl KeywordRule {
    pub fn new(bucket: &str, category_id: &str, keywords: &[&str]) -> Self {
        Self {
            bucket: bucket.to_string(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            category_id: category_id.to_string(),
        }
    }
}

/// Ordered keyword rules. Earlier rules win when a note matches several.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordTable {
    pub rules: Vec<KeywordRule>,
}

impl Default for KeywordTable {
    /// Built-in Vietnamese + English table mapped onto the default expense categories.
    fn default() -> Self {
        Self {
            rules: vec![
                KeywordRule::new(
                    "food",
                    "food",
                    &[
                        "ăn", "quán", "nhà hàng", "cà phê", "cafe", "phở", "cơm", "bún", "bánh",
                        "trà", "sữa", "food", "restaurant", "coffee",
                    ],
                ),
                KeywordRule::new(
                    "transport",
                    "transport",
                    &[
                        "xe", "grab", "taxi", "xăng", "đỗ xe", "gửi xe", "vé", "bus", "metro",
                        "transport", "parking",
                    ],
                ),
                KeywordRule::new(
                    "shopping",
                    "shopping",
                    &[
                        "mua", "siêu thị", "chợ", "quần áo", "giày", "shopping", "mall",
                        "thời trang", "fashion",
                    ],
                ),
                KeywordRule::new(
                    "entertainment",
                    "entertainment",
                    &[
                        "phim", "game", "karaoke", "du lịch", "vui chơi", "giải trí", "cinema",
                        "movie", "concert",
                    ],
                ),
                KeywordRule::new(
                    "bills",
                    "bills",
                    &[
                        "điện", "nước", "internet", "điện thoại", "hóa đơn", "bill", "tiền nhà",
                        "rent",
                    ],
                ),
                KeywordRule::new(
                    "health",
                    "health",
                    &[
                        "bệnh viện", "thuốc", "khám", "phòng khám", "health", "hospital",
                        "medicine", "doctor",
                    ],
                ),
                KeywordRule::new(
                    "education",
                    "education",
                    &[
                        "học", "sách", "khóa học", "course", "education", "school", "university",
                    ],
                ),
            ],
        }
    }
}

impl KeywordTable {
    /// Load a replacement table, e.g. for another locale. Keywords are lowercased.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let mut table: KeywordTable = serde_json::from_str(json)?;
        for rule in &mut table.rules {
            if rule.category_id.trim().is_empty() {
                return Err(CoreError::ValidationError(format!(
                    "keyword bucket '{}' has no category id",
                    rule.bucket
                )));
            }
            for keyword in &mut rule.keywords {
                *keyword = keyword.to_lowercase();
            }
            rule.keywords.retain(|k| !k.trim().is_empty());
        }
        Ok(table)
    }
}

/// Word → category id learned from past transaction notes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearnedPatterns {
    words: HashMap<String, String>,
}

impl LearnedPatterns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `word` as pointing at `category_id`, replacing any earlier mapping.
    pub fn insert(&mut self, word: impl Into<String>, category_id: impl Into<String>) {
        self.words.insert(word.into(), category_id.into());
    }

    pub fn category_for(&self, word: &str) -> Option<&str> {
        self.words.get(word).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
