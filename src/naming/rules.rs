use serde::{Deserialize, Serialize};

/// Naming rule producing physical storage identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DbRule {
    #[default]
    AsIs,
    ReplaceUnderscoresWithSpaces,
    RemoveUnderscoresAndCapitalize,
}

impl DbRule {
    /// Bits belonging to the database category
    pub const MASK: u32 = 31;

    pub const fn bits(self) -> u32 {
        match self {
            DbRule::AsIs => 1,
            DbRule::ReplaceUnderscoresWithSpaces => 2,
            DbRule::RemoveUnderscoresAndCapitalize => 4,
        }
    }

    /// Decode the database category of a combined rule value.
    /// Anything that is not exactly one known rule is `AsIs`.
    pub const fn from_bits(bits: u32) -> Self {
        match bits & Self::MASK {
            2 => DbRule::ReplaceUnderscoresWithSpaces,
            4 => DbRule::RemoveUnderscoresAndCapitalize,
            _ => DbRule::AsIs,
        }
    }

    pub fn apply(self, name: &str) -> String {
        apply_db_rule(name, self)
    }
}

/// Naming rule producing human-facing labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ViewRule {
    #[default]
    AsIs,
    UnderscoresReplaceSpaces,
    ToTitleCase,
    Humanize,
}

impl ViewRule {
    /// Bits belonging to the view category
    pub const MASK: u32 = 480;

    pub const fn bits(self) -> u32 {
        match self {
            ViewRule::AsIs => 32,
            ViewRule::UnderscoresReplaceSpaces => 64,
            ViewRule::ToTitleCase => 128,
            ViewRule::Humanize => 256,
        }
    }

    /// Decode the view category of a combined rule value.
    /// Anything that is not exactly one known rule is `AsIs`.
    pub const fn from_bits(bits: u32) -> Self {
        match bits & Self::MASK {
            64 => ViewRule::UnderscoresReplaceSpaces,
            128 => ViewRule::ToTitleCase,
            256 => ViewRule::Humanize,
            _ => ViewRule::AsIs,
        }
    }

    pub fn apply(self, name: &str) -> String {
        apply_view_rule(name, self)
    }
}

/// A single rule switch, touching only its own category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOverride {
    Db(DbRule),
    View(ViewRule),
}

/// The active pair of naming rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub db: DbRule,
    pub view: ViewRule,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            db: DbRule::AsIs,
            view: ViewRule::Humanize,
        }
    }
}

impl RuleSet {
    pub const fn new(db: DbRule, view: ViewRule) -> Self {
        Self { db, view }
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self {
            db: DbRule::from_bits(bits),
            view: ViewRule::from_bits(bits),
        }
    }

    pub const fn bits(&self) -> u32 {
        self.db.bits() | self.view.bits()
    }

    /// Apply overrides in order; within a category the last one wins
    pub fn apply_overrides(&mut self, overrides: &[RuleOverride]) {
        for rule in overrides {
            match *rule {
                RuleOverride::Db(db) => self.db = db,
                RuleOverride::View(view) => self.view = view,
            }
        }
    }

    pub fn with_overrides(mut self, overrides: &[RuleOverride]) -> Self {
        self.apply_overrides(overrides);
        self
    }

    pub fn db_name(&self, name: &str) -> String {
        apply_db_rule(name, self.db)
    }

    pub fn view_name(&self, name: &str) -> String {
        apply_view_rule(name, self.view)
    }
}

pub fn apply_db_rule(name: &str, rule: DbRule) -> String {
    match rule {
        DbRule::AsIs => name.to_string(),
        DbRule::ReplaceUnderscoresWithSpaces => name.replace('_', " "),
        DbRule::RemoveUnderscoresAndCapitalize => name
            .split('_')
            .filter(|part| !part.trim().is_empty())
            .map(capitalize)
            .collect(),
    }
}

pub fn apply_view_rule(name: &str, rule: ViewRule) -> String {
    match rule {
        ViewRule::AsIs => name.to_string(),
        ViewRule::UnderscoresReplaceSpaces => name.replace('_', " "),
        ViewRule::ToTitleCase => title_case(&name.replace('_', " ")),
        ViewRule::Humanize => humanize(name),
    }
}

/// Turn an identifier into a readable label.
///
/// Underscores become spaces. A space is inserted before an interior
/// letter that starts a new word: an uppercase letter after a lowercase
/// one, or any letter after a digit. A word-starting capital followed by
/// lowercase is lowercased (`itemCount` -> `Item count`), one followed by
/// another capital is kept (`OrderID` -> `Order ID`). The first character
/// is always uppercased.
pub fn humanize(name: &str) -> String {
    let chars: Vec<char> = name
        .chars()
        .map(|c| if c == '_' { ' ' } else { c })
        .collect();

    let mut out = String::with_capacity(chars.len() + 4);
    let Some(&first) = chars.first() else {
        return out;
    };
    out.extend(first.to_uppercase());

    let last = chars.len() - 1;
    for i in 1..chars.len() {
        let c = chars[i];
        if i < last {
            let prev = chars[i - 1];
            let next = chars[i + 1];
            let camel = c.is_uppercase() && prev.is_lowercase();
            let after_digit = c.is_alphabetic() && prev.is_numeric();
            if camel || after_digit {
                out.push(' ');
                if c.is_uppercase() && next.is_lowercase() {
                    out.extend(c.to_lowercase());
                } else {
                    out.push(c);
                }
                continue;
            }
        }
        out.push(c);
    }

    out
}

/// Capitalize every whitespace-separated word, lowercasing the rest of it.
/// Words written entirely in capitals are left alone.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word = String::new();

    for c in text.chars() {
        if c.is_whitespace() {
            push_title_word(&mut out, &word);
            word.clear();
            out.push(c);
        } else {
            word.push(c);
        }
    }
    push_title_word(&mut out, &word);

    out
}

fn push_title_word(out: &mut String, word: &str) {
    let has_letters = word.chars().any(char::is_alphabetic);
    let acronym = has_letters && word.chars().filter(|c| c.is_alphabetic()).all(char::is_uppercase);
    if acronym {
        out.push_str(word);
        return;
    }

    let mut chars = word.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.extend(chars.flat_map(char::to_lowercase));
    }
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("OrderID"), "Order ID");
        assert_eq!(humanize("customer_name"), "Customer name");
        assert_eq!(humanize("item2Count"), "Item2 count");
        assert_eq!(humanize("CustomerName"), "Customer name");
        assert_eq!(humanize("id"), "Id");
        assert_eq!(humanize("x"), "X");
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn test_humanize_is_pure() {
        let first = apply_view_rule("shipVia3Days", ViewRule::Humanize);
        let second = apply_view_rule("shipVia3Days", ViewRule::Humanize);
        assert_eq!(first, second);
        assert_eq!(first, "Ship via3 days");
    }

    #[test]
    fn test_db_rules() {
        assert_eq!(apply_db_rule("order_items", DbRule::AsIs), "order_items");
        assert_eq!(
            apply_db_rule("order_items", DbRule::ReplaceUnderscoresWithSpaces),
            "order items"
        );
        assert_eq!(
            apply_db_rule("order__line_items_", DbRule::RemoveUnderscoresAndCapitalize),
            "OrderLineItems"
        );
    }

    #[test]
    fn test_view_rules() {
        assert_eq!(
            apply_view_rule("ship_to_city", ViewRule::UnderscoresReplaceSpaces),
            "ship to city"
        );
        assert_eq!(
            apply_view_rule("ship_to_CITY", ViewRule::ToTitleCase),
            "Ship To CITY"
        );
        assert_eq!(apply_view_rule("ship_to", ViewRule::AsIs), "ship_to");
    }

    #[test]
    fn test_bits_are_masked_per_category() {
        let rules = RuleSet::from_bits(4 | 128);
        assert_eq!(rules.db, DbRule::RemoveUnderscoresAndCapitalize);
        assert_eq!(rules.view, ViewRule::ToTitleCase);
        assert_eq!(rules.bits(), 4 | 128);

        // two rules of the same category do not decode to either
        let mixed = RuleSet::from_bits(2 | 4 | 64 | 256);
        assert_eq!(mixed.db, DbRule::AsIs);
        assert_eq!(mixed.view, ViewRule::AsIs);
    }

    #[test]
    fn test_overrides_last_wins_per_category() {
        let rules = RuleSet::default().with_overrides(&[
            RuleOverride::View(ViewRule::ToTitleCase),
            RuleOverride::Db(DbRule::ReplaceUnderscoresWithSpaces),
            RuleOverride::View(ViewRule::AsIs),
        ]);
        assert_eq!(rules.db, DbRule::ReplaceUnderscoresWithSpaces);
        assert_eq!(rules.view, ViewRule::AsIs);
    }
}
