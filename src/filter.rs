use std::fmt;

use crate::config::Column;
use crate::record::{Fields, GovernmentId};

/// Which party of the receivable a filter looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Seller,
    Sponsor,
}

impl Party {
    pub fn name_column(self) -> Column {
        match self {
            Party::Seller => Column::SellerName,
            Party::Sponsor => Column::SponsorName,
        }
    }

    pub fn id_column(self) -> Column {
        match self {
            Party::Seller => Column::SellerGovernmentId,
            Party::Sponsor => Column::SponsorGovernmentId,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Party::Seller => "seller",
            Party::Sponsor => "sponsor",
        }
    }
}

/// Record filter selected once per run.
///
/// At most one variant is active. Records the filter rejects never reach the
/// running aggregator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    None,
    /// Name equals one of `names` byte for byte. An empty set accepts everything.
    NameIn { party: Party, names: Vec<Vec<u8>> },
    /// Normalized government id equals `id`
    GovernmentId { party: Party, id: GovernmentId },
    /// Name contains `needle`, ASCII case-insensitive. `needle` is stored lowercased.
    NameContains { party: Party, needle: Vec<u8> },
}

impl Filter {
    pub fn name_in<I, S>(party: Party, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        Filter::NameIn {
            party,
            names: names.into_iter().map(|n| n.as_ref().to_vec()).collect(),
        }
    }

    pub fn government_id(party: Party, raw: &str) -> Self {
        Filter::GovernmentId {
            party,
            id: GovernmentId::normalize(raw.as_bytes()),
        }
    }

    pub fn name_contains(party: Party, text: &str) -> Self {
        Filter::NameContains {
            party,
            needle: text.as_bytes().to_ascii_lowercase(),
        }
    }

    /// Input column the filter reads
    pub fn column(&self) -> Option<Column> {
        match self {
            Filter::None => None,
            Filter::NameIn { party, .. } | Filter::NameContains { party, .. } => {
                Some(party.name_column())
            }
            Filter::GovernmentId { party, .. } => Some(party.id_column()),
        }
    }

    /// Decide whether the record in `line` contributes to aggregation.
    ///
    /// `NameContains` lowercases its field inside `line`.
    pub fn evaluate(&self, line: &mut [u8], fields: &Fields) -> bool {
        match self {
            Filter::None => true,
            Filter::NameIn { party, names } => {
                if names.is_empty() {
                    return true;
                }
                let value = fields.get(line, party.name_column()).unwrap_or_default();
                names.iter().any(|name| name.as_slice() == value)
            }
            Filter::GovernmentId { party, id } => {
                let value = fields.get(line, party.id_column()).unwrap_or_default();
                GovernmentId::normalize(value) == *id
            }
            Filter::NameContains { party, needle } => {
                if needle.is_empty() {
                    return true;
                }
                match fields.span(party.name_column()) {
                    Some(span) => {
                        let value = &mut line[span.start..span.end];
                        value.make_ascii_lowercase();
                        contains(value, needle)
                    }
                    None => false,
                }
            }
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::None => write!(f, "none"),
            Filter::NameIn { party, names } => {
                let names: Vec<_> = names.iter().map(|n| String::from_utf8_lossy(n)).collect();
                write!(f, "{} name in [{}]", party.as_str(), names.join(", "))
            }
            Filter::GovernmentId { party, id } => {
                write!(f, "{} government id = {}", party.as_str(), id)
            }
            Filter::NameContains { party, needle } => write!(
                f,
                "{} name contains '{}'",
                party.as_str(),
                String::from_utf8_lossy(needle)
            ),
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.len() <= haystack.len() && haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnLayout;
    use crate::record::Tokenizer;

    /// Tokenize `line` for the columns `filter` reads using a compact layout:
    /// seller name 0, seller id 1, sponsor name 2, sponsor id 3.
    fn eval(filter: &Filter, line: &str) -> (bool, Vec<u8>) {
        let mut layout = ColumnLayout::default();
        layout.set(Column::SellerName, 0);
        layout.set(Column::SellerGovernmentId, 1);
        layout.set(Column::SponsorName, 2);
        layout.set(Column::SponsorGovernmentId, 3);
        let columns: Vec<Column> = filter.column().into_iter().collect();
        let tokenizer = Tokenizer::new(b';', &layout, &columns);

        let mut buf = line.as_bytes().to_vec();
        let mut fields = Fields::new();
        tokenizer.split(&buf, &mut fields);
        let passed = filter.evaluate(&mut buf, &fields);
        (passed, buf)
    }

    #[test]
    fn test_no_filter_accepts_everything() {
        assert!(eval(&Filter::None, "anything").0);
        assert_eq!(Filter::None.column(), None);
    }

    #[test]
    fn test_name_in_set() {
        let filter = Filter::name_in(Party::Seller, ["ACME LTDA", "FOO SA"]);
        assert!(eval(&filter, "ACME LTDA;1;BANK;2").0);
        assert!(eval(&filter, "FOO SA;1;BANK;2").0);
        assert!(!eval(&filter, "acme ltda;1;BANK;2").0);
        assert!(!eval(&filter, "BANK;1;ACME LTDA;2").0);
    }

    #[test]
    fn test_name_in_empty_set_is_noop() {
        let filter = Filter::name_in(Party::Sponsor, Vec::<&str>::new());
        assert!(eval(&filter, "x;1;y;2").0);
    }

    #[test]
    fn test_government_id_filter() {
        let filter = Filter::government_id(Party::Seller, "11222333000181");
        assert!(eval(&filter, "ACME;11.222.333/0001-81;BANK;2").0);
        assert!(!eval(&filter, "ACME;11.222.333/0001-82;BANK;2").0);

        let sponsor = Filter::government_id(Party::Sponsor, "33.000.167/0001-01");
        assert!(eval(&sponsor, "ACME;1;BANK;33000167000101").0);
        assert_eq!(sponsor.column(), Some(Column::SponsorGovernmentId));
    }

    #[test]
    fn test_government_id_filter_on_truncated_line() {
        let filter = Filter::government_id(Party::Sponsor, "33000167000101");
        assert!(!eval(&filter, "ACME;1").0);
    }

    #[test]
    fn test_name_contains_lowercases_in_place() {
        let filter = Filter::name_contains(Party::Sponsor, "Bank");
        let (passed, buf) = eval(&filter, "ACME;1;BIG BANK SA;2");
        assert!(passed);
        assert_eq!(buf, b"ACME;1;big bank sa;2");
        assert!(!eval(&filter, "BANK;1;ACME;2").0);
    }

    #[test]
    fn test_name_contains_empty_needle() {
        let filter = Filter::name_contains(Party::Seller, "");
        assert!(eval(&filter, ";1;x;2").0);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Filter::government_id(Party::Seller, "11.222.333/0001-81").to_string(),
            "seller government id = 11222333000181"
        );
        assert_eq!(
            Filter::name_contains(Party::Sponsor, "Bank").to_string(),
            "sponsor name contains 'bank'"
        );
    }
}
